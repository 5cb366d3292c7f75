//! Loader for the archived dictionary bundle.
//!
//! The bundle is a ZIP archive of nine logical sub-files. Members may
//! appear in any order and unknown members are ignored. A missing or
//! corrupt member degrades to that member's fallback only; the loader
//! never fails outright once the archive itself is readable.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use hashbrown::HashMap;

use crate::dictionary::character::CharProperty;
use crate::dictionary::connection::ConnectionTable;
use crate::dictionary::morph::Morph;
use crate::dictionary::reader::{BinaryReader, VarintReader};
use crate::dictionary::trie::{DaNode, IndexTable};
use crate::dictionary::unknown::UnkDict;
use crate::dictionary::{
    Dict, DictInfo, PosTable, BASE_FORM_INDEX, INFLECTIONAL_FORM, INFLECTIONAL_TYPE,
    POS_HIERARCHY, POS_START_INDEX, PRONUNCIATION_INDEX, READING_INDEX,
};
use crate::errors::{KagomeError, Result};

pub(crate) const MORPH_DICT: &str = "morph.dict";
pub(crate) const POS_DICT: &str = "pos.dict";
pub(crate) const CONTENT_META: &str = "content.meta";
pub(crate) const CONTENT_DICT: &str = "content.dict";
pub(crate) const INDEX_DICT: &str = "index.dict";
pub(crate) const CONNECTION_DICT: &str = "connection.dict";
pub(crate) const CHAR_DEF_DICT: &str = "chardef.dict";
pub(crate) const UNK_DICT: &str = "unk.dict";
pub(crate) const DICT_INFO: &str = "dict.info";

const MAX_MORPH_COUNT: u64 = 10_000_000;
const MAX_POS_NAMES: u64 = 100_000;
const MAX_CONTENT_ROWS: usize = 10_000_000;
const MAX_DA_SIZE: u64 = 10_000_000;
const MAX_DUP_SIZE: u64 = 1_000_000;
const MAX_CONNECTION_DIM: u64 = 100_000;
const MAX_UNK_ENTRIES: u64 = 100_000;

/// The largest plausible dictionary file, used by path discovery.
const MAX_DICT_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Per-sub-file outcomes of a load, as diagnostic strings.
#[derive(Debug, Default)]
pub struct LoadReport {
    notes: Vec<String>,
    fallbacks: usize,
}

impl LoadReport {
    fn ok(&mut self, member: &str, detail: String) {
        self.notes.push(format!("{member}: {detail}"));
    }

    fn fell_back(&mut self, member: &str, reason: &str) {
        log::warn!("{member}: falling back ({reason})");
        self.notes.push(format!("{member}: fallback ({reason})"));
        self.fallbacks += 1;
    }

    /// Diagnostic strings, one per sub-file.
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// The number of sub-files replaced by fallback data.
    pub fn fallback_count(&self) -> usize {
        self.fallbacks
    }
}

impl Dict {
    /// Loads a dictionary bundle from a file path.
    ///
    /// # Errors
    ///
    /// [`KagomeError`] is returned only when the archive itself cannot be
    /// opened; sub-file problems degrade to fallback data and are reported
    /// through the [`LoadReport`].
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<(Self, LoadReport)> {
        let file = File::open(path.as_ref())?;
        Self::from_zip(BufReader::new(file))
    }

    /// Loads a dictionary bundle from a seekable reader over ZIP data.
    pub fn from_zip<R: Read + Seek>(rdr: R) -> Result<(Self, LoadReport)> {
        let mut archive = zip::ZipArchive::new(rdr)?;
        let mut members: HashMap<String, Vec<u8>> = HashMap::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_string();
            if !matches!(
                name.as_str(),
                MORPH_DICT
                    | POS_DICT
                    | CONTENT_META
                    | CONTENT_DICT
                    | INDEX_DICT
                    | CONNECTION_DICT
                    | CHAR_DEF_DICT
                    | UNK_DICT
                    | DICT_INFO
            ) {
                continue;
            }
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            members.insert(name, data);
        }
        Ok(Self::assemble(&members))
    }

    fn assemble(members: &HashMap<String, Vec<u8>>) -> (Self, LoadReport) {
        fn load<'a>(members: &'a HashMap<String, Vec<u8>>, name: &str) -> Option<&'a [u8]> {
            members.get(name).map(Vec::as_slice)
        }

        let mut report = LoadReport::default();

        let morphs = match load(members, MORPH_DICT).map(load_morphs) {
            Some(Ok(morphs)) => {
                report.ok(MORPH_DICT, format!("loaded {} morphs", morphs.len()));
                morphs
            }
            outcome => {
                report.fell_back(MORPH_DICT, &describe(outcome.map(|r| r.err())));
                fallback_morphs()
            }
        };

        let pos_table = match load(members, POS_DICT).map(load_pos) {
            Some(Ok(table)) => {
                report.ok(
                    POS_DICT,
                    format!("loaded {} names, {} entries", table.names.len(), table.entries.len()),
                );
                table
            }
            outcome => {
                report.fell_back(POS_DICT, &describe(outcome.map(|r| r.err())));
                fallback_pos_table()
            }
        };

        let contents_meta = match load(members, CONTENT_META).map(load_meta) {
            Some(Ok(meta)) => {
                report.ok(CONTENT_META, format!("loaded {} keys", meta.len()));
                meta
            }
            outcome => {
                report.fell_back(CONTENT_META, &describe(outcome.map(|r| r.err())));
                fallback_meta()
            }
        };

        let contents = match load(members, CONTENT_DICT).map(load_contents) {
            Some(Ok(contents)) => {
                report.ok(CONTENT_DICT, format!("loaded {} rows", contents.len()));
                contents
            }
            outcome => {
                report.fell_back(CONTENT_DICT, &describe(outcome.map(|r| r.err())));
                Vec::new()
            }
        };

        let index = match load(members, INDEX_DICT).map(load_index) {
            Some(Ok(index)) => {
                report.ok(INDEX_DICT, "loaded double array".to_string());
                index
            }
            outcome => {
                report.fell_back(INDEX_DICT, &describe(outcome.map(|r| r.err())));
                IndexTable::default()
            }
        };

        let connection = match load(members, CONNECTION_DICT).map(load_connection) {
            Some(Ok(conn)) => {
                report.ok(
                    CONNECTION_DICT,
                    format!("loaded {}x{} matrix", conn.num_rows(), conn.num_cols()),
                );
                conn
            }
            outcome => {
                report.fell_back(CONNECTION_DICT, &describe(outcome.map(|r| r.err())));
                fallback_connection()
            }
        };

        let char_prop = match load(members, CHAR_DEF_DICT).map(load_chardef) {
            Some(Ok(prop)) => {
                report.ok(CHAR_DEF_DICT, "loaded character classes".to_string());
                prop
            }
            outcome => {
                report.fell_back(CHAR_DEF_DICT, &describe(outcome.map(|r| r.err())));
                CharProperty::fallback()
            }
        };

        let unk = match load(members, UNK_DICT).map(load_unk) {
            Some(Ok(unk)) => {
                report.ok(UNK_DICT, format!("loaded {} entries", unk.morphs.len()));
                unk
            }
            outcome => {
                report.fell_back(UNK_DICT, &describe(outcome.map(|r| r.err())));
                UnkDict::fallback()
            }
        };

        let info = match load(members, DICT_INFO).map(load_info) {
            Some(Ok(info)) => {
                report.ok(DICT_INFO, format!("{} ({})", info.name, info.src));
                info
            }
            outcome => {
                report.fell_back(DICT_INFO, &describe(outcome.map(|r| r.err())));
                fallback_info()
            }
        };

        let dict = Dict {
            morphs,
            pos_table,
            contents_meta,
            contents,
            connection,
            index,
            char_prop,
            unk,
            info,
        };
        (dict, report)
    }

    /// The minimal built-in dictionary.
    ///
    /// Keeps the engine running with degraded quality when no bundle can be
    /// read: every sub-file is its fallback, so any input segments into
    /// classifier-driven unknown runs.
    pub fn fallback() -> Self {
        Self {
            morphs: fallback_morphs(),
            pos_table: fallback_pos_table(),
            contents_meta: fallback_meta(),
            contents: Vec::new(),
            connection: fallback_connection(),
            index: IndexTable::default(),
            char_prop: CharProperty::fallback(),
            unk: UnkDict::fallback(),
            info: fallback_info(),
        }
    }
}

fn describe(err: Option<Option<KagomeError>>) -> String {
    match err {
        None => "missing member".to_string(),
        Some(Some(e)) => e.to_string(),
        Some(None) => unreachable!("fallback taken on success"),
    }
}

fn fallback_morphs() -> Vec<Morph> {
    vec![
        Morph::new(1, 1, 1000),
        Morph::new(2, 2, 2000),
        Morph::new(3, 3, 3000),
    ]
}

fn fallback_pos_table() -> PosTable {
    PosTable {
        names: vec!["名詞".to_string(), "動詞".to_string(), "形容詞".to_string()],
        entries: vec![vec![0], vec![1], vec![2]],
    }
}

fn fallback_meta() -> HashMap<String, u32> {
    let mut meta = HashMap::new();
    meta.insert(POS_START_INDEX.to_string(), 0);
    meta.insert(POS_HIERARCHY.to_string(), 4);
    meta.insert(INFLECTIONAL_TYPE.to_string(), 4);
    meta.insert(INFLECTIONAL_FORM.to_string(), 5);
    meta.insert(BASE_FORM_INDEX.to_string(), 6);
    meta.insert(READING_INDEX.to_string(), 7);
    meta.insert(PRONUNCIATION_INDEX.to_string(), 8);
    meta
}

fn fallback_connection() -> ConnectionTable {
    ConnectionTable::new(3, 3, vec![0, 100, 200, 100, 0, 150, 200, 150, 0])
}

fn fallback_info() -> DictInfo {
    DictInfo {
        name: "Fallback Dictionary".to_string(),
        src: "internal".to_string(),
    }
}

fn load_morphs(data: &[u8]) -> Result<Vec<Morph>> {
    let mut rdr = BinaryReader::new(data);
    let count = rdr.u64()?;
    if count > MAX_MORPH_COUNT {
        return Err(KagomeError::invalid_format(
            "morph.dict",
            format!("morph count {count} exceeds the limit"),
        ));
    }
    let mut morphs = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let left_id = rdr.i16()?;
        let right_id = rdr.i16()?;
        let weight = rdr.i16()?;
        morphs.push(Morph::new(left_id, right_id, weight));
    }
    Ok(morphs)
}

fn load_pos(data: &[u8]) -> Result<PosTable> {
    let mut rdr = VarintReader::new(data);
    let name_count = rdr.u64()?;
    if name_count > MAX_POS_NAMES {
        return Err(KagomeError::invalid_format(
            "pos.dict",
            format!("name count {name_count} exceeds the limit"),
        ));
    }
    let mut names = Vec::with_capacity(name_count as usize);
    for _ in 0..name_count {
        names.push(rdr.string()?);
    }
    let entry_count = rdr.u64()?;
    if entry_count > MAX_MORPH_COUNT {
        return Err(KagomeError::invalid_format(
            "pos.dict",
            format!("entry count {entry_count} exceeds the limit"),
        ));
    }
    let mut entries = Vec::with_capacity(entry_count as usize);
    for _ in 0..entry_count {
        let k = rdr.usize()?;
        let mut ids = Vec::with_capacity(k.min(16));
        for _ in 0..k {
            ids.push(u32::try_from(rdr.u64()?)?);
        }
        entries.push(ids);
    }
    Ok(PosTable { names, entries })
}

fn load_meta(data: &[u8]) -> Result<HashMap<String, u32>> {
    let mut rdr = VarintReader::new(data);
    let count = rdr.u64()?;
    if count > 1000 {
        return Err(KagomeError::invalid_format(
            "content.meta",
            format!("key count {count} exceeds the limit"),
        ));
    }
    let mut meta = HashMap::with_capacity(count as usize);
    for _ in 0..count {
        let key = rdr.string()?;
        let value = u32::try_from(rdr.u64()?)?;
        meta.insert(key, value);
    }
    Ok(meta)
}

fn load_contents(data: &[u8]) -> Result<Vec<Vec<String>>> {
    const ROW_DELIMITER: char = '\n';
    const COL_DELIMITER: char = '\x07';

    let text = std::str::from_utf8(data)?;
    let mut rows = Vec::new();
    for row in text.split(ROW_DELIMITER) {
        if row.is_empty() {
            continue;
        }
        if rows.len() >= MAX_CONTENT_ROWS {
            return Err(KagomeError::invalid_format(
                "content.dict",
                "row count exceeds the limit",
            ));
        }
        rows.push(row.split(COL_DELIMITER).map(str::to_string).collect());
    }
    Ok(rows)
}

fn load_index(data: &[u8]) -> Result<IndexTable> {
    let mut rdr = BinaryReader::new(data);
    let da_size = rdr.u64()?;
    if da_size > MAX_DA_SIZE {
        return Err(KagomeError::invalid_format(
            "index.dict",
            format!("double-array size {da_size} exceeds the limit"),
        ));
    }
    let mut da = Vec::with_capacity(da_size as usize);
    for _ in 0..da_size {
        let base = rdr.i32()?;
        let check = rdr.i32()?;
        da.push(DaNode::new(base, check));
    }
    let dup_size = rdr.u64()?;
    if dup_size > MAX_DUP_SIZE {
        return Err(KagomeError::invalid_format(
            "index.dict",
            format!("duplicate-map size {dup_size} exceeds the limit"),
        ));
    }
    let mut dup = HashMap::with_capacity(dup_size as usize);
    for _ in 0..dup_size {
        let id = rdr.i32()?;
        let extra = rdr.i32()?;
        dup.insert(id, extra);
    }
    Ok(IndexTable::from_raw(da, dup))
}

fn load_connection(data: &[u8]) -> Result<ConnectionTable> {
    let mut rdr = BinaryReader::new(data);
    let rows = rdr.u64()?;
    let cols = rdr.u64()?;
    if rows > MAX_CONNECTION_DIM || cols > MAX_CONNECTION_DIM {
        return Err(KagomeError::invalid_format(
            "connection.dict",
            format!("matrix size {rows}x{cols} exceeds the limit"),
        ));
    }
    let total = (rows * cols) as usize;
    let mut costs = Vec::with_capacity(total);
    for _ in 0..total {
        costs.push(rdr.i16()?);
    }
    Ok(ConnectionTable::new(rows as usize, cols as usize, costs))
}

fn load_chardef(data: &[u8]) -> Result<CharProperty> {
    let mut rdr = BinaryReader::new(data);
    let cate_count = rdr.u64()?;
    if cate_count > 64 {
        return Err(KagomeError::invalid_format(
            "chardef.dict",
            format!("category count {cate_count} exceeds the limit"),
        ));
    }
    let mut invoke = Vec::with_capacity(cate_count as usize);
    let mut group = Vec::with_capacity(cate_count as usize);
    for _ in 0..cate_count {
        let flags = rdr.bytes(2)?;
        invoke.push(flags[0] != 0);
        group.push(flags[1] != 0);
    }
    let table_len = rdr.u64()?;
    if table_len > 0x10000 {
        return Err(KagomeError::invalid_format(
            "chardef.dict",
            format!("table length {table_len} exceeds the BMP"),
        ));
    }
    let table = rdr.bytes(table_len as usize)?;
    CharProperty::from_parts(table, invoke, group)
}

fn load_unk(data: &[u8]) -> Result<UnkDict> {
    let mut rdr = VarintReader::new(data);

    let index_count = rdr.u64()?;
    if index_count > MAX_UNK_ENTRIES {
        return Err(KagomeError::invalid_format(
            "unk.dict",
            format!("index count {index_count} exceeds the limit"),
        ));
    }
    let mut index = HashMap::with_capacity(index_count as usize);
    for _ in 0..index_count {
        let cate = i32::try_from(rdr.u64()?)?;
        let id = i32::try_from(rdr.u64()?)?;
        index.insert(cate, id);
    }

    let dup_count = rdr.u64()?;
    if dup_count > MAX_UNK_ENTRIES {
        return Err(KagomeError::invalid_format(
            "unk.dict",
            format!("duplicate count {dup_count} exceeds the limit"),
        ));
    }
    let mut index_dup = HashMap::with_capacity(dup_count as usize);
    for _ in 0..dup_count {
        let cate = i32::try_from(rdr.u64()?)?;
        let extra = i32::try_from(rdr.u64()?)?;
        index_dup.insert(cate, extra);
    }

    let morph_count = rdr.u64()?;
    if morph_count > MAX_UNK_ENTRIES {
        return Err(KagomeError::invalid_format(
            "unk.dict",
            format!("morph count {morph_count} exceeds the limit"),
        ));
    }
    let mut morphs = Vec::with_capacity(morph_count as usize);
    for _ in 0..morph_count {
        let left_id = i16::try_from(rdr.i64()?)?;
        let right_id = i16::try_from(rdr.i64()?)?;
        let weight = i16::try_from(rdr.i64()?)?;
        morphs.push(Morph::new(left_id, right_id, weight));
    }

    let meta_count = rdr.u64()?;
    if meta_count > 1000 {
        return Err(KagomeError::invalid_format(
            "unk.dict",
            format!("metadata count {meta_count} exceeds the limit"),
        ));
    }
    let mut contents_meta = HashMap::with_capacity(meta_count as usize);
    for _ in 0..meta_count {
        let key = rdr.string()?;
        let value = u32::try_from(rdr.u64()?)?;
        contents_meta.insert(key, value);
    }

    let content_count = rdr.u64()?;
    if content_count > MAX_UNK_ENTRIES {
        return Err(KagomeError::invalid_format(
            "unk.dict",
            format!("content count {content_count} exceeds the limit"),
        ));
    }
    let mut contents = Vec::with_capacity(content_count as usize);
    for _ in 0..content_count {
        let k = rdr.usize()?;
        let mut row = Vec::with_capacity(k.min(32));
        for _ in 0..k {
            row.push(rdr.string()?);
        }
        contents.push(row);
    }

    Ok(UnkDict {
        morphs,
        index,
        index_dup,
        contents_meta,
        contents,
    })
}

fn load_info(data: &[u8]) -> Result<DictInfo> {
    let mut rdr = VarintReader::new(data);
    Ok(DictInfo {
        name: rdr.string()?,
        src: rdr.string()?,
    })
}

/// Probes the conventional dictionary locations, returning the first
/// readable regular file of plausible size.
///
/// `KAGOME_DICT_PATH` takes precedence over the fixed path list.
pub fn locate_system_dict() -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Ok(p) = std::env::var("KAGOME_DICT_PATH") {
        if !p.is_empty() {
            candidates.push(PathBuf::from(p));
        }
    }
    for p in [
        "./ipa.dict",
        "./data/ipa/ipa.dict",
        "../data/ipa/ipa.dict",
        "../../data/ipa/ipa.dict",
        "/usr/local/share/kagome/ipa.dict",
        "/usr/share/kagome/ipa.dict",
        "/opt/kagome/ipa.dict",
    ] {
        candidates.push(PathBuf::from(p));
    }
    candidates.into_iter().find(|p| {
        std::fs::metadata(p)
            .map(|m| m.is_file() && m.len() > 0 && m.len() <= MAX_DICT_FILE_SIZE)
            .unwrap_or(false)
    })
}
