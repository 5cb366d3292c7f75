//! In-memory dictionary fixtures for the end-to-end tests.

use hashbrown::HashMap;

use crate::dictionary::character::{default_table, CharCategory, CharProperty};
use crate::dictionary::connection::ConnectionTable;
use crate::dictionary::morph::Morph;
use crate::dictionary::trie::IndexTable;
use crate::dictionary::unknown::UnkDict;
use crate::dictionary::{
    Dict, DictInfo, PosTable, BASE_FORM_INDEX, INFLECTIONAL_FORM, INFLECTIONAL_TYPE,
    POS_HIERARCHY, POS_START_INDEX, PRONUNCIATION_INDEX, READING_INDEX,
};

// Connection-id classes of the miniature dictionary.
const ID_BOS_EOS: i16 = 0;
const ID_NOUN: i16 = 1;
const ID_PARTICLE: i16 = 2;
const ID_VERB: i16 = 3;
const ID_AUX: i16 = 4;

struct Entry {
    surface: &'static str,
    pos: [&'static str; 4],
    content: [&'static str; 5],
    conn_id: i16,
    weight: i16,
}

/// Lexicon of the miniature dictionary, ordered by surface bytes so the
/// double array assigns contiguous ids.
fn entries() -> Vec<Entry> {
    let e = |surface, pos, content, conn_id, weight| Entry {
        surface,
        pos,
        content,
        conn_id,
        weight,
    };
    vec![
        e(
            "うち",
            ["名詞", "非自立", "副詞可能", "*"],
            ["*", "*", "うち", "ウチ", "ウチ"],
            ID_NOUN,
            3000,
        ),
        e(
            "すもも",
            ["名詞", "一般", "*", "*"],
            ["*", "*", "すもも", "スモモ", "スモモ"],
            ID_NOUN,
            3000,
        ),
        e(
            "た",
            ["助動詞", "*", "*", "*"],
            ["特殊・タ", "基本形", "た", "タ", "タ"],
            ID_AUX,
            1000,
        ),
        e(
            "の",
            ["助詞", "連体化", "*", "*"],
            ["*", "*", "の", "ノ", "ノ"],
            ID_PARTICLE,
            1000,
        ),
        e(
            "も",
            ["助詞", "係助詞", "*", "*"],
            ["*", "*", "も", "モ", "モ"],
            ID_PARTICLE,
            1000,
        ),
        e(
            "もも",
            ["名詞", "一般", "*", "*"],
            ["*", "*", "もも", "モモ", "モモ"],
            ID_NOUN,
            3000,
        ),
        e(
            "を",
            ["助詞", "格助詞", "一般", "*"],
            ["*", "*", "を", "ヲ", "ヲ"],
            ID_PARTICLE,
            1000,
        ),
        e(
            "カメ",
            ["名詞", "一般", "*", "*"],
            ["*", "*", "カメ", "カメ", "カメ"],
            ID_NOUN,
            3000,
        ),
        e(
            "国際",
            ["名詞", "一般", "*", "*"],
            ["*", "*", "国際", "コクサイ", "コクサイ"],
            ID_NOUN,
            3000,
        ),
        e(
            "空港",
            ["名詞", "一般", "*", "*"],
            ["*", "*", "空港", "クウコウ", "クーコー"],
            ID_NOUN,
            3000,
        ),
        e(
            "買っ",
            ["動詞", "自立", "*", "*"],
            ["五段・ワ行促音便", "連用タ接続", "買う", "カッ", "カッ"],
            ID_VERB,
            3000,
        ),
        e(
            "関西",
            ["名詞", "固有名詞", "地域", "*"],
            ["*", "*", "関西", "カンサイ", "カンサイ"],
            ID_NOUN,
            3000,
        ),
        e(
            "関西国際空港",
            ["名詞", "固有名詞", "組織", "*"],
            ["*", "*", "関西国際空港", "カンサイコクサイクウコウ", "カンサイコクサイクーコー"],
            ID_NOUN,
            6000,
        ),
    ]
}

fn intern(names: &mut Vec<String>, s: &str) -> u32 {
    if let Some(i) = names.iter().position(|n| n == s) {
        return i as u32;
    }
    names.push(s.to_string());
    (names.len() - 1) as u32
}

/// Connection costs tuned so the textbook segmentations win: alternating
/// noun/particle chains are rewarded, repeated nouns or particles pay.
fn connection_cost(right: usize, left: usize) -> i16 {
    let (right, left) = (right as i16, left as i16);
    if right == ID_BOS_EOS || left == ID_BOS_EOS {
        return 0;
    }
    match (right, left) {
        (ID_NOUN, ID_PARTICLE) | (ID_PARTICLE, ID_NOUN) => -500,
        (ID_PARTICLE, ID_VERB) | (ID_VERB, ID_AUX) => -500,
        (ID_NOUN, ID_NOUN) | (ID_PARTICLE, ID_PARTICLE) => 3000,
        _ => 200,
    }
}

/// Builds a miniature IPA-style dictionary covering the canonical test
/// sentences.
pub(crate) fn ipa_mini_dict() -> Dict {
    let entries = entries();

    let index = IndexTable::from_surfaces(entries.iter().map(|e| e.surface)).unwrap();

    let morphs: Vec<Morph> = entries
        .iter()
        .map(|e| Morph::new(e.conn_id, e.conn_id, e.weight))
        .collect();

    let mut names = Vec::new();
    let mut pos_entries = Vec::with_capacity(entries.len());
    for e in &entries {
        let ids: Vec<u32> = e.pos.iter().map(|p| intern(&mut names, p)).collect();
        pos_entries.push(ids);
    }
    let pos_table = PosTable {
        names,
        entries: pos_entries,
    };

    let contents = entries
        .iter()
        .map(|e| e.content.iter().map(|s| s.to_string()).collect())
        .collect();

    let mut contents_meta = HashMap::new();
    contents_meta.insert(POS_START_INDEX.to_string(), 0);
    contents_meta.insert(POS_HIERARCHY.to_string(), 4);
    contents_meta.insert(INFLECTIONAL_TYPE.to_string(), 4);
    contents_meta.insert(INFLECTIONAL_FORM.to_string(), 5);
    contents_meta.insert(BASE_FORM_INDEX.to_string(), 6);
    contents_meta.insert(READING_INDEX.to_string(), 7);
    contents_meta.insert(PRONUNCIATION_INDEX.to_string(), 8);

    let dims = ID_AUX as usize + 1;
    let mut costs = Vec::with_capacity(dims * dims);
    for left in 0..dims {
        for right in 0..dims {
            costs.push(connection_cost(right, left));
        }
    }
    let connection = ConnectionTable::new(dims, dims, costs);

    // IPA-style invoke/group flags: unknown generation always fires inside
    // katakana and alpha runs, only on lookup misses elsewhere.
    let mut invoke = vec![false; CharCategory::COUNT];
    for cate in [
        CharCategory::Numeric,
        CharCategory::Alpha,
        CharCategory::Symbol,
        CharCategory::Katakana,
        CharCategory::Greek,
        CharCategory::Cyrillic,
    ] {
        invoke[cate as usize] = true;
    }
    let mut group = vec![false; CharCategory::COUNT];
    for cate in [
        CharCategory::Numeric,
        CharCategory::Alpha,
        CharCategory::Hiragana,
        CharCategory::Katakana,
    ] {
        group[cate as usize] = true;
    }
    let char_prop = CharProperty::from_parts(default_table(), invoke, group).unwrap();

    Dict {
        morphs,
        pos_table,
        contents_meta,
        contents,
        connection,
        index,
        char_prop,
        unk: UnkDict::fallback(),
        info: DictInfo {
            name: "IPA mini".to_string(),
            src: "test fixture".to_string(),
        },
    }
}

/// Looks up the id of a surface in the miniature dictionary.
pub(crate) fn entry_id(dict: &Dict, surface: &str) -> i32 {
    let ids = dict.index().search(surface.as_bytes());
    assert_eq!(ids.len(), 1, "ambiguous or missing surface {surface}");
    ids[0]
}
