//! Dictionary for tokenization.
pub(crate) mod character;
pub(crate) mod connection;
pub(crate) mod loader;
pub(crate) mod morph;
pub(crate) mod reader;
pub(crate) mod trie;
pub(crate) mod unknown;
pub(crate) mod user;

use hashbrown::HashMap;

use crate::dictionary::character::CharProperty;
use crate::dictionary::connection::ConnectionTable;
use crate::dictionary::trie::IndexTable;

pub use crate::dictionary::character::CharCategory;
pub use crate::dictionary::loader::{locate_system_dict, LoadReport};
pub use crate::dictionary::morph::Morph;
pub use crate::dictionary::unknown::UnkDict;
pub use crate::dictionary::user::{UserDict, UserEntry};

/// Feature-metadata key: first index of the POS sub-vector.
pub(crate) const POS_START_INDEX: &str = "_pos_start";
/// Feature-metadata key: length of the POS sub-vector.
pub(crate) const POS_HIERARCHY: &str = "_pos_hierarchy";
/// Feature-metadata key: inflectional type slot.
pub(crate) const INFLECTIONAL_TYPE: &str = "_inflectional_type";
/// Feature-metadata key: inflectional form slot.
pub(crate) const INFLECTIONAL_FORM: &str = "_inflectional_form";
/// Feature-metadata key: base form slot.
pub(crate) const BASE_FORM_INDEX: &str = "_base";
/// Feature-metadata key: reading slot.
pub(crate) const READING_INDEX: &str = "_reading";
/// Feature-metadata key: pronunciation slot.
pub(crate) const PRONUNCIATION_INDEX: &str = "_pronunciation";

/// Descriptive metadata of a dictionary.
#[derive(Debug, Clone, Default)]
pub struct DictInfo {
    /// Human-readable dictionary name.
    pub name: String,
    /// Where the dictionary came from.
    pub src: String,
}

/// Part-of-speech table: deduplicated names plus per-morpheme name indices.
#[derive(Default, Clone)]
pub struct PosTable {
    pub(crate) names: Vec<String>,
    pub(crate) entries: Vec<Vec<u32>>,
}

impl PosTable {
    /// Resolves the POS hierarchy of a morpheme to name strings.
    pub fn pos_names(&self, id: i32) -> Vec<&str> {
        let Some(entry) = usize::try_from(id).ok().and_then(|i| self.entries.get(i)) else {
            return Vec::new();
        };
        entry
            .iter()
            .filter_map(|&i| self.names.get(i as usize))
            .map(String::as_str)
            .collect()
    }
}

/// Immutable in-memory dictionary shared by all analyses.
///
/// All hot-path accessors are bounds-checked and return a safe default on
/// out-of-range input, because construction may produce fallback data.
pub struct Dict {
    pub(crate) morphs: Vec<Morph>,
    pub(crate) pos_table: PosTable,
    pub(crate) contents_meta: HashMap<String, u32>,
    pub(crate) contents: Vec<Vec<String>>,
    pub(crate) connection: ConnectionTable,
    pub(crate) index: IndexTable,
    pub(crate) char_prop: CharProperty,
    pub(crate) unk: UnkDict,
    pub(crate) info: DictInfo,
}

impl Dict {
    /// Returns the parameters of a morpheme, defaulting to zeros when the
    /// id is out of range.
    #[inline(always)]
    pub fn morph(&self, id: i32) -> Morph {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.morphs.get(i))
            .copied()
            .unwrap_or_default()
    }

    /// Returns the POS name indices of a morpheme.
    #[inline(always)]
    pub fn pos_entries(&self, id: i32) -> &[u32] {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.pos_table.entries.get(i))
            .map_or(&[], Vec::as_slice)
    }

    /// Returns the feature record of a morpheme.
    #[inline(always)]
    pub fn features(&self, id: i32) -> Option<&[String]> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.contents.get(i))
            .map(Vec::as_slice)
    }

    /// Returns the category of a code point.
    #[inline(always)]
    pub fn category(&self, c: char) -> CharCategory {
        self.char_prop.category(c)
    }

    /// Returns the unknown-word invocation policy of a category.
    #[inline(always)]
    pub fn invoke(&self, cate: CharCategory) -> bool {
        self.char_prop.invoke(cate)
    }

    /// Returns the grouping policy of a category.
    #[inline(always)]
    pub fn group(&self, cate: CharCategory) -> bool {
        self.char_prop.group(cate)
    }

    /// Returns the connection cost of `(right_id, left_id)`.
    #[inline(always)]
    pub fn connection(&self, right_id: i16, left_id: i16) -> i16 {
        if right_id < 0 || left_id < 0 {
            return 0;
        }
        self.connection.at(right_id as usize, left_id as usize)
    }

    /// Returns the dictionary index.
    #[inline(always)]
    pub(crate) fn index(&self) -> &IndexTable {
        &self.index
    }

    /// Common-prefix search over the dictionary index: every terminated
    /// prefix of `key` yields its duplicate-expanded id set and byte
    /// length, in increasing length order.
    pub fn dat_search(&self, key: &[u8]) -> Vec<(Vec<i32>, usize)> {
        let mut hits = Vec::new();
        self.index.common_prefix_search_callback(key, |base_id, len| {
            let ids = (base_id..=base_id + self.index.dup_count(base_id)).collect();
            hits.push((ids, len));
        });
        hits
    }

    /// Returns the character classifier.
    #[inline(always)]
    pub(crate) fn char_prop(&self) -> &CharProperty {
        &self.char_prop
    }

    /// Returns the unknown-word dictionary.
    #[inline(always)]
    pub fn unknown(&self) -> &UnkDict {
        &self.unk
    }

    /// Returns the `(base_id, extra_count)` unknown-entry range of a
    /// category.
    #[inline(always)]
    pub fn unknown_entry_range(&self, cate: CharCategory) -> Option<(i32, i32)> {
        self.unk.entry_range(cate)
    }

    /// Returns the descriptive metadata.
    #[inline(always)]
    pub fn info(&self) -> &DictInfo {
        &self.info
    }

    /// Looks up a feature-metadata key in the main store.
    #[inline(always)]
    pub(crate) fn meta(&self, key: &str) -> Option<u32> {
        self.contents_meta.get(key).copied()
    }
}
