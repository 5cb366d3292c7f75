//! Unknown-word entries, parallel in shape to the main morpheme store.

use hashbrown::HashMap;

use crate::dictionary::character::CharCategory;
use crate::dictionary::morph::Morph;
use crate::dictionary::{BASE_FORM_INDEX, POS_HIERARCHY, POS_START_INDEX, PRONUNCIATION_INDEX, READING_INDEX};

/// Per-category unknown-word dictionary.
#[derive(Default, Clone)]
pub struct UnkDict {
    pub(crate) morphs: Vec<Morph>,
    pub(crate) index: HashMap<i32, i32>,
    pub(crate) index_dup: HashMap<i32, i32>,
    pub(crate) contents_meta: HashMap<String, u32>,
    pub(crate) contents: Vec<Vec<String>>,
}

impl UnkDict {
    /// Returns the `(base_id, extra_count)` entry range for a category,
    /// or `None` when the category has no unknown entry.
    #[inline(always)]
    pub fn entry_range(&self, cate: CharCategory) -> Option<(i32, i32)> {
        let base = *self.index.get(&(cate as i32))?;
        let dup = self.index_dup.get(&(cate as i32)).copied().unwrap_or(0);
        Some((base, dup))
    }

    /// Returns the parameters of an unknown morpheme, defaulting to zeros
    /// when the id is out of range.
    #[inline(always)]
    pub fn morph(&self, id: i32) -> Morph {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.morphs.get(i))
            .copied()
            .unwrap_or_default()
    }

    /// Returns the feature record of an unknown morpheme.
    pub fn features(&self, id: i32) -> Option<&[String]> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.contents.get(i))
            .map(|v| v.as_slice())
    }

    /// The degraded table used when `unk.dict` is absent or corrupt:
    /// every defined category maps to an entry so the lattice always has an
    /// unknown candidate to fall back on.
    pub(crate) fn fallback() -> Self {
        let mut index = HashMap::new();
        index.insert(CharCategory::Default as i32, 0);
        index.insert(CharCategory::Space as i32, 1);
        index.insert(CharCategory::Alpha as i32, 2);
        index.insert(CharCategory::Numeric as i32, 3);
        index.insert(CharCategory::Kanji as i32, 4);
        index.insert(CharCategory::Hiragana as i32, 5);
        index.insert(CharCategory::Katakana as i32, 6);
        index.insert(CharCategory::Symbol as i32, 7);
        index.insert(CharCategory::Greek as i32, 8);
        index.insert(CharCategory::Cyrillic as i32, 8);

        let morphs = vec![
            Morph::new(1, 1, 1000),   // general
            Morph::new(13, 13, 500),  // space
            Morph::new(15, 15, 2000), // alpha
            Morph::new(19, 19, 1500), // numeric
            Morph::new(36, 37, 1000), // kanji noun
            Morph::new(38, 39, 800),  // hiragana
            Morph::new(40, 41, 1200), // katakana
            Morph::new(2, 2, 3000),   // symbol
            Morph::new(15, 15, 2000), // greek/cyrillic
        ];

        let row = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        let contents = vec![
            row(&["名詞", "一般", "*", "*", "*", "*", "*", "*", "*"]),
            row(&["記号", "空白", "*", "*", "*", "*", "*", "*", "*"]),
            row(&["名詞", "固有名詞", "一般", "*", "*", "*", "*", "*", "*"]),
            row(&["名詞", "数", "*", "*", "*", "*", "*", "*", "*"]),
            row(&["名詞", "一般", "*", "*", "*", "*", "*", "*", "*"]),
            row(&["助詞", "格助詞", "一般", "*", "*", "*", "*", "*", "*"]),
            row(&["名詞", "一般", "*", "*", "*", "*", "*", "*", "*"]),
            row(&["記号", "一般", "*", "*", "*", "*", "*", "*", "*"]),
            row(&["名詞", "固有名詞", "一般", "*", "*", "*", "*", "*", "*"]),
        ];

        let mut contents_meta = HashMap::new();
        contents_meta.insert(POS_START_INDEX.to_string(), 0);
        contents_meta.insert(POS_HIERARCHY.to_string(), 3);
        contents_meta.insert(BASE_FORM_INDEX.to_string(), 6);
        contents_meta.insert(READING_INDEX.to_string(), 7);
        contents_meta.insert(PRONUNCIATION_INDEX.to_string(), 8);

        Self {
            morphs,
            index,
            index_dup: HashMap::new(),
            contents_meta,
            contents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_covers_all_categories() {
        let unk = UnkDict::fallback();
        for cate in [
            CharCategory::Default,
            CharCategory::Space,
            CharCategory::Numeric,
            CharCategory::Alpha,
            CharCategory::Symbol,
            CharCategory::Hiragana,
            CharCategory::Katakana,
            CharCategory::Kanji,
            CharCategory::Greek,
            CharCategory::Cyrillic,
        ] {
            let (base, dup) = unk.entry_range(cate).unwrap();
            assert!(dup >= 0);
            assert!(unk.features(base).is_some());
        }
    }

    #[test]
    fn test_alpha_maps_to_proper_noun() {
        let unk = UnkDict::fallback();
        let (base, _) = unk.entry_range(CharCategory::Alpha).unwrap();
        let features = unk.features(base).unwrap();
        assert_eq!(&features[..2], &["名詞".to_string(), "固有名詞".to_string()]);
    }

    #[test]
    fn test_out_of_range_morph_is_zeroed() {
        let unk = UnkDict::fallback();
        assert_eq!(unk.morph(-2), Morph::default());
        assert_eq!(unk.morph(9999), Morph::default());
    }
}
