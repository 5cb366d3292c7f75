//! Character classification for unknown-word processing.

use crate::errors::{KagomeError, Result};

/// The size of the code-point table: the Basic Multilingual Plane.
pub(crate) const TABLE_SIZE: usize = 0x10000;

/// Character categories driving unknown-word generation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum CharCategory {
    /// Everything not covered by another category.
    Default = 0,
    /// Whitespace.
    Space = 1,
    /// Decimal digits.
    Numeric = 2,
    /// Latin letters.
    Alpha = 3,
    /// Punctuation and other symbols.
    Symbol = 4,
    /// Hiragana block.
    Hiragana = 5,
    /// Katakana block.
    Katakana = 6,
    /// Han ideographs.
    Kanji = 7,
    /// Greek letters.
    Greek = 8,
    /// Cyrillic letters.
    Cyrillic = 9,
}

impl CharCategory {
    /// The number of defined categories.
    pub const COUNT: usize = 10;

    /// Converts a raw table ordinal, treating unknown values as `Default`.
    #[inline(always)]
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Space,
            2 => Self::Numeric,
            3 => Self::Alpha,
            4 => Self::Symbol,
            5 => Self::Hiragana,
            6 => Self::Katakana,
            7 => Self::Kanji,
            8 => Self::Greek,
            9 => Self::Cyrillic,
            _ => Self::Default,
        }
    }
}

/// Mapping from code points to categories, with per-category
/// unknown-word policy flags.
#[derive(Clone)]
pub struct CharProperty {
    table: Vec<u8>,
    invoke: Vec<bool>,
    group: Vec<bool>,
}

impl CharProperty {
    /// Wraps loaded classifier data.
    ///
    /// # Errors
    ///
    /// [`KagomeError`] is returned when the table exceeds the Basic
    /// Multilingual Plane.
    pub(crate) fn from_parts(table: Vec<u8>, invoke: Vec<bool>, group: Vec<bool>) -> Result<Self> {
        if table.len() > TABLE_SIZE {
            return Err(KagomeError::invalid_format(
                "chardef.dict",
                format!("character table too large: {}", table.len()),
            ));
        }
        Ok(Self {
            table,
            invoke,
            group,
        })
    }

    /// Returns the category of a code point.
    ///
    /// Code points outside the table (including everything beyond the BMP)
    /// map to `Default`.
    #[inline(always)]
    pub fn category(&self, c: char) -> CharCategory {
        self.table
            .get(c as usize)
            .map_or(CharCategory::Default, |&v| CharCategory::from_u8(v))
    }

    /// Returns whether unknown-word generation fires inside the category
    /// even when dictionary entries matched. Out-of-range defaults to true.
    #[inline(always)]
    pub fn invoke(&self, cate: CharCategory) -> bool {
        self.invoke.get(cate as usize).copied().unwrap_or(true)
    }

    /// Returns whether runs of same-category characters are glued into one
    /// unknown candidate. Out-of-range defaults to false.
    #[inline(always)]
    pub fn group(&self, cate: CharCategory) -> bool {
        self.group.get(cate as usize).copied().unwrap_or(false)
    }

    /// Builds the classifier from the hard-coded script ranges.
    ///
    /// Used when `chardef.dict` is absent or corrupt. Grouping is enabled
    /// for the run-forming categories and invocation everywhere, so the
    /// degraded dictionary still yields coherent unknown tokens.
    pub(crate) fn fallback() -> Self {
        let invoke = vec![true; CharCategory::COUNT];
        let mut group = vec![false; CharCategory::COUNT];
        group[CharCategory::Numeric as usize] = true;
        group[CharCategory::Alpha as usize] = true;
        group[CharCategory::Hiragana as usize] = true;
        group[CharCategory::Katakana as usize] = true;
        group[CharCategory::Kanji as usize] = true;

        Self {
            table: default_table(),
            invoke,
            group,
        }
    }
}

/// The hard-coded BMP category table backing the fallback classifier.
pub(crate) fn default_table() -> Vec<u8> {
    let mut table = vec![CharCategory::Default as u8; TABLE_SIZE];

    table[0x0020] = CharCategory::Space as u8;
    table[0x3000] = CharCategory::Space as u8; // ideographic space
    for c in 0x0030..=0x0039usize {
        table[c] = CharCategory::Numeric as u8;
    }
    for c in 0x0041..=0x005Ausize {
        table[c] = CharCategory::Alpha as u8;
    }
    for c in 0x0061..=0x007Ausize {
        table[c] = CharCategory::Alpha as u8;
    }
    for c in 0x0021..=0x002Fusize {
        table[c] = CharCategory::Symbol as u8;
    }
    for c in 0x003A..=0x0040usize {
        table[c] = CharCategory::Symbol as u8;
    }
    for c in 0x0370..=0x03FFusize {
        table[c] = CharCategory::Greek as u8;
    }
    for c in 0x0400..=0x04FFusize {
        table[c] = CharCategory::Cyrillic as u8;
    }
    for c in 0x3040..=0x309Fusize {
        table[c] = CharCategory::Hiragana as u8;
    }
    for c in 0x30A0..=0x30FFusize {
        table[c] = CharCategory::Katakana as u8;
    }
    for c in 0x4E00..=0x9FAFusize {
        table[c] = CharCategory::Kanji as u8;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script;

    #[test]
    fn test_fallback_categories() {
        let prop = CharProperty::fallback();
        assert_eq!(prop.category('す'), CharCategory::Hiragana);
        assert_eq!(prop.category('デ'), CharCategory::Katakana);
        assert_eq!(prop.category('空'), CharCategory::Kanji);
        assert_eq!(prop.category('a'), CharCategory::Alpha);
        assert_eq!(prop.category('7'), CharCategory::Numeric);
        assert_eq!(prop.category(' '), CharCategory::Space);
        assert_eq!(prop.category('!'), CharCategory::Symbol);
        assert_eq!(prop.category('Ω'), CharCategory::Greek);
        assert_eq!(prop.category('Ж'), CharCategory::Cyrillic);
    }

    #[test]
    fn test_out_of_table_defaults() {
        let prop = CharProperty::from_parts(vec![], vec![], vec![]).unwrap();
        assert_eq!(prop.category('す'), CharCategory::Default);
        assert!(prop.invoke(CharCategory::Kanji));
        assert!(!prop.group(CharCategory::Kanji));
        // Beyond the BMP.
        assert_eq!(CharProperty::fallback().category('𠮷'), CharCategory::Default);
    }

    #[test]
    fn test_oversized_table_rejected() {
        let r = CharProperty::from_parts(vec![0; TABLE_SIZE + 1], vec![], vec![]);
        assert!(r.is_err());
    }

    #[test]
    fn test_fallback_agrees_with_script_ranges() {
        // The search-mode penalty and the classifier must agree on the
        // Hiragana/Katakana/Han blocks.
        let prop = CharProperty::fallback();
        for cp in 0x3040..=0x30FFu32 {
            let c = char::from_u32(cp).unwrap();
            assert_eq!(script::is_hiragana(c), prop.category(c) == CharCategory::Hiragana);
            assert_eq!(script::is_katakana(c), prop.category(c) == CharCategory::Katakana);
        }
        for cp in (0x4E00..=0x9FAFu32).step_by(17) {
            let c = char::from_u32(cp).unwrap();
            assert!(script::is_ideographic(c));
            assert_eq!(prop.category(c), CharCategory::Kanji);
        }
    }
}
