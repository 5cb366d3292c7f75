//! Common settings in Kagome.

/// The absorbing cost of unreachable lattice nodes.
pub const MAXIMUM_COST: i32 = i32::MAX;

/// The hard cap on a grouped unknown-word run, in characters.
pub const MAXIMUM_UNKNOWN_WORD_LENGTH: usize = 1024;

/// Character-length threshold above which ideographic morphemes are
/// penalised in the search modes.
pub const SEARCH_MODE_KANJI_LENGTH: usize = 2;

/// Per-character penalty for over-long ideographic morphemes.
pub const SEARCH_MODE_KANJI_PENALTY: i32 = 3000;

/// Character-length threshold above which any morpheme is penalised in the
/// search modes.
pub const SEARCH_MODE_OTHER_LENGTH: usize = 7;

/// Per-character penalty for over-long non-ideographic morphemes.
pub const SEARCH_MODE_OTHER_PENALTY: i32 = 1700;

/// The morpheme id shared by the BOS and EOS sentinel nodes.
pub const BOS_EOS_ID: i32 = -1;

/// The morpheme id of the catch-all unknown node inserted when a character
/// category has no unknown-word entry.
pub const UNKNOWN_CATCH_ALL_ID: i32 = -2;
