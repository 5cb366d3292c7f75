//! Supplementary user dictionary.
//!
//! Records are CSV lines of `surface,tokens,yomi,pos` where `tokens` and
//! `yomi` are space-separated. Entries are indexed by a double-array trie
//! over the surfaces; merging with the system dictionary happens purely
//! through lattice competition.

use std::io::{BufRead, BufReader, Read};

use crate::dictionary::trie::IndexTable;
use crate::errors::{KagomeError, Result};

/// One user-dictionary record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntry {
    /// User-assigned part of speech.
    pub pos: String,
    /// Constituent tokens of the surface.
    pub tokens: Vec<String>,
    /// Readings of the constituent tokens.
    pub yomi: Vec<String>,
}

/// User dictionary: entries plus the surface index.
pub struct UserDict {
    pub(crate) entries: Vec<UserEntry>,
    pub(crate) index: IndexTable,
}

impl UserDict {
    /// Parses a user dictionary from CSV text.
    ///
    /// Empty lines and lines starting with `#` are skipped. Entries are
    /// sorted by surface so duplicate surfaces stay adjacent for the index.
    ///
    /// # Errors
    ///
    /// [`KagomeError`] is returned when a record does not have exactly four
    /// columns or the reader fails.
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut records: Vec<(String, UserEntry)> = Vec::new();
        for line in BufReader::new(rdr).lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let cols: Vec<&str> = line.split(',').collect();
            if cols.len() != 4 {
                return Err(KagomeError::invalid_format(
                    "user_dict",
                    format!("expected 4 columns, got {}: {line:?}", cols.len()),
                ));
            }
            let entry = UserEntry {
                pos: cols[3].to_string(),
                tokens: cols[1].split_whitespace().map(str::to_string).collect(),
                yomi: cols[2].split_whitespace().map(str::to_string).collect(),
            };
            records.push((cols[0].to_string(), entry));
        }
        records.sort_by(|a, b| a.0.cmp(&b.0));

        let index = IndexTable::from_surfaces(records.iter().map(|(s, _)| s.as_str()))?;
        let entries = records.into_iter().map(|(_, e)| e).collect();
        Ok(Self { entries, index })
    }

    /// Returns the entry for an id, if in range.
    #[inline(always)]
    pub fn entry(&self, id: i32) -> Option<&UserEntry> {
        usize::try_from(id).ok().and_then(|i| self.entries.get(i))
    }

    /// Returns the surface index.
    #[inline(always)]
    pub(crate) fn index(&self) -> &IndexTable {
        &self.index
    }
}
