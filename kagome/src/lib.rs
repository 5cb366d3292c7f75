//! # Kagome
//!
//! A lattice-based Japanese morphological analyzer: given UTF-8 text and a
//! precompiled dictionary, it produces the minimum-cost segmentation into
//! morphemes with attached linguistic features.
//!
//! Dictionary lookup runs over a compressed double-array trie, unknown
//! words are synthesised from character-class rules, and the optimal path
//! is found with the Viterbi algorithm. Three modes are provided: `Normal`
//! segmentation, `Search` (penalises over-long morphemes so compounds
//! break into searchable units), and `Extended` (additionally splits
//! unknown words into single-character tokens).
//!
//! ## Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use kagome::{Dict, Tokenizer};
//!
//! // The built-in fallback dictionary segments purely from character
//! // classes; load a real bundle with `Dict::from_path` for quality.
//! let dict = Arc::new(Dict::fallback());
//! let tokenizer = Tokenizer::new(dict);
//!
//! let mut worker = tokenizer.new_worker();
//! worker.reset_sentence("Hello");
//! worker.tokenize();
//!
//! assert_eq!(worker.num_tokens(), 1);
//! assert_eq!(worker.token(0).surface(), "Hello");
//! ```
#![deny(missing_docs)]

pub mod common;
pub mod dictionary;
pub mod errors;
pub mod script;
mod sentence;
pub mod token;
pub mod tokenizer;

#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod tests;

pub use dictionary::{locate_system_dict, CharCategory, Dict, DictInfo, LoadReport, UserDict};
pub use token::Token;
pub use tokenizer::lattice::NodeClass;
pub use tokenizer::worker::Worker;
pub use tokenizer::{Mode, Tokenizer};

/// Version number of this library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
