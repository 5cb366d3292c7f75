//! Viterbi-based tokenizer.
pub(crate) mod lattice;
pub mod worker;

use std::sync::Arc;

use crate::common::{MAXIMUM_UNKNOWN_WORD_LENGTH, UNKNOWN_CATCH_ALL_ID};
use crate::dictionary::{Dict, UserDict};
use crate::sentence::Sentence;
use crate::tokenizer::lattice::{warn_unknown_run_truncated, Lattice, Node, NodeClass, INVALID_IDX};
use crate::tokenizer::worker::Worker;

/// Tokenization modes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    /// Regular segmentation.
    #[default]
    Normal,
    /// Penalises over-long morphemes so compounds break into searchable
    /// units.
    Search,
    /// Like `Search`, and additionally splits unknown words into
    /// single-character tokens in the output.
    Extended,
}

/// Tokenizer.
#[derive(Clone)]
pub struct Tokenizer {
    dict: Arc<Dict>,
    user_dict: Option<Arc<UserDict>>,
    mode: Mode,
}

impl Tokenizer {
    /// Creates a new tokenizer over a shared dictionary.
    pub fn new(dict: Arc<Dict>) -> Self {
        Self {
            dict,
            user_dict: None,
            mode: Mode::Normal,
        }
    }

    /// Sets the tokenization mode.
    #[must_use]
    pub const fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Attaches a user dictionary, consulted alongside the system
    /// dictionary during lattice construction.
    #[must_use]
    pub fn user_dictionary(mut self, user_dict: Arc<UserDict>) -> Self {
        self.user_dict = Some(user_dict);
        self
    }

    /// Returns the dictionary.
    #[inline(always)]
    pub fn dictionary(&self) -> &Dict {
        &self.dict
    }

    /// Returns the user dictionary, if attached.
    #[inline(always)]
    pub(crate) fn user_dictionary_ref(&self) -> Option<&UserDict> {
        self.user_dict.as_deref()
    }

    /// Returns the configured mode.
    #[inline(always)]
    pub const fn current_mode(&self) -> Mode {
        self.mode
    }

    /// Creates a new worker holding the reusable analysis state.
    pub fn new_worker(&self) -> Worker {
        Worker::new(self.clone())
    }

    /// Segments `input` into surface strings.
    pub fn wakati<S>(&self, input: S) -> Vec<String>
    where
        S: AsRef<str>,
    {
        let mut worker = self.new_worker();
        worker.reset_sentence(input);
        worker.tokenize();
        worker
            .token_iter()
            .map(|t| t.surface().to_string())
            .collect()
    }

    /// Populates the lattice with candidate nodes for the compiled
    /// sentence.
    ///
    /// Every character position is scanned: user and system hits are both
    /// collected, and unknown-word generation fires when the position had
    /// no hits or the category's invoke flag is set.
    pub(crate) fn build_lattice(&self, sent: &Sentence, lattice: &mut Lattice) {
        lattice.reset(sent.len_char());
        let dict = &*self.dict;
        let input = sent.raw().as_bytes();

        for char_pos in 0..sent.len_char() {
            let byte_pos = sent.byte_position(char_pos);
            let suffix = &input[byte_pos..];
            let mut has_match = false;

            if let Some(user_dict) = self.user_dict.as_deref() {
                user_dict.index().common_prefix_search_callback(suffix, |id, len_byte| {
                    // Hits off a character boundary only arise from corrupt
                    // index data; drop them.
                    let Some(end_char) = sent.char_position(byte_pos + len_byte) else {
                        return;
                    };
                    lattice.insert_node(Node {
                        id,
                        class: NodeClass::User,
                        byte_start: byte_pos,
                        char_start: char_pos,
                        char_end: end_char,
                        left_id: 0,
                        right_id: 0,
                        weight: 0,
                        cost: 0,
                        prev_idx: INVALID_IDX,
                    });
                    has_match = true;
                });
            }

            dict.index().common_prefix_search_callback(suffix, |base_id, len_byte| {
                let Some(end_char) = sent.char_position(byte_pos + len_byte) else {
                    return;
                };
                for id in base_id..=base_id + dict.index().dup_count(base_id) {
                    let morph = dict.morph(id);
                    lattice.insert_node(Node {
                        id,
                        class: NodeClass::Known,
                        byte_start: byte_pos,
                        char_start: char_pos,
                        char_end: end_char,
                        left_id: morph.left_id,
                        right_id: morph.right_id,
                        weight: morph.weight,
                        cost: 0,
                        prev_idx: INVALID_IDX,
                    });
                }
                has_match = true;
            });

            let cate = sent.category(char_pos);
            if !has_match || dict.invoke(cate) {
                self.add_unknown_nodes(sent, lattice, char_pos, byte_pos);
            }
        }

        lattice.insert_eos(sent.raw().len());
    }

    fn add_unknown_nodes(
        &self,
        sent: &Sentence,
        lattice: &mut Lattice,
        char_pos: usize,
        byte_pos: usize,
    ) {
        let dict = &*self.dict;
        let cate = sent.category(char_pos);

        let mut run = 1;
        if dict.group(cate) {
            run = sent.groupable(char_pos);
            if run > MAXIMUM_UNKNOWN_WORD_LENGTH {
                warn_unknown_run_truncated(run);
                run = MAXIMUM_UNKNOWN_WORD_LENGTH;
            }
        }

        match dict.unknown_entry_range(cate) {
            Some((base_id, dup)) => {
                for id in base_id..=base_id + dup {
                    let morph = dict.unknown().morph(id);
                    // A shortened candidate keeps the lattice flexible when
                    // the grouped run overshoots a word boundary.
                    if run > 1 {
                        lattice.insert_node(Node {
                            id,
                            class: NodeClass::Unknown,
                            byte_start: byte_pos,
                            char_start: char_pos,
                            char_end: char_pos + run - 1,
                            left_id: morph.left_id,
                            right_id: morph.right_id,
                            weight: morph.weight,
                            cost: 0,
                            prev_idx: INVALID_IDX,
                        });
                    }
                    lattice.insert_node(Node {
                        id,
                        class: NodeClass::Unknown,
                        byte_start: byte_pos,
                        char_start: char_pos,
                        char_end: char_pos + run,
                        left_id: morph.left_id,
                        right_id: morph.right_id,
                        weight: morph.weight,
                        cost: 0,
                        prev_idx: INVALID_IDX,
                    });
                }
            }
            None => {
                // Exotic code points keep the lattice connected through a
                // catch-all node.
                lattice.insert_node(Node {
                    id: UNKNOWN_CATCH_ALL_ID,
                    class: NodeClass::Unknown,
                    byte_start: byte_pos,
                    char_start: char_pos,
                    char_end: char_pos + run,
                    left_id: 0,
                    right_id: 0,
                    weight: 0,
                    cost: 0,
                    prev_idx: INVALID_IDX,
                });
            }
        }
    }
}
