//! Provider of a routine for tokenization.

use crate::dictionary::{Dict, UserDict};
use crate::sentence::Sentence;
use crate::token::{Token, TokenIter};
use crate::tokenizer::lattice::{Lattice, Node};
use crate::tokenizer::Tokenizer;

/// Reusable per-call analysis state.
///
/// Holds the compiled sentence, the lattice, and the resultant best path,
/// so repeated tokenization avoids reallocation. A worker is not safe for
/// concurrent use; create one per thread.
pub struct Worker {
    pub(crate) tokenizer: Tokenizer,
    pub(crate) sent: Sentence,
    lattice: Lattice,
    pub(crate) output: Vec<Node>,
}

impl Worker {
    pub(crate) fn new(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            sent: Sentence::new(),
            lattice: Lattice::default(),
            output: vec![],
        }
    }

    /// Resets the input sentence to be tokenized.
    pub fn reset_sentence<S>(&mut self, input: S)
    where
        S: AsRef<str>,
    {
        self.sent.clear();
        self.output.clear();
        let input = input.as_ref();
        if !input.is_empty() {
            self.sent.set_sentence(input);
            self.sent.compile(self.tokenizer.dictionary().char_prop());
        }
    }

    /// Tokenizes the sentence set with [`Self::reset_sentence`].
    pub fn tokenize(&mut self) {
        if self.sent.chars().is_empty() {
            return;
        }
        let mode = self.tokenizer.current_mode();
        self.tokenizer.build_lattice(&self.sent, &mut self.lattice);
        self.lattice
            .forward(&self.sent, self.tokenizer.dictionary(), mode);
        self.lattice.backward(&self.sent, mode, &mut self.output);
    }

    /// Returns the number of resultant tokens.
    #[inline(always)]
    pub fn num_tokens(&self) -> usize {
        self.output.len()
    }

    /// Returns the `i`-th resultant token.
    #[inline(always)]
    pub fn token(&self, i: usize) -> Token<'_> {
        Token::new(self, i)
    }

    /// Creates an iterator over the resultant tokens.
    #[inline(always)]
    pub const fn token_iter(&self) -> TokenIter<'_> {
        TokenIter::new(self, 0)
    }

    #[inline(always)]
    pub(crate) fn dict(&self) -> &Dict {
        self.tokenizer.dictionary()
    }

    #[inline(always)]
    pub(crate) fn user_dict(&self) -> Option<&UserDict> {
        self.tokenizer.user_dictionary_ref()
    }
}
