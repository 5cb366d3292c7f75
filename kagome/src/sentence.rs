//! Compiled representation of an input sentence.

use crate::dictionary::character::{CharCategory, CharProperty};

/// Input text together with the per-character data the lattice builder
/// consumes: character/byte position maps, categories, and the length of
/// the same-category run starting at each character.
#[derive(Default)]
pub struct Sentence {
    input: String,
    chars: Vec<char>,
    c2b: Vec<usize>,
    b2c: Vec<usize>,
    categories: Vec<CharCategory>,
    groupable: Vec<usize>,
}

impl Sentence {
    /// Creates a new empty instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the internal state, keeping allocations.
    pub fn clear(&mut self) {
        self.input.clear();
        self.chars.clear();
        self.c2b.clear();
        self.b2c.clear();
        self.categories.clear();
        self.groupable.clear();
    }

    /// Sets the sentence to be analysed. [`Self::compile`] must be called
    /// before the lattice builder can use it.
    pub fn set_sentence<S>(&mut self, input: S)
    where
        S: AsRef<str>,
    {
        self.clear();
        self.input.push_str(input.as_ref());
    }

    /// Computes the character maps, categories, and groupable run lengths.
    pub fn compile(&mut self, char_prop: &CharProperty) {
        self.compute_basic();
        self.compute_categories(char_prop);
        self.compute_groupable();
    }

    fn compute_basic(&mut self) {
        self.b2c.resize(self.input.len() + 1, usize::MAX);
        for (ci, (bi, c)) in self.input.char_indices().enumerate() {
            self.chars.push(c);
            self.c2b.push(bi);
            self.b2c[bi] = ci;
        }
        self.c2b.push(self.input.len());
        self.b2c[self.input.len()] = self.chars.len();
    }

    fn compute_categories(&mut self, char_prop: &CharProperty) {
        self.categories.reserve(self.chars.len());
        for &c in &self.chars {
            self.categories.push(char_prop.category(c));
        }
    }

    fn compute_groupable(&mut self) {
        self.groupable.resize(self.chars.len(), 1);
        for i in (1..self.chars.len()).rev() {
            if self.categories[i - 1] == self.categories[i] {
                self.groupable[i - 1] = self.groupable[i] + 1;
            }
        }
    }

    /// Returns the raw input.
    #[inline(always)]
    pub fn raw(&self) -> &str {
        &self.input
    }

    /// Returns the character array.
    #[inline(always)]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Returns the number of characters.
    #[inline(always)]
    pub fn len_char(&self) -> usize {
        self.chars.len()
    }

    /// Maps a character position to its byte position.
    #[inline(always)]
    pub fn byte_position(&self, pos_char: usize) -> usize {
        self.c2b[pos_char]
    }

    /// Maps a byte position back to its character position, or `None` when
    /// the byte position is not a character boundary (possible only with
    /// corrupt index data).
    #[inline(always)]
    pub fn char_position(&self, pos_byte: usize) -> Option<usize> {
        match self.b2c.get(pos_byte) {
            Some(&pos) if pos != usize::MAX => Some(pos),
            _ => None,
        }
    }

    /// Returns the category of the character at `pos_char`.
    #[inline(always)]
    pub fn category(&self, pos_char: usize) -> CharCategory {
        self.categories[pos_char]
    }

    /// Returns the length of the same-category run starting at `pos_char`.
    #[inline(always)]
    pub fn groupable(&self, pos_char: usize) -> usize {
        self.groupable[pos_char]
    }

    /// Returns the surface of a character range.
    #[inline(always)]
    pub fn surface(&self, start_char: usize, end_char: usize) -> &str {
        &self.input[self.c2b[start_char]..self.c2b[end_char]]
    }
}
