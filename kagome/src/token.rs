//! Container of resultant tokens.

use crate::common::BOS_EOS_ID;
use crate::dictionary::{
    BASE_FORM_INDEX, INFLECTIONAL_FORM, INFLECTIONAL_TYPE, POS_HIERARCHY, POS_START_INDEX,
    PRONUNCIATION_INDEX, READING_INDEX,
};
use crate::tokenizer::lattice::{Node, NodeClass};
use crate::tokenizer::worker::Worker;

/// The wildcard value an absent feature resolves to.
const FEATURE_WILDCARD: &str = "*";

/// Resultant token: a cheap view into a [`Worker`]'s best path.
pub struct Token<'w> {
    worker: &'w Worker,
    index: usize,
}

impl<'w> Token<'w> {
    #[inline(always)]
    pub(crate) const fn new(worker: &'w Worker, index: usize) -> Self {
        Self { worker, index }
    }

    #[inline(always)]
    fn node(&self) -> &'w Node {
        &self.worker.output[self.index]
    }

    /// Gets the surface string of the token.
    #[inline(always)]
    pub fn surface(&self) -> &'w str {
        let node = self.node();
        self.worker.sent.surface(node.char_start, node.char_end)
    }

    /// Gets the byte offset of the surface in the input.
    #[inline(always)]
    pub fn position(&self) -> usize {
        self.node().byte_start
    }

    /// Gets the character position the surface starts at.
    #[inline(always)]
    pub fn char_start(&self) -> usize {
        self.node().char_start
    }

    /// Gets the character position the surface ends at (exclusive).
    #[inline(always)]
    pub fn char_end(&self) -> usize {
        self.node().char_end
    }

    /// Gets the classification of the token.
    #[inline(always)]
    pub fn class(&self) -> NodeClass {
        self.node().class
    }

    /// Gets the morpheme id of the token.
    #[inline(always)]
    pub fn id(&self) -> i32 {
        self.node().id
    }

    /// Gets the accumulated cost from BOS to the token's node.
    #[inline(always)]
    pub fn total_cost(&self) -> i32 {
        self.node().cost
    }

    /// Resolves the full feature record of the token.
    ///
    /// Known tokens concatenate the POS names with the content row;
    /// unknown tokens read the unknown-word store; user tokens synthesise
    /// a record from the user entry; dummy tokens have no features.
    pub fn features(&self) -> Vec<String> {
        let dict = self.worker.dict();
        match self.class() {
            NodeClass::Known => {
                let mut features: Vec<String> = dict
                    .pos_table
                    .pos_names(self.id())
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                if let Some(content) = dict.features(self.id()) {
                    features.extend(content.iter().cloned());
                }
                features
            }
            NodeClass::Unknown => dict
                .unknown()
                .features(self.id())
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
            NodeClass::User => {
                let Some(entry) = self
                    .worker
                    .user_dict()
                    .and_then(|u| u.entry(self.id()))
                else {
                    return Vec::new();
                };
                vec![
                    entry.pos.clone(),
                    entry.tokens.join("/"),
                    entry.yomi.join("/"),
                ]
            }
            NodeClass::Dummy => Vec::new(),
        }
    }

    /// Gets the feature at `index`, if present.
    pub fn feature_at(&self, index: usize) -> Option<String> {
        self.features().into_iter().nth(index)
    }

    /// Resolves the POS hierarchy of the token.
    pub fn pos(&self) -> Vec<String> {
        let dict = self.worker.dict();
        match self.class() {
            NodeClass::Known => {
                let names = dict.pos_table.pos_names(self.id());
                if !names.is_empty() {
                    return names.into_iter().map(str::to_string).collect();
                }
                // Loader fallback paths have no POS table; read the leading
                // feature slots instead.
                [self.feature_at(0), self.feature_at(1)]
                    .into_iter()
                    .flatten()
                    .filter(|s| s != FEATURE_WILDCARD)
                    .collect()
            }
            NodeClass::Unknown => {
                let meta = &dict.unknown().contents_meta;
                let start = meta.get(POS_START_INDEX).copied().unwrap_or(0) as usize;
                let hierarchy = meta.get(POS_HIERARCHY).copied().unwrap_or(1) as usize;
                let Some(features) = dict.unknown().features(self.id()) else {
                    return Vec::new();
                };
                let end = start + hierarchy;
                if end > features.len() {
                    return Vec::new();
                }
                features[start..end].to_vec()
            }
            NodeClass::User => self
                .worker
                .user_dict()
                .and_then(|u| u.entry(self.id()))
                .map(|e| vec![e.pos.clone()])
                .unwrap_or_default(),
            NodeClass::Dummy => Vec::new(),
        }
    }

    /// Looks a metadata key up in the store matching the token class and
    /// resolves the indexed feature.
    fn pickup_from_features(&self, key: &str) -> Option<String> {
        let dict = self.worker.dict();
        let index = match self.class() {
            NodeClass::Known => dict.meta(key),
            NodeClass::Unknown => dict.unknown().contents_meta.get(key).copied(),
            NodeClass::Dummy | NodeClass::User => None,
        }?;
        self.feature_at(index as usize)
    }

    /// Resolves a surface-normalisation slot: metadata first, then the
    /// fixed positional index, then the wildcard.
    fn normalisation_slot(&self, key: &str, positional: usize) -> String {
        if let Some(value) = self.pickup_from_features(key) {
            if value != FEATURE_WILDCARD {
                return value;
            }
        }
        self.feature_at(positional)
            .unwrap_or_else(|| FEATURE_WILDCARD.to_string())
    }

    /// Gets the inflectional type of the token.
    pub fn inflectional_type(&self) -> String {
        self.pickup_from_features(INFLECTIONAL_TYPE)
            .unwrap_or_else(|| FEATURE_WILDCARD.to_string())
    }

    /// Gets the inflectional form of the token.
    pub fn inflectional_form(&self) -> String {
        self.pickup_from_features(INFLECTIONAL_FORM)
            .unwrap_or_else(|| FEATURE_WILDCARD.to_string())
    }

    /// Gets the base form of the token.
    pub fn base_form(&self) -> String {
        self.normalisation_slot(BASE_FORM_INDEX, 2)
    }

    /// Gets the reading of the token.
    pub fn reading(&self) -> String {
        self.normalisation_slot(READING_INDEX, 3)
    }

    /// Gets the pronunciation of the token.
    pub fn pronunciation(&self) -> String {
        self.normalisation_slot(PRONUNCIATION_INDEX, 4)
    }

    /// Returns whether this is a BOS/EOS sentinel.
    #[inline(always)]
    pub fn is_bos_eos(&self) -> bool {
        self.id() == BOS_EOS_ID && self.class() == NodeClass::Dummy
    }
}

impl PartialEq for Token<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id() && self.class() == other.class() && self.surface() == other.surface()
    }
}

impl std::fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("surface", &self.surface())
            .field("position", &self.position())
            .field("char_start", &self.char_start())
            .field("char_end", &self.char_end())
            .field("class", &self.class())
            .field("id", &self.id())
            .field("total_cost", &self.total_cost())
            .finish()
    }
}

/// Iterator of tokens.
pub struct TokenIter<'w> {
    worker: &'w Worker,
    i: usize,
}

impl<'w> TokenIter<'w> {
    #[inline(always)]
    pub(crate) const fn new(worker: &'w Worker, i: usize) -> Self {
        Self { worker, i }
    }
}

impl<'w> Iterator for TokenIter<'w> {
    type Item = Token<'w>;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.i < self.worker.num_tokens() {
            let t = self.worker.token(self.i);
            self.i += 1;
            Some(t)
        } else {
            None
        }
    }
}
