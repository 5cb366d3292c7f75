//! Position-bucketed lattice and the Viterbi passes over it.

use std::sync::Once;

use crate::common::{
    BOS_EOS_ID, MAXIMUM_COST, SEARCH_MODE_KANJI_LENGTH, SEARCH_MODE_KANJI_PENALTY,
    SEARCH_MODE_OTHER_LENGTH, SEARCH_MODE_OTHER_PENALTY,
};
use crate::dictionary::Dict;
use crate::script;
use crate::sentence::Sentence;
use crate::tokenizer::Mode;

pub(crate) const INVALID_IDX: u16 = u16::MAX;

static TRUNCATION_WARNING: Once = Once::new();

/// Emits the unknown-run truncation warning once per process.
pub(crate) fn warn_unknown_run_truncated(len: usize) {
    TRUNCATION_WARNING.call_once(|| {
        log::warn!("unknown-word run of {len} characters truncated to the configured maximum");
    });
}

/// Classification of a lattice node.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum NodeClass {
    /// Sentinel (BOS/EOS) or a character split off an unknown token.
    Dummy = 0,
    /// Word from the system dictionary.
    Known = 1,
    /// Word synthesised from the character-class rules.
    Unknown = 2,
    /// Word from the user dictionary.
    User = 3,
}

impl NodeClass {
    /// Returns the conventional upper-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dummy => "DUMMY",
            Self::Known => "KNOWN",
            Self::Unknown => "UNKNOWN",
            Self::User => "USER",
        }
    }
}

/// A candidate morpheme occupying a character range of the input.
///
/// A node lives in the bucket of the position its surface ends at; its
/// best predecessor is an index into the bucket at `char_start`.
#[derive(Clone, Copy, Debug)]
pub struct Node {
    /// Morpheme id in the store matching `class`.
    pub id: i32,
    /// Node classification.
    pub class: NodeClass,
    /// Byte offset of the surface in the input.
    pub byte_start: usize,
    /// Character position the surface starts at.
    pub char_start: usize,
    /// Character position the surface ends at (exclusive).
    pub char_end: usize,
    /// Left context id.
    pub left_id: i16,
    /// Right context id.
    pub right_id: i16,
    /// Intrinsic cost.
    pub weight: i16,
    /// Accumulated cost from BOS, valid after the forward pass.
    pub cost: i32,
    /// Index of the best predecessor within the bucket at `char_start`.
    pub prev_idx: u16,
}

impl Node {
    /// Returns whether this is the BOS or EOS sentinel.
    #[inline(always)]
    pub fn is_bos_eos(&self) -> bool {
        self.id == BOS_EOS_ID && self.class == NodeClass::Dummy
    }

    #[inline(always)]
    fn is_bos(&self) -> bool {
        self.is_bos_eos() && self.char_end == 0
    }

    /// Returns the surface length in characters.
    #[inline(always)]
    pub fn char_len(&self) -> usize {
        self.char_end - self.char_start
    }
}

/// The lattice. Bucket `i` holds the candidate nodes whose surfaces end at
/// character position `i`; bucket 0 holds BOS and bucket `len + 1` holds
/// EOS. Bucket storage is reused across analyses.
#[derive(Default)]
pub struct Lattice {
    ends: Vec<Vec<Node>>,
    len_char: usize,
}

impl Lattice {
    /// Clears the lattice for a sentence of `len_char` characters and
    /// inserts BOS.
    pub fn reset(&mut self, len_char: usize) {
        Self::reset_vec(&mut self.ends, len_char + 2);
        self.len_char = len_char;
        self.ends[0].push(Node {
            id: BOS_EOS_ID,
            class: NodeClass::Dummy,
            byte_start: 0,
            char_start: 0,
            char_end: 0,
            left_id: 0,
            right_id: 0,
            weight: 0,
            cost: 0,
            prev_idx: INVALID_IDX,
        });
    }

    fn reset_vec(data: &mut Vec<Vec<Node>>, new_len: usize) {
        for v in data.iter_mut() {
            v.clear();
        }
        let cur_len = data.len();
        if cur_len < new_len {
            data.reserve(new_len - cur_len);
            for _ in cur_len..new_len {
                data.push(Vec::with_capacity(16));
            }
        }
    }

    /// Inserts a candidate node into the bucket its surface ends at.
    pub fn insert_node(&mut self, node: Node) {
        debug_assert!(node.char_start < node.char_end);
        debug_assert!(node.char_end <= self.len_char);
        self.ends[node.char_end].push(node);
    }

    /// Inserts EOS into the final bucket.
    pub fn insert_eos(&mut self, len_byte: usize) {
        let bucket = self.len_char + 1;
        self.ends[bucket].push(Node {
            id: BOS_EOS_ID,
            class: NodeClass::Dummy,
            byte_start: len_byte,
            char_start: self.len_char,
            char_end: self.len_char,
            left_id: 0,
            right_id: 0,
            weight: 0,
            cost: 0,
            prev_idx: INVALID_IDX,
        });
    }

    /// Forward Viterbi pass: minimises the accumulated cost of every node
    /// over its predecessor bucket.
    ///
    /// Accumulation happens in 64-bit arithmetic and saturates at
    /// [`MAXIMUM_COST`], which is absorbing. When two predecessors tie, the
    /// first one inserted wins.
    pub fn forward(&mut self, sent: &Sentence, dict: &Dict, mode: Mode) {
        let max = i64::from(MAXIMUM_COST);
        for i in 1..=self.len_char + 1 {
            let (before, rest) = self.ends.split_at_mut(i);
            for target in rest[0].iter_mut() {
                let prev_list = &before[target.char_start];
                if prev_list.is_empty() {
                    target.cost = MAXIMUM_COST;
                    target.prev_idx = INVALID_IDX;
                    continue;
                }
                let mut best_cost = max;
                let mut best_idx = INVALID_IDX;
                for (k, prev) in prev_list.iter().enumerate() {
                    let total = if prev.cost == MAXIMUM_COST {
                        max
                    } else {
                        let conn = if prev.class == NodeClass::User
                            || target.class == NodeClass::User
                        {
                            0
                        } else {
                            i64::from(dict.connection(prev.right_id, target.left_id))
                        };
                        let mut total =
                            i64::from(prev.cost) + conn + i64::from(target.weight);
                        if mode != Mode::Normal {
                            total += i64::from(additional_cost(sent, prev));
                        }
                        total.min(max)
                    };
                    if total < best_cost {
                        best_cost = total;
                        best_idx = k as u16;
                    }
                }
                if best_cost >= max || best_idx == INVALID_IDX {
                    target.cost = MAXIMUM_COST;
                    target.prev_idx = INVALID_IDX;
                } else {
                    target.cost = best_cost as i32;
                    target.prev_idx = best_idx;
                }
            }
        }
    }

    /// Backward pass: extracts the best path in BOS→EOS order, excluding
    /// the sentinels. In Extended mode, unknown nodes on the path are
    /// replaced by one single-character Dummy node per code point.
    pub fn backward(&self, sent: &Sentence, mode: Mode, out: &mut Vec<Node>) {
        out.clear();
        let Some(eos) = self.ends.get(self.len_char + 1).and_then(|b| b.first()) else {
            return;
        };
        if eos.cost == MAXIMUM_COST || eos.prev_idx == INVALID_IDX {
            return;
        }

        let mut cur = eos;
        while cur.prev_idx != INVALID_IDX {
            let prev = &self.ends[cur.char_start][usize::from(cur.prev_idx)];
            if prev.is_bos() {
                break;
            }
            if mode == Mode::Extended && prev.class == NodeClass::Unknown {
                // Collected in reverse, so the per-character nodes go in
                // reverse too; the final flip restores forward order.
                for i in (prev.char_start..prev.char_end).rev() {
                    out.push(Node {
                        id: prev.id,
                        class: NodeClass::Dummy,
                        byte_start: sent.byte_position(i),
                        char_start: i,
                        char_end: i + 1,
                        left_id: 0,
                        right_id: 0,
                        weight: 0,
                        cost: prev.cost,
                        prev_idx: INVALID_IDX,
                    });
                }
            } else {
                out.push(*prev);
            }
            cur = prev;
        }
        out.reverse();
    }
}

/// Search-mode penalty for extending the given predecessor.
///
/// Charged to the predecessor, not the target: a long morpheme pays each
/// time an edge leaves it, which is what pushes compounds apart.
fn additional_cost(sent: &Sentence, node: &Node) -> i32 {
    let n = node.char_len();
    if n == 0 {
        return 0;
    }
    let chars = &sent.chars()[node.char_start..node.char_end];
    if n > SEARCH_MODE_KANJI_LENGTH && chars.iter().all(|&c| script::is_ideographic(c)) {
        return (n - SEARCH_MODE_KANJI_LENGTH) as i32 * SEARCH_MODE_KANJI_PENALTY;
    }
    if n > SEARCH_MODE_OTHER_LENGTH {
        return (n - SEARCH_MODE_OTHER_LENGTH) as i32 * SEARCH_MODE_OTHER_PENALTY;
    }
    0
}
