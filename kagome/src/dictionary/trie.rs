//! Double-array trie over UTF-8 byte keys.
//!
//! Byte 0 is reserved as the key terminator. A lookup resolves to a base
//! morpheme id; entries sharing a surface occupy the contiguous id range
//! `[id, id + dup[id]]`.

use hashbrown::HashMap;

use crate::errors::{KagomeError, Result};

const VACANT: i32 = -1;

/// One slot of the double array.
#[derive(Default, Clone, Copy, Debug)]
pub(crate) struct DaNode {
    pub(crate) base: i32,
    pub(crate) check: i32,
}

impl DaNode {
    pub(crate) const fn new(base: i32, check: i32) -> Self {
        Self { base, check }
    }
}

/// Dictionary index: a double-array trie plus the duplicate-surface map.
#[derive(Default, Clone)]
pub struct IndexTable {
    da: Vec<DaNode>,
    dup: HashMap<i32, i32>,
}

impl IndexTable {
    /// Wraps raw double-array data loaded from a dictionary bundle.
    pub(crate) fn from_raw(da: Vec<DaNode>, dup: HashMap<i32, i32>) -> Self {
        Self { da, dup }
    }

    /// Returns the number of extra entries sharing the surface of `id`.
    #[inline(always)]
    pub fn dup_count(&self, id: i32) -> i32 {
        self.dup.get(&id).copied().unwrap_or(0)
    }

    /// Walks the full key; `Some(id)` when the key is a terminated entry.
    fn find(&self, key: &[u8]) -> Option<i32> {
        if self.da.is_empty() || key.is_empty() {
            return None;
        }
        let len = self.da.len();
        let mut q = 0usize;
        for &b in key {
            if b == 0 {
                return None;
            }
            let p = q;
            let next = self.da[p].base + i32::from(b);
            if next < 0 || next as usize >= len || self.da[next as usize].check != p as i32 {
                return None;
            }
            q = next as usize;
        }
        let p = q;
        let next = self.da[p].base;
        if next < 0 || next as usize >= len {
            return None;
        }
        let node = self.da[next as usize];
        if node.check != p as i32 || node.base > 0 {
            return None;
        }
        Some(-node.base)
    }

    /// Exact-match search, expanded over the duplicate range.
    pub fn search(&self, key: &[u8]) -> Vec<i32> {
        match self.find(key) {
            Some(id) => (id..=id + self.dup_count(id)).collect(),
            None => Vec::new(),
        }
    }

    /// Invokes `f(base_id, prefix_byte_len)` once per terminated prefix of
    /// `key`, in increasing length order. The caller expands the duplicate
    /// range.
    pub fn common_prefix_search_callback<F>(&self, key: &[u8], mut f: F)
    where
        F: FnMut(i32, usize),
    {
        if self.da.is_empty() || key.is_empty() {
            return;
        }
        let len = self.da.len();
        let mut q = 0usize;
        for (i, &b) in key.iter().enumerate() {
            if b == 0 {
                return;
            }
            let p = q;
            let next = self.da[p].base + i32::from(b);
            if next < 0 || next as usize >= len || self.da[next as usize].check != p as i32 {
                return;
            }
            q = next as usize;

            let ahead = self.da[q].base;
            if ahead >= 0 && (ahead as usize) < len {
                let node = self.da[ahead as usize];
                if node.check == q as i32 && node.base <= 0 {
                    f(-node.base, i + 1);
                }
            }
        }
    }

    /// Builds the index from surfaces listed in morpheme-id order.
    ///
    /// Entries sharing a surface must be adjacent so the duplicate range
    /// stays contiguous.
    pub fn from_surfaces<'a, I>(surfaces: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut keys: Vec<(&str, i32)> = Vec::new();
        let mut dup = HashMap::new();
        for (id, surface) in surfaces.into_iter().enumerate() {
            let id = i32::try_from(id)?;
            if surface.is_empty() {
                return Err(KagomeError::invalid_argument("surfaces", "empty surface"));
            }
            match keys.last_mut() {
                Some((prev, base_id)) if *prev == surface => {
                    *dup.entry(*base_id).or_insert(0) += 1;
                }
                _ => keys.push((surface, id)),
            }
        }

        let mut builder = TrieBuilder::default();
        for (surface, base_id) in &keys {
            builder.insert(surface.as_bytes(), *base_id)?;
        }
        Ok(Self {
            da: builder.into_double_array(),
            dup,
        })
    }
}

#[derive(Default)]
struct TrieNode {
    children: Vec<(u8, usize)>, // sorted by byte
    terminal: Option<i32>,
}

#[derive(Default)]
struct TrieBuilder {
    nodes: Vec<TrieNode>,
}

impl TrieBuilder {
    fn insert(&mut self, key: &[u8], id: i32) -> Result<()> {
        if self.nodes.is_empty() {
            self.nodes.push(TrieNode::default());
        }
        let mut cur = 0usize;
        for &b in key {
            if b == 0 {
                return Err(KagomeError::invalid_argument(
                    "surfaces",
                    "surface contains a NUL byte",
                ));
            }
            cur = match self.nodes[cur].children.binary_search_by_key(&b, |e| e.0) {
                Ok(i) => self.nodes[cur].children[i].1,
                Err(i) => {
                    let next = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[cur].children.insert(i, (b, next));
                    next
                }
            };
        }
        if self.nodes[cur].terminal.is_some() {
            return Err(KagomeError::invalid_argument(
                "surfaces",
                "duplicate surfaces must be adjacent in id order",
            ));
        }
        self.nodes[cur].terminal = Some(id);
        Ok(())
    }

    fn into_double_array(self) -> Vec<DaNode> {
        if self.nodes.is_empty() {
            return Vec::new();
        }
        let mut da = vec![DaNode::new(0, VACANT); 256];
        let mut used = vec![false; 256];
        used[0] = true;

        // (trie node, double-array slot)
        let mut queue = std::collections::VecDeque::new();
        queue.push_back((0usize, 0usize));

        while let Some((node_idx, pos)) = queue.pop_front() {
            let mut edges: Vec<u8> = Vec::with_capacity(self.nodes[node_idx].children.len() + 1);
            if self.nodes[node_idx].terminal.is_some() {
                edges.push(0);
            }
            edges.extend(self.nodes[node_idx].children.iter().map(|e| e.0));

            let mut base = 1usize;
            'search: loop {
                for &c in &edges {
                    let slot = base + usize::from(c);
                    if slot >= used.len() {
                        let new_len = slot + 256;
                        used.resize(new_len, false);
                        da.resize(new_len, DaNode::new(0, VACANT));
                    }
                    if used[slot] {
                        base += 1;
                        continue 'search;
                    }
                }
                break;
            }

            da[pos].base = base as i32;
            if let Some(id) = self.nodes[node_idx].terminal {
                let slot = base;
                used[slot] = true;
                da[slot] = DaNode::new(-id, pos as i32);
            }
            for &(c, child) in &self.nodes[node_idx].children {
                let slot = base + usize::from(c);
                used[slot] = true;
                da[slot].check = pos as i32;
                queue.push_back((child, slot));
            }
        }
        da
    }
}
