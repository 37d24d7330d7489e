// Copyright 2026 the patricia-trie authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![cfg_attr(not(doctest), doc = include_str!("../README.md"))]
#![deny(
    missing_docs,
    missing_debug_implementations,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    unsafe_code
)]
#![warn(rust_2018_idioms)]

mod discriminant;
#[cfg(test)]
mod proptests;

use std::{error::Error, fmt, marker::PhantomData};

pub use discriminant::{Bits, Bytes, Discriminant};

/// A PATRICIA trie branching on bit positions.
pub type BitTrie = PatriciaTrie<Bits>;

/// A PATRICIA trie branching on byte positions.
pub type ByteTrie = PatriciaTrie<Bytes>;

/// A node in the arena. Children are arena indices, so the splice step of an
/// insertion is a plain index update in the parent's slot.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    /// Terminal node owning one complete key.
    Leaf(Box<[u8]>),
    /// Branching point. Keys whose ordinal at `pos` is below `pivot` live
    /// under `low`, the rest under `high`. Inner nodes never store a key.
    Inner {
        pos: usize,
        pivot: u8,
        low: usize,
        high: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Low,
    High,
}

impl Side {
    fn of(ordinal: u8, pivot: u8) -> Self {
        if ordinal < pivot {
            Side::Low
        } else {
            Side::High
        }
    }
}

/// Error returned by [`PatriciaTrie::insert`] when a key cannot be told
/// apart from an already-stored key at any discriminant position.
///
/// Positions past the end of a key read as zero, so two distinct keys that
/// differ only by trailing `0x00` bytes extract identical ordinals
/// everywhere and no branching position exists for them. The trie is left
/// unchanged.
///
/// ```
/// use patricia_trie::BitTrie;
///
/// let mut trie = BitTrie::new();
/// trie.insert(b"a").unwrap();
///
/// let err = trie.insert(b"a\0").unwrap_err();
/// assert_eq!(err.key(), b"a\0");
/// assert_eq!(trie.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousKey {
    key: Box<[u8]>,
}

impl AmbiguousKey {
    /// The key that could not be inserted.
    pub fn key(&self) -> &[u8] {
        &self.key
    }
}

impl fmt::Display for AmbiguousKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "key {:?} differs from a stored key only by trailing zero bytes \
             and has no branching position",
            self.key
        )
    }
}

impl Error for AmbiguousKey {}

/// A path-compressed binary trie over byte-string keys, generic over the
/// [`Discriminant`] granularity used to split them.
///
/// Nodes live in an index-addressed arena owned by the trie; each node is
/// either a leaf holding one complete key or an inner node holding a
/// discriminant position and two children. Insertion allocates at most one
/// leaf and one inner node and redirects a single child slot; nothing is
/// ever freed or moved, so node handles stay valid for the life of the trie.
///
/// ```
/// use patricia_trie::ByteTrie;
///
/// let mut trie = ByteTrie::new();
/// trie.insert("gato").unwrap();
/// trie.insert("galinha").unwrap();
/// trie.insert("golfinho").unwrap();
///
/// assert!(trie.contains("gato"));
/// assert!(!trie.contains("galho"));
/// assert_eq!(trie.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct PatriciaTrie<D: Discriminant = Bits> {
    nodes: Vec<Node>,
    root: Option<usize>,
    len: usize,
    _granularity: PhantomData<D>,
}

impl<D: Discriminant> Default for PatriciaTrie<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Discriminant> PatriciaTrie<D> {
    /// Create an empty trie.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            len: 0,
            _granularity: PhantomData,
        }
    }

    /// Number of keys stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if no key has been inserted yet.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Report whether `key` is stored in the trie. Any key type can be used
    /// here as long as it implements `AsRef<[u8]>`.
    ///
    /// The walk compares one discriminant per inner node to reach the single
    /// leaf that could hold `key`, then confirms with one exact equality
    /// check. No backtracking happens.
    ///
    /// ```
    /// use patricia_trie::BitTrie;
    ///
    /// let mut trie = BitTrie::new();
    /// trie.insert("cachorro").unwrap();
    /// trie.insert("cacto").unwrap();
    /// trie.insert("carro").unwrap();
    ///
    /// assert!(trie.contains("cacto"));
    /// assert!(trie.contains(b"carro"));
    /// assert!(!trie.contains("casa".to_owned()));
    /// ```
    pub fn contains<K: AsRef<[u8]>>(&self, key: K) -> bool {
        let key = key.as_ref();
        let Some(root) = self.root else {
            return false;
        };
        let candidate = self.descend(root, key);
        matches!(&self.nodes[candidate], Node::Leaf(stored) if stored.as_ref() == key)
    }

    /// Insert `key`, returning `Ok(true)` if it was new and `Ok(false)` if
    /// it was already stored (in which case the trie is untouched).
    ///
    /// The only failure is [`AmbiguousKey`]: `key` is distinct from a stored
    /// key but extracts the same ordinal at every position, which happens
    /// exactly when the two differ only by trailing zero bytes.
    ///
    /// ```
    /// use patricia_trie::ByteTrie;
    ///
    /// let mut trie = ByteTrie::new();
    /// assert_eq!(trie.insert("gato"), Ok(true));
    /// assert_eq!(trie.insert("gato"), Ok(false));
    /// assert_eq!(trie.len(), 1);
    /// ```
    pub fn insert<K: AsRef<[u8]>>(&mut self, key: K) -> Result<bool, AmbiguousKey> {
        let key = key.as_ref();

        let Some(root) = self.root else {
            let leaf = self.push_node(Node::Leaf(key.into()));
            self.root = Some(leaf);
            self.len = 1;
            return Ok(true);
        };

        // Probe: find the one leaf `key` would occupy if it were present.
        let candidate = self.descend(root, key);
        let Node::Leaf(existing) = &self.nodes[candidate] else {
            unreachable!("descend stops on a leaf")
        };
        if existing.as_ref() == key {
            return Ok(false);
        }

        let Some(pos) = divergence::<D>(existing, key) else {
            return Err(AmbiguousKey { key: key.into() });
        };
        let pivot = D::extract(existing, pos).max(D::extract(key, pos));

        // Second walk: stop at the subtree the new inner node must capture,
        // remembering the parent slot to redirect. Byte tries can chain
        // several nodes at one position, and the split belongs below the
        // chain, so only a *greater* position (or a leaf) stops the walk.
        let mut at = root;
        let mut parent = None;
        loop {
            match &self.nodes[at] {
                Node::Leaf(_) => break,
                Node::Inner {
                    pos: node_pos,
                    pivot: node_pivot,
                    low,
                    high,
                } => {
                    if *node_pos > pos {
                        break;
                    }
                    let side = Side::of(D::extract(key, *node_pos), *node_pivot);
                    parent = Some((at, side));
                    at = match side {
                        Side::Low => *low,
                        Side::High => *high,
                    };
                }
            }
        }

        let leaf = self.push_node(Node::Leaf(key.into()));
        let (low, high) = match Side::of(D::extract(key, pos), pivot) {
            Side::Low => (leaf, at),
            Side::High => (at, leaf),
        };
        let split = self.push_node(Node::Inner {
            pos,
            pivot,
            low,
            high,
        });

        match parent {
            None => self.root = Some(split),
            Some((id, side)) => {
                let Node::Inner { low, high, .. } = &mut self.nodes[id] else {
                    unreachable!("splice parents are inner nodes")
                };
                match side {
                    Side::Low => *low = split,
                    Side::High => *high = split,
                }
            }
        }

        self.len += 1;
        Ok(true)
    }

    /// Read-only handle on the root node, or `None` for an empty trie.
    ///
    /// Together with [`NodeRef::kind`] this is everything an external
    /// depth-first consumer (say, a tree printer) needs; none of it can
    /// mutate the trie.
    ///
    /// ```
    /// use patricia_trie::{BitTrie, NodeKind};
    ///
    /// let mut trie = BitTrie::new();
    /// trie.insert("cachorro").unwrap();
    /// trie.insert("cacto").unwrap();
    ///
    /// let NodeKind::Inner { position, low, high, .. } =
    ///     trie.root().unwrap().kind()
    /// else {
    ///     unreachable!()
    /// };
    /// // "cachorro" and "cacto" first differ inside their fourth byte.
    /// assert_eq!(position, 27);
    /// assert!(matches!(low.kind(), NodeKind::Leaf(b"cachorro")));
    /// assert!(matches!(high.kind(), NodeKind::Leaf(b"cacto")));
    /// ```
    pub fn root(&self) -> Option<NodeRef<'_, D>> {
        self.root.map(|id| NodeRef { trie: self, id })
    }

    /// Iterate over the stored keys, depth first with low children before
    /// high ones. The order is structural, not lexicographic.
    ///
    /// ```
    /// use patricia_trie::BitTrie;
    ///
    /// let mut trie = BitTrie::new();
    /// for key in ["carro", "cacto", "cachorro"] {
    ///     trie.insert(key).unwrap();
    /// }
    ///
    /// assert_eq!(trie.keys().count(), 3);
    /// assert!(trie.keys().any(|k| k == "cacto".as_bytes()));
    /// ```
    pub fn keys(&self) -> Keys<'_, D> {
        Keys {
            trie: self,
            stack: self.root.into_iter().collect(),
        }
    }

    /// Walk from `at` to the unique leaf whose path matches `key`'s
    /// discriminants.
    fn descend(&self, mut at: usize, key: &[u8]) -> usize {
        loop {
            match &self.nodes[at] {
                Node::Leaf(_) => return at,
                Node::Inner {
                    pos,
                    pivot,
                    low,
                    high,
                } => {
                    at = match Side::of(D::extract(key, *pos), *pivot) {
                        Side::Low => *low,
                        Side::High => *high,
                    };
                }
            }
        }
    }

    fn push_node(&mut self, node: Node) -> usize {
        let id = self.nodes.len();
        self.nodes.push(node);
        id
    }
}

/// First position where the two keys' ordinals differ.
///
/// The scan is bounded by the longer key's last real position: past it both
/// keys read as zero padding, so `None` means the keys agree everywhere and
/// differ only by trailing zero bytes.
fn divergence<D: Discriminant>(a: &[u8], b: &[u8]) -> Option<usize> {
    let limit = a.len().max(b.len()) * D::POSITIONS_PER_BYTE;
    (0..limit).find(|&pos| D::extract(a, pos) != D::extract(b, pos))
}

/// Read-only handle on one node of a [`PatriciaTrie`].
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a, D: Discriminant> {
    trie: &'a PatriciaTrie<D>,
    id: usize,
}

impl<'a, D: Discriminant> NodeRef<'a, D> {
    /// Expose which kind of node this is, along with its contents.
    pub fn kind(&self) -> NodeKind<'a, D> {
        match &self.trie.nodes[self.id] {
            Node::Leaf(key) => NodeKind::Leaf(key.as_ref()),
            Node::Inner {
                pos,
                pivot,
                low,
                high,
            } => NodeKind::Inner {
                position: *pos,
                pivot: *pivot,
                low: NodeRef {
                    trie: self.trie,
                    id: *low,
                },
                high: NodeRef {
                    trie: self.trie,
                    id: *high,
                },
            },
        }
    }
}

/// The two node shapes a [`NodeRef`] can expose.
#[derive(Debug, Clone, Copy)]
pub enum NodeKind<'a, D: Discriminant> {
    /// A terminal node and the complete key it owns.
    Leaf(&'a [u8]),
    /// A branching point.
    Inner {
        /// Discriminant position this node splits at.
        position: usize,
        /// Smallest ordinal routed to `high`. Always `1` in a bit trie.
        pivot: u8,
        /// Subtree of keys whose ordinal at `position` is below the pivot.
        low: NodeRef<'a, D>,
        /// Subtree of the remaining keys.
        high: NodeRef<'a, D>,
    },
}

/// Depth-first iterator over the keys of a [`PatriciaTrie`], created by
/// [`PatriciaTrie::keys`].
#[derive(Debug)]
pub struct Keys<'a, D: Discriminant> {
    trie: &'a PatriciaTrie<D>,
    stack: Vec<usize>,
}

impl<'a, D: Discriminant> Iterator for Keys<'a, D> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            match &self.trie.nodes[id] {
                Node::Leaf(key) => return Some(key.as_ref()),
                Node::Inner { low, high, .. } => {
                    self.stack.push(*high);
                    self.stack.push(*low);
                }
            }
        }
        None
    }
}
