//! Adaptive Radix Tree (ART) implementation.
//!
//! Based on "The Adaptive Radix Tree: ARTful Indexing for Main-Memory Databases"
//! by Leis et al., 2013.
//!
//! Key features:
//! - Adaptive node sizes (4, 16, 48, 256 children)
//! - Path compression with a bounded inline prefix
//! - Minimal disambiguating length over the whole key set
//!
//! The tree behaves as a set keyed by byte sequence: inserting a key that is
//! already present keeps the first value.

mod debug;
mod node;

pub use node::{Children, Header, Leaf, Node, NodeType, Prefix, MAX_PREFIX_LEN};

use node::Child;

/// Node counts per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Number of leaf nodes
    pub leaf_count: usize,
    /// Number of Node4 instances
    pub node4_count: usize,
    /// Number of Node16 instances
    pub node16_count: usize,
    /// Number of Node48 instances
    pub node48_count: usize,
    /// Number of Node256 instances
    pub node256_count: usize,
}

impl TreeStats {
    fn record_growth(&mut self, from: NodeType) {
        match from {
            NodeType::Node4 => {
                self.node4_count = self.node4_count.saturating_sub(1);
                self.node16_count += 1;
            }
            NodeType::Node16 => {
                self.node16_count = self.node16_count.saturating_sub(1);
                self.node48_count += 1;
            }
            NodeType::Node48 => {
                self.node48_count = self.node48_count.saturating_sub(1);
                self.node256_count += 1;
            }
            NodeType::Leaf | NodeType::Node256 => {}
        }
    }

    /// Total number of inner nodes.
    pub fn inner_count(&self) -> usize {
        self.node4_count + self.node16_count + self.node48_count + self.node256_count
    }
}

/// An Adaptive Radix Tree over byte keys.
pub struct RadixTree<V> {
    root: Child<V>,
    size: usize,
    stats: TreeStats,
}

impl<V> RadixTree<V> {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            root: None,
            size: 0,
            stats: TreeStats::default(),
        }
    }

    /// Insert a key-value pair.
    ///
    /// Returns `false` and drops `value` if the key is already present.
    pub fn insert(&mut self, key: &[u8], value: V) -> bool {
        let inserted = Self::insert_recursive(&mut self.root, key, 0, value, &mut self.stats);
        if inserted {
            self.size += 1;
        }
        inserted
    }

    fn insert_recursive(
        slot: &mut Child<V>,
        key: &[u8],
        depth: usize,
        value: V,
        stats: &mut TreeStats,
    ) -> bool {
        let Some(node) = slot.as_deref_mut() else {
            *slot = Some(Box::new(Node::new_leaf(key.to_vec(), value)));
            stats.leaf_count += 1;
            return true;
        };

        if let Node::Leaf(leaf) = node {
            if leaf.key == key {
                return false;
            }

            // Split the leaf at the first byte where the two keys diverge.
            let common = common_prefix_len(&leaf.key, key, depth);
            let split = depth + common;
            let existing_byte = leaf.key.get(split).copied();

            let mut branch = Node::new_node4(Prefix::new(&key[depth..split]));
            if let Some(existing) = slot.take() {
                branch.attach(existing_byte, existing);
            }
            branch.attach(
                key.get(split).copied(),
                Box::new(Node::new_leaf(key.to_vec(), value)),
            );
            *slot = Some(Box::new(branch));
            stats.node4_count += 1;
            stats.leaf_count += 1;
            return true;
        }

        let prefix_len = node.header().map_or(0, |h| h.prefix.len());
        let matched = node.match_prefix_deep(key, depth);

        if matched < prefix_len {
            // Prefix mismatch: hoist the shared part into a new Node4 and
            // re-home the existing node under its next prefix byte.
            let full = node.full_prefix(depth);
            let shared = &full[..matched.min(full.len())];
            let mut branch = Node::new_node4(Prefix::new(shared));
            if let Some(mut existing) = slot.take() {
                existing.set_prefix(Prefix::new(full.get(matched + 1..).unwrap_or_default()));
                branch.attach(full.get(matched).copied(), existing);
            }
            branch.attach(
                key.get(depth + matched).copied(),
                Box::new(Node::new_leaf(key.to_vec(), value)),
            );
            *slot = Some(Box::new(branch));
            stats.node4_count += 1;
            stats.leaf_count += 1;
            return true;
        }

        let depth = depth + prefix_len;
        let Some(&byte) = key.get(depth) else {
            // The key ends at this node.
            if node.header().is_some_and(|h| h.terminal.is_some()) {
                return false;
            }
            node.attach(None, Box::new(Node::new_leaf(key.to_vec(), value)));
            stats.leaf_count += 1;
            return true;
        };

        if let Some(child) = node.child_mut(byte) {
            return Self::insert_recursive(child, key, depth + 1, value, stats);
        }

        let before = node.node_type();
        if node.add_child(byte, Box::new(Node::new_leaf(key.to_vec(), value))) {
            stats.record_growth(before);
        }
        stats.leaf_count += 1;
        true
    }

    /// Get a reference to the value for a key.
    pub fn get(&self, key: &[u8]) -> Option<&V> {
        let mut node = self.root.as_deref()?;
        let mut depth = 0;

        loop {
            let header = match node {
                Node::Leaf(leaf) => return (leaf.key == key).then_some(&leaf.value),
                _ => node.header()?,
            };

            // Bytes past the inline bound are skipped; the leaf comparison settles them.
            if node.match_prefix(key, depth) < header.prefix.partial().len() {
                return None;
            }
            depth += header.prefix.len();

            match key.get(depth) {
                None => {
                    let leaf = header.terminal.as_deref()?.as_leaf()?;
                    return (leaf.key == key).then_some(&leaf.value);
                }
                Some(&byte) => {
                    node = node.child(byte)?;
                    depth += 1;
                }
            }
        }
    }

    /// Check if a key exists.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    /// Visit every key-value pair in ascending key order.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&[u8], &V),
    {
        if let Some(root) = self.root.as_deref() {
            Self::walk(root, &mut f);
        }
    }

    fn walk<F>(node: &Node<V>, f: &mut F)
    where
        F: FnMut(&[u8], &V),
    {
        if let Node::Leaf(leaf) = node {
            f(&leaf.key, &leaf.value);
            return;
        }
        if let Some(terminal) = node.header().and_then(Header::terminal) {
            Self::walk(terminal, f);
        }
        for (_, child) in node.children() {
            Self::walk(child, f);
        }
    }

    /// The smallest length `>= floor` at which every key's truncation is unique.
    ///
    /// This is the deepest leaf depth in the tree: a leaf sits exactly one byte
    /// past the point where its key leaves every other key behind.
    pub fn minimal_length(&self, floor: usize) -> usize {
        let mut deepest = 0;
        if let Some(root) = self.root.as_deref() {
            Self::deepest_leaf(root, 0, &mut deepest);
        }
        deepest.max(floor)
    }

    fn deepest_leaf(node: &Node<V>, depth: usize, deepest: &mut usize) {
        let Some(header) = node.header() else {
            *deepest = (*deepest).max(depth);
            return;
        };
        let depth = depth + header.prefix.len();
        if header.terminal.is_some() {
            *deepest = (*deepest).max(depth);
        }
        for (_, child) in node.children() {
            Self::deepest_leaf(child, depth + 1, deepest);
        }
    }

    /// Get the number of keys in the tree.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Check if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Node counts per tier, maintained during insertion.
    pub fn stats(&self) -> TreeStats {
        self.stats
    }
}

impl<V> Default for RadixTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

fn common_prefix_len(a: &[u8], b: &[u8], depth: usize) -> usize {
    let a = a.get(depth..).unwrap_or_default();
    let b = b.get(depth..).unwrap_or_default();
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
