//! ART node types with adaptive sizing.
//!
//! Inner nodes pick their layout from the number of children they hold:
//!
//! - Node4: up to 4 children (sorted keys, linear scan)
//! - Node16: 5-16 children (sorted keys, bitmask scan)
//! - Node48: 17-48 children (256-byte slot index gated by a presence bitmap)
//! - Node256: 49-256 children (direct indexing by byte)
//!
//! Every inner node carries a compressed path. Only the first
//! [`MAX_PREFIX_LEN`] bytes of it are stored inline; the remainder is checked
//! against a leaf below the node when needed.

use smallvec::SmallVec;

/// Number of compressed-path bytes stored inline in an inner node.
pub const MAX_PREFIX_LEN: usize = 10;

/// A child slot. Empty slots are `None`.
pub(crate) type Child<V> = Option<Box<Node<V>>>;

/// The type of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// A leaf node containing a key and value.
    Leaf,
    /// A node with up to 4 children.
    Node4,
    /// A node with 5-16 children.
    Node16,
    /// A node with 17-48 children.
    Node48,
    /// A node with 49-256 children.
    Node256,
}

impl NodeType {
    /// Maximum number of children a node of this type can hold.
    pub fn capacity(self) -> usize {
        match self {
            NodeType::Leaf => 0,
            NodeType::Node4 => 4,
            NodeType::Node16 => 16,
            NodeType::Node48 => 48,
            NodeType::Node256 => 256,
        }
    }
}

/// A path-compressed prefix.
///
/// `len` is the full length of the compressed path; `partial` holds at most
/// [`MAX_PREFIX_LEN`] of its leading bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prefix {
    len: usize,
    partial: SmallVec<[u8; MAX_PREFIX_LEN]>,
}

impl Prefix {
    /// Build a prefix for the given path, keeping only the inline bytes.
    pub fn new(path: &[u8]) -> Self {
        let stored = path.len().min(MAX_PREFIX_LEN);
        Self {
            len: path.len(),
            partial: SmallVec::from_slice(&path[..stored]),
        }
    }

    /// Full length of the compressed path.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the compressed path is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The bytes stored inline.
    pub fn partial(&self) -> &[u8] {
        &self.partial
    }

    /// Whether part of the path lives only in the leaves below.
    pub fn is_truncated(&self) -> bool {
        self.len > MAX_PREFIX_LEN
    }
}

/// A key-value pair stored at the bottom of the tree.
#[derive(Debug, Clone)]
pub struct Leaf<V> {
    pub(crate) key: Vec<u8>,
    pub(crate) value: V,
}

impl<V> Leaf<V> {
    /// The full key.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// The value attached to the key.
    pub fn value(&self) -> &V {
        &self.value
    }
}

/// State shared by every inner node type.
pub struct Header<V> {
    /// Compressed path consumed before the child byte.
    pub(crate) prefix: Prefix,
    /// Number of occupied child slots.
    pub(crate) num_children: u16,
    /// Leaf whose key ends exactly at this node.
    pub(crate) terminal: Child<V>,
}

impl<V> Default for Header<V> {
    fn default() -> Self {
        Self {
            prefix: Prefix::default(),
            num_children: 0,
            terminal: None,
        }
    }
}

impl<V> Header<V> {
    /// The node's compressed path.
    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    /// Number of children (not counting the terminal leaf).
    pub fn num_children(&self) -> usize {
        self.num_children as usize
    }

    /// The leaf whose key ends at this node, if any.
    pub fn terminal(&self) -> Option<&Node<V>> {
        self.terminal.as_deref()
    }
}

/// A node in the Adaptive Radix Tree.
pub enum Node<V> {
    /// A leaf node storing a key-value pair.
    Leaf(Leaf<V>),

    /// A node with up to 4 children.
    Node4 {
        /// Prefix, child count and terminal leaf.
        header: Header<V>,
        /// Child keys, sorted.
        keys: [u8; 4],
        /// Child nodes, parallel to `keys`.
        children: [Child<V>; 4],
    },

    /// A node with 5-16 children.
    Node16 {
        /// Prefix, child count and terminal leaf.
        header: Header<V>,
        /// Child keys, sorted.
        keys: [u8; 16],
        /// Child nodes, parallel to `keys`.
        children: Box<[Child<V>; 16]>,
    },

    /// A node with 17-48 children.
    Node48 {
        /// Prefix, child count and terminal leaf.
        header: Header<V>,
        /// One bit per key byte that has a child.
        present: [u64; 4],
        /// Maps key bytes to positions in `children`. Only meaningful where `present` is set.
        child_index: Box<[u8; 256]>,
        /// Child nodes, filled in insertion order.
        children: Box<[Child<V>; 48]>,
    },

    /// A node with 49-256 children.
    Node256 {
        /// Prefix, child count and terminal leaf.
        header: Header<V>,
        /// Child nodes (direct indexing by byte).
        children: Box<[Child<V>; 256]>,
    },
}

#[inline]
fn is_present(present: &[u64; 4], byte: u8) -> bool {
    present[(byte >> 6) as usize] & (1u64 << (byte & 63)) != 0
}

#[inline]
fn set_present(present: &mut [u64; 4], byte: u8) {
    present[(byte >> 6) as usize] |= 1u64 << (byte & 63);
}

fn empty_children<V, const N: usize>() -> Box<[Child<V>; N]> {
    Box::new(std::array::from_fn(|_| None))
}

/// Insert into a sorted Node4/Node16 layout. The caller guarantees room.
fn insert_sorted<V>(
    header: &mut Header<V>,
    keys: &mut [u8],
    children: &mut [Child<V>],
    byte: u8,
    child: Box<Node<V>>,
) {
    let n = header.num_children as usize;
    let pos = keys[..n].iter().position(|&k| k > byte).unwrap_or(n);
    keys.copy_within(pos..n, pos + 1);
    children[pos..=n].rotate_right(1);
    keys[pos] = byte;
    children[pos] = Some(child);
    header.num_children += 1;
}

impl<V> Node<V> {
    /// Create a new leaf node.
    pub fn new_leaf(key: Vec<u8>, value: V) -> Self {
        Node::Leaf(Leaf { key, value })
    }

    /// Create a new, empty Node4 with the given compressed path.
    pub fn new_node4(prefix: Prefix) -> Self {
        Node::Node4 {
            header: Header {
                prefix,
                ..Header::default()
            },
            keys: [0; 4],
            children: std::array::from_fn(|_| None),
        }
    }

    /// Get the node type.
    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Leaf(_) => NodeType::Leaf,
            Node::Node4 { .. } => NodeType::Node4,
            Node::Node16 { .. } => NodeType::Node16,
            Node::Node48 { .. } => NodeType::Node48,
            Node::Node256 { .. } => NodeType::Node256,
        }
    }

    /// Whether this is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// The leaf payload, if this is a leaf.
    pub fn as_leaf(&self) -> Option<&Leaf<V>> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// The inner-node header, or `None` for leaves.
    pub fn header(&self) -> Option<&Header<V>> {
        match self {
            Node::Leaf(_) => None,
            Node::Node4 { header, .. }
            | Node::Node16 { header, .. }
            | Node::Node48 { header, .. }
            | Node::Node256 { header, .. } => Some(header),
        }
    }

    fn header_mut(&mut self) -> Option<&mut Header<V>> {
        match self {
            Node::Leaf(_) => None,
            Node::Node4 { header, .. }
            | Node::Node16 { header, .. }
            | Node::Node48 { header, .. }
            | Node::Node256 { header, .. } => Some(header),
        }
    }

    /// Get the number of children.
    pub fn num_children(&self) -> usize {
        self.header().map_or(0, Header::num_children)
    }

    /// Replace the compressed path. No-op on leaves.
    pub fn set_prefix(&mut self, prefix: Prefix) {
        if let Some(header) = self.header_mut() {
            header.prefix = prefix;
        }
    }

    fn is_full(&self) -> bool {
        match self.node_type() {
            NodeType::Leaf | NodeType::Node256 => false,
            tier => self.num_children() >= tier.capacity(),
        }
    }

    /// Find the slot holding the child for `byte`.
    pub fn find_child(&self, byte: u8) -> Option<usize> {
        match self {
            Node::Leaf(_) => None,

            Node::Node4 { header, keys, .. } => keys[..header.num_children as usize]
                .iter()
                .position(|&k| k == byte),

            Node::Node16 { header, keys, .. } => {
                let mut mask = 0u32;
                for (i, &k) in keys[..header.num_children as usize].iter().enumerate() {
                    mask |= u32::from(k == byte) << i;
                }
                (mask != 0).then(|| mask.trailing_zeros() as usize)
            }

            Node::Node48 {
                present,
                child_index,
                ..
            } => is_present(present, byte).then(|| child_index[byte as usize] as usize),

            Node::Node256 { children, .. } => {
                children[byte as usize].is_some().then_some(byte as usize)
            }
        }
    }

    fn slot(&self, idx: usize) -> Option<&Node<V>> {
        match self {
            Node::Leaf(_) => None,
            Node::Node4 { children, .. } => children.get(idx)?.as_deref(),
            Node::Node16 { children, .. } => children.get(idx)?.as_deref(),
            Node::Node48 { children, .. } => children.get(idx)?.as_deref(),
            Node::Node256 { children, .. } => children.get(idx)?.as_deref(),
        }
    }

    fn slot_mut(&mut self, idx: usize) -> Option<&mut Child<V>> {
        match self {
            Node::Leaf(_) => None,
            Node::Node4 { children, .. } => children.get_mut(idx),
            Node::Node16 { children, .. } => children.get_mut(idx),
            Node::Node48 { children, .. } => children.get_mut(idx),
            Node::Node256 { children, .. } => children.get_mut(idx),
        }
    }

    /// The child stored under `byte`.
    pub fn child(&self, byte: u8) -> Option<&Node<V>> {
        self.slot(self.find_child(byte)?)
    }

    /// The occupied slot stored under `byte`, for in-place replacement.
    pub(crate) fn child_mut(&mut self, byte: u8) -> Option<&mut Child<V>> {
        let idx = self.find_child(byte)?;
        self.slot_mut(idx)
    }

    /// Children in ascending key-byte order.
    pub fn children(&self) -> Children<'_, V> {
        Children { node: self, pos: 0 }
    }

    /// Add a child under `byte`, growing the node first if it is full.
    ///
    /// An existing child under the same byte is replaced. Returns `true` if the
    /// node was promoted to the next tier.
    ///
    /// # Panics
    ///
    /// Panics when called on a leaf.
    pub fn add_child(&mut self, byte: u8, child: Box<Node<V>>) -> bool {
        if let Some(slot) = self.child_mut(byte) {
            *slot = Some(child);
            return false;
        }

        let grew = self.is_full();
        if grew {
            self.grow();
        }

        match self {
            Node::Leaf(_) => panic!("Cannot add child to leaf"),

            Node::Node4 {
                header,
                keys,
                children,
            } => insert_sorted(header, keys, children, byte, child),

            Node::Node16 {
                header,
                keys,
                children,
            } => insert_sorted(header, keys, &mut children[..], byte, child),

            Node::Node48 {
                header,
                present,
                child_index,
                children,
            } => {
                // Children are never removed, so the next free slot is the count.
                let slot = header.num_children as usize;
                children[slot] = Some(child);
                child_index[byte as usize] = slot as u8;
                set_present(present, byte);
                header.num_children += 1;
            }

            Node::Node256 { header, children } => {
                children[byte as usize] = Some(child);
                header.num_children += 1;
            }
        }

        grew
    }

    /// Attach a child by its next key byte; `None` means the child's key ends here.
    pub(crate) fn attach(&mut self, byte: Option<u8>, child: Box<Node<V>>) -> bool {
        match byte {
            Some(byte) => self.add_child(byte, child),
            None => {
                debug_assert!(child.is_leaf(), "terminal slot only holds leaves");
                if let Some(header) = self.header_mut() {
                    header.terminal = Some(child);
                }
                false
            }
        }
    }

    /// Promote to the next tier, moving prefix, keys and children across.
    fn grow(&mut self) {
        match self {
            Node::Node4 {
                header,
                keys,
                children,
            } => {
                let mut new_keys = [0u8; 16];
                new_keys[..4].copy_from_slice(keys);
                let mut new_children = empty_children::<V, 16>();
                for (dst, src) in new_children.iter_mut().zip(children.iter_mut()) {
                    *dst = src.take();
                }

                *self = Node::Node16 {
                    header: std::mem::take(header),
                    keys: new_keys,
                    children: new_children,
                };
            }

            Node::Node16 {
                header,
                keys,
                children,
            } => {
                let mut present = [0u64; 4];
                let mut child_index = Box::new([0u8; 256]);
                let mut new_children = empty_children::<V, 48>();
                for i in 0..header.num_children as usize {
                    child_index[keys[i] as usize] = i as u8;
                    set_present(&mut present, keys[i]);
                    new_children[i] = children[i].take();
                }

                *self = Node::Node48 {
                    header: std::mem::take(header),
                    present,
                    child_index,
                    children: new_children,
                };
            }

            Node::Node48 {
                header,
                present,
                child_index,
                children,
            } => {
                let mut new_children = empty_children::<V, 256>();
                for byte in 0..=255u8 {
                    if is_present(present, byte) {
                        let slot = child_index[byte as usize] as usize;
                        new_children[byte as usize] = children[slot].take();
                    }
                }

                *self = Node::Node256 {
                    header: std::mem::take(header),
                    children: new_children,
                };
            }

            Node::Leaf(_) | Node::Node256 { .. } => {}
        }
    }

    /// Compare the inline prefix bytes against `key[depth..]`.
    ///
    /// Returns the index of the first mismatch, or the number of inline bytes
    /// if they all match. Bytes beyond the inline bound are not compared.
    pub fn match_prefix(&self, key: &[u8], depth: usize) -> usize {
        let Some(header) = self.header() else {
            return 0;
        };
        let rest = key.get(depth..).unwrap_or_default();
        header
            .prefix
            .partial()
            .iter()
            .zip(rest)
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// Like [`Node::match_prefix`], but continues past the inline bound using
    /// the minimum leaf below this node. Every leaf below shares the full
    /// compressed path, so any of them will do.
    pub fn match_prefix_deep(&self, key: &[u8], depth: usize) -> usize {
        let Some(header) = self.header() else {
            return 0;
        };
        let prefix = &header.prefix;
        let matched = self.match_prefix(key, depth);
        if matched < prefix.partial().len() || !prefix.is_truncated() {
            return matched;
        }

        let Some(leaf) = self.minimum_leaf() else {
            return matched;
        };
        (matched..prefix.len())
            .find(|&i| key.get(depth + i) != leaf.key.get(depth + i))
            .unwrap_or(prefix.len())
    }

    /// Materialize the full compressed path of a node reached at `depth`.
    pub(crate) fn full_prefix(&self, depth: usize) -> Vec<u8> {
        let Some(header) = self.header() else {
            return Vec::new();
        };
        let prefix = &header.prefix;
        if !prefix.is_truncated() {
            return prefix.partial().to_vec();
        }
        self.minimum_leaf()
            .and_then(|leaf| leaf.key.get(depth..depth + prefix.len()))
            .map(<[u8]>::to_vec)
            .unwrap_or_else(|| prefix.partial().to_vec())
    }

    /// Descend through the terminal slot or the lowest child until a leaf is reached.
    pub fn minimum_leaf(&self) -> Option<&Leaf<V>> {
        let mut node = self;
        loop {
            if let Node::Leaf(leaf) = node {
                return Some(leaf);
            }
            let header = node.header()?;
            node = match header.terminal.as_deref() {
                Some(terminal) => terminal,
                None => node.children().next()?.1,
            };
        }
    }
}

/// Iterator over the children of a node in key-byte order.
pub struct Children<'a, V> {
    node: &'a Node<V>,
    pos: usize,
}

fn next_sorted<'a, V>(
    keys: &[u8],
    children: &'a [Child<V>],
    len: u16,
    pos: &mut usize,
) -> Option<(u8, &'a Node<V>)> {
    while *pos < len as usize {
        let i = *pos;
        *pos += 1;
        if let Some(child) = children[i].as_deref() {
            return Some((keys[i], child));
        }
    }
    None
}

impl<'a, V> Iterator for Children<'a, V> {
    type Item = (u8, &'a Node<V>);

    fn next(&mut self) -> Option<Self::Item> {
        let node: &'a Node<V> = self.node;
        match node {
            Node::Leaf(_) => None,

            Node::Node4 {
                header,
                keys,
                children,
            } => next_sorted(keys, children, header.num_children, &mut self.pos),

            Node::Node16 {
                header,
                keys,
                children,
            } => next_sorted(keys, &children[..], header.num_children, &mut self.pos),

            Node::Node48 {
                present,
                child_index,
                children,
                ..
            } => {
                while self.pos < 256 {
                    let byte = self.pos as u8;
                    self.pos += 1;
                    if !is_present(present, byte) {
                        continue;
                    }
                    if let Some(child) = children[child_index[byte as usize] as usize].as_deref() {
                        return Some((byte, child));
                    }
                }
                None
            }

            Node::Node256 { children, .. } => {
                while self.pos < 256 {
                    let byte = self.pos as u8;
                    self.pos += 1;
                    if let Some(child) = children[byte as usize].as_deref() {
                        return Some((byte, child));
                    }
                }
                None
            }
        }
    }
}

impl<V> std::fmt::Debug for Node<V>
where
    V: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Leaf(leaf) => f
                .debug_struct("Leaf")
                .field("key", &String::from_utf8_lossy(&leaf.key))
                .field("value", &leaf.value)
                .finish(),
            _ => {
                let Some(header) = self.header() else {
                    return Ok(());
                };
                f.debug_struct(match self.node_type() {
                    NodeType::Node4 => "Node4",
                    NodeType::Node16 => "Node16",
                    NodeType::Node48 => "Node48",
                    _ => "Node256",
                })
                .field("prefix", &String::from_utf8_lossy(header.prefix.partial()))
                .field("prefix_len", &header.prefix.len())
                .field("num_children", &header.num_children)
                .field(
                    "keys",
                    &self.children().map(|(k, _)| k as char).collect::<Vec<_>>(),
                )
                .field("terminal", &header.terminal.is_some())
                .finish()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(key: &[u8]) -> Box<Node<u32>> {
        Box::new(Node::new_leaf(key.to_vec(), 0))
    }

    #[test]
    fn test_grows_through_every_tier() {
        let mut node: Node<u32> = Node::new_node4(Prefix::default());
        // Scrambled order so sorted insertion is exercised.
        let bytes: Vec<u8> = (0..=255u8).map(|i| i.wrapping_mul(167)).collect();

        for (i, &b) in bytes.iter().enumerate() {
            let grew = node.add_child(b, leaf(&[b]));
            let expected_grow = matches!(i, 4 | 16 | 48);
            assert_eq!(grew, expected_grow, "unexpected growth at child {}", i);

            let expected = match i + 1 {
                0..=4 => NodeType::Node4,
                5..=16 => NodeType::Node16,
                17..=48 => NodeType::Node48,
                _ => NodeType::Node256,
            };
            assert_eq!(node.node_type(), expected);
            assert_eq!(node.num_children(), i + 1);

            for &seen in &bytes[..=i] {
                let child = node.child(seen).expect("child must be reachable after growth");
                assert_eq!(child.as_leaf().map(Leaf::key), Some(&[seen][..]));
            }
        }

        let order: Vec<u8> = node.children().map(|(k, _)| k).collect();
        assert_eq!(order, (0..=255u8).collect::<Vec<_>>());
    }

    #[test]
    fn test_children_sorted_in_small_tiers() {
        let mut node: Node<u32> = Node::new_node4(Prefix::default());
        for b in [b'd', b'a', b'c', b'b', b'z', b'e'] {
            node.add_child(b, leaf(&[b]));
        }
        assert_eq!(node.node_type(), NodeType::Node16);
        let order: Vec<u8> = node.children().map(|(k, _)| k).collect();
        assert_eq!(order, b"abcdez".to_vec());
        assert_eq!(node.find_child(b'a'), Some(0));
        assert_eq!(node.find_child(b'z'), Some(5));
        assert_eq!(node.find_child(b'y'), None);
    }

    #[test]
    fn test_add_existing_byte_replaces() {
        let mut node: Node<u32> = Node::new_node4(Prefix::default());
        for b in b"abcd" {
            node.add_child(*b, leaf(&[*b]));
        }
        assert!(!node.add_child(b'a', Box::new(Node::new_leaf(b"a".to_vec(), 7))));
        assert_eq!(node.node_type(), NodeType::Node4);
        assert_eq!(node.num_children(), 4);
        assert_eq!(node.child(b'a').and_then(Node::as_leaf).map(|l| l.value), Some(7));
    }

    #[test]
    fn test_prefix_keeps_inline_bound() {
        let path = b"0123456789abcdef";
        let prefix = Prefix::new(path);
        assert_eq!(prefix.len(), 16);
        assert_eq!(prefix.partial(), b"0123456789");
        assert!(prefix.is_truncated());

        let short = Prefix::new(b"abc");
        assert_eq!(short.partial(), b"abc");
        assert!(!short.is_truncated());
    }

    #[test]
    fn test_match_prefix_shallow_and_deep() {
        let shared = b"0123456789abcdef";
        let mut node: Node<u32> = Node::new_node4(Prefix::new(shared));
        let mut k1 = shared.to_vec();
        k1.push(b'x');
        let mut k2 = shared.to_vec();
        k2.push(b'y');
        node.add_child(b'x', Box::new(Node::new_leaf(k1, 1)));
        node.add_child(b'y', Box::new(Node::new_leaf(k2, 2)));

        // Diverges inside the inline bytes.
        assert_eq!(node.match_prefix(b"012X", 0), 3);
        assert_eq!(node.match_prefix_deep(b"012X", 0), 3);

        // Diverges past the inline bound: only the deep match sees it.
        let probe = b"0123456789abXdefz";
        assert_eq!(node.match_prefix(probe, 0), MAX_PREFIX_LEN);
        assert_eq!(node.match_prefix_deep(probe, 0), 12);

        // Full match.
        assert_eq!(node.match_prefix_deep(b"0123456789abcdefq", 0), 16);
        assert_eq!(node.full_prefix(0), shared.to_vec());
    }

    #[test]
    fn test_match_prefix_at_depth() {
        let node: Node<u32> = Node::new_node4(Prefix::new(b"cd"));
        assert_eq!(node.match_prefix(b"abcdef", 2), 2);
        assert_eq!(node.match_prefix(b"abcx", 2), 1);
        // Key ends inside the prefix.
        assert_eq!(node.match_prefix(b"abc", 2), 1);
    }

    #[test]
    fn test_minimum_leaf_prefers_terminal() {
        let mut node: Node<u32> = Node::new_node4(Prefix::new(b"ab"));
        node.add_child(b'c', Box::new(Node::new_leaf(b"abc".to_vec(), 1)));
        assert_eq!(node.minimum_leaf().map(Leaf::key), Some(&b"abc"[..]));

        node.attach(None, Box::new(Node::new_leaf(b"ab".to_vec(), 2)));
        assert_eq!(node.minimum_leaf().map(Leaf::key), Some(&b"ab"[..]));
        assert_eq!(node.num_children(), 1);
    }
}
