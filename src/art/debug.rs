//! Debug utilities for ART troubleshooting.

use std::fmt::Write;

use super::{Header, Node, NodeType, RadixTree, TreeStats, MAX_PREFIX_LEN};

impl<V> RadixTree<V> {
    /// Render the tree structure, one node per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        match self.root.as_deref() {
            Some(root) => Self::dump_node(root, 0, &mut out),
            None => out.push_str("(empty)\n"),
        }
        out
    }

    fn dump_node(node: &Node<V>, indent: usize, out: &mut String) {
        let pad = "  ".repeat(indent);
        let Some(header) = node.header() else {
            if let Node::Leaf(leaf) = node {
                let _ = writeln!(out, "{}Leaf {:?}", pad, String::from_utf8_lossy(&leaf.key));
            }
            return;
        };

        let _ = writeln!(
            out,
            "{}{:?} (prefix={:?}, prefix_len={}, children={})",
            pad,
            node.node_type(),
            String::from_utf8_lossy(header.prefix.partial()),
            header.prefix.len(),
            header.num_children,
        );
        if let Some(terminal) = header.terminal() {
            let _ = writeln!(out, "{}  [$] ->", pad);
            Self::dump_node(terminal, indent + 2, out);
        }
        for (byte, child) in node.children() {
            let _ = writeln!(out, "{}  [{}] ->", pad, byte as char);
            Self::dump_node(child, indent + 2, out);
        }
    }

    /// Verify tree integrity - returns list of issues found.
    pub fn verify_integrity(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let mut counted = TreeStats::default();
        if let Some(root) = self.root.as_deref() {
            Self::verify_node(root, 0, &mut counted, &mut issues);
        }

        if counted.leaf_count != self.size {
            issues.push(format!(
                "{} reachable leaves but len()={}",
                counted.leaf_count, self.size
            ));
        }
        if counted != self.stats {
            issues.push(format!(
                "tracked stats {:?} differ from walked stats {:?}",
                self.stats, counted
            ));
        }
        issues
    }

    fn verify_node(
        node: &Node<V>,
        depth: usize,
        counted: &mut TreeStats,
        issues: &mut Vec<String>,
    ) {
        let Some(header) = node.header() else {
            counted.leaf_count += 1;
            return;
        };

        let tier = node.node_type();
        match tier {
            NodeType::Node4 => counted.node4_count += 1,
            NodeType::Node16 => counted.node16_count += 1,
            NodeType::Node48 => counted.node48_count += 1,
            NodeType::Node256 => counted.node256_count += 1,
            NodeType::Leaf => {}
        }

        Self::verify_header(tier, header, issues);
        Self::verify_slots(node, issues);

        let depth = depth + header.prefix.len();
        if let Some(terminal) = header.terminal() {
            match terminal.as_leaf() {
                Some(leaf) if leaf.key.len() != depth => issues.push(format!(
                    "terminal leaf {:?} has length {} at depth {}",
                    String::from_utf8_lossy(&leaf.key),
                    leaf.key.len(),
                    depth
                )),
                Some(_) => {}
                None => issues.push(format!("{:?} terminal slot holds an inner node", tier)),
            }
            counted.leaf_count += 1;
        }

        for (byte, child) in node.children() {
            // Every key below must carry this edge byte at `depth`.
            if let Some(leaf) = child.minimum_leaf() {
                if leaf.key.get(depth) != Some(&byte) {
                    issues.push(format!(
                        "leaf {:?} reached through byte {} at depth {}",
                        String::from_utf8_lossy(&leaf.key),
                        byte,
                        depth
                    ));
                }
            }
            Self::verify_node(child, depth + 1, counted, issues);
        }
    }

    fn verify_header(tier: NodeType, header: &Header<V>, issues: &mut Vec<String>) {
        let n = header.num_children();
        if n > tier.capacity() {
            issues.push(format!("{:?} has {} children (max {})", tier, n, tier.capacity()));
        }

        // Nodes only grow when the previous tier is full.
        let floor = match tier {
            NodeType::Node16 => 5,
            NodeType::Node48 => 17,
            NodeType::Node256 => 49,
            _ => 0,
        };
        if n < floor {
            issues.push(format!("{:?} has only {} children", tier, n));
        }

        let occupants = n + usize::from(header.terminal.is_some());
        if occupants < 2 {
            issues.push(format!("{:?} branches to {} entries", tier, occupants));
        }

        let stored = header.prefix.partial().len();
        if stored != header.prefix.len().min(MAX_PREFIX_LEN) {
            issues.push(format!(
                "prefix stores {} bytes for a path of {}",
                stored,
                header.prefix.len()
            ));
        }
    }

    fn verify_slots(node: &Node<V>, issues: &mut Vec<String>) {
        match node {
            Node::Node4 {
                header,
                keys,
                children,
            } => {
                Self::verify_sorted("Node4", header, keys, &children[..], issues)
            }
            Node::Node16 {
                header,
                keys,
                children,
            } => {
                Self::verify_sorted("Node16", header, keys, &children[..], issues)
            }
            Node::Node48 {
                header,
                present,
                child_index,
                children,
            } => {
                let n = header.num_children();
                let marked: u32 = present.iter().map(|w| w.count_ones()).sum();
                if marked as usize != n {
                    issues.push(format!(
                        "Node48 has {} present bits but num_children={}",
                        marked, n
                    ));
                }
                for byte in 0..=255u8 {
                    if present[(byte >> 6) as usize] & (1u64 << (byte & 63)) == 0 {
                        continue;
                    }
                    let idx = child_index[byte as usize] as usize;
                    if idx >= n || children[idx].is_none() {
                        issues.push(format!("Node48 byte {} points at empty slot {}", byte, idx));
                    }
                }
            }
            Node::Node256 { header, children } => {
                let actual = children.iter().filter(|c| c.is_some()).count();
                if actual != header.num_children() {
                    issues.push(format!(
                        "Node256 has {} Some children but num_children={}",
                        actual,
                        header.num_children()
                    ));
                }
            }
            Node::Leaf(_) => {}
        }
    }

    fn verify_sorted(
        name: &str,
        header: &Header<V>,
        keys: &[u8],
        children: &[Option<Box<Node<V>>>],
        issues: &mut Vec<String>,
    ) {
        let n = header.num_children().min(keys.len());
        if keys[..n].windows(2).any(|w| w[0] >= w[1]) {
            issues.push(format!("{} keys not strictly ascending: {:?}", name, &keys[..n]));
        }
        if children[..n].iter().any(Option::is_none) {
            issues.push(format!("{} has an empty slot below num_children={}", name, n));
        }
        if children[n..].iter().any(Option::is_some) {
            issues.push(format!("{} has a child past num_children={}", name, n));
        }
    }
}
