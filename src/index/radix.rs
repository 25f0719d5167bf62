//! Compressed prefix tree (radix tree) for destination names.
//!
//! Each edge carries a whole string fragment instead of a single character.
//! Children are keyed by the first character of their label, so at most one
//! edge is a candidate at every step. Inserting a key that diverges halfway
//! along an edge splits that edge at the divergence point.

use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;

#[derive(Debug, Clone, Default)]
struct PrefixNode {
    /// Edge label leading into this node; empty only for the root.
    label: String,
    /// A complete key ends here.
    terminal: bool,
    children: FxHashMap<char, PrefixNode>,
}

impl PrefixNode {
    fn leaf(label: &str) -> Self {
        Self {
            label: label.to_string(),
            terminal: true,
            children: FxHashMap::default(),
        }
    }

    /// Cut this node's label after `at` bytes, pushing the tail (with the
    /// node's flag and children) down into a new single child.
    fn split_at(&mut self, at: usize) {
        let tail = PrefixNode {
            label: self.label.split_off(at),
            terminal: self.terminal,
            children: std::mem::take(&mut self.children),
        };
        self.terminal = false;
        if let Some(first) = tail.label.chars().next() {
            self.children.insert(first, tail);
        }
    }

    fn collect(&self, path: &mut String, out: &mut Vec<String>) {
        if self.terminal {
            out.push(path.clone());
        }
        for child in self.children.values() {
            let mark = path.len();
            path.push_str(&child.label);
            child.collect(path, out);
            path.truncate(mark);
        }
    }

    fn count(&self) -> usize {
        1 + self.children.values().map(PrefixNode::count).sum::<usize>()
    }
}

/// Exact string-set membership with shared-prefix path compression.
///
/// ```rust
/// use geostream::index::CompressedPrefixIndex;
///
/// let mut index = CompressedPrefixIndex::new();
/// index.insert("North Street");
/// index.insert("North Avenue");
///
/// assert!(index.search("North Avenue"));
/// assert!(!index.search("North"));
/// assert_eq!(index.complete("North S"), vec!["North Street".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CompressedPrefixIndex {
    root: PrefixNode,
    len: usize,
}

impl CompressedPrefixIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `key` as a complete entry. Returns `false` if it was already present.
    pub fn insert(&mut self, key: &str) -> bool {
        let mut node = &mut self.root;
        let mut rest = key;

        let added = loop {
            let Some(first) = rest.chars().next() else {
                let added = !node.terminal;
                node.terminal = true;
                break added;
            };

            let child = match node.children.entry(first) {
                Entry::Vacant(slot) => {
                    slot.insert(PrefixNode::leaf(rest));
                    break true;
                }
                Entry::Occupied(slot) => slot.into_mut(),
            };

            let common = common_prefix_len(rest, &child.label);
            if common == child.label.len() {
                rest = &rest[common..];
                node = child;
                continue;
            }

            // Diverged inside the edge: `child` keeps the shared part.
            child.split_at(common);
            let remainder = &rest[common..];
            match remainder.chars().next() {
                None => child.terminal = true,
                Some(next) => {
                    child.children.insert(next, PrefixNode::leaf(remainder));
                }
            }
            break true;
        };

        if added {
            self.len += 1;
        }
        added
    }

    /// True iff `key` was inserted as a complete entry.
    pub fn search(&self, key: &str) -> bool {
        let mut node = &self.root;
        let mut rest = key;

        while let Some(first) = rest.chars().next() {
            let Some(child) = node.children.get(&first) else {
                return false;
            };
            let Some(remainder) = rest.strip_prefix(child.label.as_str()) else {
                return false;
            };
            rest = remainder;
            node = child;
        }

        node.terminal
    }

    /// True if at least one entry starts with `prefix`.
    pub fn contains_prefix(&self, prefix: &str) -> bool {
        if prefix.is_empty() {
            return !self.is_empty();
        }
        self.descend(prefix).is_some()
    }

    /// Every entry starting with `prefix`, sorted.
    pub fn complete(&self, prefix: &str) -> Vec<String> {
        let mut out = Vec::new();
        if let Some((node, mut path)) = self.descend(prefix) {
            node.collect(&mut path, &mut out);
        }
        out.sort();
        out
    }

    /// Number of complete entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Nodes in the tree, root included.
    pub fn node_count(&self) -> usize {
        self.root.count()
    }

    /// Walk `prefix` down the tree, allowing it to end partway along an edge.
    /// Returns the node below the last touched edge and the string it spells.
    fn descend(&self, prefix: &str) -> Option<(&PrefixNode, String)> {
        let mut node = &self.root;
        let mut rest = prefix;
        let mut path = String::new();

        while let Some(first) = rest.chars().next() {
            let child = node.children.get(&first)?;
            path.push_str(&child.label);
            node = child;
            match rest.strip_prefix(child.label.as_str()) {
                Some(remainder) => rest = remainder,
                None if child.label.starts_with(rest) => break,
                None => return None,
            }
        }

        Some((node, path))
    }
}

/// Length in bytes of the longest common prefix, on `char` boundaries.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| a.len().min(b.len()))
}
