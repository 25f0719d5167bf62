//! Fibonacci heap over an index arena.
//!
//! Nodes are stored in a `Vec` and linked by position: every node knows its
//! parent, one of its children, and its left/right neighbours in a circular
//! sibling list. The roots form one such circular list and `min` points at the
//! smallest of them.
//!
//! `insert` is O(1): the new singleton tree is spliced next to `min`.
//! `extract_min` moves the minimum's children to the root list, unlinks the
//! minimum and consolidates roots of equal degree, which gives amortized
//! O(log n). `decrease_key` cuts a node out to the root list and
//! cascades cuts up through marked ancestors.
//!
//! Extracted nodes keep their arena slot (their payload is moved out), so
//! handles stay stable for the lifetime of the heap. A heap is meant to be
//! short-lived: the dispatch pipeline builds one per request.

use smallvec::{SmallVec, smallvec};

/// Golden ratio; bounds the largest root degree at `log_φ(n)`.
const PHI: f64 = 1.618_033_988_749_895;

/// Stable reference to an inserted entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeapHandle(usize);

#[derive(Debug, Clone)]
struct HeapNode<K, V> {
    key: K,
    /// Taken on extraction.
    value: Option<V>,
    parent: Option<usize>,
    child: Option<usize>,
    left: usize,
    right: usize,
    degree: usize,
    /// Lost a child since it last became a child itself.
    marked: bool,
}

/// Min-ordered Fibonacci heap.
///
/// ```rust
/// use geostream::index::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// heap.insert(7.07, "Driver_Beta");
/// heap.insert(2.83, "Driver_Alpha");
///
/// assert_eq!(heap.extract_min(), Some((2.83, "Driver_Alpha")));
/// assert_eq!(heap.extract_min(), Some((7.07, "Driver_Beta")));
/// assert_eq!(heap.extract_min(), None);
/// ```
#[derive(Debug, Clone)]
pub struct FibonacciHeap<K, V> {
    nodes: Vec<HeapNode<K, V>>,
    min: Option<usize>,
    len: usize,
}

impl<K: PartialOrd + Copy, V> FibonacciHeap<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            min: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, key: K, value: V) -> HeapHandle {
        let idx = self.nodes.len();
        self.nodes.push(HeapNode {
            key,
            value: Some(value),
            parent: None,
            child: None,
            left: idx,
            right: idx,
            degree: 0,
            marked: false,
        });

        self.add_root(idx);
        self.len += 1;
        HeapHandle(idx)
    }

    pub fn peek_min(&self) -> Option<(&K, &V)> {
        let node = &self.nodes[self.min?];
        node.value.as_ref().map(|value| (&node.key, value))
    }

    /// Remove and return the entry with the smallest key, `None` when empty.
    pub fn extract_min(&mut self) -> Option<(K, V)> {
        let z = self.min?;

        if let Some(first_child) = self.nodes[z].child.take() {
            for child in self.ring(first_child) {
                self.nodes[child].parent = None;
                self.splice_right(z, child);
            }
            self.nodes[z].degree = 0;
        }

        let next = self.nodes[z].right;
        if next == z {
            self.min = None;
        } else {
            self.unlink(z);
            self.min = Some(next);
            self.consolidate();
        }
        self.len -= 1;

        let node = &mut self.nodes[z];
        node.value.take().map(|value| (node.key, value))
    }

    /// Lower the key of a live entry.
    ///
    /// Returns `false` and leaves the heap untouched if the entry was already
    /// extracted or `key` is greater than its current key.
    pub fn decrease_key(&mut self, handle: HeapHandle, key: K) -> bool {
        let x = handle.0;
        match self.nodes.get(x) {
            Some(node) if node.value.is_some() && key <= node.key => {}
            _ => return false,
        }

        self.nodes[x].key = key;
        if let Some(parent) = self.nodes[x].parent
            && key < self.nodes[parent].key
        {
            self.cut(x, parent);
            self.cascading_cut(parent);
        }
        if let Some(min) = self.min
            && key < self.nodes[min].key
        {
            self.min = Some(x);
        }
        true
    }

    fn add_root(&mut self, idx: usize) {
        match self.min {
            None => {
                self.nodes[idx].left = idx;
                self.nodes[idx].right = idx;
                self.min = Some(idx);
            }
            Some(min) => {
                self.splice_right(min, idx);
                if self.nodes[idx].key < self.nodes[min].key {
                    self.min = Some(idx);
                }
            }
        }
    }

    /// Merge roots of equal degree until every root degree is distinct, then
    /// pick the new minimum among the survivors.
    fn consolidate(&mut self) {
        let Some(start) = self.min else {
            return;
        };

        let bound = ((self.len.max(1) as f64).ln() / PHI.ln()) as usize + 2;
        let mut by_degree: SmallVec<[Option<usize>; 32]> = smallvec![None; bound];

        for root in self.ring(start) {
            let mut x = root;
            let mut degree = self.nodes[x].degree;
            while let Some(&Some(y)) = by_degree.get(degree) {
                let (parent, child) = if self.nodes[y].key < self.nodes[x].key {
                    (y, x)
                } else {
                    (x, y)
                };
                self.link(child, parent);
                by_degree[degree] = None;
                x = parent;
                degree += 1;
            }
            if degree >= by_degree.len() {
                by_degree.resize(degree + 1, None);
            }
            by_degree[degree] = Some(x);
        }

        self.min = by_degree.iter().flatten().copied().reduce(|best, candidate| {
            if self.nodes[candidate].key < self.nodes[best].key {
                candidate
            } else {
                best
            }
        });
    }

    /// Make root `child` a child of root `parent`.
    fn link(&mut self, child: usize, parent: usize) {
        self.unlink(child);
        self.nodes[child].parent = Some(parent);
        match self.nodes[parent].child {
            None => self.nodes[parent].child = Some(child),
            Some(first) => self.splice_right(first, child),
        }
        self.nodes[parent].degree += 1;
        self.nodes[child].marked = false;
    }

    /// Move `x` from the child list of `parent` to the root list.
    fn cut(&mut self, x: usize, parent: usize) {
        if self.nodes[parent].child == Some(x) {
            let next = self.nodes[x].right;
            self.nodes[parent].child = (next != x).then_some(next);
        }
        self.unlink(x);
        self.nodes[parent].degree -= 1;
        self.nodes[x].parent = None;
        self.nodes[x].marked = false;
        self.add_root(x);
    }

    fn cascading_cut(&mut self, mut y: usize) {
        while let Some(parent) = self.nodes[y].parent {
            if !self.nodes[y].marked {
                self.nodes[y].marked = true;
                return;
            }
            self.cut(y, parent);
            y = parent;
        }
    }

    /// Insert `idx` immediately to the right of `anchor` in anchor's ring.
    fn splice_right(&mut self, anchor: usize, idx: usize) {
        let right = self.nodes[anchor].right;
        self.nodes[idx].left = anchor;
        self.nodes[idx].right = right;
        self.nodes[right].left = idx;
        self.nodes[anchor].right = idx;
    }

    /// Detach `idx` from its ring, leaving it as a singleton ring.
    fn unlink(&mut self, idx: usize) {
        let (left, right) = (self.nodes[idx].left, self.nodes[idx].right);
        self.nodes[left].right = right;
        self.nodes[right].left = left;
        self.nodes[idx].left = idx;
        self.nodes[idx].right = idx;
    }

    /// Snapshot of the ring containing `start`, beginning at `start`.
    fn ring(&self, start: usize) -> SmallVec<[usize; 16]> {
        let mut members = smallvec![start];
        let mut current = self.nodes[start].right;
        while current != start {
            members.push(current);
            current = self.nodes[current].right;
        }
        members
    }
}

impl<K: PartialOrd + Copy, V> Default for FibonacciHeap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(n: usize) -> Vec<f64> {
        (0..n).map(|i| ((i * 7919) % 1000) as f64 / 10.0).collect()
    }

    /// Heap order, parent links, degrees and ring symmetry for every live node.
    fn assert_well_formed<V>(heap: &FibonacciHeap<f64, V>) {
        let mut live = 0;
        for (idx, node) in heap.nodes.iter().enumerate() {
            if node.value.is_none() {
                continue;
            }
            live += 1;
            assert_eq!(heap.nodes[node.right].left, idx);
            assert_eq!(heap.nodes[node.left].right, idx);
            if let Some(parent) = node.parent {
                assert!(node.key >= heap.nodes[parent].key, "heap order at {idx}");
            }
            let children = node.child.map(|c| heap.ring(c)).unwrap_or_default();
            assert_eq!(children.len(), node.degree, "degree at {idx}");
            for child in children {
                assert_eq!(heap.nodes[child].parent, Some(idx));
            }
        }
        assert_eq!(live, heap.len());
        if let Some(min) = heap.min {
            assert!(heap.ring(min).iter().all(|&r| heap.nodes[r].parent.is_none()));
        }
    }

    #[test]
    fn test_empty_heap() {
        let mut heap: FibonacciHeap<f64, &str> = FibonacciHeap::new();
        assert!(heap.is_empty());
        assert!(heap.peek_min().is_none());
        assert!(heap.extract_min().is_none());
    }

    #[test]
    fn test_extracts_in_non_decreasing_order() {
        let keys = keys(500);
        let mut heap = FibonacciHeap::new();
        for (i, key) in keys.iter().enumerate() {
            heap.insert(*key, i);
        }
        assert_eq!(heap.len(), 500);

        let mut extracted = Vec::new();
        while let Some((key, payload)) = heap.extract_min() {
            extracted.push((key, payload));
            assert_well_formed(&heap);
        }

        assert!(extracted.windows(2).all(|w| w[0].0 <= w[1].0));
        let mut payloads: Vec<usize> = extracted.iter().map(|(_, p)| *p).collect();
        payloads.sort();
        assert_eq!(payloads, (0..500).collect::<Vec<_>>());
        for (key, payload) in extracted {
            assert_eq!(key, keys[payload]);
        }
    }

    #[test]
    fn test_interleaved_operations_match_sorted_reference() {
        let mut heap = FibonacciHeap::new();
        let mut reference: Vec<f64> = Vec::new();

        for (round, key) in keys(300).into_iter().enumerate() {
            heap.insert(key, round);
            reference.push(key);
            if round % 3 == 2 {
                reference.sort_by(|a, b| a.partial_cmp(b).unwrap());
                let expected = reference.remove(0);
                assert_eq!(heap.extract_min().map(|(k, _)| k), Some(expected));
            }
        }
        assert_well_formed(&heap);
        assert_eq!(heap.len(), reference.len());
    }

    #[test]
    fn test_duplicate_keys() {
        let mut heap = FibonacciHeap::new();
        for name in ["a", "b", "c", "d"] {
            heap.insert(1.0, name);
        }
        let mut names: Vec<&str> = std::iter::from_fn(|| heap.extract_min().map(|(_, n)| n)).collect();
        names.sort();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_peek_min_tracks_inserts() {
        let mut heap = FibonacciHeap::new();
        heap.insert(5.0, "far");
        assert_eq!(heap.peek_min(), Some((&5.0, &"far")));
        heap.insert(2.0, "near");
        assert_eq!(heap.peek_min(), Some((&2.0, &"near")));
        heap.insert(3.0, "middle");
        assert_eq!(heap.peek_min(), Some((&2.0, &"near")));
    }

    #[test]
    fn test_consolidation_builds_trees() {
        let mut heap = FibonacciHeap::new();
        for i in 0..9 {
            heap.insert(i as f64, i);
        }
        heap.extract_min();

        // Eight remaining nodes consolidate into a single tree of degree 3.
        let min = heap.min.unwrap();
        assert_eq!(heap.ring(min).len(), 1);
        assert_eq!(heap.nodes[min].degree, 3);
        assert_well_formed(&heap);
    }

    #[test]
    fn test_decrease_key_moves_to_front() {
        let mut heap = FibonacciHeap::new();
        let handles: Vec<HeapHandle> = (0..16).map(|i| heap.insert(i as f64 + 10.0, i)).collect();
        heap.extract_min();

        assert!(heap.decrease_key(handles[15], 1.0));
        assert_well_formed(&heap);
        assert_eq!(heap.extract_min(), Some((1.0, 15)));

        assert!(heap.decrease_key(handles[14], 2.0));
        assert!(heap.decrease_key(handles[13], 3.0));
        assert!(heap.decrease_key(handles[12], 4.0));
        assert_well_formed(&heap);

        let order: Vec<usize> = std::iter::from_fn(|| heap.extract_min().map(|(_, v)| v)).collect();
        assert_eq!(order, vec![14, 13, 12, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn test_decrease_key_rejections() {
        let mut heap = FibonacciHeap::new();
        let a = heap.insert(1.0, "a");
        let b = heap.insert(2.0, "b");

        assert!(!heap.decrease_key(b, 5.0));
        assert_eq!(heap.extract_min(), Some((1.0, "a")));
        assert!(!heap.decrease_key(a, 0.0));
        assert!(heap.decrease_key(b, 2.0));
        assert_eq!(heap.len(), 1);
    }
}
