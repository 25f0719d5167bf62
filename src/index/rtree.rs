//! Point R-tree used to pre-filter dispatch candidates by location.
//!
//! Nodes live in an arena and refer to each other through [`NodeId`]
//! handles. A node is either a leaf holding `(point, payload)` entries or an
//! internal node holding `(bounding box, child)` routing entries.
//!
//! ## Maintained invariants
//!
//! - every node caches the exact union of its entries' (or children's) extents
//! - every routing entry's box equals the cached box of the child it points to
//! - no node holds more than `max_entries` entries
//! - all leaves sit at the same depth
//!
//! Insertion descends into the child needing the least area enlargement
//! (ties: smaller area, then earlier child), then walks back up the same
//! path refreshing boxes. An overflowing node splits at the midpoint of its
//! entry list and the new sibling is promoted into the parent; when the root
//! splits, a new root is grown above both halves.
//!
//! Queries are axis-aligned: [`SpatialIndex::search`] reports points inside
//! the square `[x - r, x + r] × [y - r, y + r]`, edges included.

use crate::config::BoundingBox2D;
use geo::Point;
use smallvec::{SmallVec, smallvec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind<T> {
    Leaf { entries: Vec<(Point, T)> },
    Internal { children: Vec<(BoundingBox2D, NodeId)> },
}

#[derive(Debug, Clone)]
struct SpatialNode<T> {
    /// `None` only for the empty root leaf.
    bbox: Option<BoundingBox2D>,
    kind: NodeKind<T>,
}

/// Result of inserting below a node: the node's refreshed box and, if it
/// overflowed, the box and handle of the sibling split off from it.
struct Insertion {
    bbox: Option<BoundingBox2D>,
    split: Option<(BoundingBox2D, NodeId)>,
}

/// 2D bounding-box tree over points with an attached payload.
///
/// ```rust
/// use geostream::index::SpatialIndex;
/// use geo::Point;
///
/// let mut index = SpatialIndex::new(4);
/// index.insert(Point::new(2.0, 2.0), "Driver_Alpha");
/// index.insert(Point::new(5.0, 5.0), "Driver_Beta");
/// index.insert(Point::new(40.0, 40.0), "Driver_Gamma");
///
/// let nearby = index.search(0.0, 0.0, 10.0);
/// assert_eq!(nearby.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SpatialIndex<T> {
    nodes: Vec<SpatialNode<T>>,
    root: NodeId,
    max_entries: usize,
    len: usize,
}

impl<T> SpatialIndex<T> {
    /// Create an empty index whose nodes hold at most `max_entries` entries.
    ///
    /// # Panics
    ///
    /// Panics if `max_entries` is less than 2.
    pub fn new(max_entries: usize) -> Self {
        assert!(max_entries >= 2, "max_entries must be at least 2");
        Self {
            nodes: vec![SpatialNode {
                bbox: None,
                kind: NodeKind::Leaf {
                    entries: Vec::new(),
                },
            }],
            root: NodeId(0),
            max_entries,
            len: 0,
        }
    }

    /// Index `payload` at `point`, splitting overflowing nodes on the way back up.
    pub fn insert(&mut self, point: Point, payload: T) {
        let Insertion { bbox, split } = self.insert_into(self.root, point, payload);

        if let (Some(root_box), Some((sibling_box, sibling))) = (bbox, split) {
            let old_root = self.root;
            self.root = self.push(SpatialNode {
                bbox: Some(root_box.union(&sibling_box)),
                kind: NodeKind::Internal {
                    children: vec![(root_box, old_root), (sibling_box, sibling)],
                },
            });
            log::trace!("Spatial index root split, height now {}", self.height());
        }

        self.len += 1;
    }

    /// Every entry whose point lies inside `query`, in no particular order.
    pub fn search_bbox(&self, query: &BoundingBox2D) -> Vec<(&Point, &T)> {
        let mut found = Vec::new();

        if ![query.min_x(), query.min_y(), query.max_x(), query.max_y()]
            .iter()
            .all(|v| v.is_finite())
        {
            log::warn!("Rejecting bounding box query with non-finite coordinates");
            return found;
        }

        match self.nodes[self.root.0].bbox {
            Some(root_box) if root_box.intersects(query) => {}
            _ => return found,
        }

        let mut stack: SmallVec<[NodeId; 32]> = smallvec![self.root];
        while let Some(id) = stack.pop() {
            match &self.nodes[id.0].kind {
                NodeKind::Leaf { entries } => found.extend(
                    entries
                        .iter()
                        .filter(|(point, _)| query.contains_point(point))
                        .map(|(point, payload)| (point, payload)),
                ),
                NodeKind::Internal { children } => stack.extend(
                    children
                        .iter()
                        .filter(|(bbox, _)| bbox.intersects(query))
                        .map(|(_, child)| *child),
                ),
            }
        }

        found
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Levels from root to leaves; an empty or single-leaf tree has height 1.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut id = self.root;
        while let NodeKind::Internal { children } = &self.nodes[id.0].kind {
            match children.first() {
                Some((_, child)) => id = *child,
                None => break,
            }
            height += 1;
        }
        height
    }

    /// Box enclosing every indexed point, `None` when empty.
    pub fn bounds(&self) -> Option<BoundingBox2D> {
        self.nodes[self.root.0].bbox
    }

    /// All entries in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (&Point, &T)> + '_ {
        self.nodes
            .iter()
            .filter_map(|node| match &node.kind {
                NodeKind::Leaf { entries } => Some(entries),
                NodeKind::Internal { .. } => None,
            })
            .flatten()
            .map(|(point, payload)| (point, payload))
    }

    /// Recompute every box from scratch and compare against the cached ones.
    ///
    /// Also checks node capacity, uniform leaf depth and the entry count.
    pub fn check_invariants(&self) -> bool {
        let mut leaf_depth = None;
        let mut entries = 0;
        match self.verify(self.root, 1, &mut leaf_depth, &mut entries) {
            Some(exact) => exact == self.nodes[self.root.0].bbox && entries == self.len,
            None => false,
        }
    }

    fn verify(
        &self,
        id: NodeId,
        depth: usize,
        leaf_depth: &mut Option<usize>,
        entries_seen: &mut usize,
    ) -> Option<Option<BoundingBox2D>> {
        let node = &self.nodes[id.0];
        let exact = match &node.kind {
            NodeKind::Leaf { entries } => {
                if entries.len() > self.max_entries || *leaf_depth.get_or_insert(depth) != depth {
                    return None;
                }
                *entries_seen += entries.len();
                entries_box(entries)
            }
            NodeKind::Internal { children } => {
                if children.is_empty() || children.len() > self.max_entries {
                    return None;
                }
                for (bbox, child) in children {
                    let child_exact = self.verify(*child, depth + 1, leaf_depth, entries_seen)?;
                    if child_exact != Some(*bbox) {
                        return None;
                    }
                }
                children_box(children)
            }
        };
        (node.bbox == exact).then_some(exact)
    }

    fn push(&mut self, node: SpatialNode<T>) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn insert_into(&mut self, id: NodeId, point: Point, payload: T) -> Insertion {
        let descend = match &self.nodes[id.0].kind {
            NodeKind::Leaf { .. } => None,
            NodeKind::Internal { children } => {
                let slot = choose_child(children, &point);
                Some((slot, children[slot].1))
            }
        };

        match descend {
            None => self.insert_into_leaf(id, point, payload),
            Some((slot, child)) => {
                let below = self.insert_into(child, point, payload);
                self.adopt(id, slot, below)
            }
        }
    }

    fn insert_into_leaf(&mut self, id: NodeId, point: Point, payload: T) -> Insertion {
        let max_entries = self.max_entries;
        let node = &mut self.nodes[id.0];
        let NodeKind::Leaf { entries } = &mut node.kind else {
            unreachable!("leaf insertion reached an internal node");
        };

        entries.push((point, payload));
        if entries.len() <= max_entries {
            node.bbox = Some(match node.bbox {
                Some(bbox) => bbox.union_point(&point),
                None => BoundingBox2D::from_point(&point),
            });
            return Insertion {
                bbox: node.bbox,
                split: None,
            };
        }

        let tail = entries.split_off(entries.len() / 2);
        node.bbox = entries_box(entries);
        let own_box = node.bbox;
        let tail_box = entries_box(&tail);
        let sibling = self.push(SpatialNode {
            bbox: tail_box,
            kind: NodeKind::Leaf { entries: tail },
        });
        log::trace!("Split leaf {:?} into {:?}", id, sibling);

        Insertion {
            bbox: own_box,
            split: tail_box.map(|bbox| (bbox, sibling)),
        }
    }

    /// Refresh routing entry `slot` of internal node `id` after an insertion
    /// below it, taking in the promoted sibling if the child split.
    fn adopt(&mut self, id: NodeId, slot: usize, below: Insertion) -> Insertion {
        let max_entries = self.max_entries;
        let node = &mut self.nodes[id.0];
        let NodeKind::Internal { children } = &mut node.kind else {
            unreachable!("routing update reached a leaf");
        };

        if let Some(bbox) = below.bbox {
            children[slot].0 = bbox;
        }
        if let Some(promoted) = below.split {
            children.insert(slot + 1, promoted);
        }

        if children.len() <= max_entries {
            node.bbox = children_box(children);
            return Insertion {
                bbox: node.bbox,
                split: None,
            };
        }

        let tail = children.split_off(children.len() / 2);
        node.bbox = children_box(children);
        let own_box = node.bbox;
        let tail_box = children_box(&tail);
        let sibling = self.push(SpatialNode {
            bbox: tail_box,
            kind: NodeKind::Internal { children: tail },
        });
        log::trace!("Split internal node {:?} into {:?}", id, sibling);

        Insertion {
            bbox: own_box,
            split: tail_box.map(|bbox| (bbox, sibling)),
        }
    }
}

impl<T: Clone> SpatialIndex<T> {
    /// Every entry inside the square of half-width `radius` centred on `(x, y)`.
    ///
    /// A negative or NaN radius selects nothing.
    pub fn search(&self, x: f64, y: f64, radius: f64) -> Vec<(Point, T)> {
        let Some(query) = BoundingBox2D::around(x, y, radius) else {
            return Vec::new();
        };
        self.search_bbox(&query)
            .into_iter()
            .map(|(point, payload)| (*point, payload.clone()))
            .collect()
    }
}

/// Least area enlargement, then smaller area, then first in order.
fn choose_child(children: &[(BoundingBox2D, NodeId)], point: &Point) -> usize {
    let mut best = 0;
    let mut best_cost = (f64::INFINITY, f64::INFINITY);
    for (i, (bbox, _)) in children.iter().enumerate() {
        let cost = (bbox.enlargement(point), bbox.area());
        if cost < best_cost {
            best = i;
            best_cost = cost;
        }
    }
    best
}

fn entries_box<T>(entries: &[(Point, T)]) -> Option<BoundingBox2D> {
    BoundingBox2D::from_points(entries.iter().map(|(point, _)| point))
}

fn children_box(children: &[(BoundingBox2D, NodeId)]) -> Option<BoundingBox2D> {
    children
        .iter()
        .map(|(bbox, _)| *bbox)
        .reduce(|acc, bbox| acc.union(&bbox))
}
