//! Index structures composed by the dispatch pipeline.
//!
//! - [`MembershipFilter`]: Bloom filter for the requester denylist
//! - [`CompressedPrefixIndex`]: radix tree of valid destinations
//! - [`SpatialIndex`]: R-tree pre-filtering candidates by location
//! - [`FibonacciHeap`]: request-scoped ranking by distance
//!
//! Each structure is usable on its own.

pub mod bloom;
pub mod heap;
pub mod radix;
pub mod rtree;

pub use bloom::MembershipFilter;
pub use heap::{FibonacciHeap, HeapHandle};
pub use radix::CompressedPrefixIndex;
pub use rtree::SpatialIndex;
