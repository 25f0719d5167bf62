//! In-memory spatial dispatch engine.
//!
//! A request is matched with the nearest registered candidate after passing a
//! Bloom-filter denylist and a radix-tree destination check. Candidates are
//! pre-filtered by an R-tree and ranked by distance in a Fibonacci heap.
//!
//! ```rust
//! use geostream::{DispatchOutcome, Engine, Point};
//!
//! let mut engine = Engine::builder().blacklist("hacker_01").build()?;
//! engine.add_destination("Downtown_Central");
//! engine.add_candidate("Driver_A", Point::new(2.0, 2.0));
//! engine.add_candidate("Driver_B", Point::new(5.0, 5.0));
//!
//! let outcome = engine.find_best_candidate("user_123", "Downtown_Central", Point::new(0.0, 0.0));
//! assert_eq!(outcome.assignment().unwrap().candidate_id, "Driver_A");
//!
//! let outcome = engine.find_best_candidate("hacker_01", "Downtown_Central", Point::new(0.0, 0.0));
//! assert_eq!(outcome, DispatchOutcome::AccessDenied);
//! # Ok::<(), geostream::DispatchError>(())
//! ```

pub mod builder;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod index;

pub use builder::EngineBuilder;
pub use config::{
    BoundingBox2D, CandidateRecord, Config, Dataset, EngineStats, FilterStats, RadiusShape,
};
pub use dataset::{LoadReport, read_dataset, write_dataset};
pub use engine::{Assignment, DispatchOutcome, Engine};
pub use error::{DispatchError, Result};

#[cfg(feature = "sync")]
pub use engine::SyncEngine;

pub use index::{CompressedPrefixIndex, FibonacciHeap, HeapHandle, MembershipFilter, SpatialIndex};

pub use geo::Point;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{DispatchError, Engine, EngineBuilder, Result};

    pub use crate::{Assignment, DispatchOutcome};

    pub use crate::{Config, Dataset, RadiusShape};

    #[cfg(feature = "sync")]
    pub use crate::SyncEngine;

    pub use geo::Point;
}
