//! # geostream-types
//!
//! Shared value types for the GeoStream dispatch engine.
//!
//! - **Geometry**: `BoundingBox2D`, a `geo::Rect` wrapper with the box algebra
//!   used by the spatial index
//! - **Bulk load**: `Dataset` and `CandidateRecord`, the startup data format
//! - **Statistics**: `FilterStats`, `EngineStats`
//!
//! All types are serializable with Serde and built on top of the `geo` crate's
//! geometric primitives.
//!
//! ## Examples
//!
//! ```rust
//! use geostream_types::bbox::BoundingBox2D;
//! use geostream_types::dataset::Dataset;
//! use geo::Point;
//!
//! let downtown = BoundingBox2D::new(0.0, 0.0, 10.0, 10.0);
//! assert!(downtown.contains_point(&Point::new(2.0, 2.0)));
//!
//! let dataset = Dataset::new()
//!     .with_destination("Downtown_Central")
//!     .with_candidate("Driver_Alpha", 2.0, 2.0);
//! assert_eq!(dataset.candidates.len(), 1);
//! ```

pub mod bbox;
pub mod dataset;
pub mod stats;

pub use geo;
