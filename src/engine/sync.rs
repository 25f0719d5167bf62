//! Thread-safe wrapper for concurrent engine access.
//!
//! Enable the `sync` feature to use this module:
//!
//! ```toml
//! [dependencies]
//! geostream = { version = "0.1", features = ["sync"] }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use geostream::{Point, SyncEngine};
//! use std::thread;
//!
//! let engine = SyncEngine::new();
//! engine.add_destination("Airport");
//! engine.add_candidate("Driver_A", Point::new(1.0, 1.0));
//!
//! let worker = engine.clone();
//! let handle = thread::spawn(move || {
//!     worker.find_best_candidate("user_1", "Airport", Point::new(0.0, 0.0))
//! });
//!
//! assert!(handle.join().unwrap().is_success());
//! assert_eq!(engine.stats().requests, 1);
//! ```

use super::{DispatchOutcome, Engine};
use crate::config::{Config, Dataset, EngineStats, FilterStats};
use crate::dataset::LoadReport;
use crate::error::Result;
use geo::Point;
use parking_lot::RwLock;
use std::sync::Arc;

/// Thread-safe wrapper around [`Engine`] using `Arc<RwLock<Engine>>`.
///
/// Requests update the engine's outcome counters, so `find_best_candidate`
/// takes the write lock just like the mutating operations. Introspection
/// (`stats`, `filter_stats`, `has_destination`) runs under the read lock.
#[derive(Clone, Debug)]
pub struct SyncEngine {
    inner: Arc<RwLock<Engine>>,
}

impl SyncEngine {
    pub fn new() -> Self {
        Self::from_engine(Engine::new())
    }

    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self::from_engine(Engine::with_config(config)?))
    }

    pub fn from_engine(engine: Engine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    pub fn add_candidate(&self, id: impl Into<String>, location: Point) {
        self.inner.write().add_candidate(id, location)
    }

    pub fn add_destination(&self, name: &str) {
        self.inner.write().add_destination(name)
    }

    pub fn blacklist(&self, requester_id: &str) {
        self.inner.write().blacklist(requester_id)
    }

    pub fn load_dataset(&self, dataset: &Dataset) -> LoadReport {
        self.inner.write().load_dataset(dataset)
    }

    pub fn find_best_candidate(
        &self,
        requester_id: &str,
        destination: &str,
        location: Point,
    ) -> DispatchOutcome {
        self.inner
            .write()
            .find_best_candidate(requester_id, destination, location)
    }

    pub fn find_best_candidate_within(
        &self,
        requester_id: &str,
        destination: &str,
        location: Point,
        radius: f64,
    ) -> DispatchOutcome {
        self.inner
            .write()
            .find_best_candidate_within(requester_id, destination, location, radius)
    }

    pub fn has_destination(&self, name: &str) -> bool {
        self.inner.read().has_destination(name)
    }

    pub fn filter_stats(&self) -> FilterStats {
        self.inner.read().filter_stats()
    }

    pub fn stats(&self) -> EngineStats {
        self.inner.read().stats()
    }

    /// Unwrap the engine if this is the last handle, otherwise return `self`.
    pub fn into_inner(self) -> std::result::Result<Engine, Self> {
        Arc::try_unwrap(self.inner)
            .map(RwLock::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl Default for SyncEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Engine> for SyncEngine {
    fn from(engine: Engine) -> Self {
        Self::from_engine(engine)
    }
}
