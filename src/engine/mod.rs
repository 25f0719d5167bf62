//! The dispatch engine.
//!
//! [`Engine`] owns the three long-lived structures (denylist filter,
//! destination registry and candidate locations) together with the
//! configuration that sized them. Requests are served by
//! [`Engine::find_best_candidate`], see [`pipeline`].

use crate::builder::EngineBuilder;
use crate::config::{CandidateRecord, Config, Dataset, EngineStats, FilterStats};
use crate::dataset::LoadReport;
use crate::error::{DispatchError, Result};
use crate::index::{CompressedPrefixIndex, MembershipFilter, SpatialIndex};
use geo::Point;

pub mod pipeline;

#[cfg(feature = "sync")]
mod sync;

pub use pipeline::{Assignment, DispatchOutcome};

#[cfg(feature = "sync")]
pub use sync::SyncEngine;

/// In-memory dispatch engine (single-threaded).
///
/// All mutation goes through `&mut self`. Independent engines share nothing,
/// so several may live in one process. For access from multiple threads
/// enable the `sync` feature and use `SyncEngine`.
///
/// # Examples
///
/// ```rust
/// use geostream::{DispatchOutcome, Engine, Point};
///
/// let mut engine = Engine::new();
/// engine.add_destination("Downtown_Central");
/// engine.add_candidate("Driver_A", Point::new(2.0, 2.0));
/// engine.add_candidate("Driver_B", Point::new(5.0, 5.0));
/// engine.blacklist("hacker_01");
///
/// let outcome = engine.find_best_candidate("user_123", "Downtown_Central", Point::new(0.0, 0.0));
/// assert_eq!(
///     outcome.to_string(),
///     "Success! Candidate Driver_A assigned. Distance: 2.83 units."
/// );
///
/// let denied = engine.find_best_candidate("hacker_01", "Downtown_Central", Point::new(0.0, 0.0));
/// assert_eq!(denied, DispatchOutcome::AccessDenied);
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    pub(crate) security_filter: MembershipFilter,
    pub(crate) destinations: CompressedPrefixIndex,
    pub(crate) candidates: SpatialIndex<String>,
    pub(crate) config: Config,
    pub(crate) stats: EngineStats,
}

impl Engine {
    /// Create an engine with the default configuration.
    pub fn new() -> Self {
        Self::from_valid_config(Config::default())
    }

    /// Create an engine sized by `config`.
    ///
    /// Returns [`DispatchError::InvalidConfig`] if the configuration does not
    /// validate.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().map_err(DispatchError::InvalidConfig)?;
        Ok(Self::from_valid_config(config))
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    fn from_valid_config(config: Config) -> Self {
        log::debug!(
            "Creating engine: denylist sized for {} at p={}, node capacity {}, radius {}",
            config.expected_denylist_size,
            config.false_positive_rate,
            config.max_entries,
            config.search_radius
        );

        Self {
            security_filter: MembershipFilter::new(
                config.expected_denylist_size,
                config.false_positive_rate,
            ),
            destinations: CompressedPrefixIndex::new(),
            candidates: SpatialIndex::new(config.max_entries),
            config,
            stats: EngineStats::new(),
        }
    }

    /// Index a candidate at `location`.
    ///
    /// Ids are not deduplicated: adding the same id twice indexes two
    /// entries.
    pub fn add_candidate(&mut self, id: impl Into<String>, location: Point) {
        let id = id.into();
        log::trace!("Indexing candidate {} at ({}, {})", id, location.x(), location.y());
        self.candidates.insert(location, id);
        self.stats.candidates = self.candidates.len();
    }

    /// Register a valid destination name.
    pub fn add_destination(&mut self, name: &str) {
        if self.destinations.insert(name) {
            self.stats.destinations = self.destinations.len();
        }
    }

    /// Add `requester_id` to the denylist. Denial is permanent.
    pub fn blacklist(&mut self, requester_id: &str) {
        self.security_filter.add(requester_id);
        self.stats.denylisted = self.security_filter.len();
    }

    /// Bulk-load destinations and candidates.
    ///
    /// Records with an empty id or name, or with non-finite coordinates, are
    /// skipped with a warning and counted in the returned report.
    pub fn load_dataset(&mut self, dataset: &Dataset) -> LoadReport {
        let mut report = LoadReport::default();

        for name in &dataset.destinations {
            if name.is_empty() {
                log::warn!("Skipping destination with an empty name");
                report.skipped += 1;
                continue;
            }
            self.add_destination(name);
            report.destinations += 1;
        }

        for record in &dataset.candidates {
            if let Err(e) = validate_candidate(record) {
                log::warn!("Skipping candidate record: {}", e);
                report.skipped += 1;
                continue;
            }
            self.add_candidate(record.id.as_str(), record.point());
            report.candidates += 1;
        }

        log::info!(
            "Loaded {} destinations and {} candidates ({} skipped)",
            report.destinations,
            report.candidates,
            report.skipped
        );
        report
    }

    /// Shape of the denylist filter and its current fill level.
    pub fn filter_stats(&self) -> FilterStats {
        self.security_filter.stats()
    }

    pub fn stats(&self) -> EngineStats {
        self.stats.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// True if `name` is a registered destination.
    pub fn has_destination(&self, name: &str) -> bool {
        self.destinations.search(name)
    }

    /// Registered destinations starting with `prefix`, sorted.
    pub fn complete_destination(&self, prefix: &str) -> Vec<String> {
        self.destinations.complete(prefix)
    }

    /// Read-only view of the candidate index.
    pub fn candidates(&self) -> &SpatialIndex<String> {
        &self.candidates
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_candidate(record: &CandidateRecord) -> Result<()> {
    if record.id.is_empty() {
        return Err(DispatchError::InvalidInput(
            "candidate id must not be empty".to_string(),
        ));
    }
    if !record.coords.iter().all(|c| c.is_finite()) {
        return Err(DispatchError::InvalidInput(format!(
            "candidate {} has non-finite coordinates {:?}",
            record.id, record.coords
        )));
    }
    Ok(())
}
