//! Startup data loading.
//!
//! Datasets are JSON objects with a list of destination names and a list of
//! candidate records:
//!
//! ```json
//! {
//!     "destinations": ["Downtown", "Airport"],
//!     "candidates": [{ "id": "Driver_000", "coords": [12.5, 40.0] }]
//! }
//! ```
//!
//! The older field names `locations` and `drivers` are also accepted.

use crate::config::Dataset;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// What a call to [`Engine::load_dataset`](crate::Engine::load_dataset) did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Destination names passed to the registry (duplicates included)
    pub destinations: usize,
    /// Candidates indexed
    pub candidates: usize,
    /// Records rejected for an empty id or non-finite coordinates
    pub skipped: usize,
}

/// Read a JSON dataset from `path`.
pub fn read_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let dataset: Dataset = serde_json::from_reader(reader)?;
    log::debug!(
        "Read dataset {}: {} destinations, {} candidates",
        path.display(),
        dataset.destinations.len(),
        dataset.candidates.len()
    );
    Ok(dataset)
}

/// Write `dataset` to `path` as pretty-printed JSON.
pub fn write_dataset<P: AsRef<Path>>(path: P, dataset: &Dataset) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, dataset)?;
    Ok(())
}
