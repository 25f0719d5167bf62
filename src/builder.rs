//! Engine builder
//!
//! Assembles an [`Engine`] from a configuration plus optional startup data,
//! either an in-memory [`Dataset`] or a JSON file on disk.

use crate::config::{Config, Dataset};
use crate::dataset::read_dataset;
use crate::engine::Engine;
use crate::error::Result;
use std::path::PathBuf;

/// Builder for engines with custom sizing and startup data.
#[derive(Debug, Default)]
pub struct EngineBuilder {
    config: Config,
    datasets: Vec<Dataset>,
    dataset_paths: Vec<PathBuf>,
    denylist: Vec<String>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the engine configuration (filter sizing, node capacity, radius).
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Load `dataset` when the engine is built.
    pub fn dataset(mut self, dataset: Dataset) -> Self {
        self.datasets.push(dataset);
        self
    }

    /// Read and load a JSON dataset file when the engine is built.
    pub fn dataset_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.dataset_paths.push(path.into());
        self
    }

    /// Denylist `requester_id` when the engine is built.
    pub fn blacklist(mut self, requester_id: impl Into<String>) -> Self {
        self.denylist.push(requester_id.into());
        self
    }

    /// Validate the configuration, then load datasets (in-memory first, then
    /// files in the order given) and apply the denylist.
    pub fn build(self) -> Result<Engine> {
        let mut engine = Engine::with_config(self.config)?;

        for dataset in &self.datasets {
            engine.load_dataset(dataset);
        }
        for path in &self.dataset_paths {
            let dataset = read_dataset(path)?;
            engine.load_dataset(&dataset);
        }
        for id in &self.denylist {
            engine.blacklist(id);
        }

        Ok(engine)
    }
}
