//! Engine configuration.
//!
//! This module provides the serializable [`Config`] and re-exports the shared
//! value types from the `geostream-types` crate for convenience.
use serde::de::Error;
use serde::{Deserialize, Serialize};

pub use geostream_types::bbox::BoundingBox2D;
pub use geostream_types::dataset::{CandidateRecord, Dataset};
pub use geostream_types::stats::{EngineStats, FilterStats};

/// How the spatial pre-filter result is interpreted.
///
/// The spatial index always answers with the axis-aligned square around the
/// requester. `Circle` additionally drops candidates whose Euclidean distance
/// exceeds the radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RadiusShape {
    #[default]
    Square,
    Circle,
}

/// Engine configuration
///
/// # Example
///
/// ```rust
/// use geostream::{Config, RadiusShape};
///
/// let json = r#"{
///     "expected_denylist_size": 5000,
///     "search_radius": 25.0,
///     "radius_shape": "circle"
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.max_entries, 4);
/// assert_eq!(config.radius_shape, RadiusShape::Circle);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Element count the denylist filter is sized for
    #[serde(default = "Config::default_expected_denylist_size")]
    pub expected_denylist_size: usize,

    /// Target false-positive rate of the denylist filter, in (0, 1)
    #[serde(default = "Config::default_false_positive_rate")]
    pub false_positive_rate: f64,

    /// Leaf/internal node capacity of the spatial index
    #[serde(default = "Config::default_max_entries")]
    pub max_entries: usize,

    /// Half-width of the search square around the requester
    #[serde(default = "Config::default_search_radius")]
    pub search_radius: f64,

    #[serde(default)]
    pub radius_shape: RadiusShape,
}

impl Config {
    const fn default_expected_denylist_size() -> usize {
        1000
    }

    const fn default_false_positive_rate() -> f64 {
        0.01
    }

    const fn default_max_entries() -> usize {
        4
    }

    const fn default_search_radius() -> f64 {
        10.0
    }

    pub fn with_expected_denylist_size(mut self, size: usize) -> Self {
        assert!(size > 0, "Expected denylist size must be greater than zero");

        if size > 10_000_000 {
            log::warn!(
                "Denylist sized for {} entries; the bit array alone will take several megabytes",
                size
            );
        }

        self.expected_denylist_size = size;
        self
    }

    pub fn with_false_positive_rate(mut self, rate: f64) -> Self {
        assert!(
            rate > 0.0 && rate < 1.0,
            "False-positive rate must be in (0, 1)"
        );
        self.false_positive_rate = rate;
        self
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        assert!(max_entries >= 2, "Node capacity must be at least 2");
        self.max_entries = max_entries;
        self
    }

    pub fn with_search_radius(mut self, radius: f64) -> Self {
        assert!(
            radius.is_finite() && radius >= 0.0,
            "Search radius must be finite and non-negative"
        );
        self.search_radius = radius;
        self
    }

    pub fn with_radius_shape(mut self, shape: RadiusShape) -> Self {
        self.radius_shape = shape;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.expected_denylist_size == 0 {
            return Err("Expected denylist size must be greater than zero".to_string());
        }

        if !(self.false_positive_rate > 0.0 && self.false_positive_rate < 1.0) {
            return Err(format!(
                "False-positive rate must be in (0, 1), got: {}",
                self.false_positive_rate
            ));
        }

        if self.max_entries < 2 {
            return Err(format!(
                "Node capacity must be at least 2, got: {}",
                self.max_entries
            ));
        }

        if !self.search_radius.is_finite() || self.search_radius < 0.0 {
            return Err(format!(
                "Search radius must be finite and non-negative, got: {}",
                self.search_radius
            ));
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            expected_denylist_size: Self::default_expected_denylist_size(),
            false_positive_rate: Self::default_false_positive_rate(),
            max_entries: Self::default_max_entries(),
            search_radius: Self::default_search_radius(),
            radius_shape: RadiusShape::default(),
        }
    }
}
