use geo::Point;
use serde::{Deserialize, Serialize};

/// One dispatchable resource in a bulk-load file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: String,
    /// `[x, y]` in the same planar units as request coordinates.
    pub coords: [f64; 2],
}

impl CandidateRecord {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            coords: [x, y],
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.coords[0], self.coords[1])
    }
}

/// Startup data consumed by the engine loader.
///
/// Older files name the lists `locations` and `drivers`; both spellings are
/// accepted on input, the canonical names are written on output.
///
/// ```
/// use geostream_types::dataset::Dataset;
///
/// let json = r#"{
///     "locations": ["Downtown", "Airport"],
///     "drivers": [{ "id": "Driver_000", "coords": [12.5, 40.0] }]
/// }"#;
/// let dataset: Dataset = serde_json::from_str(json).unwrap();
/// assert_eq!(dataset.destinations.len(), 2);
/// assert_eq!(dataset.candidates[0].id, "Driver_000");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default, alias = "locations")]
    pub destinations: Vec<String>,

    #[serde(default, alias = "drivers")]
    pub candidates: Vec<CandidateRecord>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_destination(mut self, name: impl Into<String>) -> Self {
        self.destinations.push(name.into());
        self
    }

    pub fn with_candidate(mut self, id: impl Into<String>, x: f64, y: f64) -> Self {
        self.candidates.push(CandidateRecord::new(id, x, y));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty() && self.candidates.is_empty()
    }

    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[cfg(feature = "json")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
