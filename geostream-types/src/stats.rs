use serde::{Deserialize, Serialize};

/// Shape and fill level of the denylist membership filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterStats {
    /// Length of the bit array (`m`)
    pub size_bits: usize,
    /// Number of hash functions (`k`)
    pub hash_functions: u32,
    /// False-positive rate the filter was sized for
    pub false_positive_rate: f64,
    /// Element count the filter was sized for (`n`)
    pub expected_items: usize,
    /// Number of `add` calls so far
    pub items_added: usize,
    /// Number of bits currently set
    pub bits_set: usize,
    /// `(1 - e^(-k·added/m))^k` for the current fill level
    pub estimated_false_positive_rate: f64,
}

/// Engine statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Candidates indexed spatially
    pub candidates: usize,
    /// Distinct destinations registered
    pub destinations: usize,
    /// `blacklist` calls so far
    pub denylisted: usize,
    /// Total dispatch requests processed
    pub requests: u64,
    pub access_denied: u64,
    pub destination_not_found: u64,
    pub no_candidates: u64,
    pub assignments: u64,
}

impl EngineStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that ended in any outcome other than an assignment.
    pub fn rejected(&self) -> u64 {
        self.access_denied + self.destination_not_found + self.no_candidates
    }
}
