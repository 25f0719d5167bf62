//! Bloom filter backing the requester denylist.
//!
//! The filter is sized from an expected element count `n` and a target
//! false-positive rate `p`:
//!
//! - bit array length `m = ceil(-n·ln(p) / ln(2)²)`
//! - hash count `k = round((m / n)·ln(2))`, at least one
//!
//! Position `i` of an item is the keyed hash of the item bytes followed by the
//! discriminator `i`, reduced modulo `m`. Bits are only ever set, so the filter
//! never reports a false negative. Past `n` elements the false-positive rate
//! climbs but nothing fails.

use crate::config::FilterStats;
use rustc_hash::FxHasher;
use smallvec::SmallVec;
use std::f64::consts::LN_2;
use std::hash::Hasher;

const WORD_BITS: usize = u64::BITS as usize;

/// Fixed-capacity probabilistic set of strings.
///
/// ```rust
/// use geostream::index::MembershipFilter;
///
/// let mut filter = MembershipFilter::new(100, 0.01);
/// filter.add("hacker_01");
/// assert!(filter.check("hacker_01"));
/// assert_eq!(filter.size_bits(), 959);
/// assert_eq!(filter.hash_functions(), 7);
/// ```
#[derive(Debug, Clone)]
pub struct MembershipFilter {
    bits: Vec<u64>,
    num_bits: usize,
    num_hashes: u32,
    expected_items: usize,
    false_positive_rate: f64,
    items_added: usize,
}

impl MembershipFilter {
    /// Create a filter sized for `expected_items` at `false_positive_rate`.
    ///
    /// # Panics
    ///
    /// Panics if `expected_items` is 0 or `false_positive_rate` is not in (0, 1).
    pub fn new(expected_items: usize, false_positive_rate: f64) -> Self {
        assert!(expected_items > 0, "expected_items must be > 0");
        assert!(
            false_positive_rate > 0.0 && false_positive_rate < 1.0,
            "false_positive_rate must be in (0, 1)"
        );

        let n = expected_items as f64;
        let num_bits = ((-n * false_positive_rate.ln()) / (LN_2 * LN_2)).ceil() as usize;
        let num_bits = num_bits.max(1);
        let num_hashes = ((num_bits as f64 / n) * LN_2).round().max(1.0) as u32;

        Self {
            bits: vec![0; num_bits.div_ceil(WORD_BITS)],
            num_bits,
            num_hashes,
            expected_items,
            false_positive_rate,
            items_added: 0,
        }
    }

    /// Record `item` as a member. There is no inverse operation.
    pub fn add(&mut self, item: &str) {
        let positions: SmallVec<[usize; 16]> = self.positions(item).collect();
        for idx in positions {
            self.bits[idx / WORD_BITS] |= 1u64 << (idx % WORD_BITS);
        }

        self.items_added += 1;
        if self.items_added == self.expected_items + 1 {
            log::warn!(
                "Membership filter holds more than the {} items it was sized for; \
                 false-positive rate now exceeds {}",
                self.expected_items,
                self.false_positive_rate
            );
        }
    }

    /// `false` means `item` was definitely never added; `true` means it
    /// probably was.
    pub fn check(&self, item: &str) -> bool {
        self.positions(item)
            .all(|idx| self.bits[idx / WORD_BITS] & (1u64 << (idx % WORD_BITS)) != 0)
    }

    /// Length of the bit array (`m`).
    pub fn size_bits(&self) -> usize {
        self.num_bits
    }

    /// Number of hash functions (`k`).
    pub fn hash_functions(&self) -> u32 {
        self.num_hashes
    }

    pub fn false_positive_rate(&self) -> f64 {
        self.false_positive_rate
    }

    pub fn expected_items(&self) -> usize {
        self.expected_items
    }

    /// Number of `add` calls, duplicates included.
    pub fn len(&self) -> usize {
        self.items_added
    }

    pub fn is_empty(&self) -> bool {
        self.items_added == 0
    }

    pub fn bits_set(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Expected false-positive rate at the current fill level.
    pub fn estimated_false_positive_rate(&self) -> f64 {
        let k = self.num_hashes as f64;
        let fill = (-k * self.items_added as f64 / self.num_bits as f64).exp();
        (1.0 - fill).powf(k)
    }

    pub fn stats(&self) -> FilterStats {
        FilterStats {
            size_bits: self.num_bits,
            hash_functions: self.num_hashes,
            false_positive_rate: self.false_positive_rate,
            expected_items: self.expected_items,
            items_added: self.items_added,
            bits_set: self.bits_set(),
            estimated_false_positive_rate: self.estimated_false_positive_rate(),
        }
    }

    fn positions<'a>(&'a self, item: &'a str) -> impl Iterator<Item = usize> + 'a {
        (0..self.num_hashes).map(move |seed| self.bit_index(item, seed))
    }

    #[inline]
    fn bit_index(&self, item: &str, seed: u32) -> usize {
        let mut hasher = FxHasher::default();
        hasher.write(item.as_bytes());
        hasher.write_u32(seed);
        (fmix64(hasher.finish()) % self.num_bits as u64) as usize
    }
}

/// MurmurHash3 64-bit finalizer; spreads Fx output across all bits before the
/// modulo reduction.
#[inline]
fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizing_formulas() {
        let filter = MembershipFilter::new(1000, 0.01);
        // -1000 * ln(0.01) / ln(2)^2 = 9585.06
        assert_eq!(filter.size_bits(), 9586);
        assert_eq!(filter.hash_functions(), 7);
        assert_eq!(filter.bits.len(), 150);
    }

    #[test]
    fn test_minimum_one_hash() {
        let filter = MembershipFilter::new(10, 0.9);
        assert!(filter.hash_functions() >= 1);
        assert!(filter.size_bits() >= 1);
    }

    #[test]
    fn test_true_positive_and_true_negative() {
        let mut filter = MembershipFilter::new(100, 0.01);
        filter.add("malicious_user_88");

        assert!(filter.check("malicious_user_88"));
        assert!(!filter.check("clean_user_01"));
    }

    #[test]
    fn test_no_false_negatives() {
        let mut filter = MembershipFilter::new(500, 0.01);
        let items: Vec<String> = (0..500).map(|i| format!("user_{i:04}")).collect();
        for item in &items {
            filter.add(item);
        }

        assert!(items.iter().all(|item| filter.check(item)));
        assert_eq!(filter.len(), 500);
    }

    #[test]
    fn test_false_positive_rate_close_to_target() {
        let mut filter = MembershipFilter::new(1000, 0.01);
        for i in 0..1000 {
            filter.add(&format!("blocked-{i}"));
        }

        let trials = 20_000;
        let false_positives = (0..trials)
            .filter(|i| filter.check(&format!("visitor-{i}")))
            .count();
        let observed = false_positives as f64 / trials as f64;

        assert!(observed < 0.03, "observed false-positive rate {observed}");
        assert!((filter.estimated_false_positive_rate() - 0.01).abs() < 0.002);
    }

    #[test]
    fn test_overfilled_filter_keeps_answering() {
        let mut filter = MembershipFilter::new(4, 0.1);
        for i in 0..64 {
            filter.add(&format!("id-{i}"));
        }

        assert!((0..64).all(|i| filter.check(&format!("id-{i}"))));
        assert!(filter.estimated_false_positive_rate() > 0.1);
    }

    #[test]
    fn test_stats() {
        let mut filter = MembershipFilter::new(100, 0.01);
        assert!(filter.is_empty());
        assert_eq!(filter.stats().bits_set, 0);

        filter.add("a");
        let stats = filter.stats();
        assert_eq!(stats.size_bits, filter.size_bits());
        assert_eq!(stats.hash_functions, filter.hash_functions());
        assert_eq!(stats.items_added, 1);
        assert!(stats.bits_set >= 1 && stats.bits_set <= stats.hash_functions as usize);
    }

    #[test]
    #[should_panic(expected = "false_positive_rate must be in (0, 1)")]
    fn test_invalid_rate_panics() {
        let _ = MembershipFilter::new(10, 0.0);
    }
}
