//! Request pipeline.
//!
//! A request runs through four stages and stops at the first that fails:
//!
//! 1. the requester id is checked against the denylist filter
//! 2. the destination must be a registered name
//! 3. the spatial index returns candidates around the requester
//! 4. candidates are ranked by Euclidean distance in a fresh Fibonacci heap
//!
//! Stage failures are ordinary [`DispatchOutcome`] values. A request never
//! touches the filter, the registry or the spatial index, only the engine's
//! request counters.

use super::Engine;
use crate::config::{BoundingBox2D, RadiusShape};
use crate::index::FibonacciHeap;
use geo::{Distance, Euclidean, Point};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The candidate chosen for a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub candidate_id: String,
    /// Euclidean distance from the requester, in coordinate units.
    pub distance: f64,
}

/// Result of a dispatch request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// The requester id hit the denylist filter.
    AccessDenied,
    /// The destination is not a registered name.
    DestinationNotFound { destination: String },
    /// No candidate lies within the search radius.
    NoCandidates,
    Success(Assignment),
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Success(_))
    }

    pub fn assignment(&self) -> Option<&Assignment> {
        match self {
            DispatchOutcome::Success(assignment) => Some(assignment),
            _ => None,
        }
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchOutcome::AccessDenied => {
                write!(f, "ACCESS DENIED: Requester ID flagged by security filter.")
            }
            DispatchOutcome::DestinationNotFound { destination } => {
                write!(f, "ERROR: Location '{destination}' not found in registry.")
            }
            DispatchOutcome::NoCandidates => write!(f, "No candidates found in your area."),
            DispatchOutcome::Success(Assignment {
                candidate_id,
                distance,
            }) => write!(
                f,
                "Success! Candidate {candidate_id} assigned. Distance: {distance:.2} units."
            ),
        }
    }
}

impl Engine {
    /// Match `requester_id` travelling to `destination` with the nearest
    /// candidate around `location`, using the configured search radius.
    pub fn find_best_candidate(
        &mut self,
        requester_id: &str,
        destination: &str,
        location: Point,
    ) -> DispatchOutcome {
        let radius = self.config.search_radius;
        self.find_best_candidate_within(requester_id, destination, location, radius)
    }

    /// Like [`find_best_candidate`](Self::find_best_candidate) with an explicit
    /// search radius for this request only.
    ///
    /// A negative or NaN radius yields [`DispatchOutcome::NoCandidates`];
    /// `f64::INFINITY` considers every indexed candidate.
    pub fn find_best_candidate_within(
        &mut self,
        requester_id: &str,
        destination: &str,
        location: Point,
        radius: f64,
    ) -> DispatchOutcome {
        let outcome = self.dispatch(requester_id, destination, location, radius);

        self.stats.requests += 1;
        match &outcome {
            DispatchOutcome::AccessDenied => self.stats.access_denied += 1,
            DispatchOutcome::DestinationNotFound { .. } => self.stats.destination_not_found += 1,
            DispatchOutcome::NoCandidates => self.stats.no_candidates += 1,
            DispatchOutcome::Success(_) => self.stats.assignments += 1,
        }
        outcome
    }

    fn dispatch(
        &self,
        requester_id: &str,
        destination: &str,
        location: Point,
        radius: f64,
    ) -> DispatchOutcome {
        if self.security_filter.check(requester_id) {
            log::debug!("Request from {} denied by security filter", requester_id);
            return DispatchOutcome::AccessDenied;
        }

        if !self.destinations.search(destination) {
            log::debug!("Unknown destination '{}'", destination);
            return DispatchOutcome::DestinationNotFound {
                destination: destination.to_string(),
            };
        }

        let Some(query) = self.query_box(location, radius) else {
            return DispatchOutcome::NoCandidates;
        };
        let nearby = self.candidates.search_bbox(&query);
        log::trace!(
            "Spatial pre-filter returned {} candidates within {} of ({}, {})",
            nearby.len(),
            radius,
            location.x(),
            location.y()
        );

        let mut ranking = FibonacciHeap::with_capacity(nearby.len());
        for (point, id) in nearby {
            let distance = Euclidean.distance(location, *point);
            if self.config.radius_shape == RadiusShape::Circle && distance > radius {
                continue;
            }
            ranking.insert(distance, id);
        }

        match ranking.extract_min() {
            Some((distance, id)) => {
                log::debug!("Assigned {} to {} at distance {:.2}", id, requester_id, distance);
                DispatchOutcome::Success(Assignment {
                    candidate_id: id.clone(),
                    distance,
                })
            }
            None => {
                log::debug!("No candidates within {} of requester {}", radius, requester_id);
                DispatchOutcome::NoCandidates
            }
        }
    }

    /// Search square for a request. An infinite radius covers the whole
    /// index; a negative or NaN radius, or a non-finite location, selects
    /// nothing.
    fn query_box(&self, location: Point, radius: f64) -> Option<BoundingBox2D> {
        if !location.x().is_finite() || !location.y().is_finite() {
            log::warn!("Rejecting request with non-finite location");
            return None;
        }
        if radius == f64::INFINITY {
            return self.candidates.bounds();
        }
        let query = BoundingBox2D::around(location.x(), location.y(), radius);
        if query.is_none() {
            log::warn!("Rejecting request with invalid search radius {}", radius);
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn downtown_engine() -> Engine {
        let mut engine = Engine::new();
        engine.add_destination("Downtown_Central");
        engine.add_candidate("Driver_A", Point::new(2.0, 2.0));
        engine.add_candidate("Driver_B", Point::new(5.0, 5.0));
        engine.add_candidate("Driver_C", Point::new(50.0, 50.0));
        engine
    }

    #[test]
    fn test_nearest_candidate_wins() {
        let mut engine = downtown_engine();
        let outcome =
            engine.find_best_candidate("user_123", "Downtown_Central", Point::new(0.0, 0.0));

        let assignment = outcome.assignment().unwrap();
        assert_eq!(assignment.candidate_id, "Driver_A");
        assert!((assignment.distance - 8f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_security_check_runs_first() {
        let mut engine = downtown_engine();
        engine.blacklist("hacker_01");

        // Denied even though the destination is unknown.
        let outcome = engine.find_best_candidate("hacker_01", "Nowhere", Point::new(0.0, 0.0));
        assert_eq!(outcome, DispatchOutcome::AccessDenied);
    }

    #[test]
    fn test_destination_prefix_is_not_enough() {
        let mut engine = downtown_engine();
        let outcome = engine.find_best_candidate("user_1", "Downtown", Point::new(0.0, 0.0));
        assert_eq!(
            outcome,
            DispatchOutcome::DestinationNotFound {
                destination: "Downtown".to_string()
            }
        );
    }

    #[test]
    fn test_square_includes_corner_circle_excludes_it() {
        // (9, 9) is inside the square of half-width 10 but ~12.73 away.
        let mut square = Engine::new();
        square.add_destination("Harbor");
        square.add_candidate("corner", Point::new(9.0, 9.0));
        assert!(
            square
                .find_best_candidate("u", "Harbor", Point::new(0.0, 0.0))
                .is_success()
        );

        let config = Config::default().with_radius_shape(RadiusShape::Circle);
        let mut circle = Engine::with_config(config).unwrap();
        circle.add_destination("Harbor");
        circle.add_candidate("corner", Point::new(9.0, 9.0));
        assert_eq!(
            circle.find_best_candidate("u", "Harbor", Point::new(0.0, 0.0)),
            DispatchOutcome::NoCandidates
        );
    }

    #[test]
    fn test_radius_override() {
        let mut engine = downtown_engine();
        let outcome = engine.find_best_candidate_within(
            "user_9",
            "Downtown_Central",
            Point::new(48.0, 48.0),
            1.0,
        );
        assert_eq!(outcome, DispatchOutcome::NoCandidates);

        let outcome = engine.find_best_candidate_within(
            "user_9",
            "Downtown_Central",
            Point::new(48.0, 48.0),
            3.0,
        );
        assert_eq!(outcome.assignment().unwrap().candidate_id, "Driver_C");
    }

    #[test]
    fn test_negative_or_nan_radius_finds_nothing() {
        for shape in [RadiusShape::Square, RadiusShape::Circle] {
            let config = Config::default().with_radius_shape(shape);
            let mut engine = Engine::with_config(config).unwrap();
            engine.add_destination("Harbor");
            engine.add_candidate("A", Point::new(1.0, 1.0));

            for radius in [-5.0, f64::NAN, f64::NEG_INFINITY] {
                let outcome = engine.find_best_candidate_within(
                    "user_1",
                    "Harbor",
                    Point::new(0.0, 0.0),
                    radius,
                );
                assert_eq!(outcome, DispatchOutcome::NoCandidates, "{shape:?} {radius}");
            }
            assert_eq!(engine.stats().no_candidates, 3);
        }
    }

    #[test]
    fn test_infinite_radius_covers_every_candidate() {
        for shape in [RadiusShape::Square, RadiusShape::Circle] {
            let config = Config::default().with_radius_shape(shape);
            let mut engine = Engine::with_config(config).unwrap();
            engine.add_destination("Harbor");
            assert_eq!(
                engine.find_best_candidate_within(
                    "user_1",
                    "Harbor",
                    Point::new(0.0, 0.0),
                    f64::INFINITY
                ),
                DispatchOutcome::NoCandidates
            );

            engine.add_candidate("far", Point::new(1.0e6, -1.0e6));
            engine.add_candidate("farther", Point::new(-3.0e6, 2.0e6));

            let outcome = engine.find_best_candidate_within(
                "user_1",
                "Harbor",
                Point::new(0.0, 0.0),
                f64::INFINITY,
            );
            assert_eq!(outcome.assignment().unwrap().candidate_id, "far", "{shape:?}");
        }
    }

    #[test]
    fn test_non_finite_location_finds_nothing() {
        let mut engine = downtown_engine();
        let outcome = engine.find_best_candidate_within(
            "user_1",
            "Downtown_Central",
            Point::new(f64::NAN, 0.0),
            f64::INFINITY,
        );
        assert_eq!(outcome, DispatchOutcome::NoCandidates);
    }

    #[test]
    fn test_outcome_counters() {
        let mut engine = downtown_engine();
        engine.blacklist("bad");
        let origin = Point::new(0.0, 0.0);

        engine.find_best_candidate("bad", "Downtown_Central", origin);
        engine.find_best_candidate("good", "Nowhere", origin);
        engine.find_best_candidate("good", "Downtown_Central", Point::new(-500.0, -500.0));
        engine.find_best_candidate("good", "Downtown_Central", origin);

        let stats = engine.stats();
        assert_eq!(stats.requests, 4);
        assert_eq!(stats.access_denied, 1);
        assert_eq!(stats.destination_not_found, 1);
        assert_eq!(stats.no_candidates, 1);
        assert_eq!(stats.assignments, 1);
        assert_eq!(stats.rejected(), 3);
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            DispatchOutcome::AccessDenied.to_string(),
            "ACCESS DENIED: Requester ID flagged by security filter."
        );
        assert_eq!(
            DispatchOutcome::DestinationNotFound {
                destination: "Nonexistent_Place".to_string()
            }
            .to_string(),
            "ERROR: Location 'Nonexistent_Place' not found in registry."
        );
        assert_eq!(
            DispatchOutcome::NoCandidates.to_string(),
            "No candidates found in your area."
        );
        let success = DispatchOutcome::Success(Assignment {
            candidate_id: "Driver_B".to_string(),
            distance: 7.0710678,
        });
        assert_eq!(
            success.to_string(),
            "Success! Candidate Driver_B assigned. Distance: 7.07 units."
        );
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let json = serde_json::to_string(&DispatchOutcome::NoCandidates).unwrap();
        assert_eq!(json, r#"{"outcome":"no_candidates"}"#);
    }
}
