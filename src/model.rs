//! Point and score records exchanged between the planner stages.
//!
//! All positions are planar meters in a local projection; conversion to and
//! from geographic coordinates happens at the boundary (see `projection`).

use serde::{Deserialize, Serialize};

/// Floor area assumed per resident, in square meters.
pub const SQUARE_METERS_PER_RESIDENT: f64 = 25.0;

/// Footprint used when a building has no usable area.
pub const DEFAULT_AREA_M2: f64 = 25.0;

/// Floor count used when a building has no usable level tag.
pub const DEFAULT_LEVELS: f64 = 2.0;

/// Residents assumed when the estimate cannot be computed at all.
pub const FALLBACK_RESIDENTS: f64 = 3.0;

/// A position in planar meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &PlanarPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A demand point: a building centroid weighted by its estimated residents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidentPoint {
    pub position: PlanarPoint,
    pub weight: f64,
}

impl ResidentPoint {
    pub const fn new(x: f64, y: f64, weight: f64) -> Self {
        Self {
            position: PlanarPoint::new(x, y),
            weight,
        }
    }
}

/// Stores carry no attributes beyond their position.
pub type StorePoint = PlanarPoint;

/// The three score components of a location and their biased sum.
///
/// `total` is both the surrogate's training target and the reported score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub customer_proximity: f64,
    pub store_proximity: f64,
    pub ratio: f64,
    pub bias: f64,
    /// `bias + customer_proximity + store_proximity + ratio`.
    pub total: f64,
}

impl ScoreBreakdown {
    pub fn new(customer_proximity: f64, store_proximity: f64, ratio: f64, bias: f64) -> Self {
        Self {
            customer_proximity,
            store_proximity,
            ratio,
            bias,
            total: bias + customer_proximity + store_proximity + ratio,
        }
    }

    /// Sum of the three components alone.
    pub fn unbiased_total(&self) -> f64 {
        self.total - self.bias
    }
}

/// A location with the objective value it scored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub point: PlanarPoint,
    pub score: f64,
}

/// A store accepted by one placement round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// 1-based round number.
    pub round: usize,
    pub position: PlanarPoint,
    /// Breakdown against the store set that includes this placement.
    pub score: ScoreBreakdown,
    /// Breakdown against the store set the round searched over.
    pub selection_score: ScoreBreakdown,
}

/// Flat output record for a placement, in both coordinate systems.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub lat: f64,
    pub lon: f64,
    pub x: f64,
    pub y: f64,
    pub customer_proximity: f64,
    pub store_proximity: f64,
    pub ratio: f64,
    pub total_score: f64,
    pub round: usize,
}

/// Estimate residents of a building from its footprint and floor count.
///
/// Missing or zero values fall back to [`DEFAULT_AREA_M2`] and
/// [`DEFAULT_LEVELS`]; the result is `levels * ceil(area / 25)`.
pub fn estimate_residents(area_m2: Option<f64>, levels: Option<f64>) -> f64 {
    let area = area_m2
        .filter(|a| a.is_finite() && *a > 0.0)
        .unwrap_or(DEFAULT_AREA_M2);
    let levels = levels
        .filter(|l| l.is_finite() && *l > 0.0)
        .unwrap_or(DEFAULT_LEVELS);

    let residents = levels * (area / SQUARE_METERS_PER_RESIDENT).ceil();
    if residents.is_finite() && residents > 0.0 {
        residents
    } else {
        FALLBACK_RESIDENTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = PlanarPoint::new(0.0, 0.0);
        let b = PlanarPoint::new(3.0, 4.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(b.distance(&a), 5.0);
    }

    #[test]
    fn test_is_finite() {
        assert!(PlanarPoint::new(1.0, 2.0).is_finite());
        assert!(!PlanarPoint::new(f64::NAN, 2.0).is_finite());
        assert!(!PlanarPoint::new(1.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn test_breakdown_total() {
        let score = ScoreBreakdown::new(0.5, -0.25, 1.0, 1.0);
        assert_eq!(score.total, 2.25);
        assert_eq!(score.unbiased_total(), 1.25);

        let unbiased = ScoreBreakdown::new(0.5, -0.25, 1.0, 0.0);
        assert_eq!(unbiased.total, unbiased.unbiased_total());
    }

    #[test]
    fn test_estimate_residents_from_area_and_levels() {
        // 110 m2 -> ceil(4.4) = 5 per floor, 4 floors
        assert_eq!(estimate_residents(Some(110.0), Some(4.0)), 20.0);
    }

    #[test]
    fn test_estimate_residents_defaults() {
        assert_eq!(estimate_residents(None, None), 2.0);
        assert_eq!(estimate_residents(Some(0.0), Some(0.0)), 2.0);
        assert_eq!(estimate_residents(Some(100.0), None), 8.0);
        assert_eq!(estimate_residents(Some(f64::NAN), Some(3.0)), 3.0);
    }

    #[test]
    fn test_serde_roundtrip_shape() {
        let record = PlacementRecord {
            lat: 52.23,
            lon: 21.01,
            x: 1.0,
            y: 2.0,
            customer_proximity: 0.4,
            store_proximity: -0.5,
            ratio: 1.0,
            total_score: 0.9,
            round: 1,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"total_score\":0.9"));
        assert!(json.contains("\"round\":1"));
    }
}
