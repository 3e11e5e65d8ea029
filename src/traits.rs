//! Core seams of the planner.
//!
//! The optimizer only talks to spatial structures, acquisition rules and
//! coordinate projections through these traits, so alternatives can be
//! swapped in without touching the placement loop.

use crate::model::{GeoPoint, PlanarPoint};
use crate::surrogate::Prediction;

/// A point set answering fixed-radius neighborhood queries.
pub trait RadiusIndex {
    /// Number of indexed points.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of the point stored at `index`.
    fn position(&self, index: usize) -> PlanarPoint;

    /// Indices of all points within `radius` (inclusive) of `point`,
    /// in ascending index order. An empty result is not an error.
    fn query_radius(&self, point: PlanarPoint, radius: f64) -> Vec<usize>;
}

/// Ranks candidates from the surrogate's predictive distribution.
pub trait Acquisition {
    /// Desirability of a single candidate; higher is better.
    fn score(&self, prediction: &Prediction) -> f64;

    /// Candidate indices ordered best-first. Ties keep input order.
    fn rank(&self, predictions: &[Prediction]) -> Vec<usize> {
        let scores: Vec<f64> = predictions.iter().map(|p| self.score(p)).collect();
        let mut order: Vec<usize> = (0..predictions.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        order
    }
}

/// Converts between geographic and planar coordinates.
pub trait Projection {
    fn to_planar(&self, point: GeoPoint) -> PlanarPoint;
    fn to_geographic(&self, point: PlanarPoint) -> GeoPoint;
}
