//! Location scoring.
//!
//! A candidate is scored from the residents and stores inside a fixed
//! radius around it:
//! - customer proximity: weighted cube-root distance decay over residents
//! - store proximity: mean cube-root penalty over existing stores (<= 0)
//! - ratio: in-radius demand per in-radius store against an expected load

use crate::error::PlannerError;
use crate::model::{PlanarPoint, ScoreBreakdown};
use crate::spatial::SpatialIndex;
use crate::traits::RadiusIndex;

/// Scoring cutoff in meters.
pub const DEFAULT_MAX_RADIUS: f64 = 1_000.0;

/// Residents a single store is expected to serve.
pub const DEFAULT_EXPECTED_CUSTOMERS_PER_STORE: f64 = 800.0;

/// Ratio credited when no store is in range.
pub const NO_STORE_RATIO: f64 = 1.0;

/// How the weighted customer decay is normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    /// Divide by the in-radius weight sum; bounded in `[0, 1]`.
    WeightSum,
    /// Divide by a fixed constant; grows with total demand.
    Fixed(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreConfig {
    /// Radius of both neighborhood queries, in meters.
    pub max_radius: f64,
    pub expected_customers_per_store: f64,
    pub customer_weight: f64,
    pub store_weight: f64,
    pub ratio_weight: f64,
    /// Constant added to every total, trained on and reported alike.
    pub bias: f64,
    pub normalization: Normalization,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            max_radius: DEFAULT_MAX_RADIUS,
            expected_customers_per_store: DEFAULT_EXPECTED_CUSTOMERS_PER_STORE,
            customer_weight: 1.0,
            store_weight: 1.0,
            ratio_weight: 1.0,
            bias: 1.0,
            normalization: Normalization::WeightSum,
        }
    }
}

impl ScoreConfig {
    pub fn validate(&self) -> Result<(), PlannerError> {
        if !self.max_radius.is_finite() || self.max_radius <= 0.0 {
            return Err(PlannerError::InvalidConfig(format!(
                "max_radius must be positive, got {}",
                self.max_radius
            )));
        }
        if !self.expected_customers_per_store.is_finite() || self.expected_customers_per_store <= 0.0 {
            return Err(PlannerError::InvalidConfig(format!(
                "expected_customers_per_store must be positive, got {}",
                self.expected_customers_per_store
            )));
        }
        for (name, value) in [
            ("customer_weight", self.customer_weight),
            ("store_weight", self.store_weight),
            ("ratio_weight", self.ratio_weight),
            ("bias", self.bias),
        ] {
            if !value.is_finite() {
                return Err(PlannerError::InvalidConfig(format!("{} must be finite", name)));
            }
        }
        if let Normalization::Fixed(constant) = self.normalization {
            if !constant.is_finite() || constant <= 0.0 {
                return Err(PlannerError::InvalidConfig(format!(
                    "fixed normalization must be positive, got {}",
                    constant
                )));
            }
        }
        Ok(())
    }
}

/// Weighted cube-root decay over residents at `distances`.
///
/// Contributions fall from full weight at distance zero to nothing at
/// `max_radius`. Returns `0.0` when there are no residents.
pub fn customer_proximity(distances: &[f64], weights: &[f64], config: &ScoreConfig) -> f64 {
    if distances.is_empty() {
        return 0.0;
    }

    let decayed: f64 = distances
        .iter()
        .zip(weights)
        .map(|(d, w)| w * (1.0 - (d / config.max_radius).clamp(0.0, 1.0).cbrt()))
        .sum();

    let norm = match config.normalization {
        Normalization::WeightSum => weights.iter().sum::<f64>(),
        Normalization::Fixed(constant) => constant,
    };
    if norm <= 0.0 {
        return 0.0;
    }

    config.customer_weight * decayed / norm
}

/// Cannibalization penalty from stores at `distances`; `0.0` when none.
pub fn store_proximity(distances: &[f64], config: &ScoreConfig) -> f64 {
    if distances.is_empty() {
        return 0.0;
    }

    let pressure: f64 = distances
        .iter()
        .map(|d| (1.0 - d / config.max_radius).clamp(0.0, 1.0).cbrt())
        .sum();

    -config.store_weight * pressure / distances.len() as f64
}

/// In-radius demand per in-radius store, capped at one expected load.
pub fn demand_ratio(demand: f64, store_count: usize, config: &ScoreConfig) -> f64 {
    if store_count == 0 {
        return config.ratio_weight * NO_STORE_RATIO;
    }

    let per_store = demand / store_count as f64;
    config.ratio_weight * (per_store / config.expected_customers_per_store).min(1.0)
}

/// Scores candidates against a resident index and a store index.
#[derive(Debug)]
pub struct Scorer<'a, I: RadiusIndex = SpatialIndex> {
    residents: &'a I,
    weights: &'a [f64],
    stores: &'a I,
    config: &'a ScoreConfig,
}

impl<I: RadiusIndex> Clone for Scorer<'_, I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I: RadiusIndex> Copy for Scorer<'_, I> {}

impl<'a, I: RadiusIndex> Scorer<'a, I> {
    /// `weights[i]` is the demand of the resident stored at index `i`.
    pub fn new(
        residents: &'a I,
        weights: &'a [f64],
        stores: &'a I,
        config: &'a ScoreConfig,
    ) -> Result<Self, PlannerError> {
        if residents.len() != weights.len() {
            return Err(PlannerError::LengthMismatch {
                points: residents.len(),
                weights: weights.len(),
            });
        }
        Ok(Self {
            residents,
            weights,
            stores,
            config,
        })
    }

    /// Full breakdown for `candidate`.
    pub fn evaluate(&self, candidate: PlanarPoint) -> Result<ScoreBreakdown, PlannerError> {
        if !candidate.is_finite() {
            return Err(PlannerError::NonFinite {
                what: "candidate coordinate",
                index: 0,
            });
        }

        let radius = self.config.max_radius;

        let resident_hits = self.residents.query_radius(candidate, radius);
        let resident_distances: Vec<f64> = resident_hits
            .iter()
            .map(|&i| self.residents.position(i).distance(&candidate))
            .collect();
        let resident_weights: Vec<f64> = resident_hits.iter().map(|&i| self.weights[i]).collect();

        let store_hits = self.stores.query_radius(candidate, radius);
        let store_distances: Vec<f64> = store_hits
            .iter()
            .map(|&i| self.stores.position(i).distance(&candidate))
            .collect();

        let demand: f64 = resident_weights.iter().sum();

        Ok(ScoreBreakdown::new(
            customer_proximity(&resident_distances, &resident_weights, self.config),
            store_proximity(&store_distances, self.config),
            demand_ratio(demand, store_hits.len(), self.config),
            self.config.bias,
        ))
    }

    /// Total score of `candidate`, the surrogate's regression target.
    pub fn objective(&self, candidate: PlanarPoint) -> Result<f64, PlannerError> {
        Ok(self.evaluate(candidate)?.total)
    }
}
