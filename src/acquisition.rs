//! Acquisition rules for picking the next batch to evaluate.

use crate::surrogate::Prediction;
use crate::traits::Acquisition;

/// Default weight of the predictive standard deviation.
pub const DEFAULT_EXPLORATION: f64 = 1.0;

/// Upper Confidence Bound: `mean + exploration * std_dev`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpperConfidenceBound {
    pub exploration: f64,
}

impl Default for UpperConfidenceBound {
    fn default() -> Self {
        Self {
            exploration: DEFAULT_EXPLORATION,
        }
    }
}

impl UpperConfidenceBound {
    pub fn new(exploration: f64) -> Self {
        Self { exploration }
    }
}

impl Acquisition for UpperConfidenceBound {
    fn score(&self, prediction: &Prediction) -> f64 {
        prediction.mean + self.exploration * prediction.std_dev
    }
}
