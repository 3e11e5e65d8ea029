//! Error type shared by the planner modules.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    /// Configuration rejected before any work starts.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Nothing to optimize against (e.g. no residents at all).
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    #[error("non-finite {what} at index {index}")]
    NonFinite { what: &'static str, index: usize },

    #[error("resident weight at index {index} must be positive, got {weight}")]
    InvalidWeight { index: usize, weight: f64 },

    #[error("{points} resident points but {weights} weights")]
    LengthMismatch { points: usize, weights: usize },

    /// Covariance factorization failed, including the regularized retry.
    #[error("surrogate fit failed: {0}")]
    SurrogateFit(String),
}
