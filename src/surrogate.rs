//! Gaussian-process surrogate of the location score.
//!
//! Kernel: `amplitude * Matern52(r / length_scale)` over inputs rescaled so
//! the search box spans the unit interval along its longer side. Targets
//! are standardized before fitting. The length scale is picked from a fixed
//! log-spaced grid by maximum marginal likelihood; the amplitude has a
//! closed-form optimum for each length scale and is profiled out.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::PlannerError;
use crate::model::PlanarPoint;
use crate::sobol::BoundingBox;

/// Length scales tried during fitting, in unit-box coordinates.
pub const LENGTH_SCALE_GRID: [f64; 10] = [
    0.005, 0.01, 0.02, 0.04, 0.08, 0.16, 0.32, 0.64, 1.28, 2.56,
];

/// Diagonal regularization of the unit-amplitude covariance.
pub const JITTER: f64 = 1e-6;

/// Jitter multiplier used for the single retry after a failed fit.
pub const RETRY_JITTER_FACTOR: f64 = 1e3;

/// Predictive mean and standard deviation at one input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub mean: f64,
    pub std_dev: f64,
}

/// Maps planar meters into the unit box used by the kernel.
#[derive(Debug, Clone, Copy)]
struct InputScaler {
    origin: PlanarPoint,
    scale: f64,
}

impl InputScaler {
    fn new(bounds: &BoundingBox) -> Self {
        let extent = bounds.width().max(bounds.height());
        Self {
            origin: bounds.min,
            scale: if extent > 0.0 && extent.is_finite() { extent } else { 1.0 },
        }
    }

    fn apply(&self, point: PlanarPoint) -> [f64; 2] {
        [
            (point.x - self.origin.x) / self.scale,
            (point.y - self.origin.y) / self.scale,
        ]
    }
}

fn matern52(a: &[f64; 2], b: &[f64; 2], length_scale: f64) -> f64 {
    let r = (a[0] - b[0]).hypot(a[1] - b[1]) / length_scale;
    let s = 5f64.sqrt() * r;
    (1.0 + s + s * s / 3.0) * (-s).exp()
}

/// Result of fitting one length scale.
struct Candidate {
    length_scale: f64,
    log_likelihood: f64,
    amplitude: f64,
    lower: DMatrix<f64>,
    alpha: DVector<f64>,
}

fn fit_length_scale(
    inputs: &[[f64; 2]],
    targets: &DVector<f64>,
    length_scale: f64,
    jitter: f64,
) -> Option<Candidate> {
    let n = inputs.len();
    let covariance = DMatrix::from_fn(n, n, |i, j| {
        let k = matern52(&inputs[i], &inputs[j], length_scale);
        if i == j { k + jitter } else { k }
    });

    let cholesky = covariance.cholesky()?;
    let alpha = cholesky.solve(targets);
    let lower = cholesky.unpack();

    let quad = targets.dot(&alpha);
    let amplitude = (quad / n as f64).max(f64::MIN_POSITIVE);
    let log_det: f64 = (0..n).map(|i| lower[(i, i)].ln()).sum::<f64>() * 2.0;
    let log_likelihood = -0.5 * n as f64 * (amplitude.ln() + 1.0 + (2.0 * std::f64::consts::PI).ln())
        - 0.5 * log_det;

    if !log_likelihood.is_finite() {
        return None;
    }

    Some(Candidate {
        length_scale,
        log_likelihood,
        amplitude,
        lower,
        alpha,
    })
}

/// A fitted Gaussian-process regressor.
#[derive(Debug, Clone)]
pub struct GaussianProcess {
    scaler: InputScaler,
    inputs: Vec<[f64; 2]>,
    lower: DMatrix<f64>,
    alpha: DVector<f64>,
    length_scale: f64,
    amplitude: f64,
    y_mean: f64,
    y_std: f64,
}

impl GaussianProcess {
    /// Fit on `points` with observed `targets`.
    ///
    /// A failed factorization at every grid length scale is retried once
    /// with stronger diagonal regularization before giving up.
    pub fn fit(
        bounds: &BoundingBox,
        points: &[PlanarPoint],
        targets: &[f64],
    ) -> Result<Self, PlannerError> {
        Self::fit_with_jitter(bounds, points, targets, JITTER, JITTER * RETRY_JITTER_FACTOR)
    }

    /// [`fit`](Self::fit) with explicit first-attempt and retry jitter.
    pub(crate) fn fit_with_jitter(
        bounds: &BoundingBox,
        points: &[PlanarPoint],
        targets: &[f64],
        jitter: f64,
        retry_jitter: f64,
    ) -> Result<Self, PlannerError> {
        if points.is_empty() {
            return Err(PlannerError::SurrogateFit("no observations".to_string()));
        }
        if points.len() != targets.len() {
            return Err(PlannerError::SurrogateFit(format!(
                "{} points but {} targets",
                points.len(),
                targets.len()
            )));
        }
        if let Some(index) = targets.iter().position(|t| !t.is_finite()) {
            return Err(PlannerError::NonFinite {
                what: "surrogate target",
                index,
            });
        }

        let scaler = InputScaler::new(bounds);
        let inputs: Vec<[f64; 2]> = points.iter().map(|p| scaler.apply(*p)).collect();

        let n = targets.len() as f64;
        let y_mean = targets.iter().sum::<f64>() / n;
        let variance = targets.iter().map(|t| (t - y_mean).powi(2)).sum::<f64>() / n;
        let y_std = if variance > 0.0 { variance.sqrt() } else { 1.0 };
        let standardized = DVector::from_iterator(targets.len(), targets.iter().map(|t| (t - y_mean) / y_std));

        let best = match Self::select(&inputs, &standardized, jitter) {
            Some(best) => best,
            None => {
                warn!(observations = inputs.len(), "covariance not positive definite, retrying with more jitter");
                Self::select(&inputs, &standardized, retry_jitter).ok_or_else(|| {
                    PlannerError::SurrogateFit(format!(
                        "covariance of {} observations is not positive definite",
                        inputs.len()
                    ))
                })?
            }
        };

        debug!(
            observations = inputs.len(),
            length_scale = best.length_scale,
            amplitude = best.amplitude,
            log_likelihood = best.log_likelihood,
            "fitted surrogate"
        );

        Ok(Self {
            scaler,
            inputs,
            lower: best.lower,
            alpha: best.alpha,
            length_scale: best.length_scale,
            amplitude: best.amplitude,
            y_mean,
            y_std,
        })
    }

    /// Best grid length scale; earlier grid entries win ties.
    fn select(inputs: &[[f64; 2]], targets: &DVector<f64>, jitter: f64) -> Option<Candidate> {
        let fitted: Vec<Option<Candidate>> = LENGTH_SCALE_GRID
            .par_iter()
            .map(|&l| fit_length_scale(inputs, targets, l, jitter))
            .collect();

        let mut best: Option<Candidate> = None;
        for candidate in fitted.into_iter().flatten() {
            let better = best
                .as_ref()
                .is_none_or(|b| candidate.log_likelihood > b.log_likelihood);
            if better {
                best = Some(candidate);
            }
        }
        best
    }

    /// Chosen kernel length scale, in unit-box coordinates.
    pub fn length_scale(&self) -> f64 {
        self.length_scale
    }

    pub fn observation_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn predict(&self, point: PlanarPoint) -> Prediction {
        let x = self.scaler.apply(point);
        let k_star = DVector::from_iterator(
            self.inputs.len(),
            self.inputs.iter().map(|xi| matern52(xi, &x, self.length_scale)),
        );

        let mean = k_star.dot(&self.alpha);
        let explained = self
            .lower
            .solve_lower_triangular(&k_star)
            .map(|v| v.norm_squared())
            .unwrap_or(1.0);
        let variance = (self.amplitude * (1.0 - explained)).max(0.0);

        Prediction {
            mean: self.y_mean + self.y_std * mean,
            std_dev: self.y_std * variance.sqrt(),
        }
    }

    /// Predictions for a batch, in input order.
    pub fn predict_many(&self, points: &[PlanarPoint]) -> Vec<Prediction> {
        points.par_iter().map(|p| self.predict(*p)).collect()
    }
}
