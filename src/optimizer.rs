//! Surrogate-guided search over the bounding box.
//!
//! One optimizer instance serves one placement round: it accumulates
//! observations of the true score, refits a Gaussian process on all of
//! them after every batch and asks the acquisition rule which fresh
//! quasi-random candidates to evaluate next.

use rayon::prelude::*;
use tracing::debug;

use crate::error::PlannerError;
use crate::model::{Observation, PlanarPoint};
use crate::score::Scorer;
use crate::sobol::{BoundingBox, SobolSampler};
use crate::surrogate::{GaussianProcess, JITTER, RETRY_JITTER_FACTOR};
use crate::traits::{Acquisition, RadiusIndex};

/// Candidates evaluated per inner round after the first.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Quasi-random candidates ranked by the acquisition rule per suggestion.
pub const DEFAULT_POOL_SIZE: usize = 4096;

#[derive(Debug)]
pub struct SurrogateOptimizer<'a, I: RadiusIndex, A: Acquisition> {
    scorer: Scorer<'a, I>,
    acquisition: A,
    bounds: BoundingBox,
    sampler: SobolSampler,
    batch_size: usize,
    pool_size: usize,
    /// First-attempt and retry diagonal jitter for each refit.
    jitter: (f64, f64),
    observations: Vec<Observation>,
    model: Option<GaussianProcess>,
}

impl<'a, I, A> SurrogateOptimizer<'a, I, A>
where
    I: RadiusIndex + Sync,
    A: Acquisition,
{
    pub fn new(scorer: Scorer<'a, I>, acquisition: A, bounds: BoundingBox, seed: u64) -> Self {
        Self {
            scorer,
            acquisition,
            bounds,
            sampler: SobolSampler::new(seed),
            batch_size: DEFAULT_BATCH_SIZE,
            pool_size: DEFAULT_POOL_SIZE,
            jitter: (JITTER, JITTER * RETRY_JITTER_FACTOR),
            observations: Vec::new(),
            model: None,
        }
    }

    /// Override the per-round batch and candidate pool sizes.
    pub fn with_batch(mut self, batch_size: usize, pool_size: usize) -> Self {
        self.batch_size = batch_size;
        self.pool_size = pool_size;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_jitter(mut self, jitter: f64, retry_jitter: f64) -> Self {
        self.jitter = (jitter, retry_jitter);
        self
    }

    /// Score `points`, record them and refit the surrogate on everything
    /// observed so far.
    ///
    /// Observations are kept even when the refit fails, so the caller can
    /// still fall back to [`best`](Self::best).
    pub fn observe(&mut self, points: &[PlanarPoint]) -> Result<(), PlannerError> {
        let scorer = self.scorer;
        let scores = points
            .par_iter()
            .map(|p| scorer.objective(*p))
            .collect::<Result<Vec<f64>, PlannerError>>()?;

        self.observations.extend(
            points
                .iter()
                .zip(scores)
                .map(|(point, score)| Observation { point: *point, score }),
        );

        let inputs: Vec<PlanarPoint> = self.observations.iter().map(|o| o.point).collect();
        let targets: Vec<f64> = self.observations.iter().map(|o| o.score).collect();
        let (jitter, retry_jitter) = self.jitter;
        self.model = Some(GaussianProcess::fit_with_jitter(
            &self.bounds,
            &inputs,
            &targets,
            jitter,
            retry_jitter,
        )?);
        Ok(())
    }

    /// Top `count` of a fresh quasi-random pool, ranked by the acquisition
    /// rule under the current surrogate.
    ///
    /// Before the first fit there is nothing to rank by and the pool is
    /// returned in generation order.
    pub fn suggest(&mut self, count: usize, pool_size: usize) -> Vec<PlanarPoint> {
        let pool = self.sampler.generate(&self.bounds, pool_size.max(count));

        let Some(model) = &self.model else {
            return pool.into_iter().take(count).collect();
        };

        let predictions = model.predict_many(&pool);
        self.acquisition
            .rank(&predictions)
            .into_iter()
            .take(count)
            .map(|i| pool[i])
            .collect()
    }

    /// Observe `initial` in round zero, then alternate suggest/observe for
    /// the remaining `rounds - 1` rounds.
    pub fn run(&mut self, initial: &[PlanarPoint], rounds: usize) -> Result<(), PlannerError> {
        for round in 0..rounds {
            if round == 0 {
                self.observe(initial)?;
            } else {
                let batch = self.suggest(self.batch_size, self.pool_size);
                self.observe(&batch)?;
            }

            debug!(
                round,
                observations = self.observations.len(),
                best = self.best(1).first().map(|o| o.score),
                length_scale = self.model.as_ref().map(|m| m.length_scale()),
                "surrogate round complete"
            );
        }
        Ok(())
    }

    /// The `n` highest-scoring observations, best first; ties keep the
    /// earliest observation first.
    pub fn best(&self, n: usize) -> Vec<Observation> {
        let mut ranked = self.observations.clone();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(n);
        ranked
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn model(&self) -> Option<&GaussianProcess> {
        self.model.as_ref()
    }
}
