//! Sequential store placement.
//!
//! Stores are placed one per round. Each round searches the plane with a
//! fresh surrogate optimizer against the current store set, refines the
//! winner locally and appends it to the store set, so later rounds are
//! penalized for crowding earlier placements.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::acquisition::{DEFAULT_EXPLORATION, UpperConfidenceBound};
use crate::error::PlannerError;
use crate::model::{Observation, PlanarPoint, Placement, PlacementRecord, ResidentPoint, StorePoint};
use crate::optimizer::{DEFAULT_BATCH_SIZE, DEFAULT_POOL_SIZE, SurrogateOptimizer};
use crate::score::{ScoreConfig, Scorer};
use crate::sobol::{BoundingBox, SobolSampler};
use crate::spatial::SpatialIndex;
use crate::traits::{Acquisition, Projection, RadiusIndex};

#[derive(Debug, Clone)]
pub struct SolveOptions {
    pub score: ScoreConfig,
    /// UCB weight of the surrogate's standard deviation.
    pub exploration: f64,
    /// Quasi-random candidates observed in the first inner round.
    pub initial_candidates: usize,
    /// Candidates ranked by the acquisition rule per suggestion.
    pub pool_size: usize,
    /// Suggested candidates evaluated per later inner round.
    pub batch_size: usize,
    /// Surrogate rounds per placement, including the initial one.
    pub inner_rounds: usize,
    /// Expansion of the resident extent for the search box, in meters.
    pub margin: f64,
    /// Half-width of the local refinement window, in meters.
    pub refine_half_width: f64,
    /// Quasi-random samples drawn inside the refinement window.
    pub refine_samples: usize,
    pub seed: u64,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            score: ScoreConfig::default(),
            exploration: DEFAULT_EXPLORATION,
            initial_candidates: 300,
            pool_size: DEFAULT_POOL_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            inner_rounds: 3,
            margin: 1_000.0,
            refine_half_width: 1_000.0,
            refine_samples: 1_024,
            seed: 42,
        }
    }
}

impl SolveOptions {
    pub fn validate(&self) -> Result<(), PlannerError> {
        self.score.validate()?;

        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(invalid(format!("exploration must be non-negative, got {}", self.exploration)));
        }
        for (name, value) in [
            ("initial_candidates", self.initial_candidates),
            ("pool_size", self.pool_size),
            ("batch_size", self.batch_size),
            ("inner_rounds", self.inner_rounds),
            ("refine_samples", self.refine_samples),
        ] {
            if value == 0 {
                return Err(invalid(format!("{} must be at least 1", name)));
            }
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(invalid(format!("margin must be non-negative, got {}", self.margin)));
        }
        if !self.refine_half_width.is_finite() || self.refine_half_width < 0.0 {
            return Err(invalid(format!(
                "refine_half_width must be non-negative, got {}",
                self.refine_half_width
            )));
        }
        Ok(())
    }
}

fn invalid(message: String) -> PlannerError {
    PlannerError::InvalidConfig(message)
}

#[derive(Debug, Clone)]
pub struct PlannerResult {
    /// Accepted stores in placement order, round 1 first.
    pub placements: Vec<Placement>,
    /// Existing stores followed by every placement.
    pub stores: Vec<StorePoint>,
}

impl PlannerResult {
    /// Output records with positions projected back to lat/lon.
    pub fn to_records<P: Projection>(&self, projection: &P) -> Vec<PlacementRecord> {
        self.placements
            .iter()
            .map(|placement| {
                let geo = projection.to_geographic(placement.position);
                PlacementRecord {
                    lat: geo.lat,
                    lon: geo.lon,
                    x: placement.position.x,
                    y: placement.position.y,
                    customer_proximity: placement.score.customer_proximity,
                    store_proximity: placement.score.store_proximity,
                    ratio: placement.score.ratio,
                    total_score: placement.score.total,
                    round: placement.round,
                }
            })
            .collect()
    }
}

/// Place `count` new stores among `residents`, avoiding `existing_stores`.
pub fn solve(
    residents: &[ResidentPoint],
    existing_stores: &[StorePoint],
    count: usize,
    options: SolveOptions,
) -> Result<PlannerResult, PlannerError> {
    options.validate()?;
    if count == 0 {
        return Err(invalid("placement count must be at least 1".to_string()));
    }
    validate_inputs(residents, existing_stores)?;

    let positions: Vec<PlanarPoint> = residents.iter().map(|r| r.position).collect();
    let weights: Vec<f64> = residents.iter().map(|r| r.weight).collect();
    let resident_index = SpatialIndex::build(&positions);
    let bounds = BoundingBox::around(&positions, options.margin)
        .ok_or_else(|| PlannerError::DegenerateInput("no residents".to_string()))?;

    let mut seeds = StdRng::seed_from_u64(options.seed);
    let mut stores: Vec<StorePoint> = existing_stores.to_vec();
    let mut store_index = SpatialIndex::build(&stores);
    let mut placements = Vec::with_capacity(count);

    for round in 1..=count {
        let round_seed: u64 = seeds.random();
        let mut sampler = SobolSampler::new(round_seed);

        let scorer = Scorer::new(&resident_index, &weights, &store_index, &options.score)?;
        let initial = sampler.generate(&bounds, options.initial_candidates);
        let optimizer = SurrogateOptimizer::new(
            scorer,
            UpperConfidenceBound::new(options.exploration),
            bounds,
            round_seed.rotate_left(17),
        )
        .with_batch(options.batch_size, options.pool_size);
        let nominee = search_round(optimizer, &initial, options.inner_rounds, round)?;
        let refined = refine(scorer, nominee, &mut sampler, &options)?;
        let selection_score = scorer.evaluate(refined.point)?;

        stores.push(refined.point);
        store_index = SpatialIndex::build(&stores);

        let after = Scorer::new(&resident_index, &weights, &store_index, &options.score)?;
        let score = after.evaluate(refined.point)?;

        if resident_index.query_radius(refined.point, options.score.max_radius).is_empty() {
            warn!(round, x = refined.point.x, y = refined.point.y, "placement has no residents in range");
        }
        info!(
            round,
            x = refined.point.x,
            y = refined.point.y,
            total = score.total,
            selection_total = selection_score.total,
            "placed store"
        );

        placements.push(Placement {
            round,
            position: refined.point,
            score,
            selection_score,
        });
    }

    Ok(PlannerResult { placements, stores })
}

fn validate_inputs(residents: &[ResidentPoint], stores: &[StorePoint]) -> Result<(), PlannerError> {
    if residents.is_empty() {
        return Err(PlannerError::DegenerateInput("resident set is empty".to_string()));
    }
    for (index, resident) in residents.iter().enumerate() {
        if !resident.position.is_finite() {
            return Err(PlannerError::NonFinite {
                what: "resident coordinate",
                index,
            });
        }
        if !resident.weight.is_finite() {
            return Err(PlannerError::NonFinite {
                what: "resident weight",
                index,
            });
        }
        if resident.weight <= 0.0 {
            return Err(PlannerError::InvalidWeight {
                index,
                weight: resident.weight,
            });
        }
    }
    if let Some(index) = stores.iter().position(|s| !s.is_finite()) {
        return Err(PlannerError::NonFinite {
            what: "store coordinate",
            index,
        });
    }
    Ok(())
}

// ============================================================================
// Round Stages
// ============================================================================

/// Run the surrogate search for one round and return its best observation.
///
/// A surrogate fit failure after the first batch falls back to the best
/// observation scored so far; it only surfaces when nothing was observed.
fn search_round<I, A>(
    mut optimizer: SurrogateOptimizer<'_, I, A>,
    initial: &[PlanarPoint],
    inner_rounds: usize,
    round: usize,
) -> Result<Observation, PlannerError>
where
    I: RadiusIndex + Sync,
    A: Acquisition,
{
    match optimizer.run(initial, inner_rounds) {
        Ok(()) => {}
        Err(PlannerError::SurrogateFit(reason)) if !optimizer.observations().is_empty() => {
            warn!(
                round,
                observations = optimizer.observations().len(),
                %reason,
                "surrogate fit failed, using best observation so far"
            );
        }
        Err(err) => return Err(err),
    }

    optimizer
        .best(1)
        .into_iter()
        .next()
        .ok_or_else(|| PlannerError::SurrogateFit("no observations".to_string()))
}

/// Dense quasi-random search in a small window around `nominee`.
///
/// Keeps the nominee unless a sample strictly beats it.
fn refine<I: RadiusIndex + Sync>(
    scorer: Scorer<'_, I>,
    nominee: Observation,
    sampler: &mut SobolSampler,
    options: &SolveOptions,
) -> Result<Observation, PlannerError> {
    let window = BoundingBox::centered(nominee.point, options.refine_half_width);
    let samples = sampler.generate(&window, options.refine_samples);

    let scored = samples
        .par_iter()
        .map(|p| scorer.objective(*p).map(|score| Observation { point: *p, score }))
        .collect::<Result<Vec<_>, PlannerError>>()?;

    let mut best = nominee;
    for observation in scored {
        if observation.score > best.score {
            best = observation;
        }
    }
    Ok(best)
}
