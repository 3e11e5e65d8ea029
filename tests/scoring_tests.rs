//! Scoring engine properties.
//!
//! Monotonicity of each component, neutral values for empty neighborhoods
//! and the two-resident reference scenario.

use site_planner::error::PlannerError;
use site_planner::model::PlanarPoint;
use site_planner::score::{
    Normalization, ScoreConfig, Scorer, customer_proximity, demand_ratio, store_proximity,
};
use site_planner::spatial::SpatialIndex;

// ============================================================================
// Helpers
// ============================================================================

fn fixed_config() -> ScoreConfig {
    ScoreConfig {
        normalization: Normalization::Fixed(1_000.0),
        ..ScoreConfig::default()
    }
}

fn distances(step: f64) -> Vec<f64> {
    (0..=20).map(|i| i as f64 * step).collect()
}

// ============================================================================
// Component Properties
// ============================================================================

#[test]
fn test_customer_proximity_non_increasing_in_distance() {
    for config in [ScoreConfig::default(), fixed_config()] {
        let mut previous = f64::INFINITY;
        for d in distances(50.0) {
            let score = customer_proximity(&[d], &[40.0], &config);
            assert!(score <= previous, "score rose at distance {}", d);
            previous = score;
        }
    }
}

#[test]
fn test_customer_proximity_non_decreasing_in_weight() {
    let config = fixed_config();
    let mut previous = f64::NEG_INFINITY;
    for w in [1.0, 2.0, 5.0, 10.0, 50.0, 100.0, 1_000.0] {
        let score = customer_proximity(&[120.0, 640.0], &[w, 30.0], &config);
        assert!(score >= previous, "score fell at weight {}", w);
        previous = score;
    }

    // Weight-sum normalization is scale free: a single resident scores the
    // same at any weight.
    let config = ScoreConfig::default();
    let light = customer_proximity(&[300.0], &[1.0], &config);
    let heavy = customer_proximity(&[300.0], &[500.0], &config);
    assert!((light - heavy).abs() < 1e-12);
}

#[test]
fn test_customer_proximity_bounded_under_weight_sum() {
    let config = ScoreConfig::default();
    for d in distances(50.0) {
        let score = customer_proximity(&[d, d / 2.0], &[70.0, 3.0], &config);
        assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
    }
}

#[test]
fn test_store_proximity_more_negative_when_closer() {
    let config = ScoreConfig::default();
    let mut previous = f64::NEG_INFINITY;
    for d in distances(50.0) {
        let score = store_proximity(&[d], &config);
        assert!(score >= previous, "penalty grew with distance at {}", d);
        assert!((-1.0..=0.0).contains(&score));
        previous = score;
    }
}

#[test]
fn test_store_proximity_zero_without_stores() {
    assert_eq!(store_proximity(&[], &ScoreConfig::default()), 0.0);
}

#[test]
fn test_ratio_sentinel_and_cap() {
    let config = ScoreConfig::default();
    assert_eq!(demand_ratio(0.0, 0, &config), 1.0);
    assert_eq!(demand_ratio(5_000.0, 0, &config), 1.0);
    for demand in [0.0, 100.0, 800.0, 1_600.0, 1e9] {
        for stores in 1..5 {
            let ratio = demand_ratio(demand, stores, &config);
            assert!(ratio <= 1.0 && ratio >= 0.0);
        }
    }
}

// ============================================================================
// Scorer Scenarios
// ============================================================================

#[test]
fn test_two_resident_scenario() {
    let residents = SpatialIndex::build(&[PlanarPoint::new(0.0, 0.0), PlanarPoint::new(500.0, 0.0)]);
    let weights = [100.0, 100.0];
    let stores = SpatialIndex::build(&[PlanarPoint::new(2_000.0, 0.0)]);
    let config = ScoreConfig::default();
    let scorer = Scorer::new(&residents, &weights, &stores, &config).unwrap();

    let score = scorer.evaluate(PlanarPoint::new(100.0, 0.0)).unwrap();
    assert!((0.0..=1.0).contains(&score.customer_proximity));
    assert!((0.0..=1.0).contains(&score.ratio));
    assert_eq!(score.store_proximity, 0.0);
    assert_eq!(score.ratio, 1.0);

    let expected = ((1.0 - 0.1f64.cbrt()) + (1.0 - 0.4f64.cbrt())) / 2.0;
    assert!((score.customer_proximity - expected).abs() < 1e-12);
    assert_eq!(
        score.total,
        score.bias + score.customer_proximity + score.store_proximity + score.ratio
    );
}

#[test]
fn test_ratio_uses_customer_radius_residents() {
    let residents = SpatialIndex::build(&[PlanarPoint::new(0.0, 0.0), PlanarPoint::new(3_000.0, 0.0)]);
    let weights = [400.0, 10_000.0];
    let stores = SpatialIndex::build(&[PlanarPoint::new(200.0, 0.0)]);
    let config = ScoreConfig::default();
    let scorer = Scorer::new(&residents, &weights, &stores, &config).unwrap();

    // Only the first resident is in range: 400 / 1 store / 800 expected.
    let score = scorer.evaluate(PlanarPoint::new(0.0, 0.0)).unwrap();
    assert_eq!(score.ratio, 0.5);
    assert!(score.store_proximity < 0.0);
}

#[test]
fn test_empty_neighborhood_is_neutral() {
    let residents = SpatialIndex::build(&[PlanarPoint::new(0.0, 0.0)]);
    let stores = SpatialIndex::build(&[]);
    let config = ScoreConfig::default();
    let scorer = Scorer::new(&residents, &[10.0], &stores, &config).unwrap();

    let score = scorer.evaluate(PlanarPoint::new(50_000.0, 50_000.0)).unwrap();
    assert_eq!(score.customer_proximity, 0.0);
    assert_eq!(score.store_proximity, 0.0);
    assert_eq!(score.ratio, 1.0);
}

#[test]
fn test_stores_without_residents_zero_ratio() {
    let residents = SpatialIndex::build(&[PlanarPoint::new(0.0, 0.0)]);
    let stores = SpatialIndex::build(&[PlanarPoint::new(10_000.0, 0.0)]);
    let config = ScoreConfig::default();
    let scorer = Scorer::new(&residents, &[10.0], &stores, &config).unwrap();

    let score = scorer.evaluate(PlanarPoint::new(10_100.0, 0.0)).unwrap();
    assert_eq!(score.customer_proximity, 0.0);
    assert_eq!(score.ratio, 0.0);
    assert!(score.store_proximity < -0.9);
}

#[test]
fn test_coincident_residents_and_stores() {
    let spot = PlanarPoint::new(250.0, 250.0);
    let residents = SpatialIndex::build(&vec![spot; 50]);
    let weights = vec![20.0; 50];
    let stores = SpatialIndex::build(&vec![spot; 3]);
    let config = ScoreConfig::default();
    let scorer = Scorer::new(&residents, &weights, &stores, &config).unwrap();

    let score = scorer.evaluate(spot).unwrap();
    assert_eq!(score.customer_proximity, 1.0);
    assert_eq!(score.store_proximity, -1.0);
    // 1000 residents over 3 stores against 800 expected
    assert!((score.ratio - 1_000.0 / 3.0 / 800.0).abs() < 1e-12);
}

#[test]
fn test_nan_candidate_is_an_error() {
    let residents = SpatialIndex::build(&[PlanarPoint::new(0.0, 0.0)]);
    let stores = SpatialIndex::build(&[]);
    let config = ScoreConfig::default();
    let scorer = Scorer::new(&residents, &[10.0], &stores, &config).unwrap();

    let result = scorer.evaluate(PlanarPoint::new(f64::NAN, 0.0));
    assert!(matches!(result, Err(PlannerError::NonFinite { .. })));
    assert!(scorer.objective(PlanarPoint::new(0.0, f64::INFINITY)).is_err());
}
