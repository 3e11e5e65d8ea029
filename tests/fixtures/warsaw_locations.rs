//! Approximate Warsaw locations for realistic test fixtures.
//!
//! Residential entries are block centroids with a rough head count; store
//! entries are shop fronts. Coordinates are rounded to about ten meters.

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use site_planner::model::{GeoPoint, PlanarPoint, ResidentPoint};
use site_planner::projection::{EARTH_RADIUS_M, EquirectangularProjection};
use site_planner::traits::Projection;

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lon: f64) -> Self {
        Self { name, lat, lon }
    }

    pub fn geo(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// A residential block and its estimated residents.
#[derive(Debug, Clone)]
pub struct Block {
    pub location: Location,
    pub residents: f64,
}

const fn block(name: &'static str, lat: f64, lon: f64, residents: f64) -> Block {
    Block {
        location: Location::new(name, lat, lon),
        residents,
    }
}

// ============================================================================
// Residential Blocks
// ============================================================================

pub const BLOCKS: &[Block] = &[
    // Muranow
    block("Muranow - Nowolipki", 52.2456, 20.9946, 420.0),
    block("Muranow - Dzielna", 52.2471, 20.9912, 380.0),
    block("Muranow - Anielewicza", 52.2489, 20.9938, 350.0),
    block("Muranow - Stawki", 52.2522, 20.9953, 300.0),
    // Mokotow
    block("Mokotow - Rakowiecka", 52.2034, 21.0089, 280.0),
    block("Mokotow - Narbutta", 52.2061, 21.0132, 240.0),
    block("Mokotow - Madalinskiego", 52.2019, 21.0170, 260.0),
    block("Mokotow - Woronicza", 52.1911, 21.0120, 410.0),
    block("Mokotow - Odynca", 52.1938, 21.0168, 330.0),
    // Praga
    block("Praga - Zabkowska", 52.2510, 21.0440, 220.0),
    block("Praga - Targowa", 52.2531, 21.0365, 260.0),
    block("Praga - Grochowska", 52.2440, 21.0642, 300.0),
    block("Praga - Kaweczynska", 52.2574, 21.0492, 190.0),
    // Ochota
    block("Ochota - Grojecka", 52.2195, 20.9812, 360.0),
    block("Ochota - Wawelska", 52.2148, 20.9878, 310.0),
    block("Ochota - Kaliska", 52.2172, 20.9738, 270.0),
    // Wola
    block("Wola - Chlodna", 52.2381, 20.9901, 230.0),
    block("Wola - Wolska", 52.2330, 20.9650, 290.0),
    block("Wola - Leszno", 52.2412, 20.9774, 340.0),
    // Powisle
    block("Powisle - Dobra", 52.2408, 21.0260, 150.0),
    block("Powisle - Solec", 52.2318, 21.0340, 170.0),
];

// ============================================================================
// Existing Convenience Stores
// ============================================================================

pub const STORES: &[Location] = &[
    Location::new("Store - Nowolipki", 52.2449, 20.9960),
    Location::new("Store - Rakowiecka", 52.2040, 21.0100),
    Location::new("Store - Targowa", 52.2525, 21.0375),
    Location::new("Store - Grojecka", 52.2190, 20.9830),
];

// ============================================================================
// Helpers
// ============================================================================

/// Projection around the mean block latitude.
pub fn warsaw_projection() -> EquirectangularProjection {
    let geo: Vec<GeoPoint> = BLOCKS.iter().map(|b| b.location.geo()).collect();
    EquirectangularProjection::from_mean_latitude(&geo).expect("fixture has blocks")
}

pub fn warsaw_residents(projection: &EquirectangularProjection) -> Vec<ResidentPoint> {
    BLOCKS
        .iter()
        .map(|b| ResidentPoint {
            position: projection.to_planar(b.location.geo()),
            weight: b.residents,
        })
        .collect()
}

pub fn warsaw_stores(projection: &EquirectangularProjection) -> Vec<PlanarPoint> {
    STORES.iter().map(|s| projection.to_planar(s.geo())).collect()
}

/// Deterministic pseudo-random resident cloud inside `[0, side]^2`.
pub fn scattered_residents(count: usize, side: f64, seed: u64) -> Vec<ResidentPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let x = rng.random_range(0.0..side);
            let y = rng.random_range(0.0..side);
            let weight = rng.random_range(10.0..100.0);
            ResidentPoint::new(x, y, weight)
        })
        .collect()
}

/// Great-circle distance between two points in meters.
pub fn haversine_m(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lon = (to.lon - from.lon).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}
