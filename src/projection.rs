//! Equirectangular projection between lat/lon and local planar meters.
//!
//! Accurate enough for city-scale distances around the reference latitude,
//! which is all the scoring radius needs.

use crate::model::{GeoPoint, PlanarPoint};
use crate::traits::Projection;

/// Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Equirectangular projection centered on a reference latitude.
///
/// `x` grows eastward and `y` northward, both in meters from the
/// equator/prime-meridian origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquirectangularProjection {
    /// Reference latitude in degrees used for the longitude scale.
    pub ref_lat: f64,
}

impl EquirectangularProjection {
    pub fn new(ref_lat: f64) -> Self {
        Self { ref_lat }
    }

    /// Projection around the mean latitude of `points`, or `None` when empty.
    pub fn from_mean_latitude(points: &[GeoPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let sum: f64 = points.iter().map(|p| p.lat).sum();
        Some(Self::new(sum / points.len() as f64))
    }

    fn lon_scale(&self) -> f64 {
        EARTH_RADIUS_M * self.ref_lat.to_radians().cos()
    }
}

impl Projection for EquirectangularProjection {
    fn to_planar(&self, point: GeoPoint) -> PlanarPoint {
        PlanarPoint::new(
            self.lon_scale() * point.lon.to_radians(),
            EARTH_RADIUS_M * point.lat.to_radians(),
        )
    }

    fn to_geographic(&self, point: PlanarPoint) -> GeoPoint {
        GeoPoint::new(
            (point.y / EARTH_RADIUS_M).to_degrees(),
            (point.x / self.lon_scale()).to_degrees(),
        )
    }
}
