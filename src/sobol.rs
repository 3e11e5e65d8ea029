//! Scrambled two-dimensional Sobol sequences.
//!
//! Every batch is drawn with a fresh random linear matrix scramble plus a
//! digital shift, so consecutive batches cover the box differently while
//! each one keeps the low-discrepancy structure of the base sequence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::PlanarPoint;

/// Bits of precision per coordinate.
const BITS: usize = 32;

/// Largest batch a single draw will produce.
const MAX_BATCH: usize = 1 << 24;

/// Axis-aligned rectangle in planar meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: PlanarPoint,
    pub max: PlanarPoint,
}

impl BoundingBox {
    pub fn new(min: PlanarPoint, max: PlanarPoint) -> Self {
        Self { min, max }
    }

    /// Extent of `points` grown by `margin` on every side.
    pub fn around(points: &[PlanarPoint], margin: f64) -> Option<Self> {
        let first = points.first()?;
        let (mut min, mut max) = (*first, *first);
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self::new(
            PlanarPoint::new(min.x - margin, min.y - margin),
            PlanarPoint::new(max.x + margin, max.y + margin),
        ))
    }

    /// Square of half-width `half_width` centered on `center`.
    pub fn centered(center: PlanarPoint, half_width: f64) -> Self {
        Self::new(
            PlanarPoint::new(center.x - half_width, center.y - half_width),
            PlanarPoint::new(center.x + half_width, center.y + half_width),
        )
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn contains(&self, point: &PlanarPoint) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Map a point of the unit square into the box.
    pub fn scale(&self, unit: [f64; 2]) -> PlanarPoint {
        PlanarPoint::new(
            self.min.x + unit[0] * self.width(),
            self.min.y + unit[1] * self.height(),
        )
    }
}

/// Direction numbers of the first two Sobol dimensions.
///
/// Dimension one is the van der Corput sequence; dimension two uses the
/// primitive polynomial `x + 1` with initial value `m1 = 1`.
fn direction_numbers() -> [[u32; BITS]; 2] {
    let mut dirs = [[0u32; BITS]; 2];
    for k in 0..BITS {
        dirs[0][k] = 1u32 << (BITS - 1 - k);
    }
    dirs[1][0] = 1u32 << (BITS - 1);
    for k in 1..BITS {
        let prev = dirs[1][k - 1];
        dirs[1][k] = prev ^ (prev >> 1);
    }
    dirs
}

/// Seedable generator of scrambled Sobol batches.
#[derive(Debug, Clone)]
pub struct SobolSampler {
    rng: StdRng,
}

impl SobolSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Number of points actually produced for a request of `count`.
    pub fn batch_size(count: usize) -> usize {
        count.clamp(1, MAX_BATCH).next_power_of_two()
    }

    /// Draw `batch_size(count)` points of the unit square.
    pub fn sample_unit(&mut self, count: usize) -> Vec<[f64; 2]> {
        let n = Self::batch_size(count);
        let base = direction_numbers();

        let mut dirs = [[0u32; BITS]; 2];
        let mut shift = [0u32; 2];
        for dim in 0..2 {
            let matrix = self.scramble_matrix();
            for k in 0..BITS {
                dirs[dim][k] = apply_matrix(&matrix, base[dim][k]);
            }
            shift[dim] = self.rng.random::<u32>();
        }

        let norm = 1.0 / (1u64 << BITS) as f64;
        let mut state = shift;
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            out.push([state[0] as f64 * norm, state[1] as f64 * norm]);
            // Gray-code order: flip the direction of the lowest zero bit.
            let bit = (i + 1).trailing_zeros() as usize;
            if bit < BITS {
                state[0] ^= dirs[0][bit];
                state[1] ^= dirs[1][bit];
            }
        }
        out
    }

    /// Draw `batch_size(count)` points filling `bounds`.
    pub fn generate(&mut self, bounds: &BoundingBox, count: usize) -> Vec<PlanarPoint> {
        self.sample_unit(count)
            .into_iter()
            .map(|u| bounds.scale(u))
            .collect()
    }

    /// Random lower-triangular bit matrix with unit diagonal.
    ///
    /// Row `i` acts on bit `i` counted from the most significant end.
    fn scramble_matrix(&mut self) -> [u32; BITS] {
        let mut rows = [0u32; BITS];
        for (i, row) in rows.iter_mut().enumerate() {
            let diagonal = 1u32 << (BITS - 1 - i);
            let above = if i == 0 { 0 } else { u32::MAX << (BITS - i) };
            *row = (self.rng.random::<u32>() & above) | diagonal;
        }
        rows
    }
}

fn apply_matrix(rows: &[u32; BITS], value: u32) -> u32 {
    let mut out = 0u32;
    for (i, row) in rows.iter().enumerate() {
        if (row & value).count_ones() % 2 == 1 {
            out |= 1u32 << (BITS - 1 - i);
        }
    }
    out
}
