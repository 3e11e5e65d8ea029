//! R-tree backed point index for radius queries.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::model::PlanarPoint;
use crate::traits::RadiusIndex;

/// A planar point tagged with its position in the source slice.
#[derive(Debug, Clone, Copy)]
struct IndexedPoint {
    idx: usize,
    x: f64,
    y: f64,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// Static spatial index over a point slice.
///
/// Rebuilt from scratch whenever the point set changes; bulk loading a few
/// thousand points is cheap next to one round of scoring.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: RTree<IndexedPoint>,
    points: Vec<PlanarPoint>,
}

impl SpatialIndex {
    /// Build an index; query results refer to positions in `points`.
    ///
    /// Callers must pass finite coordinates.
    pub fn build(points: &[PlanarPoint]) -> Self {
        let indexed: Vec<IndexedPoint> = points
            .iter()
            .enumerate()
            .map(|(idx, p)| IndexedPoint { idx, x: p.x, y: p.y })
            .collect();

        Self {
            tree: RTree::bulk_load(indexed),
            points: points.to_vec(),
        }
    }

    pub fn points(&self) -> &[PlanarPoint] {
        &self.points
    }
}

impl RadiusIndex for SpatialIndex {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn position(&self, index: usize) -> PlanarPoint {
        self.points[index]
    }

    fn query_radius(&self, point: PlanarPoint, radius: f64) -> Vec<usize> {
        if !point.is_finite() || radius.is_nan() || radius < 0.0 {
            return Vec::new();
        }

        let mut hits: Vec<usize> = self
            .tree
            .locate_within_distance(point.to_array(), radius * radius)
            .map(|p| p.idx)
            .collect();
        hits.sort_unstable();
        hits
    }
}
