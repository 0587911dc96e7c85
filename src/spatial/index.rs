//! R-tree backed nearest-neighbor index.

use log::{debug, warn};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use super::geometry::{chord_for_km, haversine_km, unit_vector};
use crate::error_handling::QueryError;
use crate::ingest::{is_valid_coordinate, Point};

/// Relative slack applied to chord-space cutoffs so that rounding between
/// chord and haversine arithmetic never drops a candidate.
const CHORD_SLACK: f64 = 1e-9;

/// Absolute chord slack, about 6 micrometers on the ground. Chords between
/// near-coincident points come from subtracting nearly equal unit vectors
/// and carry an absolute error of a few ulps of 1.0.
const CHORD_ABS_SLACK: f64 = 1e-12;

/// A point on the unit sphere tagged with its position in the input slice.
#[derive(Debug, Clone, Copy)]
struct IndexedPoint {
    ordinal: usize,
    xyz: [f64; 3],
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.xyz)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.xyz[0] - point[0];
        let dy = self.xyz[1] - point[1];
        let dz = self.xyz[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

/// A query hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the matched point in the slice the index was built from
    pub ordinal: usize,
    /// Great-circle distance from the query coordinate
    pub distance_km: f64,
}

/// Immutable nearest-neighbor index over a point set.
#[derive(Debug)]
pub struct SpatialIndex {
    tree: RTree<IndexedPoint>,
    points: Vec<Point>,
}

impl SpatialIndex {
    /// Builds the index, consuming the point set.
    ///
    /// Ordinals follow the input order. Points with non-finite or
    /// out-of-range coordinates keep their ordinal but are never returned.
    pub fn build(points: Vec<Point>) -> Self {
        let mut skipped = 0usize;
        let indexed: Vec<IndexedPoint> = points
            .iter()
            .enumerate()
            .filter_map(|(ordinal, p)| {
                if p.is_valid() {
                    Some(IndexedPoint {
                        ordinal,
                        xyz: unit_vector(p.latitude, p.longitude),
                    })
                } else {
                    skipped += 1;
                    None
                }
            })
            .collect();

        if skipped > 0 {
            warn!(
                "Skipped {} of {} points with invalid coordinates while building spatial index",
                skipped,
                points.len()
            );
        }
        debug!("Spatial index built over {} points", indexed.len());

        Self {
            tree: RTree::bulk_load(indexed),
            points,
        }
    }

    /// Number of points the index was built from, including skipped ones.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The point at `ordinal` in the original input.
    pub fn point(&self, ordinal: usize) -> Option<&Point> {
        self.points.get(ordinal)
    }

    /// Returns up to `k` points within `radius_km` of `(lat, long)`.
    ///
    /// Results are sorted by ascending great-circle distance; equal distances
    /// keep input order. The radius is inclusive.
    ///
    /// # Errors
    ///
    /// `QueryError::InvalidRadius` if `radius_km` is not a positive number,
    /// `QueryError::InvalidCoordinate` if the query coordinate is not a valid
    /// latitude/longitude. An empty index or `k == 0` is not an error and
    /// yields no neighbors.
    pub fn nearest(
        &self,
        lat: f64,
        long: f64,
        k: usize,
        radius_km: f64,
    ) -> Result<Vec<Neighbor>, QueryError> {
        validate_query(lat, long, radius_km)?;
        if k == 0 || self.tree.size() == 0 {
            return Ok(Vec::new());
        }

        let query = unit_vector(lat, long);
        let max_distance_2 = padded(chord_for_km(radius_km)).powi(2);

        let mut found: Vec<Neighbor> = Vec::with_capacity(k);
        // Once k hits are in hand, keep reading only candidates tied with the k-th
        let mut cutoff_2: Option<f64> = None;

        for (entry, distance_2) in self.tree.nearest_neighbor_iter_with_distance_2(&query) {
            if distance_2 > max_distance_2 || cutoff_2.is_some_and(|c| distance_2 > c) {
                break;
            }
            let p = &self.points[entry.ordinal];
            let distance_km = haversine_km(lat, long, p.latitude, p.longitude);
            if distance_km <= radius_km {
                found.push(Neighbor {
                    ordinal: entry.ordinal,
                    distance_km,
                });
                if cutoff_2.is_none() && found.len() == k {
                    cutoff_2 = Some(padded(distance_2.sqrt()).powi(2));
                }
            }
        }

        sort_neighbors(&mut found);
        found.truncate(k);
        Ok(found)
    }
}

/// Linear-scan reference for [`SpatialIndex::nearest`].
///
/// Computes the great-circle distance to every valid point. O(N) per query;
/// intended for verification and tiny datasets.
pub fn nearest_brute_force(
    points: &[Point],
    lat: f64,
    long: f64,
    k: usize,
    radius_km: f64,
) -> Result<Vec<Neighbor>, QueryError> {
    validate_query(lat, long, radius_km)?;
    let mut found: Vec<Neighbor> = points
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_valid())
        .map(|(ordinal, p)| Neighbor {
            ordinal,
            distance_km: haversine_km(lat, long, p.latitude, p.longitude),
        })
        .filter(|n| n.distance_km <= radius_km)
        .collect();
    sort_neighbors(&mut found);
    found.truncate(k);
    Ok(found)
}

fn validate_query(lat: f64, long: f64, radius_km: f64) -> Result<(), QueryError> {
    if !(radius_km.is_finite() && radius_km > 0.0) {
        return Err(QueryError::InvalidRadius(radius_km));
    }
    if !is_valid_coordinate(lat, long) {
        return Err(QueryError::InvalidCoordinate { lat, long });
    }
    Ok(())
}

fn sort_neighbors(neighbors: &mut [Neighbor]) {
    neighbors.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then(a.ordinal.cmp(&b.ordinal))
    });
}

fn padded(chord: f64) -> f64 {
    chord * (1.0 + CHORD_SLACK) + CHORD_ABS_SLACK
}
