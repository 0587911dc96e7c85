//! Great-circle nearest-neighbor search over ZIP coordinates.
//!
//! Points are placed on the unit sphere and bulk-loaded into an R-tree.
//! Straight-line (chord) distance between unit vectors grows monotonically
//! with the great-circle angle, so the tree's Euclidean nearest-neighbor
//! order is the great-circle order. Reported distances use the haversine
//! formula on a sphere of mean Earth radius.

mod geometry;
mod index;

// Re-export public API
pub use geometry::{haversine_km, unit_vector};
pub use index::{nearest_brute_force, Neighbor, SpatialIndex};
