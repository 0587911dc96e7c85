//! Spherical geometry helpers.

use crate::config::EARTH_RADIUS_KM;

/// Great-circle distance in kilometers between two coordinates in degrees.
pub fn haversine_km(lat1: f64, long1: f64, lat2: f64, long2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (long2 - long1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push `a` slightly above 1 for antipodal points
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// Position of a coordinate on the unit sphere (earth-centered, earth-fixed axes).
pub fn unit_vector(lat: f64, long: f64) -> [f64; 3] {
    let phi = lat.to_radians();
    let lambda = long.to_radians();
    [phi.cos() * lambda.cos(), phi.cos() * lambda.sin(), phi.sin()]
}

/// Chord length on the unit sphere spanning a surface distance of `km`.
///
/// Saturates at the diameter (2.0) once `km` reaches half the circumference.
pub(crate) fn chord_for_km(km: f64) -> f64 {
    let angle = km / EARTH_RADIUS_KM;
    if angle >= std::f64::consts::PI {
        2.0
    } else {
        2.0 * (angle / 2.0).sin()
    }
}
