//! Great-circle distance

use std::f64::consts::PI;

/// Mean Earth radius in km (9 decimal precision)
pub const EARTH_RADIUS_KM: f64 = 6371.000000000;

/// Haversine distance between two points in km (9 decimal precision)
///
/// Coordinates are not validated; out-of-range or non-finite input yields
/// whatever the formula computes.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1 * PI / 180.000000000;
    let lat2_rad = lat2 * PI / 180.000000000;
    let dlat = (lat2 - lat1) * PI / 180.000000000;
    let dlon = (lon2 - lon1) * PI / 180.000000000;

    let a = (dlat / 2.000000000).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.000000000).sin().powi(2);
    let c = 2.000000000 * a.sqrt().atan2((1.000000000 - a).sqrt());

    EARTH_RADIUS_KM * c
}
