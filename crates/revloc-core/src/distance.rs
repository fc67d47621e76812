//! Great-circle distance between two coordinates.

use crate::reseller::Coordinates;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometers, rounded to one decimal place.
///
/// Never panics. Returns [`f64::INFINITY`] when either coordinate is NaN or
/// outside the valid latitude/longitude ranges, so callers can drop the
/// candidate with [`is_known_distance`] instead of handling an error.
#[must_use]
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    if !from.is_valid() || !to.is_valid() {
        return f64::INFINITY;
    }

    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let dlat = (to.lat - from.lat).to_radians();
    let dlng = (to.lng - from.lng).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    // Rounding can push `a` past 1.0 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    let distance = EARTH_RADIUS_KM * c;

    if distance.is_finite() {
        (distance * 10.0).round() / 10.0
    } else {
        f64::INFINITY
    }
}

/// Whether a value returned by [`haversine_km`] is usable for ranking.
#[must_use]
pub fn is_known_distance(distance: f64) -> bool {
    distance.is_finite() && distance >= 0.0
}
