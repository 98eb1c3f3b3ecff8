use geo::{GeodesicDistance, Point};

/// Geodesic distance between two coordinates in kilometers.
///
/// Uses the WGS-84 ellipsoidal model (Karney's algorithm via the `geo`
/// crate), which is well behaved for identical and antipodal inputs.
///
/// # Arguments
/// * `lat1`, `lon1` - first point in degrees
/// * `lat2`, `lon2` - second point in degrees
#[inline]
pub fn geodesic_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    // geo points are (x, y) = (lon, lat)
    let a = Point::new(lon1, lat1);
    let b = Point::new(lon2, lat2);
    a.geodesic_distance(&b) / 1000.0
}

/// Round a distance to two decimals for presentation. Ranking and
/// filtering always use the unrounded value.
#[inline]
pub fn round_km(distance_km: f64) -> f64 {
    (distance_km * 100.0).round() / 100.0
}
