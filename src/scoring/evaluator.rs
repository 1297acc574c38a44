use super::types::{GeoPoint, Year, YearGap};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres (haversine, spherical Earth)
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = haversine(d_lat, d_lng, a.lat.to_radians(), b.lat.to_radians());
    central_angle(h) * EARTH_RADIUS_KM
}

pub fn year_difference(guessed: Year, actual: Year) -> YearGap {
    guessed.abs_diff(actual)
}

fn haversine(d_lat: f64, d_lng: f64, lat_a: f64, lat_b: f64) -> f64 {
    let sin_lat = (d_lat / 2.0).sin();
    let sin_lng = (d_lng / 2.0).sin();
    sin_lat * sin_lat + lat_a.cos() * lat_b.cos() * sin_lng * sin_lng
}

fn central_angle(h: f64) -> f64 {
    // rounding can push h a hair outside [0, 1]
    let h = h.clamp(0.0, 1.0);
    2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}
