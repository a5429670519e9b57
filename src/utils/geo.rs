//! Great-circle helpers for the durable store's distance ranking

use crate::models::BoundingBox;

/// Mean Earth radius in metres
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Haversine distance between two points in metres
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Bounding box that encloses every point within `metres` of a coordinate.
///
/// Used as an index-friendly prefilter before exact distance ranking. The
/// longitude half-width is that of the spherical cap, `asin(sin d / cos lat)`.
/// When the cap reaches a pole it spans every longitude. The returned box may
/// extend past ±180°; see [`search_windows`] for the wrapped form.
pub fn search_window(latitude: f64, longitude: f64, metres: f64) -> BoundingBox {
    let angular = metres / EARTH_RADIUS_M;
    let lat_delta = angular.to_degrees();
    let min_lat = latitude - lat_delta;
    let max_lat = latitude + lat_delta;

    if min_lat <= -90.0 || max_lat >= 90.0 || angular >= std::f64::consts::FRAC_PI_2 {
        return BoundingBox::new(min_lat.max(-90.0), max_lat.min(90.0), -180.0, 180.0);
    }

    let lon_delta = (angular.sin() / latitude.to_radians().cos())
        .asin()
        .to_degrees();

    BoundingBox::new(min_lat, max_lat, longitude - lon_delta, longitude + lon_delta)
}

/// [`search_window`] split at the antimeridian into boxes inside ±180°.
///
/// Returns one box, or two when the window crosses ±180°.
pub fn search_windows(latitude: f64, longitude: f64, metres: f64) -> Vec<BoundingBox> {
    let window = search_window(latitude, longitude, metres);
    let (min_lat, max_lat) = (window.min_lat, window.max_lat);

    if window.max_lon - window.min_lon >= 360.0 {
        vec![BoundingBox::new(min_lat, max_lat, -180.0, 180.0)]
    } else if window.min_lon < -180.0 {
        vec![
            BoundingBox::new(min_lat, max_lat, -180.0, window.max_lon),
            BoundingBox::new(min_lat, max_lat, window.min_lon + 360.0, 180.0),
        ]
    } else if window.max_lon > 180.0 {
        vec![
            BoundingBox::new(min_lat, max_lat, window.min_lon, 180.0),
            BoundingBox::new(min_lat, max_lat, -180.0, window.max_lon - 360.0),
        ]
    } else {
        vec![window]
    }
}
