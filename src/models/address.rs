use serde::{Deserialize, Serialize};

/// Default country code applied when the upstream record leaves it blank
pub const DEFAULT_COUNTRY: &str = "US";

/// Kilometres per degree of latitude used by the radius approximation
pub const KM_PER_DEGREE: f64 = 111.0;

/// Separator for the composite forward-geocode cache key
pub const GEOCODE_KEY_SEPARATOR: char = ':';

/// A postal address with its coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Assigned by the durable store; 0 for records not yet persisted
    pub id: i32,
    pub zipcode: String,
    pub number: String,
    pub street: String,
    pub street2: Option<String>,
    pub city: String,
    pub state: String,
    pub plus4: Option<String>,
    #[serde(default = "default_country")]
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub source: Option<String>,
    pub geohash: Option<String>,
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

impl Address {
    /// Cache key used for id-addressed entries
    pub fn id_key(&self) -> String {
        self.id.to_string()
    }

    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }
}

/// Address fields for a record that has not been persisted yet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    pub zipcode: String,
    pub number: String,
    pub street: String,
    pub street2: Option<String>,
    pub city: String,
    pub state: String,
    pub plus4: Option<String>,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub source: Option<String>,
    pub geohash: Option<String>,
}

/// Result of decoding a geohash: the centre of its cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub geohash: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Closed, axis-aligned latitude/longitude rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Square window of `tolerance` degrees on each side of a point
    pub fn window(latitude: f64, longitude: f64, tolerance: f64) -> Self {
        Self::new(
            latitude - tolerance,
            latitude + tolerance,
            longitude - tolerance,
            longitude + tolerance,
        )
    }

    /// Box enclosing a circle of `radius_km` around a point.
    ///
    /// Treats the Earth as locally flat (111 km per degree of latitude, the
    /// longitude span widened by `1 / cos(lat)`) and does not wrap at the
    /// antimeridian or the poles. Good enough for city-scale radii.
    pub fn around(latitude: f64, longitude: f64, radius_km: f64) -> Self {
        let lat_delta = radius_km / KM_PER_DEGREE;
        let lon_delta = radius_km / (KM_PER_DEGREE * latitude.to_radians().cos());

        Self::new(
            latitude - lat_delta,
            latitude + lat_delta,
            longitude - lon_delta,
            longitude + lon_delta,
        )
    }

    /// Closed containment test
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.min_lat
            && latitude <= self.max_lat
            && longitude >= self.min_lon
            && longitude <= self.max_lon
    }

    pub fn is_valid(&self) -> bool {
        [self.min_lat, self.max_lat, self.min_lon, self.max_lon]
            .iter()
            .all(|v| !v.is_nan())
            && self.min_lat <= self.max_lat
            && self.min_lon <= self.max_lon
    }
}

/// The six inputs of a forward geocode lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeocodeRequest {
    pub zipcode: String,
    pub number: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

impl GeocodeRequest {
    /// Memoization key: the six fields joined by `:` in declaration order
    pub fn cache_key(&self) -> String {
        [
            self.zipcode.as_str(),
            self.number.as_str(),
            self.street.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.country.as_str(),
        ]
        .join(&GEOCODE_KEY_SEPARATOR.to_string())
    }
}

pub fn is_valid_coordinate(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite() && longitude.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_joins_fields_in_order() {
        let request = GeocodeRequest {
            zipcode: "62701".to_string(),
            number: "1".to_string(),
            street: "Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            country: "US".to_string(),
        };
        assert_eq!(request.cache_key(), "62701:1:Main St:Springfield:IL:US");
    }

    #[test]
    fn test_radius_box_at_equator_spans_one_degree() {
        let bbox = BoundingBox::around(0.0, 0.0, 111.0);
        assert!((bbox.min_lat + 1.0).abs() < 1e-9);
        assert!((bbox.max_lat - 1.0).abs() < 1e-9);
        assert!((bbox.min_lon + 1.0).abs() < 1e-9);
        assert!((bbox.max_lon - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_radius_box_widens_longitude_away_from_equator() {
        let bbox = BoundingBox::around(60.0, 10.0, 111.0);
        // cos(60°) = 0.5, so the longitude span doubles
        assert!((bbox.max_lon - bbox.min_lon - 4.0).abs() < 1e-9);
        assert!((bbox.max_lat - bbox.min_lat - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_contains_is_closed() {
        let bbox = BoundingBox::new(10.0, 20.0, 30.0, 40.0);
        assert!(bbox.contains(10.0, 30.0));
        assert!(bbox.contains(20.0, 40.0));
        assert!(!bbox.contains(20.000001, 40.0));
    }

    #[test]
    fn test_country_defaults_when_missing() {
        let json = r#"{
            "id": 7, "zipcode": "12345", "number": "1", "street": "Main St",
            "street2": null, "city": "Town", "state": "CA", "plus4": null,
            "latitude": 1.0, "longitude": 2.0, "source": null, "geohash": null
        }"#;
        let address: Address = serde_json::from_str(json).unwrap();
        assert_eq!(address.country, "US");
    }

    #[test]
    fn test_nan_coordinates_are_invalid() {
        assert!(!is_valid_coordinate(f64::NAN, 0.0));
        assert!(!is_valid_coordinate(0.0, f64::INFINITY));
        assert!(is_valid_coordinate(-33.9, 151.2));
    }
}
