//! Geohash codec
//!
//! The query engine only consumes geohashes; encoding and decoding are
//! delegated to the `geohash` crate behind the [`GeohashCodec`] trait so
//! tests and alternative codecs can be swapped in.

use anyhow::{Result, anyhow};
use ::geohash::Coord;

use crate::models::Location;

/// Default precision for encoded geohashes (cells of roughly 38 m × 19 m)
pub const DEFAULT_PRECISION: usize = 8;

/// Maximum precision supported by the encoder
pub const MAX_PRECISION: usize = 12;

/// Pure geohash encode/decode functions
pub trait GeohashCodec: Send + Sync {
    /// Encode a coordinate at the given precision
    fn encode(&self, latitude: f64, longitude: f64, precision: usize) -> Result<String>;

    /// Decode a geohash to the centre of its cell
    fn decode(&self, geohash: &str) -> Result<Location>;
}

/// Base-32 geohash codec backed by the `geohash` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct Geohasher;

impl GeohashCodec for Geohasher {
    fn encode(&self, latitude: f64, longitude: f64, precision: usize) -> Result<String> {
        if precision == 0 || precision > MAX_PRECISION {
            return Err(anyhow!(
                "precision must be between 1 and {MAX_PRECISION}, got {precision}"
            ));
        }

        ::geohash::encode(
            Coord {
                x: longitude,
                y: latitude,
            },
            precision,
        )
        .map_err(|e| anyhow!("failed to encode ({latitude}, {longitude}): {e}"))
    }

    fn decode(&self, geohash: &str) -> Result<Location> {
        if geohash.is_empty() {
            return Err(anyhow!("geohash is empty"));
        }

        let (centre, _lon_err, _lat_err) =
            ::geohash::decode(geohash).map_err(|e| anyhow!("failed to decode '{geohash}': {e}"))?;

        Ok(Location {
            latitude: centre.y,
            longitude: centre.x,
            geohash: geohash.to_string(),
        })
    }
}
