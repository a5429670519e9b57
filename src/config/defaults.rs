//! Configuration default values
//!
//! All defaults live here so they can be changed in one place.

// Database defaults
pub const DEFAULT_DATABASE_URL: &str = "sqlite://./data/geonimbus.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

// Cache defaults
/// Half-width in degrees of the probe window used for point lookups
pub const DEFAULT_COORDINATE_TOLERANCE: f64 = 0.0001;

// Geohash defaults
pub const DEFAULT_GEOHASH_PRECISION: usize = 8;

// Logging defaults
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_FORMAT: &str = "pretty";

// Environment overrides, e.g. GEONIMBUS_WEB__PORT=9000
pub const ENV_PREFIX: &str = "GEONIMBUS_";
pub const ENV_SEPARATOR: &str = "__";
