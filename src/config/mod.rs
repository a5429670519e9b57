use anyhow::{Context, Result, bail};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub mod defaults;
pub mod duration_serde;

use defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub geohash: GeohashConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Deadline applied to every geocoding request
    #[serde(
        default = "default_request_timeout",
        with = "duration_serde::duration"
    )]
    pub request_timeout: Duration,
}

/// Spatial cache tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Half-width in degrees of the window probed for reverse and geohash lookups
    #[serde(default = "default_coordinate_tolerance")]
    pub coordinate_tolerance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeohashConfig {
    /// Precision used by the encode endpoint when the caller gives none
    #[serde(default = "default_geohash_precision")]
    pub default_precision: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
}

fn default_coordinate_tolerance() -> f64 {
    DEFAULT_COORDINATE_TOLERANCE
}

fn default_geohash_precision() -> usize {
    DEFAULT_GEOHASH_PRECISION
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            coordinate_tolerance: default_coordinate_tolerance(),
        }
    }
}

impl Default for GeohashConfig {
    fn default() -> Self {
        Self {
            default_precision: default_geohash_precision(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Layered sources: built-in defaults, then the TOML file, then
    /// `GEONIMBUS_` environment variables (`__` separates nested keys).
    pub fn figment(config_file: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR))
    }

    pub fn load(config_file: impl AsRef<Path>) -> Result<Self> {
        let config_file = config_file.as_ref();
        let config: Config = Self::figment(config_file)
            .extract()
            .with_context(|| format!("Failed to load configuration from {}", config_file.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let tolerance = self.cache.coordinate_tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            bail!("cache.coordinate_tolerance must be a non-negative number, got {tolerance}");
        }

        let precision = self.geohash.default_precision;
        if !(1..=crate::geohash::MAX_PRECISION).contains(&precision) {
            bail!(
                "geohash.default_precision must be between 1 and {}, got {precision}",
                crate::geohash::MAX_PRECISION
            );
        }

        if self.database.max_connections == 0 {
            bail!("database.max_connections must be at least 1");
        }

        if self.web.request_timeout.is_zero() {
            bail!("web.request_timeout must be greater than zero");
        }

        Ok(())
    }
}
