//! Business logic services

pub mod geo_query;

pub use geo_query::{CacheStats, GeoQueryOrchestrator};
