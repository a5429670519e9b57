//! Centralized error handling for GeoNimbus
//!
//! This module unifies the error types used across the cache, the durable
//! store, the query orchestrator and the web layer.
//!
//! # Error Categories
//!
//! - **Repository Errors**: durable-store failures and cancelled store calls
//! - **Cache Errors**: records rejected by the spatial index
//! - **Query Errors**: what the orchestrator surfaces to callers
//! - **Application Errors**: rejected request input and missing resources
//!
//! "Not found" is never an error here: lookups return `Ok(None)` or an empty
//! list when the store has no match.
//!
//! # Usage
//!
//! ```rust
//! use geonimbus::errors::{AppError, AppResult};
//!
//! async fn example_function() -> AppResult<String> {
//!     Ok("success".to_string())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Repository Results
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Convenience type alias for orchestrator Results
pub type GeoQueryResult<T> = Result<T, GeoQueryError>;

/// Convenience type alias for spatial index Results
pub type CacheResult<T> = Result<T, CacheError>;
