//! Error type definitions for GeoNimbus
//!
//! The hierarchy mirrors the request path: the durable store raises
//! [`RepositoryError`], the orchestrator converts it into [`GeoQueryError`]
//! without discarding the cancellation case, and the web layer wraps
//! everything in [`AppError`].

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Query orchestration errors
    #[error("Query error: {0}")]
    Query(#[from] GeoQueryError),

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Resource not found errors
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },
}

/// Errors surfaced by the cache-aside query orchestrator
#[derive(Error, Debug)]
pub enum GeoQueryError {
    /// The caller's deadline or explicit cancellation fired first
    #[error("Operation cancelled: {operation}")]
    Cancelled { operation: String },

    /// The durable store failed; passed through unchanged, never retried
    #[error("Store failure: {0}")]
    StoreFailure(#[source] RepositoryError),

    /// The geohash could not be decoded into a coordinate
    #[error("Invalid geohash '{geohash}': {message}")]
    InvalidGeohash { geohash: String, message: String },
}

/// Durable address store errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The cancellation token fired before the store call completed
    #[error("Store call cancelled: {operation}")]
    Cancelled { operation: String },

    /// Database connection failures
    #[error("Database connection failed: {message}")]
    ConnectionFailed { message: String },

    /// Database errors from SeaORM
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A stored row could not be mapped to an address
    #[error("Invalid record {id}: {message}")]
    InvalidRecord { id: i32, message: String },
}

/// Spatial index errors
#[derive(Error, Debug, PartialEq)]
pub enum CacheError {
    /// Records without finite coordinates are never indexed
    #[error("Invalid coordinate for key {key}: ({latitude}, {longitude})")]
    InvalidCoordinate {
        key: String,
        latitude: f64,
        longitude: f64,
    },
}

impl From<RepositoryError> for GeoQueryError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Cancelled { operation } => Self::Cancelled { operation },
            other => Self::StoreFailure(other),
        }
    }
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }
}

impl GeoQueryError {
    pub fn cancelled<S: Into<String>>(operation: S) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

impl RepositoryError {
    pub fn cancelled<S: Into<String>>(operation: S) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_store_call_stays_cancelled() {
        let error: GeoQueryError = RepositoryError::cancelled("get_by_id").into();
        assert!(error.is_cancelled());
    }

    #[test]
    fn test_other_store_errors_become_store_failure() {
        let error: GeoQueryError = RepositoryError::ConnectionFailed {
            message: "refused".to_string(),
        }
        .into();
        assert!(matches!(error, GeoQueryError::StoreFailure(_)));
        assert!(!error.is_cancelled());
    }
}
