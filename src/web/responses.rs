//! HTTP response types and utilities
//!
//! Every endpoint answers with the same JSON envelope; errors are mapped to
//! status codes in one place.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::error;

use crate::errors::{AppError, GeoQueryError};

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, String>>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            details: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
            details: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error_with_details(message: String, details: HashMap<String, String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
            details: Some(details),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Health probe payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub cache_entries: usize,
}

/// Status code and client-facing message for an error.
///
/// Store failures get a generic message; the cause is only logged.
pub fn error_status(error: &AppError) -> (StatusCode, String, Option<HashMap<String, String>>) {
    match error {
        AppError::Validation { message } => (StatusCode::BAD_REQUEST, message.clone(), None),
        AppError::NotFound { resource, id } => (
            StatusCode::NOT_FOUND,
            format!("{} with id '{}' not found", resource, id),
            None,
        ),
        AppError::Query(GeoQueryError::Cancelled { operation }) => {
            let mut details = HashMap::new();
            details.insert("operation".to_string(), operation.clone());
            (
                StatusCode::REQUEST_TIMEOUT,
                "The operation was cancelled".to_string(),
                Some(details),
            )
        }
        AppError::Query(GeoQueryError::InvalidGeohash { geohash, message }) => {
            let mut details = HashMap::new();
            details.insert("geohash".to_string(), geohash.clone());
            (
                StatusCode::BAD_REQUEST,
                format!("Invalid geohash: {}", message),
                Some(details),
            )
        }
        AppError::Query(GeoQueryError::StoreFailure(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Data access failed".to_string(),
            None,
        ),
    }
}

/// Convert AppError to appropriate HTTP response
pub fn handle_error(error: AppError) -> Response {
    let (status, message, details) = error_status(&error);
    if status.is_server_error() {
        error!("Request failed: {}", error);
    }

    let response = match details {
        Some(details) => ApiResponse::<()>::error_with_details(message, details),
        None => ApiResponse::<()>::error(message),
    };

    (status, Json(response)).into_response()
}

pub fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RepositoryError;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Query(GeoQueryError::cancelled("get_by_id")), StatusCode::REQUEST_TIMEOUT)]
    #[case(
        AppError::Query(GeoQueryError::InvalidGeohash { geohash: "!".into(), message: "bad".into() }),
        StatusCode::BAD_REQUEST
    )]
    #[case(
        AppError::Query(GeoQueryError::StoreFailure(RepositoryError::ConnectionFailed { message: "down".into() })),
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    #[case(
        AppError::Query(GeoQueryError::from(RepositoryError::cancelled("reverse_geocode"))),
        StatusCode::REQUEST_TIMEOUT
    )]
    #[case(AppError::not_found("Address", "1"), StatusCode::NOT_FOUND)]
    #[case(AppError::validation("latitude must be finite"), StatusCode::BAD_REQUEST)]
    fn test_error_status_mapping(#[case] error: AppError, #[case] expected: StatusCode) {
        let (status, _, _) = error_status(&error);
        assert_eq!(status, expected);
    }

    #[test]
    fn test_store_failure_message_is_generic() {
        let error = AppError::Query(GeoQueryError::StoreFailure(RepositoryError::ConnectionFailed {
            message: "password authentication failed for user geo".into(),
        }));
        let (_, message, _) = error_status(&error);
        assert_eq!(message, "Data access failed");
    }

    #[test]
    fn test_success_envelope_omits_error_fields() {
        let json = serde_json::to_value(ApiResponse::success(42)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 42);
        assert!(json.get("error").is_none());
        assert!(json.get("details").is_none());
    }
}
