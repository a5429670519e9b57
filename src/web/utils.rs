//! Web utility functions

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::AppError;
use crate::models::{BoundingBox, is_valid_coordinate};

/// Cancellation token that fires once a request has run for `timeout`.
///
/// The timer is aborted when the deadline is dropped, so finished requests
/// leave nothing behind.
pub struct RequestDeadline {
    token: CancellationToken,
    timer: JoinHandle<()>,
}

impl RequestDeadline {
    pub fn start(timeout: Duration) -> Self {
        let token = CancellationToken::new();
        let timer = tokio::spawn({
            let token = token.clone();
            async move {
                tokio::time::sleep(timeout).await;
                debug!(?timeout, "Request deadline reached");
                token.cancel();
            }
        });

        Self { token, timer }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for RequestDeadline {
    fn drop(&mut self) {
        self.timer.abort();
    }
}

pub fn validate_coordinate(latitude: f64, longitude: f64) -> Result<(), AppError> {
    if is_valid_coordinate(latitude, longitude) {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "latitude and longitude must be finite numbers, got ({latitude}, {longitude})"
        )))
    }
}

pub fn validate_bounding_box(bbox: &BoundingBox) -> Result<(), AppError> {
    if bbox.is_valid() {
        Ok(())
    } else {
        Err(AppError::validation(
            "bounding box must satisfy minLat <= maxLat and minLon <= maxLon",
        ))
    }
}

pub fn validate_radius(radius_km: f64) -> Result<(), AppError> {
    if radius_km.is_finite() && radius_km >= 0.0 {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "radius must be a non-negative number of kilometres, got {radius_km}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_cancels_after_timeout() {
        let deadline = RequestDeadline::start(Duration::from_secs(5));
        assert!(!deadline.token().is_cancelled());

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(deadline.token().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_deadline_never_fires() {
        let deadline = RequestDeadline::start(Duration::from_secs(1));
        let token = deadline.token().clone();
        drop(deadline);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_validation_helpers() {
        assert!(validate_coordinate(1.0, 2.0).is_ok());
        assert!(validate_coordinate(f64::NAN, 2.0).is_err());
        assert!(validate_bounding_box(&BoundingBox::new(2.0, 1.0, 0.0, 1.0)).is_err());
        assert!(validate_radius(-1.0).is_err());
        assert!(validate_radius(0.0).is_ok());
    }
}
