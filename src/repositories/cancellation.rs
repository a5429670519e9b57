//! Cooperative cancellation for store calls

use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::{RepositoryError, RepositoryResult};

/// Run a store future until it completes or `cancel` fires.
///
/// A token that has already fired short-circuits before the future is
/// polled. Otherwise the in-flight future is dropped as soon as the token
/// fires.
pub async fn run_cancellable<T, E, F>(
    operation: &str,
    cancel: &CancellationToken,
    future: F,
) -> RepositoryResult<T>
where
    F: Future<Output = Result<T, E>>,
    E: Into<RepositoryError>,
{
    if cancel.is_cancelled() {
        debug!(operation, "Store call skipped, token already cancelled");
        return Err(RepositoryError::cancelled(operation));
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!(operation, "Store call abandoned on cancellation");
            Err(RepositoryError::cancelled(operation))
        }
        result = future => result.map_err(Into::into),
    }
}
