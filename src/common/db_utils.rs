// src/common/db_utils.rs

use std::future::Future;
use std::time::Duration;

use crate::common::error::AppError;

/// Bounds a storage call. On expiry the inner future is dropped, which
/// cancels the in-flight query and rolls back any open transaction.
pub(crate) async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(into_storage_error),
        Err(_) => {
            tracing::warn!(timeout_ms = limit.as_millis() as u64, "storage call timed out");
            Err(AppError::StorageUnavailable(format!(
                "storage call exceeded {} ms",
                limit.as_millis()
            )))
        }
    }
}

// Driver-level failures collapse into `StorageUnavailable`; domain errors
// raised by the stores pass through untouched.
fn into_storage_error(err: AppError) -> AppError {
    match err {
        AppError::DatabaseError(e) => AppError::StorageUnavailable(e.to_string()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn elapsed_calls_surface_storage_unavailable() {
        let result: Result<(), AppError> = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(AppError::StorageUnavailable(_))));
    }

    #[tokio::test]
    async fn domain_errors_pass_through() {
        let result: Result<(), AppError> =
            with_timeout(Duration::from_secs(1), async { Err(AppError::DuplicateCode) }).await;

        assert!(matches!(result, Err(AppError::DuplicateCode)));
    }

    #[tokio::test]
    async fn driver_errors_become_storage_unavailable() {
        let result: Result<(), AppError> = with_timeout(Duration::from_secs(1), async {
            Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut))
        })
        .await;

        assert!(matches!(result, Err(AppError::StorageUnavailable(_))));
    }
}
