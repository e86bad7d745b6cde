//! Caller-side deadline for store calls.

use serde_json::json;
use std::future::Future;
use std::time::Duration;

use crate::error::AppError;

/// Runs a store operation with a deadline.
///
/// A timeout becomes [`AppError::StoreUnavailable`], never `NotFound`, so
/// callers can tell "try again" apart from "no such record".
pub async fn with_timeout<T, F>(limit: Duration, operation: &'static str, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::store_unavailable(
            "Store operation timed out",
            json!({ "operation": operation, "timeout_ms": limit.as_millis() as u64 }),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let result = with_timeout(Duration::from_millis(100), "noop", async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_passes_through_errors() {
        let result: Result<(), _> = with_timeout(Duration::from_millis(100), "lookup", async {
            Err(AppError::not_found("URL not found", json!({})))
        })
        .await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_store_unavailable() {
        let result: Result<(), _> = with_timeout(Duration::from_millis(50), "lookup", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        let err = result.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(err.details()["operation"], "lookup");
    }
}
