use crate::application_port::AuthError;
use std::future::Future;
use std::time::Duration;

/// Runs one store operation under `limit`. Driver errors and timeouts both
/// come back as `StoreUnavailable`.
pub async fn bounded<T, F>(limit: Duration, op: &'static str, fut: F) -> Result<T, AuthError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(|e| AuthError::StoreUnavailable(format!("{op}: {e}"))),
        Err(_) => Err(AuthError::StoreUnavailable(format!(
            "{op}: timed out after {limit:?}"
        ))),
    }
}
