use std::fmt::Display;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Retry an async operation, sleeping between attempts.
///
/// # Arguments
/// * `operation` - The async operation to retry
/// * `delays` - One entry per retry; the operation runs `delays.len() + 1` times at most
/// * `is_retryable` - Errors for which this returns `false` are returned immediately
///
/// # Returns
/// The result of the operation if successful, or the last error if all retries fail
pub async fn retry_with_backoff<F, Fut, T, E, P>(
    mut operation: F,
    delays: &[Duration],
    is_retryable: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Display,
    P: Fn(&E) -> bool,
{
    let attempts = delays.len() + 1;

    for (i, delay) in delays.iter().enumerate() {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if is_retryable(&e) => {
                warn!(
                    "Request failed (attempt {}/{attempts}): {e}. Retrying after {}ms...",
                    i + 1,
                    delay.as_millis()
                );
                sleep(*delay).await;
            }
            Err(e) => return Err(e),
        }
    }

    operation().await
}
