use crate::error::ScoreError;
use tokio::time::{sleep, Duration};

/// Runs `f` up to `retries` times while it fails with a transient error
///
/// The delay grows linearly with the attempt number. Non-transient errors
/// are returned immediately.
pub async fn with_retry<F, Fut, T>(f: F, retries: u32, delay: Duration) -> Result<T, ScoreError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, ScoreError>>,
{
    let mut attempts = 0;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                attempts += 1;
                if attempts >= retries || !e.is_transient() {
                    return Err(e);
                }
                sleep(delay * attempts).await;
            }
        }
    }
}
