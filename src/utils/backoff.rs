use std::time::Duration;

use tokio::time::sleep;
use tokio::time::timeout;
use tracing::warn;

use crate::BackoffPolicy;
use crate::Error;
use crate::Result;
use crate::RuntimeError;

/// Retry an async task with exponential backoff.
///
/// `policy.max_retries` bounds the total number of attempts (0 means
/// unlimited); `policy.timeout_ms` bounds each attempt, with 0 disabling
/// the per-attempt timeout (required for tasks that legitimately block,
/// such as resource watchers). A cancellation error is returned
/// immediately, never retried.
pub(crate) async fn retry_with_backoff<F, T, P>(
    task: F,
    policy: &BackoffPolicy,
) -> Result<P>
where
    F: Fn() -> T,                               // The type of the async function
    T: std::future::Future<Output = Result<P>>, // The future returned by the async function
{
    let mut attempts = 0;
    let mut delay = Duration::from_millis(policy.base_delay_ms);
    let max_delay = Duration::from_millis(policy.max_delay_ms.max(policy.base_delay_ms));

    loop {
        attempts += 1;
        let outcome = if policy.timeout_ms > 0 {
            let budget = Duration::from_millis(policy.timeout_ms);
            match timeout(budget, task()).await {
                Ok(result) => result,
                Err(_) => Err(Error::Runtime(RuntimeError::Timeout(budget))),
            }
        } else {
            task().await
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                if policy.max_retries != 0 && attempts >= policy.max_retries {
                    warn!("task failed after {} attempts: {:?}", attempts, &e);
                    return Err(e);
                }
                warn!("attempt {} failed with error: {:?}", attempts, &e);
                sleep(delay).await;
                delay = (delay * 2).min(max_delay);
            }
        }
    }
}
