//! Bounded retry
//!
//! Runs an async operation up to `max_attempts` times, pausing between
//! attempts. No backoff: every pause has the same fixed length.
//!
//! **Algorithm:**
//! 1. Attempt operation (attempt numbers start at 1)
//! 2. If successful, return result
//! 3. If failed and attempts remain: report failure, pause, retry
//! 4. If failed and no attempts remain: report failure, return the last error

use super::sleeper::Sleeper;
use std::future::Future;
use std::time::Duration;

/// How often and how patiently to retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; values below 1 are treated as 1
    pub max_attempts: u32,
    /// Pause before each retry
    pub pause: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, pause: Duration) -> Self {
        Self {
            max_attempts,
            pause,
        }
    }
}

/// Failed attempt, as seen by the `on_failure` hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailedAttempt {
    pub attempt: u32,
    pub max_attempts: u32,
    /// Whether another attempt follows after the pause
    pub will_retry: bool,
    pub pause: Duration,
}

/// Retry an async operation with a bounded number of attempts.
///
/// # Arguments
/// * `operation_name` - Name for logging (e.g., "refresh")
/// * `policy` - Maximum attempt count and pause between attempts
/// * `sleeper` - Suspension used for the pause
/// * `operation` - Async closure receiving the 1-based attempt number
/// * `on_failure` - Called once per failed attempt, before any pause
///
/// # Returns
/// Result from the first successful attempt, or the error of the final attempt
pub async fn retry_bounded<T, E, F, Fut, H, S>(
    operation_name: &str,
    policy: RetryPolicy,
    sleeper: &S,
    mut operation: F,
    mut on_failure: H,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    H: FnMut(&E, FailedAttempt),
    S: Sleeper + ?Sized,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        if attempt > 1 {
            tracing::debug!(operation = operation_name, attempt, max_attempts, "Retrying operation");
        }

        match operation(attempt).await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::debug!(
                        operation = operation_name,
                        attempt,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(err) => {
                let will_retry = attempt < max_attempts;
                on_failure(
                    &err,
                    FailedAttempt {
                        attempt,
                        max_attempts,
                        will_retry,
                        pause: policy.pause,
                    },
                );

                if !will_retry {
                    tracing::debug!(
                        operation = operation_name,
                        attempt,
                        "Operation failed: attempts exhausted"
                    );
                    return Err(err);
                }

                sleeper.sleep(policy.pause).await;
                attempt += 1;
            }
        }
    }
}
