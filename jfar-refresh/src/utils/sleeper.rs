//! Suspension capability
//!
//! Pacing and propagation waits go through [`Sleeper`] so the reconciler's
//! control flow can run with recorded, zero-length waits in tests.

use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real wall-clock sleep on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tracing::trace!(wait_ms = duration.as_millis() as u64, "Sleeping");
            tokio::time::sleep(duration).await;
        }
    }
}
