//! Utility modules

pub mod retry;
pub mod sleeper;

pub use retry::{retry_bounded, FailedAttempt, RetryPolicy};
pub use sleeper::{Sleeper, TokioSleeper};
