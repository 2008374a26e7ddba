//! Test Helper Utilities
//!
//! Shared utilities for testing jfar-refresh

#![allow(dead_code)]

pub mod fake_gateway;
pub mod log_capture;
pub mod recording_sleeper;

pub use fake_gateway::{art, episode, Call, FakeGateway};
pub use log_capture::{capture_logs, LogCapture};
pub use recording_sleeper::RecordingSleeper;
