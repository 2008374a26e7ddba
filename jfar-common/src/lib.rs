//! # JFAR Common Library
//!
//! Shared code for the Jellyfin auto-refresh tool:
//! - Bootstrap configuration loading and validation
//! - Error types
//! - Timestamp and release-window helpers

pub mod config;
pub mod error;
pub mod time;

pub use config::AppConfig;
pub use error::{Error, Result};
