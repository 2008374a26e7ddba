//! Common error types for JFAR

use thiserror::Error;

/// Common result type for JFAR operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised before the reconciliation run starts
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
