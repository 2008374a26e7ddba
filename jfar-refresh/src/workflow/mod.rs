//! Reconciliation workflow
//!
//! One pass over the candidate set: evaluate each item, refresh the
//! incomplete ones, wait for propagation, re-check, retry once.

pub mod reconciler;
pub mod report;

pub use reconciler::{ReconcileSettings, Reconciler};
pub use report::RunReporter;

use crate::models::Deficiency;
use crate::services::jellyfin_client::GatewayError;
use thiserror::Error;

/// Fatal run errors; nothing item-scoped ends up here
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The candidate set could not be listed
    #[error("Initial item listing failed: {0}")]
    InitialListing(#[source] GatewayError),

    /// The trace could not be written
    #[error("Failed to write run report: {0}")]
    Report(#[from] std::io::Error),
}

/// Why a single refresh-and-verify attempt did not end in a complete item
#[derive(Debug, Error)]
pub enum AttemptFailure {
    #[error("Refresh failed: {0}")]
    RefreshRejected(#[source] GatewayError),

    #[error("Could not re-fetch the item: {0}")]
    RefetchFailed(#[source] GatewayError),

    #[error("The item is no longer listed by the server.")]
    Vanished,

    #[error("The desired criteria are still not met. {0}")]
    StillIncomplete(Deficiency),
}
