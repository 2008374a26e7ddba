//! jfar-refresh library interface
//!
//! Reconciles the metadata and artwork completeness of recently released
//! episodes on a Jellyfin server, requesting refreshes where needed.
//! Exposes public APIs for integration testing.

pub mod config;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

pub use crate::models::{Disposition, RunContext, RunSummary};
pub use crate::workflow::{ReconcileError, ReconcileSettings, Reconciler, RunReporter};
