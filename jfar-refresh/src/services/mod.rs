//! Service modules for JFAR refresh
//!
//! - **jellyfin_client**: remote catalog gateway (HTTP)
//! - **completeness**: pass/fail policy evaluation

pub mod completeness;
pub mod jellyfin_client;

pub use completeness::evaluate;
pub use jellyfin_client::{CatalogGateway, GatewayError, ItemQuery, JellyfinClient};
