//! Run settings derived from the bootstrap configuration

use crate::models::CompletenessPolicy;
use crate::services::jellyfin_client::{GatewayError, JellyfinClient};
use crate::workflow::reconciler::{ReconcileSettings, MAX_REFRESH_ATTEMPTS};
use jfar_common::AppConfig;

/// Completeness policy for the run
pub fn completeness_policy(config: &AppConfig) -> CompletenessPolicy {
    CompletenessPolicy {
        desired_image_height: u32::from(config.desired_image_height),
    }
}

/// Loop timings for the run
pub fn reconcile_settings(config: &AppConfig) -> ReconcileSettings {
    ReconcileSettings {
        pacing_delay: config.pacing_delay,
        propagation_delay: config.propagation_delay,
        max_attempts: MAX_REFRESH_ATTEMPTS,
    }
}

/// HTTP gateway for the configured server
pub fn build_client(config: &AppConfig) -> Result<JellyfinClient, GatewayError> {
    JellyfinClient::new(&config.jellyfin_url, &config.api_key, config.request_timeout)
}
