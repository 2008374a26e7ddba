//! Jellyfin API client
//!
//! Remote catalog gateway: the three HTTP operations the reconciliation loop
//! needs.
//!
//! - `GET  {base}/Items?...`             list items (time window or single ID)
//! - `GET  {base}/Items/{id}/Images`     artwork descriptors for one item
//! - `POST {base}/Items/{id}/Refresh?...` trigger a full metadata/image refresh
//!
//! Every request carries `Authorization: MediaBrowser Token="<key>"`. The key
//! is held inside the default header map and never exposed to callers.

use crate::models::{ArtworkDescriptor, Item, ItemsResponse};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jfar_common::config::ApiKey;
use reqwest::{header, Client, StatusCode, Url};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// User-Agent header sent with every request
const USER_AGENT: &str = concat!("jfar-refresh/", env!("CARGO_PKG_VERSION"));

/// Default timeout for Jellyfin API requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Refresh flags requesting full metadata and image replacement
const REFRESH_PARAMS: [(&str, &str); 4] = [
    ("metadataRefreshMode", "FullRefresh"),
    ("imageRefreshMode", "FullRefresh"),
    ("replaceAllMetadata", "true"),
    ("replaceAllImages", "true"),
];

/// Gateway errors
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Connection failure, timeout, or request construction failure
    #[error("Network error: {0}")]
    Transport(String),

    /// Response status outside 2xx
    #[error("Server returned {status}")]
    Server { status: StatusCode },

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Status code for `Server` errors
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GatewayError::Server { status } => Some(*status),
            _ => None,
        }
    }
}

/// Filters for the item listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemQuery {
    /// Episodes (searched recursively) released on or after the cutoff
    EpisodesReleasedSince(DateTime<Utc>),
    /// A single item by ID
    ById(String),
}

impl ItemQuery {
    /// Query string pairs; synopsis text is always requested
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            ItemQuery::EpisodesReleasedSince(cutoff) => vec![
                ("includeItemTypes", "Episode".to_string()),
                ("recursive", "true".to_string()),
                ("fields", "Overview".to_string()),
                ("minPremiereDate", jfar_common::time::to_rfc3339(*cutoff)),
            ],
            ItemQuery::ById(id) => vec![
                ("ids", id.clone()),
                ("fields", "Overview".to_string()),
            ],
        }
    }
}

/// Remote catalog operations used by the reconciler
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// List items matching the query
    async fn list_items(&self, query: &ItemQuery) -> Result<Vec<Item>, GatewayError>;

    /// Artwork descriptors for one item
    ///
    /// Any failure is downgraded to "no artwork known" (empty list).
    async fn list_artwork(&self, item_id: &str) -> Vec<ArtworkDescriptor>;

    /// Ask the server to refresh metadata and images; success means "accepted"
    async fn request_refresh(&self, item_id: &str) -> Result<(), GatewayError>;
}

/// Jellyfin API client
pub struct JellyfinClient {
    http_client: Client,
    base_url: Url,
}

impl fmt::Debug for JellyfinClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JellyfinClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl JellyfinClient {
    /// Create a client for `base_url` authenticating with `api_key`
    pub fn new(base_url: &str, api_key: &ApiKey, timeout: Duration) -> Result<Self, GatewayError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| GatewayError::Transport(format!("Invalid base URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::Transport(format!(
                "Invalid base URL {base_url}"
            )));
        }

        let mut auth = header::HeaderValue::from_str(&format!(
            "MediaBrowser Token=\"{}\"",
            api_key.expose()
        ))
        .map_err(|e| GatewayError::Transport(format!("Invalid API key: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/seg1/seg2/...` with each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn fetch_artwork(&self, item_id: &str) -> Result<Vec<ArtworkDescriptor>, GatewayError> {
        let url = self.endpoint(&["Items", item_id, "Images"]);
        debug!(item_id = %item_id, url = %url, "Querying artwork");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Server { status });
        }

        response
            .json::<Vec<ArtworkDescriptor>>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CatalogGateway for JellyfinClient {
    async fn list_items(&self, query: &ItemQuery) -> Result<Vec<Item>, GatewayError> {
        let url = self.endpoint(&["Items"]);
        let params = query.params();
        debug!(url = %url, ?params, "Querying items");

        let response = self
            .http_client
            .get(url)
            .query(&params)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Server { status });
        }

        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let parsed: ItemsResponse =
            serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))?;

        debug!(count = parsed.items.len(), "Items received");
        Ok(parsed.items)
    }

    async fn list_artwork(&self, item_id: &str) -> Vec<ArtworkDescriptor> {
        match self.fetch_artwork(item_id).await {
            Ok(artwork) => artwork,
            Err(e) => {
                warn!(item_id = %item_id, error = %e, "Artwork lookup failed, treating as no artwork");
                Vec::new()
            }
        }
    }

    async fn request_refresh(&self, item_id: &str) -> Result<(), GatewayError> {
        let url = self.endpoint(&["Items", item_id, "Refresh"]);
        debug!(item_id = %item_id, url = %url, "Requesting refresh");

        let response = self
            .http_client
            .post(url)
            .query(&REFRESH_PARAMS)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Server { status });
        }

        Ok(())
    }
}
