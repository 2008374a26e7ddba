//! Catalog data as returned by the Jellyfin API
//!
//! Values are snapshots: they are never mutated locally, only re-fetched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Artwork role that the completeness policy looks at
pub const PRIMARY_IMAGE_TYPE: &str = "Primary";

/// Jellyfin returns `null` for unset strings; treat it like an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One catalog entry (an episode)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Item {
    /// Opaque server ID, stable across fetches
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name", default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Parent series, display only
    #[serde(rename = "SeriesName", default, deserialize_with = "null_as_default")]
    pub series_name: String,
    /// Synopsis; may be empty or whitespace-only
    #[serde(rename = "Overview", default, deserialize_with = "null_as_default")]
    pub overview: String,
}

impl Item {
    pub fn has_synopsis(&self) -> bool {
        !self.overview.trim().is_empty()
    }
}

/// `GET /Items` response envelope
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ItemsResponse {
    #[serde(rename = "Items", default)]
    pub items: Vec<Item>,
}

/// One entry of `GET /Items/{id}/Images`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArtworkDescriptor {
    /// Role tag ("Primary", "Backdrop", "Thumb", ...)
    #[serde(rename = "ImageType", default, deserialize_with = "null_as_default")]
    pub image_type: String,
    /// Pixel height; missing heights count as zero
    #[serde(rename = "Height", default, deserialize_with = "null_as_default")]
    pub height: u32,
}

impl ArtworkDescriptor {
    pub fn is_primary(&self) -> bool {
        self.image_type == PRIMARY_IMAGE_TYPE
    }
}

/// Pass/fail rule: non-blank synopsis plus a primary image at least this tall
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletenessPolicy {
    pub desired_image_height: u32,
}

impl Default for CompletenessPolicy {
    fn default() -> Self {
        Self {
            desired_image_height: u32::from(jfar_common::config::DEFAULT_DESIRED_IMAGE_HEIGHT),
        }
    }
}

/// Why an item fails the completeness policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deficiency {
    MissingSynopsis,
    MissingPrimaryArtwork,
    LowResolution { height: u32, required: u32 },
}

impl fmt::Display for Deficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deficiency::MissingSynopsis => write!(f, "Overview is missing."),
            Deficiency::MissingPrimaryArtwork => write!(f, "Primary image is missing."),
            Deficiency::LowResolution { height, required } => write!(
                f,
                "Primary image is of low ({}p) quality, {}p required.",
                height, required
            ),
        }
    }
}

/// Outcome of evaluating one item against the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Complete,
    Incomplete(Deficiency),
}

impl Verdict {
    pub fn is_complete(&self) -> bool {
        matches!(self, Verdict::Complete)
    }
}

/// Final disposition of one candidate item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Already complete; no refresh issued
    Skipped,
    /// Refresh accepted and re-check passed
    Refreshed,
    /// Refresh attempts exhausted
    Failed,
}

/// Run-level counters over the candidate set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub skipped: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, disposition: Disposition) {
        match disposition {
            Disposition::Skipped => self.skipped += 1,
            Disposition::Refreshed => self.succeeded += 1,
            Disposition::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.skipped + self.succeeded + self.failed
    }
}

/// Release-date window the candidate set is drawn from
///
/// Computed once at run start and never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub lookback_days: u32,
    pub cutoff: DateTime<Utc>,
}

impl TimeWindow {
    /// `None` if the cutoff is not representable
    pub fn ending_at(now: DateTime<Utc>, lookback_days: u32) -> Option<Self> {
        Some(Self {
            lookback_days,
            cutoff: jfar_common::time::release_cutoff(now, lookback_days)?,
        })
    }
}

/// State scoped to a single pass
#[derive(Debug, Clone, Copy)]
pub struct RunContext {
    pub started_at: DateTime<Utc>,
    pub window: TimeWindow,
}

impl RunContext {
    pub fn starting_now(lookback_days: u32) -> Option<Self> {
        let started_at = jfar_common::time::now();
        Some(Self {
            started_at,
            window: TimeWindow::ending_at(started_at, lookback_days)?,
        })
    }
}
