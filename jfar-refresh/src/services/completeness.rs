//! Completeness evaluator
//!
//! Decides whether an item's synopsis and primary artwork satisfy the
//! [`CompletenessPolicy`]. Pure: no I/O, deterministic given its inputs.
//!
//! Rules, in order:
//! 1. Blank (whitespace-only) synopsis fails.
//! 2. No "Primary" artwork entry fails.
//! 3. The first "Primary" entry shorter than the desired height fails.
//!
//! When several "Primary" entries are present only the first is considered.

use crate::models::{ArtworkDescriptor, CompletenessPolicy, Deficiency, Item, Verdict};

/// First descriptor tagged "Primary", if any
pub fn primary_artwork(artwork: &[ArtworkDescriptor]) -> Option<&ArtworkDescriptor> {
    artwork.iter().find(|descriptor| descriptor.is_primary())
}

/// Evaluate one item snapshot against the policy
pub fn evaluate(item: &Item, artwork: &[ArtworkDescriptor], policy: &CompletenessPolicy) -> Verdict {
    if !item.has_synopsis() {
        return Verdict::Incomplete(Deficiency::MissingSynopsis);
    }

    match primary_artwork(artwork) {
        None => Verdict::Incomplete(Deficiency::MissingPrimaryArtwork),
        Some(primary) if primary.height < policy.desired_image_height => {
            Verdict::Incomplete(Deficiency::LowResolution {
                height: primary.height,
                required: policy.desired_image_height,
            })
        }
        Some(_) => Verdict::Complete,
    }
}
