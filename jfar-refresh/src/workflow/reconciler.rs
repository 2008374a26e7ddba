//! Reconciliation loop
//!
//! Per item:
//! `Fetched → Evaluated → (Skip | RefreshRequested) → (Verified | RetryRequested) → (Success | Failure)`
//!
//! Items are processed strictly one after another. Before each item's first
//! request the loop waits `pacing_delay`; after an accepted refresh it waits
//! `propagation_delay` before re-fetching. A rejected refresh or a failed
//! re-check consumes one attempt; an item gets at most `max_attempts`
//! refreshes.

use super::report::RunReporter;
use super::{AttemptFailure, ReconcileError};
use crate::models::{CompletenessPolicy, Disposition, Item, RunContext, RunSummary, Verdict};
use crate::services::completeness;
use crate::services::jellyfin_client::{CatalogGateway, ItemQuery};
use crate::utils::{retry_bounded, RetryPolicy, Sleeper};
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Refresh attempts per item, first try included
pub const MAX_REFRESH_ATTEMPTS: u32 = 2;

/// Loop timings and retry bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileSettings {
    /// Courtesy wait before each item and before a retry
    pub pacing_delay: Duration,
    /// Wait after an accepted refresh, before re-checking
    pub propagation_delay: Duration,
    pub max_attempts: u32,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            pacing_delay: Duration::from_millis(jfar_common::config::DEFAULT_PACING_DELAY_MS),
            propagation_delay: Duration::from_millis(
                jfar_common::config::DEFAULT_PROPAGATION_DELAY_MS,
            ),
            max_attempts: MAX_REFRESH_ATTEMPTS,
        }
    }
}

impl ReconcileSettings {
    /// Zero-length waits, for tests and dry environments
    pub fn immediate() -> Self {
        Self {
            pacing_delay: Duration::ZERO,
            propagation_delay: Duration::ZERO,
            max_attempts: MAX_REFRESH_ATTEMPTS,
        }
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.pacing_delay)
    }
}

/// Drives one reconciliation pass
#[derive(Debug)]
pub struct Reconciler<G, S> {
    gateway: G,
    sleeper: S,
    policy: CompletenessPolicy,
    settings: ReconcileSettings,
}

impl<G, S> Reconciler<G, S>
where
    G: CatalogGateway,
    S: Sleeper,
{
    pub fn new(gateway: G, sleeper: S, policy: CompletenessPolicy, settings: ReconcileSettings) -> Self {
        Self {
            gateway,
            sleeper,
            policy,
            settings,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Run one pass over the items released inside the context's window
    ///
    /// Only a failed initial listing (or an unwritable report) is fatal. In
    /// that case nothing is rendered.
    pub async fn run<W: Write>(
        &self,
        ctx: &RunContext,
        server: &str,
        mut reporter: RunReporter<W>,
    ) -> Result<RunSummary, ReconcileError> {
        let candidates = self
            .gateway
            .list_items(&ItemQuery::EpisodesReleasedSince(ctx.window.cutoff))
            .await
            .map_err(ReconcileError::InitialListing)?;

        info!(
            candidates = candidates.len(),
            cutoff = %ctx.window.cutoff,
            "Candidate set fetched"
        );
        reporter.banner(ctx, server, candidates.len());

        for (index, item) in candidates.iter().enumerate() {
            let disposition = self.reconcile_item(index + 1, item, &mut reporter).await;
            debug!(item_id = %item.id, ?disposition, "Item resolved");
            reporter.record(disposition);
        }

        let summary = reporter.finish()?;
        info!(
            skipped = summary.skipped,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Run complete"
        );
        Ok(summary)
    }

    /// Evaluate one item and refresh it if needed
    pub async fn reconcile_item<W: Write>(
        &self,
        position: usize,
        item: &Item,
        reporter: &mut RunReporter<W>,
    ) -> Disposition {
        reporter.item_started(position, item);
        self.sleeper.sleep(self.settings.pacing_delay).await;

        let deficiency = match check_item(&self.gateway, &self.policy, item).await {
            Verdict::Complete => {
                reporter.already_complete();
                return Disposition::Skipped;
            }
            Verdict::Incomplete(deficiency) => deficiency,
        };

        info!(item_id = %item.id, %deficiency, "Item incomplete, requesting refresh");
        reporter.refresh_needed(&deficiency);

        let gateway = &self.gateway;
        let sleeper = &self.sleeper;
        let policy = &self.policy;
        let propagation_delay = self.settings.propagation_delay;
        let item_id = item.id.as_str();

        let outcome = retry_bounded(
            "refresh",
            self.settings.retry_policy(),
            sleeper,
            move |attempt| async move {
                debug!(item_id = %item_id, attempt, "Refresh attempt");
                refresh_and_verify(gateway, sleeper, policy, propagation_delay, item_id).await
            },
            |failure, attempt| {
                warn!(
                    item_id = %item_id,
                    attempt = attempt.attempt,
                    will_retry = attempt.will_retry,
                    error = %failure,
                    "Refresh attempt failed"
                );
                reporter.attempt_failed(failure, &attempt);
            },
        )
        .await;

        match outcome {
            Ok(()) => {
                reporter.refresh_succeeded();
                Disposition::Refreshed
            }
            Err(_) => {
                reporter.refresh_abandoned();
                Disposition::Failed
            }
        }
    }
}

/// Fetch artwork (when the synopsis does not already decide) and evaluate
async fn check_item<G>(gateway: &G, policy: &CompletenessPolicy, item: &Item) -> Verdict
where
    G: CatalogGateway + ?Sized,
{
    let artwork = if item.has_synopsis() {
        gateway.list_artwork(&item.id).await
    } else {
        Vec::new()
    };
    completeness::evaluate(item, &artwork, policy)
}

/// One attempt: trigger refresh, wait, re-fetch by ID, re-evaluate
async fn refresh_and_verify<G, S>(
    gateway: &G,
    sleeper: &S,
    policy: &CompletenessPolicy,
    propagation_delay: Duration,
    item_id: &str,
) -> Result<(), AttemptFailure>
where
    G: CatalogGateway + ?Sized,
    S: Sleeper + ?Sized,
{
    gateway
        .request_refresh(item_id)
        .await
        .map_err(AttemptFailure::RefreshRejected)?;

    sleeper.sleep(propagation_delay).await;

    let refreshed = gateway
        .list_items(&ItemQuery::ById(item_id.to_string()))
        .await
        .map_err(AttemptFailure::RefetchFailed)?;

    let item = refreshed
        .into_iter()
        .find(|candidate| candidate.id == item_id)
        .ok_or(AttemptFailure::Vanished)?;

    match check_item(gateway, policy, &item).await {
        Verdict::Complete => Ok(()),
        Verdict::Incomplete(deficiency) => Err(AttemptFailure::StillIncomplete(deficiency)),
    }
}
