//! Run reporter
//!
//! Renders the human-readable per-item trace and the final summary, and owns
//! the [`RunSummary`] counters. Carries no decision logic: the reconciler
//! tells it what happened, in item order.
//!
//! Write failures do not interrupt the run. The first one is kept and handed
//! back by [`RunReporter::finish`].

use crate::models::{Deficiency, Disposition, Item, RunContext, RunSummary};
use crate::utils::FailedAttempt;
use crate::workflow::AttemptFailure;
use std::fmt;
use std::io::{self, Write};

const RULE: &str = "----------";

pub struct RunReporter<W: Write> {
    out: W,
    summary: RunSummary,
    write_error: Option<io::Error>,
}

impl<W: Write> fmt::Debug for RunReporter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunReporter")
            .field("summary", &self.summary)
            .field("write_error", &self.write_error)
            .finish_non_exhaustive()
    }
}

impl<W: Write> RunReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            summary: RunSummary::default(),
            write_error: None,
        }
    }

    fn emit(&mut self, args: fmt::Arguments<'_>) {
        if self.write_error.is_some() {
            return;
        }
        if let Err(e) = self.out.write_fmt(args) {
            tracing::warn!(error = %e, "Failed to write run report");
            self.write_error = Some(e);
        }
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Header printed once the candidate set is known
    pub fn banner(&mut self, ctx: &RunContext, server: &str, candidates: usize) {
        self.emit(format_args!(
            "Jellyfin Autorefresh New Releases\n{RULE}\n"
        ));
        self.emit(format_args!(
            "Starting at {}\n",
            jfar_common::time::to_rfc1123(ctx.started_at)
        ));
        self.emit(format_args!("Connecting to {server}\n"));
        self.emit(format_args!(
            "Processing {candidates} episode(s) released in the last {} days (since {}).\n\n",
            ctx.window.lookback_days,
            jfar_common::time::to_rfc3339(ctx.window.cutoff)
        ));
    }

    /// Trace line emitted before any request for the item
    pub fn item_started(&mut self, position: usize, item: &Item) {
        self.emit(format_args!(
            "  {}. ID:{}\n  {} : {}\n",
            position, item.id, item.name, item.series_name
        ));
    }

    pub fn already_complete(&mut self) {
        self.emit(format_args!(
            "  All desired criteria are met. Skipping.\n\n"
        ));
    }

    pub fn refresh_needed(&mut self, deficiency: &Deficiency) {
        self.emit(format_args!("    {deficiency}\n"));
        self.emit(format_args!(
            "  Some desired criteria are not met. Requesting a refresh...\n"
        ));
    }

    pub fn attempt_failed(&mut self, failure: &AttemptFailure, attempt: &FailedAttempt) {
        self.emit(format_args!("  {failure}\n"));
        if attempt.will_retry {
            self.emit(format_args!(
                "  Retrying in {:?} (attempt {} of {})...\n",
                attempt.pause,
                attempt.attempt + 1,
                attempt.max_attempts
            ));
        }
    }

    pub fn refresh_succeeded(&mut self) {
        self.emit(format_args!("  Refresh successful!\n"));
        self.emit(format_args!(
            "  The episode now satisfies all the desired criteria.\n\n"
        ));
    }

    pub fn refresh_abandoned(&mut self) {
        self.emit(format_args!("  Better luck next time!\n\n"));
    }

    /// Fold one item's final disposition into the counters
    pub fn record(&mut self, disposition: Disposition) {
        self.summary.record(disposition);
    }

    /// Render the summary and hand back the counters
    pub fn finish(mut self) -> io::Result<RunSummary> {
        let summary = self.summary;
        self.emit(format_args!("Summary:\n"));
        self.emit(format_args!("  Skipped: {}\n", summary.skipped));
        self.emit(format_args!("  Successful refreshes: {}\n", summary.succeeded));
        self.emit(format_args!("  Failed refreshes: {}\n", summary.failed));
        self.emit(format_args!("{RULE}\n\n"));

        if self.write_error.is_none() {
            if let Err(e) = self.out.flush() {
                self.write_error = Some(e);
            }
        }

        match self.write_error {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }
}
