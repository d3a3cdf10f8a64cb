use super::job::{JobId, JobOutcome};
use super::registry::JobEntry;
use std::sync::Arc;
use tracing::warn;

/// Writer handle owned by a job's own execution.
///
/// The handle is the single writer of the job's progress; everything else
/// only reads snapshots through the registry. Reporting a terminal outcome
/// consumes the handle, so a finished job cannot keep mutating its record.
#[derive(Debug)]
pub struct JobHandle {
    entry: Arc<JobEntry>,
}

impl JobHandle {
    pub(crate) fn new(entry: Arc<JobEntry>) -> Self {
        Self { entry }
    }

    pub fn id(&self) -> JobId {
        self.entry.id
    }

    pub fn kind(&self) -> &str {
        &self.entry.kind
    }

    /// Report the latest completion percentage. Out-of-range values are
    /// clamped and logged; returns the value actually stored.
    pub fn set_progress(&self, percent: u8) -> u8 {
        let stored = self.entry.progress.set(percent);
        if stored != percent {
            warn!(
                "job {} ({}) reported out-of-range progress {}, clamped to {}",
                self.entry.id, self.entry.kind, percent, stored
            );
        }
        stored
    }

    /// Report the terminal outcome. If another terminal transition won the
    /// race (e.g. a concurrent `complete` through the registry), that
    /// earlier outcome stands.
    pub fn complete(self, outcome: JobOutcome) {
        self.entry.finish(outcome);
    }

    /// Whether cancellation has been requested. Long-running work should
    /// check this periodically and wind down with `JobOutcome::Cancelled`.
    pub fn is_cancel_requested(&self) -> bool {
        self.entry.cancel.is_cancelled()
    }

    /// Resolves when cancellation is requested, for use in `tokio::select!`.
    pub async fn cancelled(&self) {
        self.entry.cancel.cancelled().await
    }
}

impl Drop for JobHandle {
    fn drop(&mut self) {
        // A handle dropped without an outcome means the job's execution died
        // (panic or early return); record that rather than leaving the entry
        // running forever.
        if self.entry.finish(JobOutcome::Failed) {
            warn!(
                "job {} ({}) dropped its handle while running, marked failed",
                self.entry.id, self.entry.kind
            );
        }
    }
}
