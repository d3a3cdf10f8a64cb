use super::error::RegistryError;
use super::handle::JobHandle;
use super::job::{JobId, JobOutcome, JobSnapshot, JobState};
use super::progress::ProgressCell;
use crate::server::metrics;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How long a terminal job stays enumerable before the next listing sweeps
/// it, so low-frequency pollers still observe the final transition.
pub const DEFAULT_TERMINAL_RETENTION: Duration = Duration::from_secs(60);

/// A registered job's live record.
///
/// The state byte and the progress cell are the only mutable parts; both are
/// atomic, so snapshots taken while the job's own thread is writing never
/// observe a torn value.
#[derive(Debug)]
pub(crate) struct JobEntry {
    pub(crate) id: JobId,
    pub(crate) kind: String,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) progress: ProgressCell,
    state: AtomicU8,
    finished_at: OnceLock<Instant>,
    pub(crate) cancel: CancellationToken,
}

impl JobEntry {
    pub(crate) fn state(&self) -> JobState {
        JobState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Transition `Running` into a terminal state. The first terminal
    /// transition wins; later attempts return false and change nothing.
    pub(crate) fn finish(&self, outcome: JobOutcome) -> bool {
        let target = JobState::from(outcome);
        let swapped = self
            .state
            .compare_exchange(
                JobState::Running as u8,
                target as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if swapped {
            let _ = self.finished_at.set(Instant::now());
            metrics::job_finished(&self.kind, target.as_str());
        }
        swapped
    }

    pub(crate) fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            id: self.id,
            kind: self.kind.clone(),
            state: self.state(),
            percent_complete: self.progress.get(),
            started_at: self.started_at,
        }
    }

    fn retention_elapsed(&self, retention: Duration) -> bool {
        self.finished_at
            .get()
            .map(|finished| finished.elapsed() >= retention)
            .unwrap_or(false)
    }
}

/// Concurrency-safe storage and enumeration of currently active jobs.
///
/// One instance is created at process start and handed explicitly to every
/// subsystem that starts jobs; there is no global. All operations take
/// `&self` and hold the map lock only for the insert/lookup/copy itself,
/// never for the duration of a job's work.
pub struct JobRegistry {
    next_id: AtomicU64,
    closed: AtomicBool,
    retention: Duration,
    jobs: RwLock<HashMap<JobId, Arc<JobEntry>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_TERMINAL_RETENTION)
    }

    /// Create a registry with a custom retention window for terminal jobs.
    pub fn with_retention(retention: Duration) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
            retention,
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new job and return the handle its execution reports
    /// through. The job starts in `Running` with progress 0.
    ///
    /// Fails only with `RegistryError::Closed` once shutdown has begun.
    pub fn register(&self, kind: impl Into<String>) -> Result<JobHandle, RegistryError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(RegistryError::Closed);
        }

        let id = JobId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let entry = Arc::new(JobEntry {
            id,
            kind: kind.into(),
            started_at: Utc::now(),
            progress: ProgressCell::new(),
            state: AtomicU8::new(JobState::Running as u8),
            finished_at: OnceLock::new(),
            cancel: CancellationToken::new(),
        });

        {
            let mut jobs = self.jobs.write().expect("jobs map lock poisoned");
            // Re-check under the write lock: close() also takes it, so a job
            // inserted here is guaranteed to be seen by the shutdown sweep.
            if self.closed.load(Ordering::Acquire) {
                return Err(RegistryError::Closed);
            }
            jobs.insert(id, Arc::clone(&entry));
        }

        debug!("registered job {} ({})", id, entry.kind);
        metrics::job_started(&entry.kind);
        Ok(JobHandle::new(entry))
    }

    /// Store a job's latest progress percentage.
    ///
    /// `UnknownJob` covers both a reaped id and a job that already reached a
    /// terminal state; either way the caller should treat the job as
    /// finished. Out-of-range values are clamped, stored, and reported as
    /// `InvalidProgress`.
    pub fn update_progress(&self, id: JobId, percent: u8) -> Result<(), RegistryError> {
        let entry = self.entry(id).ok_or(RegistryError::UnknownJob(id))?;
        if entry.state().is_terminal() {
            return Err(RegistryError::UnknownJob(id));
        }

        let stored = entry.progress.set(percent);
        if stored != percent {
            warn!(
                "job {} ({}) reported out-of-range progress {}, clamped to {}",
                id, entry.kind, percent, stored
            );
            return Err(RegistryError::InvalidProgress {
                id,
                requested: percent,
            });
        }
        Ok(())
    }

    /// Transition a job to a terminal state.
    ///
    /// Racing against another terminal transition is not an error; the first
    /// outcome wins and later calls are absorbed.
    pub fn complete(&self, id: JobId, outcome: JobOutcome) -> Result<(), RegistryError> {
        let entry = self.entry(id).ok_or(RegistryError::UnknownJob(id))?;
        if !entry.finish(outcome) {
            debug!("job {} already terminal, ignoring {:?}", id, outcome);
        }
        Ok(())
    }

    /// Request cooperative cancellation.
    ///
    /// Only flags intent; the job's own execution decides when and whether
    /// to honor it. No-op on unknown or already terminal ids.
    pub fn cancel(&self, id: JobId) {
        if let Some(entry) = self.entry(id) {
            if !entry.state().is_terminal() {
                debug!("cancellation requested for job {} ({})", id, entry.kind);
                entry.cancel.cancel();
            }
        }
    }

    /// Point-in-time copy of every registered job, ordered by start time
    /// with ties broken by id, so repeated listings render consistently.
    ///
    /// Terminal jobs past their retention window are swept first.
    pub fn list_all(&self) -> Vec<JobSnapshot> {
        self.reap_expired();

        let entries: Vec<Arc<JobEntry>> = {
            let jobs = self.jobs.read().expect("jobs map lock poisoned");
            jobs.values().cloned().collect()
        };

        let mut snapshots: Vec<JobSnapshot> = entries.iter().map(|e| e.snapshot()).collect();
        snapshots.sort_by(|a, b| a.started_at.cmp(&b.started_at).then(a.id.cmp(&b.id)));
        snapshots
    }

    /// Stop accepting registrations and flag cancellation to every live job.
    ///
    /// Jobs already running keep their entries so a final listing during
    /// shutdown still sees them drain.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);

        let jobs = self.jobs.write().expect("jobs map lock poisoned");
        let mut live = 0usize;
        for entry in jobs.values() {
            if !entry.state().is_terminal() {
                entry.cancel.cancel();
                live += 1;
            }
        }
        info!(
            "job registry closed, cancellation flagged for {} running jobs",
            live
        );
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn entry(&self, id: JobId) -> Option<Arc<JobEntry>> {
        self.jobs
            .read()
            .expect("jobs map lock poisoned")
            .get(&id)
            .cloned()
    }

    fn reap_expired(&self) {
        let expired: Vec<JobId> = {
            let jobs = self.jobs.read().expect("jobs map lock poisoned");
            jobs.values()
                .filter(|e| e.retention_elapsed(self.retention))
                .map(|e| e.id)
                .collect()
        };
        if expired.is_empty() {
            return;
        }

        let mut jobs = self.jobs.write().expect("jobs map lock poisoned");
        for id in expired {
            let still_expired = jobs
                .get(&id)
                .map(|e| e.retention_elapsed(self.retention))
                .unwrap_or(false);
            if still_expired {
                jobs.remove(&id);
                debug!("reaped terminal job {}", id);
            }
        }
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}
