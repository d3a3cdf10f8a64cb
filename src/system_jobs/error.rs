use super::job::JobId;
use thiserror::Error;

/// Errors surfaced by the job registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The registry is shutting down and no longer accepts registrations.
    #[error("job registry is closed")]
    Closed,

    /// The id is not (or no longer) present. A job may finish and be reaped
    /// between a caller's last check and this call, so callers should treat
    /// this as "already finished" rather than as a failure.
    #[error("unknown job id {0}")]
    UnknownJob(JobId),

    /// A progress report outside [0, 100]. The value has already been
    /// clamped and stored; the error exists so the reporting bug is visible
    /// to the job author.
    #[error("invalid progress value {requested} for job {id}")]
    InvalidProgress { id: JobId, requested: u8 },
}
