use chrono::{DateTime, Utc};

/// Identifier of a registered system job.
///
/// Ids are issued from a process-wide counter at registration time and are
/// never reused for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub(crate) u64);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a system job.
///
/// `Running` is the only initial state. The three terminal states admit no
/// further transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running = 0,
    Completed = 1,
    Failed = 2,
    Cancelled = 3,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobState::Running)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Cancelled => "cancelled",
        }
    }

    pub(crate) fn from_u8(raw: u8) -> JobState {
        match raw {
            0 => JobState::Running,
            1 => JobState::Completed,
            2 => JobState::Failed,
            _ => JobState::Cancelled,
        }
    }
}

/// Terminal outcome reported by a job's own execution.
///
/// `Cancelled` is reported by a job that observed its cancellation flag and
/// stopped; the registry never forces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    Failed,
    Cancelled,
}

impl From<JobOutcome> for JobState {
    fn from(outcome: JobOutcome) -> Self {
        match outcome {
            JobOutcome::Completed => JobState::Completed,
            JobOutcome::Failed => JobState::Failed,
            JobOutcome::Cancelled => JobState::Cancelled,
        }
    }
}

/// Point-in-time copy of a job's observable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSnapshot {
    pub id: JobId,
    pub kind: String,
    pub state: JobState,
    pub percent_complete: u8,
    pub started_at: DateTime<Utc>,
}
