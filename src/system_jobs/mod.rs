//! Tracking of long-lived administrative jobs (re-indexing, migrations,
//! cleanup) running inside the node.
//!
//! Jobs register with the [`JobRegistry`], report progress through their
//! [`JobHandle`] while running on their own thread of execution, and stay
//! enumerable for a bounded window after reaching a terminal state.
//! Cancellation is cooperative: the registry flags intent, the job decides.

mod error;
mod handle;
mod job;
mod progress;
mod registry;

pub use error::RegistryError;
pub use handle::JobHandle;
pub use job::{JobId, JobOutcome, JobSnapshot, JobState};
pub use progress::{ProgressCell, MAX_PERCENT};
pub use registry::{JobRegistry, DEFAULT_TERMINAL_RETENTION};
