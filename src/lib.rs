//! Lognode Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod config;
pub mod fields;
pub mod server;
pub mod system_jobs;

// Re-export commonly used types for convenience
pub use fields::{FieldCatalog, SchemaSource};
pub use server::{run_server, RequestsLoggingLevel};
pub use system_jobs::{JobHandle, JobOutcome, JobRegistry};
