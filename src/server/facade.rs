//! Read-only projections of internal state into the external JSON views.
//!
//! These functions own no state and have no side effects; they only copy a
//! snapshot into the wire shape.

use crate::fields::FieldSet;
use crate::system_jobs::JobRegistry;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub id: String,
    pub percent_complete: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobsView {
    pub jobs: Vec<JobSummary>,
}

/// Project the registry's current listing into the external view,
/// preserving the registry's start-time ordering.
pub fn job_summaries(registry: &JobRegistry) -> JobsView {
    JobsView {
        jobs: registry
            .list_all()
            .into_iter()
            .map(|snapshot| JobSummary {
                id: snapshot.id.to_string(),
                percent_complete: snapshot.percent_complete,
            })
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldsView {
    pub fields: Vec<String>,
}

/// Project a field catalog snapshot into the external view.
pub fn field_names(snapshot: &FieldSet) -> FieldsView {
    FieldsView {
        fields: snapshot.iter().cloned().collect(),
    }
}
