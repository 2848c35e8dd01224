use thiserror::Error;

use super::types::{ApplicationId, ApplicationStatus, Role};
use crate::storage::StoreError;

/// Malformed or contradictory input at creation time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} station code is empty")]
    EmptyStation { field: &'static str },
    #[error("source and destination must be different (both are {code})")]
    SameStation { code: String },
    #[error("station code {code} is not in the station catalog")]
    UnknownStation { code: String },
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("role {role} may not submit applications")]
    RoleNotPermitted { role: Role },
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("invalid transition from {from} to {to} by {role}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
        role: Role,
    },

    #[error("application {0} not found")]
    NotFound(ApplicationId),

    #[error("application {application_id} belongs to college '{application_college}', outside the reviewer's scope")]
    OutOfScope {
        application_id: ApplicationId,
        application_college: String,
    },

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl WorkflowError {
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, WorkflowError::InvalidTransition { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, WorkflowError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, WorkflowError::NotFound(_))
    }
}
