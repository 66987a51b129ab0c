//! Domain error types for permission evaluation.
//!
//! A denied permission is not an error; it is reported through
//! [`crate::service::PermissionResult`]. These errors cover the by-id
//! convenience paths and policy data that cannot be interpreted at all.

use thiserror::Error;

/// Domain-specific errors.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Workflow not found.
    #[error("workflow not found: {workflow_id}")]
    WorkflowNotFound { workflow_id: i64 },

    /// Stage not found.
    #[error("stage not found: {stage_id}")]
    StageNotFound { stage_id: i64 },

    /// Case not found.
    #[error("case not found: {case_id}")]
    CaseNotFound { case_id: i64 },

    /// Persisted policy value that does not map onto the domain model.
    #[error("invalid policy on {entity}: {message}")]
    InvalidPolicy { entity: String, message: String },

    /// Error raised by an entity reader.
    #[error("reader error: {message}")]
    ReaderError { message: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
