//! Storage error types.

use thiserror::Error;

/// Storage-specific errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Workflow not found.
    #[error("workflow not found: {workflow_id}")]
    WorkflowNotFound { workflow_id: i64 },

    /// Stage not found.
    #[error("stage not found: {stage_id}")]
    StageNotFound { stage_id: i64 },

    /// Case not found.
    #[error("case not found: {case_id}")]
    CaseNotFound { case_id: i64 },

    /// Invalid input error.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Backend failure.
    #[error("storage backend error: {message}")]
    BackendError { message: String },
}

impl StorageError {
    /// Whether the error reports a missing record.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::WorkflowNotFound { .. } | Self::StageNotFound { .. } | Self::CaseNotFound { .. }
        )
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
