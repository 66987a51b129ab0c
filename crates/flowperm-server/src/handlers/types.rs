//! Request and response types shared by the handlers.

use std::fmt;
use std::str::FromStr;

use flowperm_domain::DomainError;
use serde::{Deserialize, Serialize};

/// Entity kind addressed by a resource check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Workflow,
    Stage,
    Case,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workflow => "Workflow",
            Self::Stage => "Stage",
            Self::Case => "Case",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = HandlerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Workflow" => Ok(Self::Workflow),
            "Stage" => Ok(Self::Stage),
            "Case" => Ok(Self::Case),
            other => Err(HandlerError::UnsupportedResourceType {
                resource_type: other.to_string(),
            }),
        }
    }
}

/// Combined view/operate answer for one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePermissionResponse {
    pub can_view: bool,
    pub can_operate: bool,
    pub grant_reason: Option<String>,
    pub error_message: Option<String>,
}

/// Module-level access the caller already holds for a list request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleAccess {
    pub view: bool,
    pub operate: bool,
}

impl ModuleAccess {
    pub fn new(view: bool, operate: bool) -> Self {
        Self { view, operate }
    }

    pub fn full() -> Self {
        Self::new(true, true)
    }
}

/// Errors that can occur while handling a permission request.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The list request exceeds the configured maximum.
    #[error("batch size {size} exceeds maximum allowed {max}")]
    BatchTooLarge { size: usize, max: usize },

    #[error("unsupported resource type: {resource_type}")]
    UnsupportedResourceType { resource_type: String },

    /// Lookup or conversion failure in the domain layer.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl HandlerError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Domain(
                DomainError::WorkflowNotFound { .. }
                    | DomainError::StageNotFound { .. }
                    | DomainError::CaseNotFound { .. }
            )
        )
    }
}

/// Result type for handler operations.
pub type HandlerResult<T> = Result<T, HandlerError>;
