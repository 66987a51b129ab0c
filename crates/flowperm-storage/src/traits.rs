//! Storage traits and persisted record types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StorageResult};

/// Maximum length of an entity name.
pub const MAX_NAME_LENGTH: usize = 255;

/// Subject type used when a record does not say otherwise.
pub const DEFAULT_SUBJECT_TYPE: &str = "Team";

/// Persisted workflow row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredWorkflow {
    pub id: i64,
    pub name: String,
    /// `Public`, `VisibleToTeams`, `InvisibleToTeams` or `Private`.
    pub view_permission_mode: String,
    /// `Team` or `User`.
    pub permission_subject_type: String,
    pub view_teams: Option<String>,
    pub view_users: Option<String>,
    pub operate_teams: Option<String>,
    pub operate_users: Option<String>,
    pub create_user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredWorkflow {
    /// A team-keyed row with empty principal columns.
    pub fn new(id: i64, name: impl Into<String>, view_permission_mode: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            view_permission_mode: view_permission_mode.into(),
            permission_subject_type: DEFAULT_SUBJECT_TYPE.to_string(),
            view_teams: None,
            view_users: None,
            operate_teams: None,
            operate_users: None,
            create_user_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Persisted stage row. A stage with no view and no operate teams inherits
/// its workflow's permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredStage {
    pub id: i64,
    pub workflow_id: i64,
    pub name: String,
    pub view_teams: Option<String>,
    pub operate_teams: Option<String>,
    /// JSON list of user ids.
    pub default_assignee: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredStage {
    pub fn new(id: i64, workflow_id: i64, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            workflow_id,
            name: name.into(),
            view_teams: None,
            operate_teams: None,
            default_assignee: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Persisted case (onboarding) row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCase {
    pub id: i64,
    pub workflow_id: i64,
    pub view_permission_mode: String,
    pub permission_subject_type: String,
    pub view_teams: Option<String>,
    pub view_users: Option<String>,
    pub operate_teams: Option<String>,
    pub operate_users: Option<String>,
    pub create_user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredCase {
    pub fn new(id: i64, workflow_id: i64, view_permission_mode: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            workflow_id,
            view_permission_mode: view_permission_mode.into(),
            permission_subject_type: DEFAULT_SUBJECT_TYPE.to_string(),
            view_teams: None,
            view_users: None,
            operate_teams: None,
            operate_users: None,
            create_user_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Abstract storage interface for permission policies.
///
/// Implementations must be thread-safe (Send + Sync) and support
/// async operations. Saves are upserts: an existing row keeps its
/// `created_at` and gets a fresh `updated_at`.
#[async_trait]
pub trait PolicyStore: Send + Sync + 'static {
    /// Inserts or replaces a workflow.
    async fn save_workflow(&self, workflow: StoredWorkflow) -> StorageResult<StoredWorkflow>;

    /// Gets a workflow, or `WorkflowNotFound`.
    async fn get_workflow(&self, workflow_id: i64) -> StorageResult<StoredWorkflow>;

    /// Deletes a workflow together with its stages and cases.
    async fn delete_workflow(&self, workflow_id: i64) -> StorageResult<()>;

    /// Inserts or replaces a stage. The parent workflow must exist.
    async fn save_stage(&self, stage: StoredStage) -> StorageResult<StoredStage>;

    async fn get_stage(&self, stage_id: i64) -> StorageResult<StoredStage>;

    async fn delete_stage(&self, stage_id: i64) -> StorageResult<()>;

    /// Stages of a workflow ordered by id.
    async fn list_stages(&self, workflow_id: i64) -> StorageResult<Vec<StoredStage>>;

    /// Inserts or replaces a case. The parent workflow must exist.
    async fn save_case(&self, case: StoredCase) -> StorageResult<StoredCase>;

    async fn get_case(&self, case_id: i64) -> StorageResult<StoredCase>;

    async fn delete_case(&self, case_id: i64) -> StorageResult<()>;

    /// Cases of a workflow ordered by id.
    async fn list_cases(&self, workflow_id: i64) -> StorageResult<Vec<StoredCase>>;
}

/// Validates a record id (must be positive).
pub fn validate_id(entity: &str, id: i64) -> StorageResult<()> {
    if id <= 0 {
        return Err(StorageError::InvalidInput {
            message: format!("{entity} id must be positive, got {id}"),
        });
    }
    Ok(())
}

/// Validates an entity name (non-blank, at most [`MAX_NAME_LENGTH`] characters).
pub fn validate_name(entity: &str, name: &str) -> StorageResult<()> {
    if name.trim().is_empty() {
        return Err(StorageError::InvalidInput {
            message: format!("{entity} name cannot be empty"),
        });
    }
    let length = name.chars().count();
    if length > MAX_NAME_LENGTH {
        return Err(StorageError::InvalidInput {
            message: format!(
                "{entity} name exceeds maximum length of {MAX_NAME_LENGTH} characters (got {length})"
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id("workflow", 1).is_ok());
        assert!(validate_id("workflow", 0).is_err());
        assert!(validate_id("workflow", -5).is_err());
    }

    #[test]
    fn test_validate_name_counts_characters() {
        assert!(validate_name("workflow", "Onboarding").is_ok());
        assert!(validate_name("workflow", "").is_err());
        assert!(validate_name("workflow", "   ").is_err());
        assert!(validate_name("workflow", &"a".repeat(255)).is_ok());
        assert!(validate_name("workflow", &"a".repeat(256)).is_err());
        // 255 multi-byte characters are still within the limit.
        assert!(validate_name("workflow", &"流".repeat(255)).is_ok());
    }
}
