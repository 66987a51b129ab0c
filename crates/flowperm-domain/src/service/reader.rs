//! Traits for entity lookups needed by the by-id check paths.
//!
//! List-oriented APIs never call these; they work on entities the caller
//! has already loaded.

use async_trait::async_trait;

use crate::error::DomainResult;
use crate::model::{Case, Stage, Workflow};

/// Loads workflows by id.
#[async_trait]
pub trait WorkflowReader: Send + Sync {
    /// Returns `Ok(None)` when the workflow does not exist.
    async fn get_workflow(&self, workflow_id: i64) -> DomainResult<Option<Workflow>>;
}

/// Loads stages by id.
#[async_trait]
pub trait StageReader: Send + Sync {
    async fn get_stage(&self, stage_id: i64) -> DomainResult<Option<Stage>>;
}

/// Loads cases by id.
#[async_trait]
pub trait CaseReader: Send + Sync {
    async fn get_case(&self, case_id: i64) -> DomainResult<Option<Case>>;
}
