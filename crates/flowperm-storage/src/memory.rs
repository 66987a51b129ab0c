//! In-memory storage implementation.
//!
//! Each record type lives in its own `DashMap` keyed by id. Listing by
//! workflow is a linear scan, which is fine for tests and small
//! deployments.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::{debug, instrument};

use crate::error::{StorageError, StorageResult};
use crate::traits::{
    validate_id, validate_name, PolicyStore, StoredCase, StoredStage, StoredWorkflow,
};

/// In-memory implementation of [`PolicyStore`].
#[derive(Debug, Default)]
pub struct MemoryPolicyStore {
    workflows: DashMap<i64, StoredWorkflow>,
    stages: DashMap<i64, StoredStage>,
    cases: DashMap<i64, StoredCase>,
}

impl MemoryPolicyStore {
    /// Creates a new in-memory policy store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory policy store wrapped in Arc.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn ensure_workflow(&self, workflow_id: i64) -> StorageResult<()> {
        if self.workflows.contains_key(&workflow_id) {
            Ok(())
        } else {
            Err(StorageError::WorkflowNotFound { workflow_id })
        }
    }
}

#[async_trait]
impl PolicyStore for MemoryPolicyStore {
    #[instrument(skip(self, workflow), fields(workflow_id = workflow.id))]
    async fn save_workflow(&self, mut workflow: StoredWorkflow) -> StorageResult<StoredWorkflow> {
        validate_id("workflow", workflow.id)?;
        validate_name("workflow", &workflow.name)?;

        let now = Utc::now();
        if let Some(existing) = self.workflows.get(&workflow.id) {
            workflow.created_at = existing.created_at;
        }
        workflow.updated_at = now;

        self.workflows.insert(workflow.id, workflow.clone());
        Ok(workflow)
    }

    async fn get_workflow(&self, workflow_id: i64) -> StorageResult<StoredWorkflow> {
        self.workflows
            .get(&workflow_id)
            .map(|w| w.value().clone())
            .ok_or(StorageError::WorkflowNotFound { workflow_id })
    }

    #[instrument(skip(self))]
    async fn delete_workflow(&self, workflow_id: i64) -> StorageResult<()> {
        if self.workflows.remove(&workflow_id).is_none() {
            return Err(StorageError::WorkflowNotFound { workflow_id });
        }
        self.stages.retain(|_, stage| stage.workflow_id != workflow_id);
        self.cases.retain(|_, case| case.workflow_id != workflow_id);
        debug!(workflow_id, "workflow deleted with its stages and cases");
        Ok(())
    }

    #[instrument(skip(self, stage), fields(stage_id = stage.id, workflow_id = stage.workflow_id))]
    async fn save_stage(&self, mut stage: StoredStage) -> StorageResult<StoredStage> {
        validate_id("stage", stage.id)?;
        validate_id("workflow", stage.workflow_id)?;
        validate_name("stage", &stage.name)?;
        self.ensure_workflow(stage.workflow_id)?;

        let now = Utc::now();
        if let Some(existing) = self.stages.get(&stage.id) {
            stage.created_at = existing.created_at;
        }
        stage.updated_at = now;

        self.stages.insert(stage.id, stage.clone());
        Ok(stage)
    }

    async fn get_stage(&self, stage_id: i64) -> StorageResult<StoredStage> {
        self.stages
            .get(&stage_id)
            .map(|s| s.value().clone())
            .ok_or(StorageError::StageNotFound { stage_id })
    }

    async fn delete_stage(&self, stage_id: i64) -> StorageResult<()> {
        self.stages
            .remove(&stage_id)
            .map(|_| ())
            .ok_or(StorageError::StageNotFound { stage_id })
    }

    async fn list_stages(&self, workflow_id: i64) -> StorageResult<Vec<StoredStage>> {
        self.ensure_workflow(workflow_id)?;
        let mut stages: Vec<StoredStage> = self
            .stages
            .iter()
            .filter(|s| s.workflow_id == workflow_id)
            .map(|s| s.value().clone())
            .collect();
        stages.sort_by_key(|s| s.id);
        Ok(stages)
    }

    #[instrument(skip(self, case), fields(case_id = case.id, workflow_id = case.workflow_id))]
    async fn save_case(&self, mut case: StoredCase) -> StorageResult<StoredCase> {
        validate_id("case", case.id)?;
        validate_id("workflow", case.workflow_id)?;
        self.ensure_workflow(case.workflow_id)?;

        let now = Utc::now();
        if let Some(existing) = self.cases.get(&case.id) {
            case.created_at = existing.created_at;
        }
        case.updated_at = now;

        self.cases.insert(case.id, case.clone());
        Ok(case)
    }

    async fn get_case(&self, case_id: i64) -> StorageResult<StoredCase> {
        self.cases
            .get(&case_id)
            .map(|c| c.value().clone())
            .ok_or(StorageError::CaseNotFound { case_id })
    }

    async fn delete_case(&self, case_id: i64) -> StorageResult<()> {
        self.cases
            .remove(&case_id)
            .map(|_| ())
            .ok_or(StorageError::CaseNotFound { case_id })
    }

    async fn list_cases(&self, workflow_id: i64) -> StorageResult<Vec<StoredCase>> {
        self.ensure_workflow(workflow_id)?;
        let mut cases: Vec<StoredCase> = self
            .cases
            .iter()
            .filter(|c| c.workflow_id == workflow_id)
            .map(|c| c.value().clone())
            .collect();
        cases.sort_by_key(|c| c.id);
        Ok(cases)
    }
}
