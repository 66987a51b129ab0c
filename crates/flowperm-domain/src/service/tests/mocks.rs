//! Mock readers for service testing.
//!
//! Every reader counts its invocations so tests can assert that list paths
//! never touch storage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::context::UserContext;
use crate::error::{DomainError, DomainResult};
use crate::model::{Case, Stage, TeamIds, Workflow};
use crate::service::{
    CasePermissionService, CaseReader, StagePermissionService, StageReader,
    WorkflowPermissionService, WorkflowReader,
};

/// Shared behaviour of the mock readers.
pub struct MockTable<T> {
    rows: RwLock<HashMap<i64, T>>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl<T: Clone> MockTable<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub async fn insert(&self, id: i64, row: T) {
        self.rows.write().await.insert(id, row);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Makes every subsequent read fail.
    pub fn fail_reads(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    async fn get(&self, id: i64) -> DomainResult<Option<T>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::ReaderError {
                message: "mock reader unavailable".to_string(),
            });
        }
        Ok(self.rows.read().await.get(&id).cloned())
    }
}

pub type MockWorkflowReader = MockTable<Workflow>;
pub type MockStageReader = MockTable<Stage>;
pub type MockCaseReader = MockTable<Case>;

#[async_trait]
impl WorkflowReader for MockWorkflowReader {
    async fn get_workflow(&self, workflow_id: i64) -> DomainResult<Option<Workflow>> {
        self.get(workflow_id).await
    }
}

#[async_trait]
impl StageReader for MockStageReader {
    async fn get_stage(&self, stage_id: i64) -> DomainResult<Option<Stage>> {
        self.get(stage_id).await
    }
}

#[async_trait]
impl CaseReader for MockCaseReader {
    async fn get_case(&self, case_id: i64) -> DomainResult<Option<Case>> {
        self.get(case_id).await
    }
}

/// Readers plus the services built on top of them.
pub struct Fixture {
    pub workflow_reader: Arc<MockWorkflowReader>,
    pub stage_reader: Arc<MockStageReader>,
    pub case_reader: Arc<MockCaseReader>,
    pub workflows: WorkflowPermissionService<MockWorkflowReader>,
    pub stages: StagePermissionService<MockStageReader, MockWorkflowReader>,
    pub cases: CasePermissionService<MockCaseReader, MockWorkflowReader>,
}

impl Fixture {
    pub fn new() -> Self {
        let workflow_reader = Arc::new(MockWorkflowReader::new());
        let stage_reader = Arc::new(MockStageReader::new());
        let case_reader = Arc::new(MockCaseReader::new());
        let workflows = WorkflowPermissionService::new(Arc::clone(&workflow_reader));
        let stages = StagePermissionService::new(Arc::clone(&stage_reader), workflows.clone());
        let cases = CasePermissionService::new(Arc::clone(&case_reader), workflows.clone());
        Self {
            workflow_reader,
            stage_reader,
            case_reader,
            workflows,
            stages,
            cases,
        }
    }

    pub fn total_reader_calls(&self) -> usize {
        self.workflow_reader.calls() + self.stage_reader.calls() + self.case_reader.calls()
    }
}

/// A caller belonging to the given flat teams.
pub fn member_of(user_id: &str, teams: &[&str]) -> UserContext {
    UserContext::new(user_id).with_teams(teams.iter().copied())
}

pub fn team_set(teams: &[&str]) -> TeamIds {
    teams.iter().map(|t| t.to_string()).collect()
}
