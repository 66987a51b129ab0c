//! Adapters that bridge the storage layer to the domain layer.
//!
//! The domain crate defines reader traits (`WorkflowReader`, `StageReader`,
//! `CaseReader`) for its by-id paths. The storage crate stores raw policy
//! rows through `PolicyStore`. The adapters here implement the former over
//! the latter and convert rows into domain entities:
//!
//! - mode and subject-type strings become typed enums (unknown values are
//!   `DomainError::InvalidPolicy`);
//! - the team or the user columns are selected by subject type;
//! - principal JSON is carried over verbatim, to be decoded at evaluation.

use std::sync::Arc;

use async_trait::async_trait;

use flowperm_domain::error::{DomainError, DomainResult};
use flowperm_domain::model::{
    Case, PermissionMode, PrincipalKind, PrincipalList, Stage, StageScope, Workflow,
};
use flowperm_domain::service::reader::{CaseReader, StageReader, WorkflowReader};
use flowperm_storage::{PolicyStore, StorageError, StoredCase, StoredStage, StoredWorkflow};

fn parse_mode(entity: &str, value: &str) -> DomainResult<PermissionMode> {
    value.parse().map_err(|e| DomainError::InvalidPolicy {
        entity: entity.to_string(),
        message: format!("{e}"),
    })
}

fn parse_kind(entity: &str, value: &str) -> DomainResult<PrincipalKind> {
    value.parse().map_err(|e| DomainError::InvalidPolicy {
        entity: entity.to_string(),
        message: format!("{e}"),
    })
}

/// Picks the view/operate columns matching the subject type.
fn principal_columns(
    kind: PrincipalKind,
    view_teams: Option<String>,
    view_users: Option<String>,
    operate_teams: Option<String>,
    operate_users: Option<String>,
) -> (PrincipalList, PrincipalList) {
    match kind {
        PrincipalKind::Team => (view_teams.into(), operate_teams.into()),
        PrincipalKind::User => (view_users.into(), operate_users.into()),
    }
}

/// Converts a stored workflow row into a domain workflow.
pub fn workflow_from_record(record: StoredWorkflow) -> DomainResult<Workflow> {
    let entity = format!("workflow {}", record.id);
    let mode = parse_mode(&entity, &record.view_permission_mode)?;
    let kind = parse_kind(&entity, &record.permission_subject_type)?;
    let (view, operate) = principal_columns(
        kind,
        record.view_teams,
        record.view_users,
        record.operate_teams,
        record.operate_users,
    );

    let mut workflow = Workflow::new(record.id, record.name, mode)
        .with_principal_kind(kind)
        .with_view_principals(view)
        .with_operate_principals(operate);
    workflow.owner_id = record.create_user_id;
    Ok(workflow)
}

/// Converts a stored stage row into a domain stage.
///
/// A stage inherits when both of its team columns are blank. Otherwise each
/// non-blank column narrows its capability and a blank one leaves that
/// capability to the workflow.
pub fn stage_from_record(record: StoredStage) -> Stage {
    let view = PrincipalList::from(record.view_teams);
    let operate = PrincipalList::from(record.operate_teams);
    let scope = if view.is_blank() && operate.is_blank() {
        StageScope::Inherit
    } else {
        StageScope::Narrow {
            view_principals: (!view.is_blank()).then_some(view),
            operate_principals: (!operate.is_blank()).then_some(operate),
        }
    };
    Stage::inheriting(record.id, record.workflow_id, record.name)
        .with_scope(scope)
        .with_default_assignees(record.default_assignee.into())
}

/// Converts a stored case row into a domain case.
pub fn case_from_record(record: StoredCase) -> DomainResult<Case> {
    let entity = format!("case {}", record.id);
    let mode = parse_mode(&entity, &record.view_permission_mode)?;
    let kind = parse_kind(&entity, &record.permission_subject_type)?;
    let (view, operate) = principal_columns(
        kind,
        record.view_teams,
        record.view_users,
        record.operate_teams,
        record.operate_users,
    );

    let mut case = Case::new(record.id, record.workflow_id, mode)
        .with_principal_kind(kind)
        .with_view_principals(view)
        .with_operate_principals(operate);
    case.owner_id = record.create_user_id;
    Ok(case)
}

/// Not-found becomes `None`; anything else is a reader error.
fn found<T>(result: Result<T, StorageError>) -> DomainResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(DomainError::ReaderError {
            message: format!("storage error: {e}"),
        }),
    }
}

/// Adapter that implements `WorkflowReader` using a `PolicyStore`.
pub struct StoreWorkflowReader<S: PolicyStore> {
    storage: Arc<S>,
}

impl<S: PolicyStore> StoreWorkflowReader<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl<S: PolicyStore> WorkflowReader for StoreWorkflowReader<S> {
    async fn get_workflow(&self, workflow_id: i64) -> DomainResult<Option<Workflow>> {
        found(self.storage.get_workflow(workflow_id).await)?
            .map(workflow_from_record)
            .transpose()
    }
}

/// Adapter that implements `StageReader` using a `PolicyStore`.
pub struct StoreStageReader<S: PolicyStore> {
    storage: Arc<S>,
}

impl<S: PolicyStore> StoreStageReader<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl<S: PolicyStore> StageReader for StoreStageReader<S> {
    async fn get_stage(&self, stage_id: i64) -> DomainResult<Option<Stage>> {
        Ok(found(self.storage.get_stage(stage_id).await)?.map(stage_from_record))
    }
}

/// Adapter that implements `CaseReader` using a `PolicyStore`.
pub struct StoreCaseReader<S: PolicyStore> {
    storage: Arc<S>,
}

impl<S: PolicyStore> StoreCaseReader<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl<S: PolicyStore> CaseReader for StoreCaseReader<S> {
    async fn get_case(&self, case_id: i64) -> DomainResult<Option<Case>> {
        found(self.storage.get_case(case_id).await)?
            .map(case_from_record)
            .transpose()
    }
}
