//! Stage permission evaluation.
//!
//! A stage either inherits its workflow's decision or narrows it: with
//! [`StageScope::Narrow`] each listed capability is the AND of the workflow
//! decision and the stage's own team whitelist, regardless of the
//! workflow's mode. An unlisted capability is the workflow's alone.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::context::UserContext;
use crate::error::{DomainError, DomainResult};
use crate::helpers::{check_team_whitelist, PermissionHelpers};
use crate::model::{
    OperationType, PermissionMode, PrincipalKind, Stage, StageScope, TeamIds, Workflow,
};

use super::reader::{StageReader, WorkflowReader};
use super::result::{DenialCode, GrantReason, PermissionInfo, PermissionResult, Reasons, Subject};
use super::workflow::WorkflowPermissionService;

const INHERITED: Reasons = Reasons::new(
    GrantReason::InheritedViewPermission,
    GrantReason::InheritedOperatePermission,
);

const NARROWED: Reasons = Reasons::new(
    GrantReason::WorkflowAndStageViewPermission,
    GrantReason::WorkflowAndStageOperatePermission,
);

/// Teams allowed to see a stage, for filtering a user picker tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedTeams {
    /// Every team is authorized; `team_ids` is ignored.
    pub public_access: bool,
    /// `team_ids` lists excluded teams rather than included ones.
    pub blacklist_mode: bool,
    pub team_ids: TeamIds,
}

impl AuthorizedTeams {
    fn public() -> Self {
        Self {
            public_access: true,
            ..Self::default()
        }
    }

    fn whitelist(team_ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            team_ids: team_ids.into_iter().collect(),
            ..Self::default()
        }
    }

    fn blacklist(team_ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            blacklist_mode: true,
            team_ids: team_ids.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Whether members of `team_id` may see the stage.
    pub fn allows(&self, team_id: &str) -> bool {
        if self.public_access {
            return true;
        }
        self.team_ids.contains(team_id) != self.blacklist_mode
    }
}

/// Evaluates stage policies against their parent workflow.
pub struct StagePermissionService<S, W> {
    stages: Arc<S>,
    workflows: WorkflowPermissionService<W>,
}

impl<S, W> Clone for StagePermissionService<S, W> {
    fn clone(&self) -> Self {
        Self {
            stages: Arc::clone(&self.stages),
            workflows: self.workflows.clone(),
        }
    }
}

impl<S, W> StagePermissionService<S, W> {
    pub fn new(stages: Arc<S>, workflows: WorkflowPermissionService<W>) -> Self {
        Self { stages, workflows }
    }

    pub fn workflows(&self) -> &WorkflowPermissionService<W> {
        &self.workflows
    }

    /// Checks `op` on a preloaded stage and its preloaded workflow.
    pub fn check_stage_permission(
        &self,
        stage: &Stage,
        workflow: &Workflow,
        ctx: &UserContext,
        op: OperationType,
        team_ids: Option<&TeamIds>,
    ) -> PermissionResult {
        if stage.workflow_id != workflow.id {
            warn!(
                stage_id = stage.id,
                stage_workflow_id = stage.workflow_id,
                workflow_id = workflow.id,
                "stage evaluated against a different workflow"
            );
        }

        let team_ids = PermissionHelpers::new(ctx).resolve_team_ids(team_ids);
        let workflow_result =
            self.workflows
                .check_workflow_permission(workflow, ctx, op, Some(&*team_ids));

        match &stage.scope {
            StageScope::Inherit => {
                debug!(stage_id = stage.id, "stage inherits workflow permission");
                workflow_result.retag(op, INHERITED)
            }
            StageScope::Narrow {
                view_principals,
                operate_principals,
            } => {
                let stage_can_view = view_principals
                    .as_ref()
                    .map_or(true, |list| check_team_whitelist(list, &team_ids));
                let stage_can_operate = operate_principals
                    .as_ref()
                    .map_or(true, |list| check_team_whitelist(list, &team_ids));
                let can_view = workflow_result.can_view && stage_can_view;
                let can_operate = workflow_result.can_operate && stage_can_operate;

                debug!(
                    stage_id = stage.id,
                    workflow_can_view = workflow_result.can_view,
                    workflow_can_operate = workflow_result.can_operate,
                    stage_can_view,
                    stage_can_operate,
                    "narrowed stage permission evaluated"
                );

                PermissionResult::decide(can_view, can_operate, op, Subject::Stage, NARROWED)
            }
        }
    }

    /// List-rendering flags for a preloaded stage. Performs no I/O.
    ///
    /// Module access is checked before any entity-level evaluation.
    pub fn get_stage_permission_info_for_list(
        &self,
        stage: &Stage,
        workflow: &Workflow,
        ctx: &UserContext,
        has_view_module: bool,
        has_operate_module: bool,
        team_ids: Option<&TeamIds>,
    ) -> PermissionInfo {
        if !has_view_module {
            return PermissionInfo::denied(
                "User does not have module permission to view stages",
                DenialCode::ModulePermissionDenied,
            );
        }
        let result = self.check_stage_permission(stage, workflow, ctx, OperationType::View, team_ids);
        PermissionInfo::from_result(result, has_operate_module)
    }

    /// Teams whose members may see the stage.
    ///
    /// A stage that narrows view reports its own view whitelist; otherwise
    /// the workflow's view settings apply.
    pub fn get_authorized_team_ids(&self, stage: &Stage, workflow: &Workflow) -> AuthorizedTeams {
        match &stage.scope {
            StageScope::Narrow {
                view_principals: Some(view_principals),
                ..
            } => AuthorizedTeams::whitelist(view_principals.entries()),
            StageScope::Narrow { .. } | StageScope::Inherit => workflow_authorized_teams(workflow),
        }
    }

    /// Whether the caller is one of the stage's default assignees.
    pub fn check_assigned_user(&self, stage: &Stage, ctx: &UserContext) -> bool {
        if ctx.user_id.is_empty() || stage.default_assignees.is_blank() {
            return false;
        }
        let assigned = stage
            .default_assignees
            .entries()
            .iter()
            .any(|user| *user == ctx.user_id);
        debug!(stage_id = stage.id, user_id = %ctx.user_id, assigned, "stage assignee check");
        assigned
    }
}

impl<S: StageReader, W: WorkflowReader> StagePermissionService<S, W> {
    /// Loads a stage and its workflow, then checks `op`.
    #[instrument(skip(self, ctx, team_ids), fields(user_id = %ctx.user_id))]
    pub async fn check_stage_permission_by_id(
        &self,
        stage_id: i64,
        ctx: &UserContext,
        op: OperationType,
        team_ids: Option<&TeamIds>,
    ) -> DomainResult<PermissionResult> {
        let stage = self
            .stages
            .get_stage(stage_id)
            .await?
            .ok_or(DomainError::StageNotFound { stage_id })?;
        let workflow = self.workflows.load_workflow(stage.workflow_id).await?;
        Ok(self.check_stage_permission(&stage, &workflow, ctx, op, team_ids))
    }
}

fn workflow_authorized_teams(workflow: &Workflow) -> AuthorizedTeams {
    if workflow.principal_kind == PrincipalKind::User {
        if workflow.mode == PermissionMode::Public {
            return AuthorizedTeams::public();
        }
        debug!(
            workflow_id = workflow.id,
            "user-keyed workflow authorizes no teams"
        );
        return AuthorizedTeams::default();
    }
    let teams = workflow.view_principals.entries();
    match workflow.mode {
        PermissionMode::Public if teams.is_empty() => AuthorizedTeams::public(),
        PermissionMode::Public | PermissionMode::VisibleToTeams => AuthorizedTeams::whitelist(teams),
        PermissionMode::InvisibleToTeams => AuthorizedTeams::blacklist(teams),
        PermissionMode::Private => AuthorizedTeams::default(),
    }
}
