//! Workflow permission evaluation.
//!
//! | Mode             | can_view              | can_operate                           |
//! |------------------|-----------------------|---------------------------------------|
//! | Public           | true                  | operate list empty ⇒ true, else white |
//! | VisibleToTeams   | view whitelist        | view whitelist AND operate whitelist  |
//! | InvisibleToTeams | NOT in view blacklist | operate whitelist                     |
//! | Private          | owner                 | owner                                 |
//!
//! The owner receives full access under every mode.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::context::UserContext;
use crate::error::{DomainError, DomainResult};
use crate::helpers::{
    check_blacklist, check_operate_public_mode, check_whitelist, PermissionHelpers, Requester,
};
use crate::model::{OperationType, PermissionMode, TeamIds, Workflow};

use super::reader::WorkflowReader;
use super::result::{DenialCode, GrantReason, PermissionInfo, PermissionResult, Reasons, Subject};

const REASONS: Reasons = Reasons::new(GrantReason::ViewPermission, GrantReason::OperatePermission);

/// Evaluates workflow policies.
///
/// The reader is only used by [`Self::check_workflow_permission_by_id`].
pub struct WorkflowPermissionService<W> {
    reader: Arc<W>,
}

impl<W> Clone for WorkflowPermissionService<W> {
    fn clone(&self) -> Self {
        Self {
            reader: Arc::clone(&self.reader),
        }
    }
}

impl<W> WorkflowPermissionService<W> {
    pub fn new(reader: Arc<W>) -> Self {
        Self { reader }
    }

    pub fn reader(&self) -> &Arc<W> {
        &self.reader
    }

    /// View column of the mode table. Ownership only counts under `Private`.
    pub fn check_view_permission(
        &self,
        workflow: &Workflow,
        ctx: &UserContext,
        team_ids: &TeamIds,
    ) -> bool {
        let requester = Requester::new(&ctx.user_id, team_ids);
        let kind = workflow.principal_kind;
        match workflow.mode {
            PermissionMode::Public => true,
            PermissionMode::VisibleToTeams => {
                check_whitelist(kind, &workflow.view_principals, requester)
            }
            PermissionMode::InvisibleToTeams => {
                check_blacklist(kind, &workflow.view_principals, requester)
            }
            PermissionMode::Private => {
                PermissionHelpers::new(ctx).is_current_user_owner(workflow.owner_id.as_deref())
            }
        }
    }

    /// Operate column of the mode table. Ownership only counts under `Private`.
    pub fn check_operate_permission(
        &self,
        workflow: &Workflow,
        ctx: &UserContext,
        team_ids: &TeamIds,
    ) -> bool {
        let requester = Requester::new(&ctx.user_id, team_ids);
        let kind = workflow.principal_kind;
        match workflow.mode {
            PermissionMode::Public => {
                check_operate_public_mode(kind, &workflow.operate_principals, requester)
            }
            PermissionMode::VisibleToTeams => {
                check_whitelist(kind, &workflow.view_principals, requester)
                    && check_whitelist(kind, &workflow.operate_principals, requester)
            }
            PermissionMode::InvisibleToTeams => {
                check_whitelist(kind, &workflow.operate_principals, requester)
            }
            PermissionMode::Private => {
                PermissionHelpers::new(ctx).is_current_user_owner(workflow.owner_id.as_deref())
            }
        }
    }

    /// Checks `op` on a preloaded workflow.
    ///
    /// Team ids are resolved from `ctx` when `team_ids` is `None`.
    pub fn check_workflow_permission(
        &self,
        workflow: &Workflow,
        ctx: &UserContext,
        op: OperationType,
        team_ids: Option<&TeamIds>,
    ) -> PermissionResult {
        let helpers = PermissionHelpers::new(ctx);
        if helpers.is_current_user_owner(workflow.owner_id.as_deref()) {
            debug!(workflow_id = workflow.id, user_id = %ctx.user_id, "workflow owner");
            return PermissionResult::owner();
        }

        let team_ids = helpers.resolve_team_ids(team_ids);
        let can_view = self.check_view_permission(workflow, ctx, &team_ids);
        let can_operate = self.check_operate_permission(workflow, ctx, &team_ids);

        debug!(
            workflow_id = workflow.id,
            mode = %workflow.mode,
            kind = %workflow.principal_kind,
            %op,
            can_view,
            can_operate,
            "workflow permission evaluated"
        );

        PermissionResult::decide(can_view, can_operate, op, Subject::Workflow, REASONS)
    }

    /// List-rendering flags for a preloaded workflow. Performs no I/O.
    pub fn get_workflow_permission_info_for_list(
        &self,
        workflow: &Workflow,
        ctx: &UserContext,
        has_view_module: bool,
        has_operate_module: bool,
        team_ids: Option<&TeamIds>,
    ) -> PermissionInfo {
        if !has_view_module {
            return PermissionInfo::denied(
                "User does not have module permission to view workflows",
                DenialCode::ModulePermissionDenied,
            );
        }
        let result = self.check_workflow_permission(workflow, ctx, OperationType::View, team_ids);
        PermissionInfo::from_result(result, has_operate_module)
    }
}

impl<W: WorkflowReader> WorkflowPermissionService<W> {
    /// Loads a workflow and checks `op` on it.
    #[instrument(skip(self, ctx, team_ids), fields(user_id = %ctx.user_id))]
    pub async fn check_workflow_permission_by_id(
        &self,
        workflow_id: i64,
        ctx: &UserContext,
        op: OperationType,
        team_ids: Option<&TeamIds>,
    ) -> DomainResult<PermissionResult> {
        let workflow = self.load_workflow(workflow_id).await?;
        Ok(self.check_workflow_permission(&workflow, ctx, op, team_ids))
    }

    pub(crate) async fn load_workflow(&self, workflow_id: i64) -> DomainResult<Workflow> {
        self.reader
            .get_workflow(workflow_id)
            .await?
            .ok_or(DomainError::WorkflowNotFound { workflow_id })
    }
}
