//! Case permission evaluation.
//!
//! The owner short-circuits every mode. A public case carries no
//! restriction of its own and takes its parent workflow's whole decision;
//! the other modes evaluate the case's own lists, with operate always a
//! whitelist independent of the view outcome. Stages are never consulted.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::context::UserContext;
use crate::error::{DomainError, DomainResult};
use crate::helpers::{
    check_blacklist, check_operate_public_mode, check_whitelist, PermissionHelpers, Requester,
};
use crate::model::{Case, OperationType, PermissionMode, TeamIds, Workflow};

use super::reader::{CaseReader, WorkflowReader};
use super::result::{DenialCode, GrantReason, PermissionInfo, PermissionResult, Reasons, Subject};
use super::workflow::WorkflowPermissionService;

const CASE: Reasons = Reasons::new(
    GrantReason::CaseViewPermission,
    GrantReason::CaseOperatePermission,
);

const WORKFLOW_INHERITED: Reasons = Reasons::new(
    GrantReason::WorkflowInheritedViewPermission,
    GrantReason::WorkflowInheritedOperatePermission,
);

/// Evaluates case policies.
pub struct CasePermissionService<C, W> {
    cases: Arc<C>,
    workflows: WorkflowPermissionService<W>,
}

impl<C, W> Clone for CasePermissionService<C, W> {
    fn clone(&self) -> Self {
        Self {
            cases: Arc::clone(&self.cases),
            workflows: self.workflows.clone(),
        }
    }
}

impl<C, W> CasePermissionService<C, W> {
    pub fn new(cases: Arc<C>, workflows: WorkflowPermissionService<W>) -> Self {
        Self { cases, workflows }
    }

    pub fn workflows(&self) -> &WorkflowPermissionService<W> {
        &self.workflows
    }

    /// Checks `op` on a preloaded case.
    ///
    /// `workflow` is the case's parent, needed only in public mode. When it
    /// is `None` a public case falls back to its own operate list.
    pub fn check_case_permission(
        &self,
        case: &Case,
        workflow: Option<&Workflow>,
        ctx: &UserContext,
        op: OperationType,
        team_ids: Option<&TeamIds>,
    ) -> PermissionResult {
        let helpers = PermissionHelpers::new(ctx);
        if helpers.is_current_user_owner(case.owner_id.as_deref()) {
            debug!(case_id = case.id, user_id = %ctx.user_id, "case owner");
            return PermissionResult::owner();
        }

        let team_ids = helpers.resolve_team_ids(team_ids);
        let requester = Requester::new(&ctx.user_id, &team_ids);
        let kind = case.principal_kind;

        let (can_view, can_operate) = match case.mode {
            PermissionMode::Public => match workflow {
                Some(workflow) => {
                    if workflow.id != case.workflow_id {
                        warn!(
                            case_id = case.id,
                            case_workflow_id = case.workflow_id,
                            workflow_id = workflow.id,
                            "case evaluated against a different workflow"
                        );
                    }
                    let inherited = self.workflows.check_workflow_permission(
                        workflow,
                        ctx,
                        op,
                        Some(&*team_ids),
                    );
                    debug!(
                        case_id = case.id,
                        can_view = inherited.can_view,
                        can_operate = inherited.can_operate,
                        "public case inherits workflow permission"
                    );
                    return PermissionResult::decide(
                        inherited.can_view,
                        inherited.can_operate,
                        op,
                        Subject::ParentWorkflow,
                        WORKFLOW_INHERITED,
                    );
                }
                None => {
                    warn!(
                        case_id = case.id,
                        workflow_id = case.workflow_id,
                        "parent workflow unavailable, using case permissions"
                    );
                    (
                        true,
                        check_operate_public_mode(kind, &case.operate_principals, requester),
                    )
                }
            },
            PermissionMode::VisibleToTeams => (
                check_whitelist(kind, &case.view_principals, requester),
                check_whitelist(kind, &case.operate_principals, requester),
            ),
            PermissionMode::InvisibleToTeams => (
                check_blacklist(kind, &case.view_principals, requester),
                check_whitelist(kind, &case.operate_principals, requester),
            ),
            PermissionMode::Private => (false, false),
        };

        debug!(
            case_id = case.id,
            mode = %case.mode,
            kind = %kind,
            %op,
            can_view,
            can_operate,
            "case permission evaluated"
        );

        PermissionResult::decide(can_view, can_operate, op, Subject::Case, CASE)
    }

    /// List-rendering flags for a preloaded case. Performs no I/O.
    pub fn get_case_permission_info_for_list(
        &self,
        case: &Case,
        workflow: Option<&Workflow>,
        ctx: &UserContext,
        has_view_module: bool,
        has_operate_module: bool,
        team_ids: Option<&TeamIds>,
    ) -> PermissionInfo {
        if !has_view_module {
            return PermissionInfo::denied(
                "User does not have module permission to view cases",
                DenialCode::ModulePermissionDenied,
            );
        }
        let result = self.check_case_permission(case, workflow, ctx, OperationType::View, team_ids);
        PermissionInfo::from_result(result, has_operate_module)
    }
}

impl<C, W: WorkflowReader> CasePermissionService<C, W> {
    /// Checks `op` on a preloaded case, loading its workflow when needed.
    ///
    /// A missing workflow or a reader failure falls back to the case's own
    /// permissions.
    #[instrument(skip_all, fields(case_id = case.id, user_id = %ctx.user_id))]
    pub async fn check_case_permission_with_reader(
        &self,
        case: &Case,
        ctx: &UserContext,
        op: OperationType,
        team_ids: Option<&TeamIds>,
    ) -> PermissionResult {
        let needs_workflow = case.mode == PermissionMode::Public
            && !PermissionHelpers::new(ctx).is_current_user_owner(case.owner_id.as_deref());

        let workflow = if needs_workflow {
            match self.workflows.reader().get_workflow(case.workflow_id).await {
                Ok(workflow) => workflow,
                Err(error) => {
                    warn!(workflow_id = case.workflow_id, %error, "failed to load parent workflow");
                    None
                }
            }
        } else {
            None
        };

        self.check_case_permission(case, workflow.as_ref(), ctx, op, team_ids)
    }
}

impl<C: CaseReader, W: WorkflowReader> CasePermissionService<C, W> {
    /// Loads a case and checks `op` on it.
    #[instrument(skip(self, ctx, team_ids), fields(user_id = %ctx.user_id))]
    pub async fn check_case_permission_by_id(
        &self,
        case_id: i64,
        ctx: &UserContext,
        op: OperationType,
        team_ids: Option<&TeamIds>,
    ) -> DomainResult<PermissionResult> {
        let case = self
            .cases
            .get_case(case_id)
            .await?
            .ok_or(DomainError::CaseNotFound { case_id })?;
        Ok(self
            .check_case_permission_with_reader(&case, ctx, op, team_ids)
            .await)
    }
}
