//! Batch permission flags for list pages.
//!
//! A list request evaluates many preloaded entities against one caller.
//! Team ids are resolved once per request and threaded through every check;
//! no reader is touched.

use flowperm_domain::{
    Case, CasePermissionService, PermissionHelpers, PermissionInfo, Stage,
    StagePermissionService, UserContext, Workflow,
};
use tracing::{debug, instrument};

use super::types::{HandlerError, HandlerResult, ModuleAccess};
use crate::bypass::BypassPolicy;
use crate::config::ServerConfig;

/// Computes per-entity [`PermissionInfo`] for stage and case lists.
pub struct PermissionListHandler<S, C, W> {
    stages: StagePermissionService<S, W>,
    cases: CasePermissionService<C, W>,
    bypass: BypassPolicy,
    max_items: usize,
}

impl<S, C, W> PermissionListHandler<S, C, W> {
    pub fn new(
        stages: StagePermissionService<S, W>,
        cases: CasePermissionService<C, W>,
        bypass: BypassPolicy,
        max_items: usize,
    ) -> Self {
        Self {
            stages,
            cases,
            bypass,
            max_items,
        }
    }

    /// Builds the handler with the bypass and batch limits from `config`.
    pub fn from_config(
        stages: StagePermissionService<S, W>,
        cases: CasePermissionService<C, W>,
        config: &ServerConfig,
    ) -> Self {
        Self::new(
            stages,
            cases,
            BypassPolicy::from_settings(&config.bypass),
            config.batch.max_items,
        )
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Flags for each stage of `workflow`, in input order.
    #[instrument(skip_all, fields(user_id = %ctx.user_id, workflow_id = workflow.id, count = stages.len()))]
    pub fn stage_permissions(
        &self,
        ctx: &UserContext,
        workflow: &Workflow,
        stages: &[Stage],
        module_access: ModuleAccess,
    ) -> HandlerResult<Vec<PermissionInfo>> {
        self.ensure_within_limit(stages.len())?;
        if self.bypass.grants_full_access(ctx) {
            return Ok(vec![PermissionInfo::allowed(true); stages.len()]);
        }

        let module = self.effective_module_access(ctx, module_access);
        let team_ids = PermissionHelpers::new(ctx).get_user_team_ids();

        Ok(stages
            .iter()
            .map(|stage| {
                self.stages.get_stage_permission_info_for_list(
                    stage,
                    workflow,
                    ctx,
                    module.view,
                    module.operate,
                    Some(&team_ids),
                )
            })
            .collect())
    }

    /// Flags for each case, in input order.
    ///
    /// `workflow` is the cases' shared parent; without it public cases fall
    /// back to their own operate lists.
    #[instrument(skip_all, fields(user_id = %ctx.user_id, count = cases.len()))]
    pub fn case_permissions(
        &self,
        ctx: &UserContext,
        workflow: Option<&Workflow>,
        cases: &[Case],
        module_access: ModuleAccess,
    ) -> HandlerResult<Vec<PermissionInfo>> {
        self.ensure_within_limit(cases.len())?;
        if self.bypass.grants_full_access(ctx) {
            return Ok(vec![PermissionInfo::allowed(true); cases.len()]);
        }

        let module = self.effective_module_access(ctx, module_access);
        let team_ids = PermissionHelpers::new(ctx).get_user_team_ids();

        Ok(cases
            .iter()
            .map(|case| {
                self.cases.get_case_permission_info_for_list(
                    case,
                    workflow,
                    ctx,
                    module.view,
                    module.operate,
                    Some(&team_ids),
                )
            })
            .collect())
    }

    fn ensure_within_limit(&self, size: usize) -> HandlerResult<()> {
        if size > self.max_items {
            return Err(HandlerError::BatchTooLarge {
                size,
                max: self.max_items,
            });
        }
        Ok(())
    }

    fn effective_module_access(&self, ctx: &UserContext, requested: ModuleAccess) -> ModuleAccess {
        if self.bypass.grants_module_access(ctx) {
            debug!(user_id = %ctx.user_id, "portal token bypasses module checks");
            return ModuleAccess::full();
        }
        requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use flowperm_domain::{
        DenialCode, PermissionMode, PrincipalList, TokenClaims, WorkflowPermissionService,
    };

    fn handler(max_items: usize) -> PermissionListHandler<(), (), ()> {
        let workflows = WorkflowPermissionService::new(Arc::new(()));
        PermissionListHandler::new(
            StagePermissionService::new(Arc::new(()), workflows.clone()),
            CasePermissionService::new(Arc::new(()), workflows),
            BypassPolicy::default(),
            max_items,
        )
    }

    fn workflow() -> Workflow {
        Workflow::new(1, "Onboarding", PermissionMode::VisibleToTeams)
            .with_view_principals(PrincipalList::from_ids(["sales", "support"]))
            .with_operate_principals(PrincipalList::from_ids(["sales"]))
    }

    fn stages() -> Vec<Stage> {
        vec![
            Stage::inheriting(10, 1, "Intake"),
            Stage::narrowed(
                11,
                1,
                "Review",
                PrincipalList::from_ids(["support"]),
                PrincipalList::from_ids(["support"]),
            ),
            Stage::narrowed(
                12,
                1,
                "Close",
                PrincipalList::from_ids(["sales"]),
                PrincipalList::none(),
            ),
        ]
    }

    #[test]
    fn test_stage_flags_in_input_order() {
        let ctx = UserContext::new("1").with_teams(["sales"]);
        let infos = handler(100)
            .stage_permissions(&ctx, &workflow(), &stages(), ModuleAccess::full())
            .unwrap();

        assert_eq!(infos.len(), 3);
        assert!(infos[0].can_view && infos[0].can_operate);
        assert!(!infos[1].can_view);
        assert_eq!(
            infos[1].error_message.as_deref(),
            Some("User does not have view permission for this stage")
        );
        assert!(infos[2].can_view && !infos[2].can_operate);
    }

    #[test]
    fn test_operate_gated_by_module_access() {
        let ctx = UserContext::new("1").with_teams(["sales"]);
        let infos = handler(100)
            .stage_permissions(&ctx, &workflow(), &stages(), ModuleAccess::new(true, false))
            .unwrap();
        assert!(infos[0].can_view);
        assert!(!infos[0].can_operate);

        let infos = handler(100)
            .stage_permissions(&ctx, &workflow(), &stages(), ModuleAccess::default())
            .unwrap();
        assert!(infos
            .iter()
            .all(|info| info.error_code == Some(DenialCode::ModulePermissionDenied)));
    }

    #[test]
    fn test_portal_token_gets_module_access() {
        let ctx = UserContext::new("1")
            .with_teams(["sales"])
            .with_token(TokenClaims::new("portal", "portal-access"))
            .with_portal_endpoint();
        let infos = handler(100)
            .stage_permissions(&ctx, &workflow(), &stages(), ModuleAccess::default())
            .unwrap();
        assert!(infos[0].can_view && infos[0].can_operate);
        // Entity checks still apply.
        assert!(!infos[1].can_view);
    }

    #[test]
    fn test_admin_sees_everything() {
        let ctx = UserContext::new("9").with_system_admin();
        let cases = vec![Case::new(100, 1, PermissionMode::Private)];
        let infos = handler(100)
            .case_permissions(&ctx, None, &cases, ModuleAccess::default())
            .unwrap();
        assert_eq!(infos, vec![PermissionInfo::allowed(true)]);
    }

    #[test]
    fn test_batch_limit() {
        let ctx = UserContext::new("1").with_teams(["sales"]);
        let err = handler(2)
            .stage_permissions(&ctx, &workflow(), &stages(), ModuleAccess::full())
            .unwrap_err();
        assert!(matches!(err, HandlerError::BatchTooLarge { size: 3, max: 2 }));

        let infos = handler(3)
            .stage_permissions(&ctx, &workflow(), &stages(), ModuleAccess::full())
            .unwrap();
        assert_eq!(infos.len(), 3);
    }

    #[test]
    fn test_case_flags() {
        let ctx = UserContext::new("1").with_teams(["support"]);
        let workflow = workflow();
        let cases = vec![
            Case::new(100, 1, PermissionMode::Public),
            Case::new(101, 1, PermissionMode::Private).with_owner("1"),
            Case::new(102, 1, PermissionMode::VisibleToTeams)
                .with_view_principals(PrincipalList::from_ids(["sales"])),
        ];
        let infos = handler(100)
            .case_permissions(&ctx, Some(&workflow), &cases, ModuleAccess::full())
            .unwrap();

        // Public case follows the workflow: support views but cannot operate.
        assert!(infos[0].can_view && !infos[0].can_operate);
        assert!(infos[1].can_view && infos[1].can_operate);
        assert!(!infos[2].can_view);
    }
}
