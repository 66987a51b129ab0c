//! Single-resource permission checks by id.

use std::sync::Arc;

use flowperm_domain::{
    CasePermissionService, OperationType, PermissionHelpers, PermissionResult,
    StagePermissionService, TeamIds, UserContext, WorkflowPermissionService,
};
use flowperm_storage::PolicyStore;
use tracing::{debug, info, instrument};

use super::types::{HandlerResult, ResourcePermissionResponse, ResourceType};
use crate::adapters::{StoreCaseReader, StoreStageReader, StoreWorkflowReader};
use crate::bypass::BypassPolicy;

/// Answers "what may this caller do with resource X" for one resource.
pub struct ResourcePermissionHandler<S: PolicyStore> {
    workflows: WorkflowPermissionService<StoreWorkflowReader<S>>,
    stages: StagePermissionService<StoreStageReader<S>, StoreWorkflowReader<S>>,
    cases: CasePermissionService<StoreCaseReader<S>, StoreWorkflowReader<S>>,
    bypass: BypassPolicy,
}

impl<S: PolicyStore> ResourcePermissionHandler<S> {
    pub fn new(storage: Arc<S>, bypass: BypassPolicy) -> Self {
        let workflows =
            WorkflowPermissionService::new(Arc::new(StoreWorkflowReader::new(Arc::clone(&storage))));
        let stages = StagePermissionService::new(
            Arc::new(StoreStageReader::new(Arc::clone(&storage))),
            workflows.clone(),
        );
        let cases =
            CasePermissionService::new(Arc::new(StoreCaseReader::new(storage)), workflows.clone());
        Self {
            workflows,
            stages,
            cases,
            bypass,
        }
    }

    /// Checks view, then operate if view was granted.
    ///
    /// Administrators short-circuit with full access. A missing resource is
    /// an error, a denial is not.
    #[instrument(skip(self, ctx), fields(user_id = %ctx.user_id))]
    pub async fn check_resource_permission(
        &self,
        ctx: &UserContext,
        resource_type: ResourceType,
        resource_id: i64,
    ) -> HandlerResult<ResourcePermissionResponse> {
        if let Some(admin) = self.bypass.admin_bypass(ctx) {
            return Ok(ResourcePermissionResponse {
                can_view: true,
                can_operate: true,
                grant_reason: Some(admin.as_str().to_string()),
                error_message: None,
            });
        }

        let team_ids = PermissionHelpers::new(ctx).get_user_team_ids();

        let view = self
            .check(ctx, resource_type, resource_id, OperationType::View, &team_ids)
            .await?;
        if !view.success {
            info!("view permission denied, skipping operate check");
            return Ok(ResourcePermissionResponse {
                can_view: false,
                can_operate: false,
                grant_reason: None,
                error_message: view.error_message,
            });
        }

        let operate = self
            .check(ctx, resource_type, resource_id, OperationType::Operate, &team_ids)
            .await?;
        let reason = if operate.success {
            operate.grant_reason
        } else {
            view.grant_reason
        };

        let response = ResourcePermissionResponse {
            can_view: true,
            can_operate: operate.success,
            grant_reason: reason.map(|r| r.as_str().to_string()),
            error_message: None,
        };
        info!(
            can_view = response.can_view,
            can_operate = response.can_operate,
            grant_reason = ?response.grant_reason,
            "resource permission checked"
        );
        Ok(response)
    }

    async fn check(
        &self,
        ctx: &UserContext,
        resource_type: ResourceType,
        resource_id: i64,
        op: OperationType,
        team_ids: &TeamIds,
    ) -> HandlerResult<PermissionResult> {
        debug!(%resource_type, resource_id, %op, "checking resource");
        let result = match resource_type {
            ResourceType::Workflow => {
                self.workflows
                    .check_workflow_permission_by_id(resource_id, ctx, op, Some(team_ids))
                    .await?
            }
            ResourceType::Stage => {
                self.stages
                    .check_stage_permission_by_id(resource_id, ctx, op, Some(team_ids))
                    .await?
            }
            ResourceType::Case => {
                self.cases
                    .check_case_permission_by_id(resource_id, ctx, op, Some(team_ids))
                    .await?
            }
        };
        Ok(result)
    }
}
