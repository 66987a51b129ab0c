//! Result types returned by the permission services.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::OperationType;

/// Why access was granted. Used by callers for audit logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantReason {
    Owner,
    ViewPermission,
    OperatePermission,
    InheritedViewPermission,
    InheritedOperatePermission,
    WorkflowAndStageViewPermission,
    WorkflowAndStageOperatePermission,
    WorkflowInheritedViewPermission,
    WorkflowInheritedOperatePermission,
    CaseViewPermission,
    CaseOperatePermission,
}

impl GrantReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "Owner",
            Self::ViewPermission => "ViewPermission",
            Self::OperatePermission => "OperatePermission",
            Self::InheritedViewPermission => "InheritedViewPermission",
            Self::InheritedOperatePermission => "InheritedOperatePermission",
            Self::WorkflowAndStageViewPermission => "WorkflowAndStageViewPermission",
            Self::WorkflowAndStageOperatePermission => "WorkflowAndStageOperatePermission",
            Self::WorkflowInheritedViewPermission => "WorkflowInheritedViewPermission",
            Self::WorkflowInheritedOperatePermission => "WorkflowInheritedOperatePermission",
            Self::CaseViewPermission => "CaseViewPermission",
            Self::CaseOperatePermission => "CaseOperatePermission",
        }
    }
}

impl fmt::Display for GrantReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-readable denial code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DenialCode {
    ViewPermissionDenied,
    OperatePermissionDenied,
    DeletePermissionDenied,
    PermissionDenied,
    WorkflowViewPermissionDenied,
    WorkflowOperatePermissionDenied,
    ModulePermissionDenied,
}

impl DenialCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewPermissionDenied => "VIEW_PERMISSION_DENIED",
            Self::OperatePermissionDenied => "OPERATE_PERMISSION_DENIED",
            Self::DeletePermissionDenied => "DELETE_PERMISSION_DENIED",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::WorkflowViewPermissionDenied => "WORKFLOW_VIEW_PERMISSION_DENIED",
            Self::WorkflowOperatePermissionDenied => "WORKFLOW_OPERATE_PERMISSION_DENIED",
            Self::ModulePermissionDenied => "MODULE_PERMISSION_DENIED",
        }
    }
}

impl fmt::Display for DenialCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single permission check.
///
/// `can_view` and `can_operate` are always both evaluated; `success` is the
/// one selected by the requested operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionResult {
    pub success: bool,
    pub can_view: bool,
    pub can_operate: bool,
    pub grant_reason: Option<GrantReason>,
    pub error_message: Option<String>,
    pub error_code: Option<DenialCode>,
}

impl PermissionResult {
    /// Full access for the entity owner.
    pub fn owner() -> Self {
        Self::granted(true, true, GrantReason::Owner)
    }

    pub fn granted(can_view: bool, can_operate: bool, reason: GrantReason) -> Self {
        Self {
            success: true,
            can_view,
            can_operate,
            grant_reason: Some(reason),
            error_message: None,
            error_code: None,
        }
    }

    pub fn denied(
        can_view: bool,
        can_operate: bool,
        message: impl Into<String>,
        code: DenialCode,
    ) -> Self {
        Self {
            success: false,
            can_view,
            can_operate,
            grant_reason: None,
            error_message: Some(message.into()),
            error_code: Some(code),
        }
    }

    /// Builds the result for `op` from evaluated flags.
    pub(crate) fn decide(
        can_view: bool,
        can_operate: bool,
        op: OperationType,
        subject: Subject,
        reasons: Reasons,
    ) -> Self {
        if op.requires_operate() {
            if can_operate {
                return Self::granted(can_view, can_operate, reasons.operate);
            }
        } else if can_view {
            return Self::granted(can_view, can_operate, reasons.view);
        }

        let (message, code) = subject.denial(op, can_view);
        Self::denied(can_view, can_operate, message, code)
    }

    /// Replaces the grant reason of a successful result.
    pub(crate) fn retag(mut self, op: OperationType, reasons: Reasons) -> Self {
        if self.success {
            self.grant_reason = Some(if op.requires_operate() {
                reasons.operate
            } else {
                reasons.view
            });
        }
        self
    }
}

/// Capability flags for list rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionInfo {
    pub can_view: bool,
    pub can_operate: bool,
    pub error_message: Option<String>,
    pub error_code: Option<DenialCode>,
}

impl PermissionInfo {
    pub fn allowed(can_operate: bool) -> Self {
        Self {
            can_view: true,
            can_operate,
            error_message: None,
            error_code: None,
        }
    }

    pub fn denied(message: impl Into<String>, code: DenialCode) -> Self {
        Self {
            can_view: false,
            can_operate: false,
            error_message: Some(message.into()),
            error_code: Some(code),
        }
    }

    /// Derives list flags from a full check, gating operate by module access.
    pub(crate) fn from_result(result: PermissionResult, has_operate_module: bool) -> Self {
        if !result.can_view {
            let message = result
                .error_message
                .unwrap_or_else(|| "User is not allowed to view this entity".to_string());
            let code = result.error_code.unwrap_or(DenialCode::ViewPermissionDenied);
            return Self::denied(message, code);
        }
        Self::allowed(has_operate_module && result.can_operate)
    }
}

/// Entity named in denial messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Subject {
    Workflow,
    Stage,
    Case,
    /// A case in public mode, judged by its workflow.
    ParentWorkflow,
}

impl Subject {
    fn label(&self) -> &'static str {
        match self {
            Self::Workflow | Self::ParentWorkflow => "workflow",
            Self::Stage => "stage",
            Self::Case => "case",
        }
    }

    fn denial(&self, op: OperationType, can_view: bool) -> (String, DenialCode) {
        if *self == Self::ParentWorkflow {
            return if can_view {
                (
                    "User has view permission but not operate permission on parent workflow"
                        .to_string(),
                    DenialCode::WorkflowOperatePermissionDenied,
                )
            } else {
                (
                    "User does not have view permission on parent workflow".to_string(),
                    DenialCode::WorkflowViewPermissionDenied,
                )
            };
        }

        let label = self.label();
        match (op, can_view) {
            (OperationType::View, _) => (
                format!("User does not have view permission for this {label}"),
                DenialCode::ViewPermissionDenied,
            ),
            (OperationType::Operate, true) => (
                format!("User has view permission but not operate permission for this {label}"),
                DenialCode::OperatePermissionDenied,
            ),
            (OperationType::Operate, false) => (
                format!("User does not have permission for this {label}"),
                DenialCode::PermissionDenied,
            ),
            (OperationType::Delete, true) => (
                format!("User has view permission but not delete permission for this {label}"),
                DenialCode::DeletePermissionDenied,
            ),
            (OperationType::Delete, false) => (
                format!("User does not have permission to delete this {label}"),
                DenialCode::PermissionDenied,
            ),
        }
    }
}

/// Grant reasons to use for the view and operate outcomes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Reasons {
    pub view: GrantReason,
    pub operate: GrantReason,
}

impl Reasons {
    pub const fn new(view: GrantReason, operate: GrantReason) -> Self {
        Self { view, operate }
    }
}
