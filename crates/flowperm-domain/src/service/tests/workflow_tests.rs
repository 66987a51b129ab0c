//! Workflow permission test suite.

use super::mocks::{member_of, team_set, Fixture};
use crate::context::UserContext;
use crate::error::DomainError;
use crate::model::{OperationType, PermissionMode, PrincipalKind, PrincipalList, Workflow};
use crate::service::{DenialCode, GrantReason};

fn workflow(mode: PermissionMode) -> Workflow {
    Workflow::new(1, "Onboarding", mode)
}

fn teams(ids: &[&str]) -> PrincipalList {
    PrincipalList::from_ids(ids.iter().copied())
}

// ========== Section 1: Public ==========

#[test]
fn test_public_without_operate_list_grants_everyone() {
    let fx = Fixture::new();
    let wf = workflow(PermissionMode::Public);
    let ctx = member_of("1001", &["team-x"]);

    let result = fx
        .workflows
        .check_workflow_permission(&wf, &ctx, OperationType::Operate, None);

    assert!(result.success);
    assert!(result.can_view);
    assert!(result.can_operate);
    assert_eq!(result.grant_reason, Some(GrantReason::OperatePermission));
}

#[test]
fn test_public_with_empty_array_operate_list_grants_everyone() {
    let fx = Fixture::new();
    let wf = workflow(PermissionMode::Public).with_operate_principals(PrincipalList::from_json("[]"));
    let ctx = member_of("1001", &["team-x"]);

    let result = fx
        .workflows
        .check_workflow_permission(&wf, &ctx, OperationType::Operate, None);
    assert!(result.success);
}

#[test]
fn test_public_operate_list_restricts_operate_only() {
    let fx = Fixture::new();
    let wf = workflow(PermissionMode::Public).with_operate_principals(teams(&["team-a"]));
    let outsider = member_of("1001", &["team-b"]);

    let result = fx
        .workflows
        .check_workflow_permission(&wf, &outsider, OperationType::Operate, None);
    assert!(!result.success);
    assert!(result.can_view);
    assert!(!result.can_operate);
    assert_eq!(result.error_code, Some(DenialCode::OperatePermissionDenied));
    assert_eq!(
        result.error_message.as_deref(),
        Some("User has view permission but not operate permission for this workflow")
    );

    let view = fx
        .workflows
        .check_workflow_permission(&wf, &outsider, OperationType::View, None);
    assert!(view.success);
    assert_eq!(view.grant_reason, Some(GrantReason::ViewPermission));

    let insider = member_of("1002", &["team-a"]);
    let result = fx
        .workflows
        .check_workflow_permission(&wf, &insider, OperationType::Operate, None);
    assert!(result.success);
}

// ========== Section 2: VisibleToTeams ==========

#[test]
fn test_visible_to_teams_view_is_whitelist() {
    let fx = Fixture::new();
    let wf = workflow(PermissionMode::VisibleToTeams).with_view_principals(teams(&["team-a", "team-b"]));

    let member = member_of("1001", &["team-b"]);
    assert!(fx
        .workflows
        .check_workflow_permission(&wf, &member, OperationType::View, None)
        .success);

    let outsider = member_of("1002", &["team-c"]);
    let result = fx
        .workflows
        .check_workflow_permission(&wf, &outsider, OperationType::View, None);
    assert!(!result.success);
    assert_eq!(result.error_code, Some(DenialCode::ViewPermissionDenied));
    assert_eq!(
        result.error_message.as_deref(),
        Some("User does not have view permission for this workflow")
    );
}

#[test]
fn test_visible_to_teams_operate_requires_both_lists() {
    let fx = Fixture::new();
    let wf = workflow(PermissionMode::VisibleToTeams)
        .with_view_principals(teams(&["team-a"]))
        .with_operate_principals(teams(&["team-b"]));

    // In the operate list but not the view list.
    let operate_only = member_of("1001", &["team-b"]);
    let result = fx
        .workflows
        .check_workflow_permission(&wf, &operate_only, OperationType::Operate, None);
    assert!(!result.success);
    assert!(!result.can_view);
    assert!(!result.can_operate);
    assert_eq!(result.error_code, Some(DenialCode::PermissionDenied));
    assert_eq!(
        result.error_message.as_deref(),
        Some("User does not have permission for this workflow")
    );

    let both = member_of("1002", &["team-a", "team-b"]);
    assert!(fx
        .workflows
        .check_workflow_permission(&wf, &both, OperationType::Operate, None)
        .success);
}

#[test]
fn test_visible_to_teams_with_empty_view_list_denies() {
    let fx = Fixture::new();
    let wf = workflow(PermissionMode::VisibleToTeams);
    let ctx = member_of("1001", &["team-a"]);

    let result = fx
        .workflows
        .check_workflow_permission(&wf, &ctx, OperationType::View, None);
    assert!(!result.success);
}

// ========== Section 3: InvisibleToTeams ==========

#[test]
fn test_invisible_to_teams_operate_is_independent_whitelist() {
    let fx = Fixture::new();
    let wf = workflow(PermissionMode::InvisibleToTeams)
        .with_view_principals(teams(&["A"]))
        .with_operate_principals(teams(&["C"]));

    let ctx = member_of("1001", &["B"]);
    let result = fx
        .workflows
        .check_workflow_permission(&wf, &ctx, OperationType::Operate, None);
    assert!(result.can_view);
    assert!(!result.can_operate);
    assert!(!result.success);
}

#[test]
fn test_invisible_to_teams_blacklisted_team_cannot_view() {
    let fx = Fixture::new();
    let wf = workflow(PermissionMode::InvisibleToTeams)
        .with_view_principals(teams(&["A"]))
        .with_operate_principals(teams(&["A"]));

    let ctx = member_of("1001", &["A"]);
    let result = fx
        .workflows
        .check_workflow_permission(&wf, &ctx, OperationType::View, None);
    assert!(!result.can_view);
    assert!(!result.success);
    // Operate is reported independently of the blacklist.
    assert!(result.can_operate);
}

#[test]
fn test_invisible_to_teams_empty_operate_list_denies_operate() {
    let fx = Fixture::new();
    let wf = workflow(PermissionMode::InvisibleToTeams);
    let ctx = member_of("1001", &["A"]);

    let result = fx
        .workflows
        .check_workflow_permission(&wf, &ctx, OperationType::Operate, None);
    assert!(result.can_view);
    assert!(!result.can_operate);
}

// ========== Section 4: Private and owner ==========

#[test]
fn test_private_denies_non_owner() {
    let fx = Fixture::new();
    let wf = workflow(PermissionMode::Private).with_owner("42");
    let ctx = member_of("1001", &["team-a"]);

    let result = fx
        .workflows
        .check_workflow_permission(&wf, &ctx, OperationType::View, None);
    assert!(!result.success);
    assert!(!result.can_view);
    assert!(!result.can_operate);
}

#[test]
fn test_owner_has_full_access_in_every_mode() {
    let fx = Fixture::new();
    let owner = member_of("42", &["nobody"]);
    for mode in [
        PermissionMode::Public,
        PermissionMode::VisibleToTeams,
        PermissionMode::InvisibleToTeams,
        PermissionMode::Private,
    ] {
        let wf = workflow(mode)
            .with_view_principals(teams(&["nobody"]))
            .with_operate_principals(teams(&["someone-else"]))
            .with_owner("42");
        for op in [OperationType::View, OperationType::Operate, OperationType::Delete] {
            let result = fx.workflows.check_workflow_permission(&wf, &owner, op, None);
            assert!(result.success, "{mode} {op}");
            assert!(result.can_view && result.can_operate, "{mode} {op}");
            assert_eq!(result.grant_reason, Some(GrantReason::Owner));
        }
    }
}

// ========== Section 5: Delete, user lists, supplied teams ==========

#[test]
fn test_delete_is_evaluated_like_operate() {
    let fx = Fixture::new();
    let wf = workflow(PermissionMode::Public).with_operate_principals(teams(&["team-a"]));
    let ctx = member_of("1001", &["team-b"]);

    let operate = fx
        .workflows
        .check_workflow_permission(&wf, &ctx, OperationType::Operate, None);
    let delete = fx
        .workflows
        .check_workflow_permission(&wf, &ctx, OperationType::Delete, None);
    assert_eq!(operate.success, delete.success);
    assert_eq!(operate.can_operate, delete.can_operate);
    assert_eq!(delete.error_code, Some(DenialCode::DeletePermissionDenied));
}

#[test]
fn test_user_keyed_workflow_uses_user_ids() {
    let fx = Fixture::new();
    let wf = workflow(PermissionMode::VisibleToTeams)
        .with_principal_kind(PrincipalKind::User)
        .with_view_principals(PrincipalList::from_ids(["1001", "1002"]))
        .with_operate_principals(PrincipalList::from_ids(["1001"]));

    let operator = member_of("1001", &["1002"]);
    assert!(fx
        .workflows
        .check_workflow_permission(&wf, &operator, OperationType::Operate, None)
        .success);

    let viewer = member_of("1002", &[]);
    let result = fx
        .workflows
        .check_workflow_permission(&wf, &viewer, OperationType::Operate, None);
    assert!(result.can_view);
    assert!(!result.can_operate);

    // A team id equal to a listed user id does not count.
    let team_named_like_user = member_of("2000", &["1001"]);
    assert!(!fx
        .workflows
        .check_workflow_permission(&wf, &team_named_like_user, OperationType::View, None)
        .success);
}

#[test]
fn test_supplied_team_ids_override_context() {
    let fx = Fixture::new();
    let wf = workflow(PermissionMode::VisibleToTeams).with_view_principals(teams(&["team-a"]));
    let ctx = member_of("1001", &["team-z"]);
    let supplied = team_set(&["team-a"]);

    let result =
        fx.workflows
            .check_workflow_permission(&wf, &ctx, OperationType::View, Some(&supplied));
    assert!(result.success);
}

#[test]
fn test_user_without_teams_matches_other() {
    let fx = Fixture::new();
    let wf = workflow(PermissionMode::VisibleToTeams).with_view_principals(teams(&["Other"]));
    let ctx = UserContext::new("1001");

    assert!(fx
        .workflows
        .check_workflow_permission(&wf, &ctx, OperationType::View, None)
        .success);
}

#[test]
fn test_double_encoded_lists_are_honoured() {
    let fx = Fixture::new();
    let wf = workflow(PermissionMode::VisibleToTeams)
        .with_view_principals(PrincipalList::from_json(r#""[\"team-a\"]""#));
    let ctx = member_of("1001", &["team-a"]);

    assert!(fx
        .workflows
        .check_workflow_permission(&wf, &ctx, OperationType::View, None)
        .success);
}

#[test]
fn test_malformed_view_list_denies_in_whitelist_mode() {
    let fx = Fixture::new();
    let wf = workflow(PermissionMode::VisibleToTeams)
        .with_view_principals(PrincipalList::from_json("invalid-json-{[}"));
    let ctx = member_of("1001", &["team-a"]);

    assert!(!fx
        .workflows
        .check_workflow_permission(&wf, &ctx, OperationType::View, None)
        .success);
}

// ========== Section 6: By-id ==========

#[tokio::test]
async fn test_check_by_id_loads_workflow() {
    let fx = Fixture::new();
    fx.workflow_reader
        .insert(7, Workflow::new(7, "Loaded", PermissionMode::Public))
        .await;
    let ctx = member_of("1001", &["team-a"]);

    let result = fx
        .workflows
        .check_workflow_permission_by_id(7, &ctx, OperationType::Operate, None)
        .await
        .unwrap();
    assert!(result.success);
    assert_eq!(fx.workflow_reader.calls(), 1);
}

#[tokio::test]
async fn test_check_by_id_reports_missing_workflow() {
    let fx = Fixture::new();
    let ctx = member_of("1001", &["team-a"]);

    let err = fx
        .workflows
        .check_workflow_permission_by_id(99, &ctx, OperationType::View, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::WorkflowNotFound { workflow_id: 99 }));
}

#[tokio::test]
async fn test_check_by_id_propagates_reader_failure() {
    let fx = Fixture::new();
    fx.workflow_reader.fail_reads();
    let ctx = member_of("1001", &["team-a"]);

    let err = fx
        .workflows
        .check_workflow_permission_by_id(7, &ctx, OperationType::View, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::ReaderError { .. }));
}
