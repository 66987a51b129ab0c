//! Shared ACL primitives.
//!
//! List checks are free functions over a [`PrincipalList`] and the caller's
//! resolved principals. Caller-specific queries (team resolution, ownership,
//! admin and portal detection) live on [`PermissionHelpers`], a borrowed view
//! over one [`UserContext`].

use std::borrow::Cow;

use tracing::{debug, warn};

use crate::context::UserContext;
use crate::model::{decode_principal_list, PrincipalKind, PrincipalList, TeamIds};

/// Team id assigned to callers without any team membership.
pub const DEFAULT_TEAM_OTHER: &str = "Other";

/// Tenant id used when the context carries none.
pub const DEFAULT_TENANT_ID: &str = "DEFAULT";

const PORTAL_SCOPE: &str = "portal";
const PORTAL_TOKEN_TYPE: &str = "portal-access";

/// The caller's principals as seen by a list check.
#[derive(Debug, Clone, Copy)]
pub struct Requester<'a> {
    pub user_id: &'a str,
    pub team_ids: &'a TeamIds,
}

impl<'a> Requester<'a> {
    pub fn new(user_id: &'a str, team_ids: &'a TeamIds) -> Self {
        Self { user_id, team_ids }
    }
}

/// Parses a stored principal list. Never fails; see [`decode_principal_list`].
pub fn deserialize_team_list(json: Option<&str>) -> Vec<String> {
    decode_principal_list(json)
}

/// True iff the list names at least one of the caller's teams. Blank ⇒ false.
pub fn check_team_whitelist(list: &PrincipalList, team_ids: &TeamIds) -> bool {
    if list.is_blank() {
        return false;
    }
    list.entries().iter().any(|team| team_ids.contains(team))
}

/// True iff the list names none of the caller's teams. Blank ⇒ true.
pub fn check_team_blacklist(list: &PrincipalList, team_ids: &TeamIds) -> bool {
    if list.is_blank() {
        return true;
    }
    !list.entries().iter().any(|team| team_ids.contains(team))
}

/// True iff the list contains `user_id`. Blank ⇒ false.
pub fn check_user_whitelist(list: &PrincipalList, user_id: &str) -> bool {
    if list.is_blank() {
        return false;
    }
    list.entries().iter().any(|user| user == user_id)
}

/// True iff the list does not contain `user_id`. Blank ⇒ true.
pub fn check_user_blacklist(list: &PrincipalList, user_id: &str) -> bool {
    if list.is_blank() {
        return true;
    }
    !list.entries().iter().any(|user| user == user_id)
}

/// Public-mode operate list: NULL, blank or `[]` lets everyone operate,
/// anything else is a team whitelist.
pub fn check_operate_teams_public_mode(list: &PrincipalList, team_ids: &TeamIds) -> bool {
    let teams = list.entries();
    if teams.is_empty() {
        debug!("public mode without operate teams, operate open to all");
        return true;
    }
    let allowed = teams.iter().any(|team| team_ids.contains(team));
    debug!(?teams, allowed, "public mode operate team whitelist");
    allowed
}

/// User-keyed counterpart of [`check_operate_teams_public_mode`].
pub fn check_operate_users_public_mode(list: &PrincipalList, user_id: &str) -> bool {
    let users = list.entries();
    if users.is_empty() {
        debug!("public mode without operate users, operate open to all");
        return true;
    }
    let allowed = users.iter().any(|user| user == user_id);
    debug!(?users, allowed, "public mode operate user whitelist");
    allowed
}

/// Whitelist check dispatched on the policy's principal kind.
pub fn check_whitelist(kind: PrincipalKind, list: &PrincipalList, requester: Requester<'_>) -> bool {
    match kind {
        PrincipalKind::Team => check_team_whitelist(list, requester.team_ids),
        PrincipalKind::User => check_user_whitelist(list, requester.user_id),
    }
}

/// Blacklist check dispatched on the policy's principal kind.
pub fn check_blacklist(kind: PrincipalKind, list: &PrincipalList, requester: Requester<'_>) -> bool {
    match kind {
        PrincipalKind::Team => check_team_blacklist(list, requester.team_ids),
        PrincipalKind::User => check_user_blacklist(list, requester.user_id),
    }
}

/// Public-mode operate check dispatched on the policy's principal kind.
pub fn check_operate_public_mode(
    kind: PrincipalKind,
    list: &PrincipalList,
    requester: Requester<'_>,
) -> bool {
    match kind {
        PrincipalKind::Team => check_operate_teams_public_mode(list, requester.team_ids),
        PrincipalKind::User => check_operate_users_public_mode(list, requester.user_id),
    }
}

/// Caller-specific queries over one [`UserContext`].
#[derive(Debug, Clone, Copy)]
pub struct PermissionHelpers<'a> {
    ctx: &'a UserContext,
}

impl<'a> PermissionHelpers<'a> {
    pub fn new(ctx: &'a UserContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &'a UserContext {
        self.ctx
    }

    /// Flattened team ids of the caller including sub-teams.
    ///
    /// Never empty: a caller with no team tree, or an empty one, is a member
    /// of [`DEFAULT_TEAM_OTHER`].
    pub fn get_user_team_ids(&self) -> TeamIds {
        let Some(teams) = self.ctx.user_teams.as_ref() else {
            warn!(
                user_id = %self.ctx.user_id,
                "user has no team tree, treating as member of '{DEFAULT_TEAM_OTHER}'"
            );
            return TeamIds::from([DEFAULT_TEAM_OTHER.to_string()]);
        };

        let mut ids = Vec::new();
        for team in teams {
            team.collect_ids(&mut ids);
        }
        let team_ids: TeamIds = ids
            .into_iter()
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();

        if team_ids.is_empty() {
            debug!(user_id = %self.ctx.user_id, "user has no teams, using '{DEFAULT_TEAM_OTHER}'");
            return TeamIds::from([DEFAULT_TEAM_OTHER.to_string()]);
        }

        debug!(user_id = %self.ctx.user_id, count = team_ids.len(), "resolved user teams");
        team_ids
    }

    /// The provided team ids, or the caller's resolved ones.
    pub fn resolve_team_ids<'t>(&self, team_ids: Option<&'t TeamIds>) -> Cow<'t, TeamIds> {
        match team_ids {
            Some(ids) => Cow::Borrowed(ids),
            None => Cow::Owned(self.get_user_team_ids()),
        }
    }

    /// Owner comparison. A missing owner or an empty caller id never matches.
    pub fn is_current_user_owner(&self, owner_id: Option<&str>) -> bool {
        let user_id = self.ctx.user_id.trim();
        match owner_id {
            Some(owner) if !user_id.is_empty() => owner.trim() == user_id,
            _ => false,
        }
    }

    pub fn current_tenant_id(&self) -> &'a str {
        self.ctx.tenant_id.as_deref().unwrap_or(DEFAULT_TENANT_ID)
    }

    pub fn is_system_admin(&self) -> bool {
        self.ctx.is_system_admin
    }

    /// Whether the caller administers the current tenant.
    pub fn is_tenant_admin(&self) -> bool {
        let tenant = self.current_tenant_id();
        self.ctx.tenant_admin_of.iter().any(|t| t == tenant)
    }

    pub fn has_admin_privileges(&self) -> bool {
        self.is_system_admin() || self.is_tenant_admin()
    }

    /// A portal-scoped token calling an endpoint marked portal-accessible.
    pub fn is_portal_token_with_portal_access(&self) -> bool {
        let Some(token) = self.ctx.token.as_ref() else {
            return false;
        };
        let is_portal_token = token.scope.as_deref() == Some(PORTAL_SCOPE)
            && token.token_type.as_deref() == Some(PORTAL_TOKEN_TYPE);
        if !is_portal_token {
            return false;
        }
        debug!(
            endpoint_portal_access = self.ctx.endpoint_portal_access,
            "portal token detected"
        );
        self.ctx.endpoint_portal_access
    }
}
