//! Caller snapshot supplied to every permission check.

use serde::{Deserialize, Serialize};

/// A team the caller belongs to, with its nested sub-teams.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTeam {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sub_teams: Vec<UserTeam>,
}

impl UserTeam {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            sub_teams: Vec::new(),
        }
    }

    pub fn with_sub_team(mut self, team: UserTeam) -> Self {
        self.sub_teams.push(team);
        self
    }

    /// Depth-first ids of this team and all of its descendants.
    pub fn collect_ids<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(&self.id);
        for team in &self.sub_teams {
            team.collect_ids(out);
        }
    }
}

/// Claims of the bearer token relevant to portal access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub scope: Option<String>,
    pub token_type: Option<String>,
}

impl TokenClaims {
    pub fn new(scope: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            scope: Some(scope.into()),
            token_type: Some(token_type.into()),
        }
    }
}

/// Immutable snapshot of the caller for one unit of work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: String,
    pub tenant_id: Option<String>,
    /// `None` when the identity provider reported no team membership.
    pub user_teams: Option<Vec<UserTeam>>,
    pub is_system_admin: bool,
    /// Tenants this user administers.
    #[serde(default)]
    pub tenant_admin_of: Vec<String>,
    pub token: Option<TokenClaims>,
    /// Whether the invoked endpoint is marked portal-accessible.
    #[serde(default)]
    pub endpoint_portal_access: bool,
}

impl UserContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    /// Replaces the team tree with flat top-level teams.
    pub fn with_teams<I, S>(mut self, team_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_teams = Some(team_ids.into_iter().map(UserTeam::new).collect());
        self
    }

    pub fn with_team_tree(mut self, teams: Vec<UserTeam>) -> Self {
        self.user_teams = Some(teams);
        self
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn with_system_admin(mut self) -> Self {
        self.is_system_admin = true;
        self
    }

    pub fn with_tenant_admin_of(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_admin_of.push(tenant_id.into());
        self
    }

    pub fn with_token(mut self, token: TokenClaims) -> Self {
        self.token = Some(token);
        self
    }

    pub fn with_portal_endpoint(mut self) -> Self {
        self.endpoint_portal_access = true;
        self
    }
}
