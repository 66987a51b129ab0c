//! Core type definitions for the permission model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::principal::PrincipalList;

/// Error returned when a persisted enum string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    /// Name of the enum being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Visibility mode of a policy.
///
/// The mode names mention teams, but the same modes apply to user-keyed
/// principal lists (see [`PrincipalKind`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionMode {
    /// Anyone may view; operate is open unless an operate list is set.
    Public,
    /// View list is a whitelist.
    VisibleToTeams,
    /// View list is a blacklist.
    InvisibleToTeams,
    /// Owner only.
    Private,
}

impl PermissionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::VisibleToTeams => "VisibleToTeams",
            Self::InvisibleToTeams => "InvisibleToTeams",
            Self::Private => "Private",
        }
    }
}

impl fmt::Display for PermissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Public" => Ok(Self::Public),
            "VisibleToTeams" => Ok(Self::VisibleToTeams),
            "InvisibleToTeams" => Ok(Self::InvisibleToTeams),
            "Private" => Ok(Self::Private),
            other => Err(ParseEnumError {
                kind: "permission mode",
                value: other.to_string(),
            }),
        }
    }
}

/// Which kind of principal a policy's lists hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrincipalKind {
    #[default]
    Team,
    User,
}

impl PrincipalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Team => "Team",
            Self::User => "User",
        }
    }
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrincipalKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Team" => Ok(Self::Team),
            "User" => Ok(Self::User),
            other => Err(ParseEnumError {
                kind: "principal kind",
                value: other.to_string(),
            }),
        }
    }
}

/// Requested operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationType {
    View,
    Operate,
    Delete,
}

impl OperationType {
    /// `Delete` is evaluated exactly like `Operate`.
    pub fn requires_operate(&self) -> bool {
        matches!(self, Self::Operate | Self::Delete)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "View",
            Self::Operate => "Operate",
            Self::Delete => "Delete",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "View" => Ok(Self::View),
            "Operate" => Ok(Self::Operate),
            "Delete" => Ok(Self::Delete),
            other => Err(ParseEnumError {
                kind: "operation type",
                value: other.to_string(),
            }),
        }
    }
}

/// Root policy of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: i64,
    pub name: String,
    pub mode: PermissionMode,
    pub principal_kind: PrincipalKind,
    pub view_principals: PrincipalList,
    pub operate_principals: PrincipalList,
    /// Creator's user id, if recorded.
    pub owner_id: Option<String>,
}

impl Workflow {
    /// Creates a team-keyed workflow with empty lists and no owner.
    pub fn new(id: i64, name: impl Into<String>, mode: PermissionMode) -> Self {
        Self {
            id,
            name: name.into(),
            mode,
            principal_kind: PrincipalKind::Team,
            view_principals: PrincipalList::none(),
            operate_principals: PrincipalList::none(),
            owner_id: None,
        }
    }

    pub fn with_principal_kind(mut self, kind: PrincipalKind) -> Self {
        self.principal_kind = kind;
        self
    }

    pub fn with_view_principals(mut self, list: PrincipalList) -> Self {
        self.view_principals = list;
        self
    }

    pub fn with_operate_principals(mut self, list: PrincipalList) -> Self {
        self.operate_principals = list;
        self
    }

    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }
}

/// How a stage relates to its parent workflow's policy.
///
/// Narrow lists are always team-keyed whitelists. A `None` list leaves that
/// capability to the workflow alone; `Some` of a blank list denies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageScope {
    /// The stage has no lists; the workflow decides.
    Inherit,
    /// The workflow decision is ANDed with the stage's own whitelists.
    Narrow {
        view_principals: Option<PrincipalList>,
        operate_principals: Option<PrincipalList>,
    },
}

/// A step of a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: i64,
    pub workflow_id: i64,
    pub name: String,
    pub scope: StageScope,
    /// JSON list of user ids assigned to the stage by default.
    pub default_assignees: PrincipalList,
}

impl Stage {
    /// A stage that defers to its workflow.
    pub fn inheriting(id: i64, workflow_id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            workflow_id,
            name: name.into(),
            scope: StageScope::Inherit,
            default_assignees: PrincipalList::none(),
        }
    }

    /// A stage that narrows its workflow with its own team whitelists.
    pub fn narrowed(
        id: i64,
        workflow_id: i64,
        name: impl Into<String>,
        view_principals: PrincipalList,
        operate_principals: PrincipalList,
    ) -> Self {
        Self {
            id,
            workflow_id,
            name: name.into(),
            scope: StageScope::Narrow {
                view_principals: Some(view_principals),
                operate_principals: Some(operate_principals),
            },
            default_assignees: PrincipalList::none(),
        }
    }

    pub fn with_default_assignees(mut self, list: PrincipalList) -> Self {
        self.default_assignees = list;
        self
    }

    pub fn with_scope(mut self, scope: StageScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn inherits(&self) -> bool {
        matches!(self.scope, StageScope::Inherit)
    }
}

/// An instance (onboarding) governed by a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub id: i64,
    pub workflow_id: i64,
    pub mode: PermissionMode,
    pub principal_kind: PrincipalKind,
    pub view_principals: PrincipalList,
    pub operate_principals: PrincipalList,
    pub owner_id: Option<String>,
}

impl Case {
    /// Creates a team-keyed case with empty lists and no owner.
    pub fn new(id: i64, workflow_id: i64, mode: PermissionMode) -> Self {
        Self {
            id,
            workflow_id,
            mode,
            principal_kind: PrincipalKind::Team,
            view_principals: PrincipalList::none(),
            operate_principals: PrincipalList::none(),
            owner_id: None,
        }
    }

    pub fn with_principal_kind(mut self, kind: PrincipalKind) -> Self {
        self.principal_kind = kind;
        self
    }

    pub fn with_view_principals(mut self, list: PrincipalList) -> Self {
        self.view_principals = list;
        self
    }

    pub fn with_operate_principals(mut self, list: PrincipalList) -> Self {
        self.operate_principals = list;
        self
    }

    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }
}
