//! flowperm-domain: Core permission evaluation logic
//!
//! This crate decides whether a user may view, operate on or delete one of
//! three nested business entities:
//! - Workflow (root policy)
//! - Stage (belongs to a Workflow; inherits or narrows its policy)
//! - Case (an onboarding instance governed by a Workflow)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               flowperm-domain                │
//! ├─────────────────────────────────────────────┤
//! │  model/    - Entities, modes, principal JSON │
//! │  context   - Caller snapshot (UserContext)   │
//! │  helpers   - Shared ACL primitives           │
//! │  service/  - Workflow / Stage / Case checks  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Every check is a pure function over entities supplied by the caller and a
//! [`UserContext`] snapshot. The only I/O happens in the `*_by_id`
//! convenience paths, which go through the reader traits in
//! [`service::reader`].

pub mod context;
pub mod error;
pub mod helpers;
mod helpers_proptest;
pub mod model;
pub mod service;

// Re-export commonly used types at the crate root
pub use context::{TokenClaims, UserContext, UserTeam};
pub use error::{DomainError, DomainResult};
pub use helpers::{PermissionHelpers, Requester, DEFAULT_TEAM_OTHER};
pub use model::{
    Case, OperationType, PermissionMode, PrincipalKind, PrincipalList, Stage, StageScope, TeamIds,
    Workflow,
};
pub use service::{
    AuthorizedTeams, CasePermissionService, CaseReader, DenialCode, GrantReason, PermissionInfo,
    PermissionResult, StagePermissionService, StageReader, WorkflowPermissionService,
    WorkflowReader,
};
