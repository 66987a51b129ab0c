//! Permission services for the Workflow → Stage / Case hierarchy.
//!
//! Each service evaluates one entity type:
//!
//! - [`WorkflowPermissionService`]: the root policy; no dependency on the
//!   other services.
//! - [`StagePermissionService`]: inherits or ANDs with the parent workflow.
//! - [`CasePermissionService`]: owner short-circuit, then either the parent
//!   workflow's decision (public mode) or the case's own lists.
//!
//! All checks are synchronous. Every check accepts an optional
//! pre-resolved team-id set so batch callers resolve teams once per unit of
//! work. Only the `*_by_id` / `*_with_reader` paths are async; they load
//! entities through the [`reader`] traits.

mod case;
pub mod reader;
mod result;
mod stage;
mod workflow;

#[cfg(test)]
mod tests;

pub use case::CasePermissionService;
pub use reader::{CaseReader, StageReader, WorkflowReader};
pub use result::{DenialCode, GrantReason, PermissionInfo, PermissionResult};
pub use stage::{AuthorizedTeams, StagePermissionService};
pub use workflow::WorkflowPermissionService;
