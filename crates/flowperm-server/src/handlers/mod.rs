//! Request handlers wrapping the permission engine.
//!
//! - [`ResourcePermissionHandler`]: view/operate answer for one resource by id
//! - [`PermissionListHandler`]: per-entity flags for stage and case lists

mod list;
mod resource;
mod types;

pub use list::PermissionListHandler;
pub use resource::ResourcePermissionHandler;
pub use types::{
    HandlerError, HandlerResult, ModuleAccess, ResourcePermissionResponse, ResourceType,
};
