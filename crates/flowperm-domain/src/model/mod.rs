//! Permission model: entities, modes and principal lists.

mod principal;
mod types;
mod types_proptest;

pub use principal::{decode_principal_list, PrincipalList, TeamIds};
pub use types::{
    Case, OperationType, ParseEnumError, PermissionMode, PrincipalKind, Stage, StageScope,
    Workflow,
};
