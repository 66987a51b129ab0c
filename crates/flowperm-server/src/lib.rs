//! flowperm-server: adapters, configuration and request handlers
//!
//! This crate wires the permission engine to storage and callers:
//! - Storage-to-domain reader adapters
//! - Caller-level bypass rules (administrators, portal tokens)
//! - Resource and list permission handlers
//! - Configuration and logging setup
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               flowperm-server                │
//! ├─────────────────────────────────────────────┤
//! │  config.rs        - Configuration loading   │
//! │  observability.rs - Logging setup           │
//! │  adapters.rs      - PolicyStore readers     │
//! │  bypass.rs        - Admin / portal bypass   │
//! │  handlers/                                  │
//! │    resource.rs    - Check one resource      │
//! │    list.rs        - Batch list flags        │
//! └─────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod bypass;
pub mod config;
pub mod handlers;
pub mod observability;

// Re-exports for convenience
pub use adapters::{StoreCaseReader, StoreStageReader, StoreWorkflowReader};
pub use bypass::{AdminBypass, BypassPolicy};
pub use config::{ConfigLoadError, ServerConfig};
pub use handlers::{
    HandlerError, HandlerResult, ModuleAccess, PermissionListHandler, ResourcePermissionHandler,
    ResourcePermissionResponse, ResourceType,
};
pub use observability::{init_logging, LoggingConfig};
