//! flowperm-storage: Policy persistence layer
//!
//! This crate holds the permission policy records exactly as they are
//! persisted, including:
//! - Workflow, stage and case records with raw JSON principal columns
//! - PolicyStore trait for storage operations
//! - In-memory implementation
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              flowperm-storage                │
//! ├─────────────────────────────────────────────┤
//! │  traits.rs   - Records + PolicyStore trait   │
//! │  memory.rs   - In-memory implementation      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Principal columns are stored verbatim; interpreting them is the domain
//! crate's job.

pub mod error;
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use memory::MemoryPolicyStore;
pub use traits::{PolicyStore, StoredCase, StoredStage, StoredWorkflow};
