//! Tests for the permission services.
//!
//! Organized by service:
//! - Workflow mode table and owner override
//! - Stage inherit / narrow composition
//! - Case owner, public delegation and own-list modes
//! - List APIs (module gating, zero reader calls, shared team resolution)

mod mocks;

mod workflow_tests;
