//! Property-based tests for team membership checks and owner override.
