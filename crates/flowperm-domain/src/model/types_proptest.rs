//! Property-based tests for principal-list decoding.
