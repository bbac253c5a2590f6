//! Integration test utilities for the board server
//!
//! Helpers for running end-to-end tests against the REST API backed by PostgreSQL.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
