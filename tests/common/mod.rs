//! Shared test utilities for Gauntlet
//!
//! Catalog fixtures and a temp-database harness used by the
//! integration tests.

pub mod fixtures;
