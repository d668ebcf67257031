//! Integration tests for Gauntlet
//!
//! These tests verify that multiple components work together correctly.

#[path = "../common/mod.rs"]
pub mod common;

pub mod export_import;
pub mod run_flow;
pub mod seed_reproducibility;
