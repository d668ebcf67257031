//! Data persistence layer
//!
//! This module provides SQLite-based storage for seed mappings, runs,
//! challenges, and configuration entries.

mod database;
mod mapping;
mod migrations;
mod models;
mod run;
mod settings;

pub use database::{Database, DatabaseError};
pub use mapping::MappingStore;
pub use models::{
    Challenge, ChallengeOrigin, ChallengeStatus, PlanEntry, Run, SeedMapping, Visibility,
};
pub use run::RunStore;
pub use settings::{SettingsStore, ACTIVE_CATALOG_PATH, LAST_RUN_ID};
