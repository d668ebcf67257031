pub mod catalog;
pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod run;
pub mod seed;
pub mod transfer;
pub mod util;

pub use catalog::{Catalog, CatalogItem, Difficulty, Filter, HackKind, JsonCatalog, StaticCatalog};
pub use config::Config;
pub use core::GauntletCore;
pub use data::{
    Challenge, ChallengeOrigin, ChallengeStatus, Database, MappingStore, PlanEntry, Run, RunStore,
    SeedMapping, SettingsStore, Visibility,
};
pub use error::{GauntletError, Result};
pub use run::{plan, RunExecutor};
pub use transfer::{CompatibilityReport, RunExport};
