//! Core command surface
//!
//! [`GauntletCore`] owns the database, the DAO stores, and the catalog
//! provider, and exposes the operations a host UI or process boundary
//! drives: plan creation, seed generation, run execution, and
//! export/import. The host is expected to serialize actions per run;
//! executors (and with them the session undo history) live for the
//! lifetime of this struct.

use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use crate::catalog::{Catalog, Filter};
use crate::data::{Database, MappingStore, Run, RunStore, SeedMapping, SettingsStore};
use crate::error::{GauntletError, Result};
use crate::run::{plan, RunExecutor};
use crate::seed;
use crate::transfer::{self, CompatibilityReport, RunExport};
use crate::data::PlanEntry;

/// Owns the persistence layer and catalog, and drives runs
pub struct GauntletCore {
    /// Database connection (owned to keep the connection alive)
    _database: Database,
    /// Seed mapping DAO
    mappings: MappingStore,
    /// Run DAO
    runs: RunStore,
    /// Configuration entries DAO
    settings: SettingsStore,
    /// External catalog provider
    catalog: Box<dyn Catalog>,
    /// Live executors keyed by run id; holds the session undo history
    executors: HashMap<Uuid, RunExecutor>,
}

impl GauntletCore {
    /// Create a core over an open database and a catalog provider
    pub fn new(database: Database, catalog: Box<dyn Catalog>) -> Self {
        let mappings = MappingStore::new(database.connection());
        let runs = RunStore::new(database.connection());
        let settings = SettingsStore::new(database.connection());
        Self {
            _database: database,
            mappings,
            runs,
            settings,
            catalog,
            executors: HashMap::new(),
        }
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn catalog(&self) -> &dyn Catalog {
        self.catalog.as_ref()
    }

    /// Generate a seed token for a filter, freezing the filter's
    /// universe on first use
    pub fn generate_seed(&self, filter: &Filter) -> Result<String> {
        let mapping = self.mappings.get_or_create(filter, self.catalog.as_ref())?;
        let token = seed::generate_seed(&mapping.code);
        info!(seed = %token, filter = %filter, "Generated seed");
        Ok(token)
    }

    /// Expand plan entries into a new run and persist it
    pub fn create_plan(&self, name: impl Into<String>, entries: Vec<PlanEntry>) -> Result<Run> {
        for entry in &entries {
            match entry {
                PlanEntry::Fixed { item_id } => {
                    if self.catalog.lookup(item_id).is_none() {
                        return Err(GauntletError::UnknownItem {
                            item_id: item_id.clone(),
                        });
                    }
                }
                PlanEntry::Random { seed, .. } => {
                    // Malformed or unknown seeds are caught at plan time,
                    // not on first reach
                    let parsed = seed::parse_seed(seed)?;
                    self.mappings.resolve(&parsed.mapping_code)?;
                }
            }
        }

        let run = Run::new(name, entries.clone(), plan(&entries));
        self.runs.save(&run)?;
        info!(run = %run.id, challenges = run.challenges.len(), "Created plan");
        Ok(run)
    }

    /// Persist a run as-is
    pub fn save_run(&self, run: &Run) -> Result<()> {
        self.runs.save(run)
    }

    /// Load a run from the store
    pub fn load_run(&self, run_id: Uuid) -> Result<Run> {
        self.runs
            .get_by_id(run_id)?
            .ok_or(GauntletError::UnknownRun {
                run_id: run_id.to_string(),
            })
    }

    /// All persisted runs, newest first
    pub fn list_runs(&self) -> Result<Vec<Run>> {
        self.runs.get_all()
    }

    /// Begin (or resume) a run
    pub fn start_run(&mut self, run_id: Uuid) -> Result<&Run> {
        self.executor_mut(run_id)?.start()?;
        Ok(self.executors[&run_id].run())
    }

    /// Explicitly reveal the current challenge of a run
    pub fn reveal(&mut self, run_id: Uuid) -> Result<&Run> {
        self.executor_mut(run_id)?.reveal()?;
        Ok(self.executors[&run_id].run())
    }

    /// Complete the current challenge and advance
    pub fn complete_challenge(&mut self, run_id: Uuid) -> Result<&Run> {
        self.executor_mut(run_id)?.complete()?;
        Ok(self.executors[&run_id].run())
    }

    /// Skip the current challenge and advance
    pub fn skip_challenge(&mut self, run_id: Uuid) -> Result<&Run> {
        self.executor_mut(run_id)?.skip()?;
        Ok(self.executors[&run_id].run())
    }

    /// Undo the most recent transition of a run
    pub fn undo(&mut self, run_id: Uuid) -> Result<&Run> {
        self.executor_mut(run_id)?.undo()?;
        Ok(self.executors[&run_id].run())
    }

    /// Snapshot a run and its referenced seed mappings
    pub fn export_run(&self, run_id: Uuid) -> Result<RunExport> {
        let run = self.load_run(run_id)?;
        transfer::export_run(&run, &self.mappings)
    }

    /// Validate an export against the local catalog without importing
    pub fn validate_export(&self, export: &RunExport) -> CompatibilityReport {
        transfer::validate(export, self.catalog.as_ref())
    }

    /// Import an export artifact as a fresh run
    pub fn import_run(&self, export: &RunExport) -> Result<Run> {
        transfer::import_run(export, self.catalog.as_ref(), &self.mappings, &self.runs)
    }

    /// All seed mappings known to this installation
    pub fn list_mappings(&self) -> Result<Vec<SeedMapping>> {
        self.mappings.list()
    }

    /// Remove a seed mapping. Seeds over it stop resolving.
    pub fn delete_mapping(&self, code: &str) -> Result<()> {
        self.mappings.delete(code)
    }

    /// The live executor for a run, created from persisted state on
    /// first touch this session
    fn executor_mut(&mut self, run_id: Uuid) -> Result<&mut RunExecutor> {
        if !self.executors.contains_key(&run_id) {
            let run = self.load_run(run_id)?;
            self.executors.insert(
                run_id,
                RunExecutor::new(run, self.mappings.clone(), self.runs.clone()),
            );
        }
        Ok(self.executors.get_mut(&run_id).unwrap())
    }
}

impl std::fmt::Debug for GauntletCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GauntletCore")
            .field("executors", &self.executors.len())
            .finish()
    }
}
