//! Export/import codec for runs
//!
//! An export is a self-contained snapshot: the run's name, its plan
//! entries, and every seed mapping the plan references. A target
//! installation validates the artifact against its own catalog and, if
//! compatible, persists the mappings verbatim and replans a fresh run.
//! The mappings carry the frozen universes, so the reconstructed
//! challenge sequence is byte-identical to the exporter's.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::validate::validate;
use crate::catalog::Catalog;
use crate::data::{MappingStore, PlanEntry, Run, RunStore, SeedMapping};
use crate::error::{GauntletError, Result};
use crate::run::plan;
use crate::seed::parse_seed;

/// Current export document version
pub const EXPORT_VERSION: u32 = 1;

/// Exported run artifact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunExport {
    /// Document version for forward compatibility
    pub version: u32,
    /// Display name of the exported run
    pub run_name: String,
    /// Plan entries, verbatim
    pub plan_entries: Vec<PlanEntry>,
    /// Every seed mapping referenced by a random plan entry
    pub seed_mappings: Vec<SeedMapping>,
}

/// Snapshot a run and its referenced mappings into an export artifact
pub fn export_run(run: &Run, mappings: &MappingStore) -> Result<RunExport> {
    let mut seed_mappings: Vec<SeedMapping> = Vec::new();

    for seed in run.referenced_seeds() {
        let parsed = parse_seed(&seed)?;
        if seed_mappings.iter().any(|m| m.code == parsed.mapping_code) {
            continue;
        }
        seed_mappings.push(mappings.resolve(&parsed.mapping_code)?);
    }

    Ok(RunExport {
        version: EXPORT_VERSION,
        run_name: run.name.clone(),
        plan_entries: run.plan.clone(),
        seed_mappings,
    })
}

/// Import an export artifact: validate it against the local catalog,
/// persist its mappings, and replan a fresh run.
///
/// Fails with `IncompatibleCatalog` (unresolvable items) or
/// `MappingConflict` (a code held locally with a different universe)
/// before touching any state.
pub fn import_run(
    export: &RunExport,
    catalog: &dyn Catalog,
    mappings: &MappingStore,
    runs: &RunStore,
) -> Result<Run> {
    let report = validate(export, catalog);
    if !report.compatible() {
        return Err(GauntletError::IncompatibleCatalog {
            missing: report.missing_items,
        });
    }

    // All conflicts must surface before the first write; failing midway
    // would leave part of the artifact's mappings behind
    for mapping in &export.seed_mappings {
        mappings.verify_importable(mapping)?;
    }

    for mapping in &export.seed_mappings {
        mappings.insert_imported(mapping)?;
    }

    let run = Run::new(
        export.run_name.clone(),
        export.plan_entries.clone(),
        plan(&export.plan_entries),
    );
    runs.save(&run)?;

    info!(
        run = %run.id,
        name = %run.name,
        mappings = export.seed_mappings.len(),
        "Imported run"
    );
    Ok(run)
}

/// Serialize an export artifact to pretty JSON
pub fn to_json(export: &RunExport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(export)
}

/// Parse an export artifact from JSON
pub fn from_json(raw: &str) -> serde_json::Result<RunExport> {
    serde_json::from_str(raw)
}
