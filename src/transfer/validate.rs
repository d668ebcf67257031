//! Catalog compatibility validation
//!
//! A mapping is reproducible on a target installation only if every item
//! id in its universe resolves in the local catalog. Partial catalogs are
//! rejected outright: silently truncating a universe would change the
//! selector's permutation and every seed over the mapping with it.

use std::collections::BTreeSet;

use tracing::warn;

use super::export::RunExport;
use crate::catalog::Catalog;
use crate::data::PlanEntry;

/// Result of validating an export against a local catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityReport {
    /// Item ids referenced by the export that the local catalog cannot
    /// resolve, deduplicated and sorted
    pub missing_items: Vec<String>,
}

impl CompatibilityReport {
    pub fn compatible(&self) -> bool {
        self.missing_items.is_empty()
    }
}

/// Check that `catalog` can resolve every item `export` references,
/// both fixed plan entries and the full universe of every seed mapping
pub fn validate(export: &RunExport, catalog: &dyn Catalog) -> CompatibilityReport {
    let mut missing = BTreeSet::new();

    for entry in &export.plan_entries {
        if let PlanEntry::Fixed { item_id } = entry {
            if catalog.lookup(item_id).is_none() {
                missing.insert(item_id.clone());
            }
        }
    }

    for mapping in &export.seed_mappings {
        for item_id in &mapping.universe {
            if catalog.lookup(item_id).is_none() {
                missing.insert(item_id.clone());
            }
        }
    }

    if !missing.is_empty() {
        warn!(
            run = %export.run_name,
            missing = missing.len(),
            "Export references items absent from the local catalog"
        );
    }

    CompatibilityReport {
        missing_items: missing.into_iter().collect(),
    }
}
