//! Catalog provider boundary
//!
//! The catalog of playable hacks is owned and mutated by an external
//! provider; this crate only reads it. Two installations with catalogs
//! that agree on item ids reconstruct identical seed universes.

mod filter;
mod json;

pub use filter::{Difficulty, Filter, HackKind};
pub use json::{CatalogError, JsonCatalog};

use serde::{Deserialize, Serialize};

/// A selectable catalog entry (a playable hack) referenced by id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    /// Opaque identifier, stable across installations
    pub id: String,
    /// Display name
    pub name: String,
    /// Hack kind (standard, kaizo, ...)
    pub kind: HackKind,
    /// Difficulty tier
    pub difficulty: Difficulty,
    /// Free-form metadata (author, exit count, ...)
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Read-only catalog access
pub trait Catalog {
    /// Look up a single item by id
    fn lookup(&self, item_id: &str) -> Option<CatalogItem>;

    /// All item ids matching a filter, in provider order
    fn query_by_filter(&self, filter: &Filter) -> Vec<String>;
}

/// In-memory catalog, used by tests and as the backing for [`JsonCatalog`]
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    items: Vec<CatalogItem>,
}

impl StaticCatalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Catalog for StaticCatalog {
    fn lookup(&self, item_id: &str) -> Option<CatalogItem> {
        self.items.iter().find(|i| i.id == item_id).cloned()
    }

    fn query_by_filter(&self, filter: &Filter) -> Vec<String> {
        self.items
            .iter()
            .filter(|i| i.kind == filter.kind && i.difficulty == filter.difficulty)
            .map(|i| i.id.clone())
            .collect()
    }
}
