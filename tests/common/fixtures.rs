//! Catalog and database fixtures shared by integration tests

use gauntlet::{CatalogItem, Database, Difficulty, Filter, GauntletCore, HackKind, StaticCatalog};
use tempfile::TempDir;

/// The standard Kaizo/Advanced filter used across tests
pub fn kaizo_advanced() -> Filter {
    Filter::new(HackKind::Kaizo, Difficulty::Advanced)
}

/// A synthetic catalog item with a stable id
pub fn item(id: &str, kind: HackKind, difficulty: Difficulty) -> CatalogItem {
    CatalogItem {
        id: id.to_string(),
        name: format!("Hack {id}"),
        kind,
        difficulty,
        metadata: serde_json::json!({ "author": "fixture" }),
    }
}

/// A catalog of `size` Kaizo/Advanced hacks with ids `h0000`, `h0001`, ...
pub fn kaizo_catalog(size: usize) -> StaticCatalog {
    StaticCatalog::new(
        (0..size)
            .map(|i| {
                item(
                    &format!("h{i:04}"),
                    HackKind::Kaizo,
                    Difficulty::Advanced,
                )
            })
            .collect(),
    )
}

/// A core over a scratch database and the given catalog. The TempDir
/// must stay alive for the database to remain on disk.
pub fn core_with_catalog(catalog: StaticCatalog) -> (TempDir, GauntletCore) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db = Database::open(dir.path().join("test.db")).expect("Failed to open database");
    (dir, GauntletCore::new(db, Box::new(catalog)))
}
