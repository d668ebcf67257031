//! Export and import across installations
//!
//! Drives the full artifact path through [`GauntletCore`]: export to
//! JSON, validate against a foreign catalog, and import into a second
//! installation.

use super::common::fixtures::{core_with_catalog, item, kaizo_advanced, kaizo_catalog};
use gauntlet::transfer;
use gauntlet::{Difficulty, GauntletError, HackKind, PlanEntry, Run, StaticCatalog};

fn exported_run(core: &gauntlet::GauntletCore) -> Run {
    let seed = core.generate_seed(&kaizo_advanced()).unwrap();
    core.create_plan(
        "tournament",
        vec![
            PlanEntry::Fixed {
                item_id: "h0002".to_string(),
            },
            PlanEntry::Random {
                filter: kaizo_advanced(),
                count: 3,
                seed,
            },
        ],
    )
    .unwrap()
}

#[test]
fn test_export_import_through_json() {
    let (_dir_a, core_a) = core_with_catalog(kaizo_catalog(12));
    let run = exported_run(&core_a);

    let raw = transfer::to_json(&core_a.export_run(run.id).unwrap()).unwrap();

    let (_dir_b, core_b) = core_with_catalog(kaizo_catalog(12));
    let export = transfer::from_json(&raw).unwrap();
    let imported = core_b.import_run(&export).unwrap();

    assert_ne!(imported.id, run.id);
    assert_eq!(imported.name, run.name);
    assert_eq!(imported.plan, run.plan);
    assert!(!imported.is_started());
    assert_eq!(imported.challenges.len(), run.challenges.len());
}

#[test]
fn test_validate_reports_every_missing_item() {
    let (_dir_a, core_a) = core_with_catalog(kaizo_catalog(6));
    let run = exported_run(&core_a);
    let export = core_a.export_run(run.id).unwrap();

    // The importer's catalog lacks h0002 and h0004 entirely
    let partial = StaticCatalog::new(
        ["h0000", "h0001", "h0003", "h0005"]
            .iter()
            .map(|id| item(id, HackKind::Kaizo, Difficulty::Advanced))
            .collect(),
    );
    let (_dir_b, core_b) = core_with_catalog(partial);

    let report = core_b.validate_export(&export);
    assert!(!report.compatible());
    assert_eq!(report.missing_items, vec!["h0002", "h0004"]);

    match core_b.import_run(&export) {
        Err(GauntletError::IncompatibleCatalog { missing }) => {
            assert_eq!(missing, vec!["h0002", "h0004"]);
        }
        other => panic!("expected IncompatibleCatalog, got {other:?}"),
    }
    assert!(core_b.list_runs().unwrap().is_empty());
    assert!(core_b.list_mappings().unwrap().is_empty());
}

#[test]
fn test_validate_passes_on_superset_catalog() {
    let (_dir_a, core_a) = core_with_catalog(kaizo_catalog(6));
    let run = exported_run(&core_a);
    let export = core_a.export_run(run.id).unwrap();

    // A bigger catalog that still contains the whole universe is fine
    let (_dir_b, core_b) = core_with_catalog(kaizo_catalog(30));
    let report = core_b.validate_export(&export);
    assert!(report.compatible());
    assert!(report.missing_items.is_empty());
    core_b.import_run(&export).unwrap();
}

#[test]
fn test_reimport_into_exporter_reuses_mapping() {
    let (_dir, core) = core_with_catalog(kaizo_catalog(12));
    let run = exported_run(&core);
    let export = core.export_run(run.id).unwrap();

    let before = core.list_mappings().unwrap().len();
    core.import_run(&export).unwrap();

    // Identical universe under the same code is reused, not duplicated
    assert_eq!(core.list_mappings().unwrap().len(), before);
    assert_eq!(core.list_runs().unwrap().len(), 2);
}
