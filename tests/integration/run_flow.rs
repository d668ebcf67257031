//! Integration tests for the full run lifecycle
//!
//! Plan creation, progression with reveal/complete/skip, exact undo,
//! and resuming a run from persisted state in a fresh session.

use super::common::fixtures::{core_with_catalog, kaizo_advanced, kaizo_catalog};
use gauntlet::{
    ChallengeStatus, Database, GauntletCore, GauntletError, MappingStore, PlanEntry, RunStore,
};
use tempfile::TempDir;

fn plan_entries(core: &GauntletCore, count: usize) -> Vec<PlanEntry> {
    let seed = core.generate_seed(&kaizo_advanced()).unwrap();
    vec![
        PlanEntry::Random {
            filter: kaizo_advanced(),
            count,
            seed,
        },
        PlanEntry::Fixed {
            item_id: "h0000".to_string(),
        },
    ]
}

#[test]
fn test_plan_then_full_playthrough() {
    let (_dir, mut core) = core_with_catalog(kaizo_catalog(24));
    let run = core.create_plan("friday", plan_entries(&core, 3)).unwrap();
    assert_eq!(run.challenges.len(), 4);

    core.start_run(run.id).unwrap();
    core.complete_challenge(run.id).unwrap();
    core.reveal(run.id).unwrap();
    core.complete_challenge(run.id).unwrap();
    core.skip_challenge(run.id).unwrap();
    let state = core.complete_challenge(run.id).unwrap().clone();

    assert!(state.is_finished());
    assert_eq!(state.challenges[0].status, ChallengeStatus::DonePerfect);
    assert_eq!(
        state.challenges[1].status,
        ChallengeStatus::DoneRevealedEarly
    );
    assert_eq!(state.challenges[2].status, ChallengeStatus::Skipped);
    assert_eq!(state.challenges[3].status, ChallengeStatus::DonePerfect);
    assert!(state.challenges.iter().all(|c| c.item_id.is_some()));
}

#[test]
fn test_undo_unwinds_a_whole_session() {
    let (_dir, mut core) = core_with_catalog(kaizo_catalog(24));
    let run = core.create_plan("undo me", plan_entries(&core, 3)).unwrap();

    core.start_run(run.id).unwrap();
    let after_start = core.load_run(run.id).unwrap();

    core.reveal(run.id).unwrap();
    core.complete_challenge(run.id).unwrap();
    core.skip_challenge(run.id).unwrap();

    core.undo(run.id).unwrap();
    core.undo(run.id).unwrap();
    let rewound = core.undo(run.id).unwrap().clone();

    assert_eq!(rewound.cursor, after_start.cursor);
    for (a, b) in rewound.challenges.iter().zip(after_start.challenges.iter()) {
        assert_eq!(a.status, b.status);
        assert_eq!(a.visibility, b.visibility);
        assert_eq!(a.revealed_explicitly, b.revealed_explicitly);
        assert_eq!(a.item_id, b.item_id);
    }

    // One more undo reverses start itself, then the history is empty
    core.undo(run.id).unwrap();
    match core.undo(run.id) {
        Err(GauntletError::NothingToUndo) => {}
        other => panic!("expected NothingToUndo, got {other:?}"),
    }
}

#[test]
fn test_resume_from_persisted_state() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("test.db");

    let run_id = {
        let db = Database::open(db_path.clone()).unwrap();
        let mut core = GauntletCore::new(db, Box::new(kaizo_catalog(24)));
        let run = core.create_plan("persist", plan_entries(&core, 3)).unwrap();
        core.start_run(run.id).unwrap();
        core.complete_challenge(run.id).unwrap();
        run.id
    };

    // A later session over the same database picks up where we stopped
    let db = Database::open(db_path).unwrap();
    let mut core = GauntletCore::new(db, Box::new(kaizo_catalog(24)));
    let resumed = core.start_run(run_id).unwrap().clone();

    assert_eq!(resumed.cursor, Some(1));
    assert_eq!(resumed.challenges[0].status, ChallengeStatus::DonePerfect);
    assert_eq!(resumed.challenges[1].status, ChallengeStatus::InProgress);

    // Undo history is session-scoped, so the old transitions are gone
    match core.undo(run_id) {
        Err(GauntletError::NothingToUndo) => {}
        other => panic!("expected NothingToUndo, got {other:?}"),
    }
}

#[test]
fn test_crash_between_resolve_and_advance_does_not_recharge() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("test.db");

    let (run_id, item_before) = {
        let db = Database::open(db_path.clone()).unwrap();
        let mut core = GauntletCore::new(db, Box::new(kaizo_catalog(24)));
        let run = core.create_plan("crash", plan_entries(&core, 3)).unwrap();
        let started = core.start_run(run.id).unwrap().clone();
        (run.id, started.challenges[0].item_id.clone().unwrap())
    };

    // Re-executing the reach after a simulated crash resolves to the
    // same item: resolution is idempotent
    let db = Database::open(db_path).unwrap();
    let mappings = MappingStore::new(db.connection());
    let runs = RunStore::new(db.connection());
    let persisted = runs.get_by_id(run_id).unwrap().unwrap();
    let mut exec = gauntlet::RunExecutor::new(persisted, mappings, runs);
    exec.start().unwrap();

    assert_eq!(
        exec.run().challenges[0].item_id.as_deref(),
        Some(item_before.as_str())
    );
}

#[test]
fn test_empty_plan_cannot_start() {
    let (_dir, mut core) = core_with_catalog(kaizo_catalog(4));
    let run = core.create_plan("empty", vec![]).unwrap();
    match core.start_run(run.id) {
        Err(GauntletError::EmptyRun) => {}
        other => panic!("expected EmptyRun, got {other:?}"),
    }
}
