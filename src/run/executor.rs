//! Run execution state machine
//!
//! Drives a run linearly through its challenge slots:
//!
//! ```text
//! pending -> in-progress -> { done-perfect | done-revealed-early | skipped }
//! ```
//!
//! Exactly one challenge is in-progress at a time (the cursor), or none
//! once the run is finished. Reaching a slot resolves its item so the
//! host can launch it; the `revealed_explicitly` flag records whether
//! the player asked to see the identity before completing, which is what
//! separates done-perfect from done-revealed-early.
//!
//! Every mutating transition snapshots the cursor and the touched
//! challenges before applying the forward change, persists the change in
//! one transaction, then pushes the snapshot onto the history stack.
//! Undo pops a snapshot and writes it back, so reversal is exact by
//! construction and repeatable until the history is empty. The history
//! lives only for the executor's lifetime; a resumed run starts with an
//! empty one.

use chrono::Utc;
use tracing::{debug, warn};

use crate::data::{
    Challenge, ChallengeOrigin, ChallengeStatus, MappingStore, Run, RunStore, Visibility,
};
use crate::error::{GauntletError, Result};
use crate::seed::{parse_seed, select_at};

/// Inverse of one forward transition: the cursor and exact copies of
/// every challenge the transition touched, as they were before it.
#[derive(Debug, Clone)]
struct TransitionRecord {
    cursor: Option<usize>,
    challenges: Vec<Challenge>,
}

/// Stateful progression engine. Owns its run exclusively; the host is
/// expected to serialize user actions per run.
pub struct RunExecutor {
    run: Run,
    mappings: MappingStore,
    runs: RunStore,
    history: Vec<TransitionRecord>,
}

impl RunExecutor {
    /// Take ownership of a run for execution
    pub fn new(run: Run, mappings: MappingStore, runs: RunStore) -> Self {
        Self {
            run,
            mappings,
            runs,
            history: Vec::new(),
        }
    }

    /// The run being executed
    pub fn run(&self) -> &Run {
        &self.run
    }

    /// Release the run
    pub fn into_run(self) -> Run {
        self.run
    }

    /// Number of undoable transitions recorded this session
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Begin the run: cursor moves to the first pending slot, which
    /// becomes in-progress and is resolved.
    ///
    /// Fails with `EmptyRun` if the run has no slots. A run that is
    /// already in progress (resumed from persisted state) is left alone:
    /// resolution is idempotent and a crash between resolving and
    /// advancing must not re-charge a reveal.
    pub fn start(&mut self) -> Result<()> {
        if self.run.challenges.is_empty() {
            return Err(GauntletError::EmptyRun);
        }
        if self.run.cursor.is_some() {
            debug!(run = %self.run.id, "Run already started, resuming");
            return Ok(());
        }
        if self.run.is_finished() {
            warn!(run = %self.run.id, "start() on a finished run");
            return Ok(());
        }

        let Some(next) = self.next_pending() else {
            return Ok(());
        };

        let mut slot = self.run.challenges[next].clone();
        slot.status = ChallengeStatus::InProgress;
        slot.started_at = Some(Utc::now());
        self.resolve_if_masked(&mut slot)?;

        self.commit(Some(next), vec![slot])
    }

    /// Explicitly reveal the current challenge's item to the player.
    ///
    /// Resolves the item if the slot is still unresolved and sets
    /// `revealed_explicitly`, which turns a later completion into
    /// done-revealed-early. A second call is a no-op: no write, no
    /// history entry.
    pub fn reveal(&mut self) -> Result<()> {
        let Some(cursor) = self.run.cursor else {
            warn!(run = %self.run.id, "reveal() with no current challenge");
            return Ok(());
        };

        if self.run.challenges[cursor].revealed_explicitly {
            return Ok(());
        }

        let mut slot = self.run.challenges[cursor].clone();
        self.resolve_if_masked(&mut slot)?;
        slot.revealed_explicitly = true;

        self.commit(Some(cursor), vec![slot])
    }

    /// Complete the current challenge and advance.
    ///
    /// The item is resolved first if it never was (the record of what
    /// was played must name it). Status becomes done-perfect unless the
    /// player explicitly revealed, then done-revealed-early.
    pub fn complete(&mut self) -> Result<()> {
        self.settle(|slot| {
            if slot.revealed_explicitly {
                ChallengeStatus::DoneRevealedEarly
            } else {
                ChallengeStatus::DonePerfect
            }
        })
    }

    /// Skip the current challenge and advance. The slot is resolved so
    /// the record shows what was skipped.
    pub fn skip(&mut self) -> Result<()> {
        self.settle(|_| ChallengeStatus::Skipped)
    }

    /// Reverse the most recent transition exactly.
    ///
    /// Repeatable until the session history is empty, then fails with
    /// `NothingToUndo`.
    pub fn undo(&mut self) -> Result<()> {
        let record = self.history.pop().ok_or(GauntletError::NothingToUndo)?;

        if let Err(e) = self
            .runs
            .apply_transition(self.run.id, record.cursor, &record.challenges)
        {
            // Put the record back so the state and history stay consistent
            self.history.push(record);
            return Err(e);
        }

        self.run.cursor = record.cursor;
        for challenge in record.challenges {
            let ordinal = challenge.ordinal;
            self.run.challenges[ordinal] = challenge;
        }
        self.run.updated_at = Utc::now();
        debug!(run = %self.run.id, depth = self.history.len(), "Undid transition");
        Ok(())
    }

    /// Settle the current slot with `status`, then advance the cursor to
    /// the next pending slot (resolving it), or finish the run.
    fn settle(&mut self, status: impl Fn(&Challenge) -> ChallengeStatus) -> Result<()> {
        let Some(cursor) = self.run.cursor else {
            warn!(run = %self.run.id, "settle with no current challenge");
            return Ok(());
        };

        let mut current = self.run.challenges[cursor].clone();
        self.resolve_if_masked(&mut current)?;
        current.status = status(&current);
        current.finished_at = Some(Utc::now());

        let mut touched = vec![current];
        let next = self.next_pending();
        if let Some(next) = next {
            let mut slot = self.run.challenges[next].clone();
            slot.status = ChallengeStatus::InProgress;
            slot.started_at = Some(Utc::now());
            self.resolve_if_masked(&mut slot)?;
            touched.push(slot);
        }

        self.commit(next, touched)
    }

    /// First pending slot in run order, excluding the current cursor
    fn next_pending(&self) -> Option<usize> {
        self.run
            .challenges
            .iter()
            .position(|c| c.status == ChallengeStatus::Pending)
    }

    /// Resolve a masked slot's item via its seed mapping. Idempotent:
    /// an already-resolved slot is left untouched.
    fn resolve_if_masked(&self, slot: &mut Challenge) -> Result<()> {
        if slot.item_id.is_some() {
            slot.visibility = Visibility::Revealed;
            return Ok(());
        }

        let ChallengeOrigin::Random { seed, index, .. } = &slot.origin else {
            // Fixed slots are resolved at plan time
            return Ok(());
        };

        let parsed = parse_seed(seed)?;
        let mapping = self.mappings.resolve(&parsed.mapping_code)?;
        let item_id = select_at(&mapping, seed, *index)?;
        debug!(
            run = %self.run.id,
            ordinal = slot.ordinal,
            item = %item_id,
            "Resolved challenge slot"
        );

        slot.item_id = Some(item_id);
        slot.visibility = Visibility::Revealed;
        Ok(())
    }

    /// Persist a forward transition, then record its inverse and apply
    /// it in memory. Nothing changes if persistence fails.
    fn commit(&mut self, cursor: Option<usize>, touched: Vec<Challenge>) -> Result<()> {
        self.runs.apply_transition(self.run.id, cursor, &touched)?;

        let record = TransitionRecord {
            cursor: self.run.cursor,
            challenges: touched
                .iter()
                .map(|c| self.run.challenges[c.ordinal].clone())
                .collect(),
        };
        self.history.push(record);

        self.run.cursor = cursor;
        for challenge in touched {
            let ordinal = challenge.ordinal;
            self.run.challenges[ordinal] = challenge;
        }
        self.run.updated_at = Utc::now();
        Ok(())
    }
}

impl std::fmt::Debug for RunExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunExecutor")
            .field("run", &self.run.id)
            .field("cursor", &self.run.cursor)
            .field("history", &self.history.len())
            .finish()
    }
}
