//! Plan expansion
//!
//! Turns an ordered list of plan entries into the flat challenge
//! sequence of a run. Pure: the selector is never invoked here, so
//! random slots stay masked and unresolved, and mapping creation is
//! deferred until a slot is actually reached.

use crate::data::{Challenge, PlanEntry};

/// Expand plan entries into ordered challenge slots.
///
/// Fixed entries resolve immediately; a random entry with count N
/// appends N masked slots tagged with its seed, filter, and index, in
/// increasing index order. Slot order preserves entry order.
pub fn plan(entries: &[PlanEntry]) -> Vec<Challenge> {
    let mut challenges = Vec::with_capacity(entries.iter().map(PlanEntry::slot_count).sum());

    for entry in entries {
        match entry {
            PlanEntry::Fixed { item_id } => {
                challenges.push(Challenge::fixed(challenges.len(), item_id.clone()));
            }
            PlanEntry::Random {
                filter,
                count,
                seed,
            } => {
                for index in 0..*count {
                    challenges.push(Challenge::random(
                        challenges.len(),
                        seed.clone(),
                        *filter,
                        index,
                    ));
                }
            }
        }
    }

    challenges
}
