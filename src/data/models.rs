//! Data models for seed mappings, plans, challenges, and runs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Filter;

/// A frozen, ordered universe of catalog item ids that seeds permute over.
///
/// The ordering is fixed forever at creation time; every seed sharing the
/// mapping code derives its selection from this exact list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeedMapping {
    /// Short code, the part before the dash in a seed token
    pub code: String,
    /// Normalized filter signature this mapping was created for.
    /// `None` for mappings brought in by an import.
    pub filter_signature: Option<String>,
    /// Ordered item ids, frozen at snapshot time
    pub universe: Vec<String>,
    /// When the mapping was frozen
    pub created_at: DateTime<Utc>,
}

impl SeedMapping {
    pub fn new(code: String, filter_signature: Option<String>, universe: Vec<String>) -> Self {
        Self {
            code,
            filter_signature,
            universe,
            created_at: Utc::now(),
        }
    }
}

/// A user-authored request for one fixed item or N random items
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PlanEntry {
    Fixed {
        item_id: String,
    },
    Random {
        filter: Filter,
        count: usize,
        seed: String,
    },
}

impl PlanEntry {
    /// Number of challenge slots this entry expands to
    pub fn slot_count(&self) -> usize {
        match self {
            PlanEntry::Fixed { .. } => 1,
            PlanEntry::Random { count, .. } => *count,
        }
    }
}

/// Where a challenge slot came from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ChallengeOrigin {
    Fixed {
        item_id: String,
    },
    Random {
        seed: String,
        filter: Filter,
        /// Position within the originating plan entry
        index: usize,
    },
}

/// Whether the challenge's item identity is visible yet
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    Masked,
    Revealed,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Masked => "masked",
            Visibility::Revealed => "revealed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "revealed" => Visibility::Revealed,
            _ => Visibility::Masked,
        }
    }
}

/// Challenge progression state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ChallengeStatus {
    Pending,
    InProgress,
    /// Completed without peeking ahead
    DonePerfect,
    /// Completed after an explicit reveal
    DoneRevealedEarly,
    Skipped,
}

impl ChallengeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeStatus::Pending => "pending",
            ChallengeStatus::InProgress => "in-progress",
            ChallengeStatus::DonePerfect => "done-perfect",
            ChallengeStatus::DoneRevealedEarly => "done-revealed-early",
            ChallengeStatus::Skipped => "skipped",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "in-progress" => ChallengeStatus::InProgress,
            "done-perfect" => ChallengeStatus::DonePerfect,
            "done-revealed-early" => ChallengeStatus::DoneRevealedEarly,
            "skipped" => ChallengeStatus::Skipped,
            _ => ChallengeStatus::Pending,
        }
    }

    /// Whether this is a terminal state
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            ChallengeStatus::DonePerfect
                | ChallengeStatus::DoneRevealedEarly
                | ChallengeStatus::Skipped
        )
    }
}

/// One slot of an executed run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Challenge {
    /// Unique identifier
    pub id: Uuid,
    /// Position within the run (0-based)
    pub ordinal: usize,
    /// Fixed item or random slot descriptor
    pub origin: ChallengeOrigin,
    /// Resolved catalog item, `None` until the slot is resolved
    pub item_id: Option<String>,
    pub visibility: Visibility,
    /// True when the player asked for the reveal before completing
    pub revealed_explicitly: bool,
    pub status: ChallengeStatus,
    /// When the slot became the current challenge
    pub started_at: Option<DateTime<Utc>>,
    /// When the slot reached a terminal state
    pub finished_at: Option<DateTime<Utc>>,
}

impl Challenge {
    /// Create a masked, unresolved random slot
    pub fn random(ordinal: usize, seed: String, filter: Filter, index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            ordinal,
            origin: ChallengeOrigin::Random {
                seed,
                filter,
                index,
            },
            item_id: None,
            visibility: Visibility::Masked,
            revealed_explicitly: false,
            status: ChallengeStatus::Pending,
            started_at: None,
            finished_at: None,
        }
    }

    /// Create a fixed slot. Fixed items were never hidden from the plan
    /// author, so the slot starts revealed and resolved.
    pub fn fixed(ordinal: usize, item_id: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            ordinal,
            origin: ChallengeOrigin::Fixed {
                item_id: item_id.clone(),
            },
            item_id: Some(item_id),
            visibility: Visibility::Revealed,
            revealed_explicitly: false,
            status: ChallengeStatus::Pending,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn is_revealed(&self) -> bool {
        self.visibility == Visibility::Revealed
    }
}

/// A planned or in-flight run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Run {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// The plan the challenges were expanded from
    pub plan: Vec<PlanEntry>,
    /// Ordered challenge slots
    pub challenges: Vec<Challenge>,
    /// Ordinal of the current in-progress challenge, `None` before start
    /// and after finish
    pub cursor: Option<usize>,
    /// When the run was created
    pub created_at: DateTime<Utc>,
    /// Last time the run was modified
    pub updated_at: DateTime<Utc>,
}

impl Run {
    pub fn new(name: impl Into<String>, plan: Vec<PlanEntry>, challenges: Vec<Challenge>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            plan,
            challenges,
            cursor: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The current in-progress challenge, if any
    pub fn current(&self) -> Option<&Challenge> {
        self.cursor.and_then(|c| self.challenges.get(c))
    }

    pub fn is_started(&self) -> bool {
        self.cursor.is_some() || self.challenges.iter().any(|c| c.status.is_settled())
    }

    /// Finished: has slots, no cursor, nothing left pending
    pub fn is_finished(&self) -> bool {
        self.cursor.is_none()
            && !self.challenges.is_empty()
            && self.challenges.iter().all(|c| c.status.is_settled())
    }

    /// Distinct seed tokens referenced by random plan entries, in plan order
    pub fn referenced_seeds(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.plan
            .iter()
            .filter_map(|entry| match entry {
                PlanEntry::Random { seed, .. } => Some(seed.clone()),
                PlanEntry::Fixed { .. } => None,
            })
            .filter(|seed| seen.insert(seed.clone()))
            .collect()
    }
}
