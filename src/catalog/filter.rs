//! Filter types and signature normalization

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hack kind, as catalogued by the hack repository
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum HackKind {
    Standard,
    Kaizo,
    Puzzle,
    Troll,
    Pit,
}

impl HackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HackKind::Standard => "standard",
            HackKind::Kaizo => "kaizo",
            HackKind::Puzzle => "puzzle",
            HackKind::Troll => "troll",
            HackKind::Pit => "pit",
        }
    }
}

impl FromStr for HackKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(HackKind::Standard),
            "kaizo" => Ok(HackKind::Kaizo),
            "puzzle" => Ok(HackKind::Puzzle),
            "troll" => Ok(HackKind::Troll),
            "pit" => Ok(HackKind::Pit),
            other => Err(format!("unknown hack kind: {other}")),
        }
    }
}

impl fmt::Display for HackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
    Master,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
            Difficulty::Expert => "expert",
            Difficulty::Master => "master",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            "expert" => Ok(Difficulty::Expert),
            "master" => Ok(Difficulty::Master),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog filter: kind + difficulty
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Filter {
    pub kind: HackKind,
    pub difficulty: Difficulty,
}

impl Filter {
    pub fn new(kind: HackKind, difficulty: Difficulty) -> Self {
        Self { kind, difficulty }
    }

    /// Normalized signature keying seed mappings. Locale-independent:
    /// fixed lowercase ASCII names joined with a fixed separator.
    pub fn signature(&self) -> String {
        format!(
            "kind:{}|difficulty:{}",
            self.kind.as_str(),
            self.difficulty.as_str()
        )
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.kind, self.difficulty)
    }
}
