use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a player. Two keys are equal only if both fields match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerKey {
    pub name: String,
    pub group: String,
}

impl PlayerKey {
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
        }
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.group)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub score: u32,
    pub remaining_attempts: u32,
}

impl PlayerRecord {
    pub fn fresh(max_attempts: u32) -> Self {
        Self {
            score: 0,
            remaining_attempts: max_attempts,
        }
    }
}

/// Best score ever reached by a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub key: PlayerKey,
    pub best_score: u32,
}
