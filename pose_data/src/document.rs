use serde::{Deserialize, Serialize};

use crate::player::{LeaderboardEntry, PlayerKey, PlayerRecord};

pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub key: PlayerKey,
    #[serde(flatten)]
    pub record: PlayerRecord,
}

/// On-disk shape of the player store. Keys are kept as structured records so
/// names and groups may contain any character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub players: Vec<PlayerEntry>,
    /// Ordered best-first.
    #[serde(default)]
    pub leaderboard: Vec<LeaderboardEntry>,
}

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            players: Vec::new(),
            leaderboard: Vec::new(),
        }
    }
}
