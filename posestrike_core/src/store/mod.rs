pub mod persist;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;
use pose_data::document::{PlayerEntry, StoreDocument, DOCUMENT_VERSION};
use pose_data::player::{LeaderboardEntry, PlayerKey, PlayerRecord};
use tracing::{debug, warn};

use crate::error::{PersistenceError, StoreError};

/// Store handle shared between the UI side and a running match loop.
pub type SharedStore = Arc<Mutex<PlayerStore>>;

/// Players and their leaderboard.
///
/// Player scores only ratchet upward and attempts only go down. The
/// leaderboard holds one entry per player with the best score ever seen,
/// sorted best-first; ties keep their existing order, so whoever reached a
/// score first stays ahead.
#[derive(Debug, Clone)]
pub struct PlayerStore {
    players: BTreeMap<PlayerKey, PlayerRecord>,
    leaderboard: Vec<LeaderboardEntry>,
    max_attempts: u32,
    path: Option<PathBuf>,
}

impl PlayerStore {
    /// A store that is never written to disk.
    pub fn in_memory(max_attempts: u32) -> Self {
        Self {
            players: BTreeMap::new(),
            leaderboard: Vec::new(),
            max_attempts,
            path: None,
        }
    }

    /// Loads the store at `path`. A missing file is an empty store.
    pub fn load(path: impl AsRef<Path>, max_attempts: u32) -> Result<Self, PersistenceError> {
        let path = path.as_ref();
        let document = persist::read_document(path)?.unwrap_or_default();
        let mut store = Self::from_document(document, max_attempts);
        store.path = Some(path.to_path_buf());
        debug!(
            path = %path.display(),
            players = store.players.len(),
            "player store loaded"
        );
        Ok(store)
    }

    /// Like [`PlayerStore::load`], but an unreadable file degrades to an
    /// empty store bound to the same path. A file that fails to parse is
    /// first moved to `<path>.corrupt`.
    pub fn open(path: impl AsRef<Path>, max_attempts: u32) -> Self {
        let path = path.as_ref();
        Self::load(path, max_attempts).unwrap_or_else(|e| {
            warn!(error = %e, "starting with an empty player store");
            if matches!(e, PersistenceError::Decode { .. }) {
                match persist::set_aside(path) {
                    Ok(moved) => warn!(moved_to = %moved.display(), "kept unreadable player store"),
                    Err(e) => warn!(error = %e, "failed to move unreadable player store"),
                }
            }
            let mut store = Self::in_memory(max_attempts);
            store.path = Some(path.to_path_buf());
            store
        })
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    pub fn from_document(document: StoreDocument, max_attempts: u32) -> Self {
        let mut players = BTreeMap::new();
        for entry in document.players {
            players.entry(entry.key).or_insert(entry.record);
        }

        let mut leaderboard: Vec<LeaderboardEntry> = Vec::with_capacity(document.leaderboard.len());
        for entry in document.leaderboard {
            match leaderboard.iter_mut().find(|e| e.key == entry.key) {
                Some(existing) => existing.best_score = existing.best_score.max(entry.best_score),
                None => leaderboard.push(entry),
            }
        }
        sort_leaderboard(&mut leaderboard);

        Self {
            players,
            leaderboard,
            max_attempts,
            path: None,
        }
    }

    pub fn to_document(&self) -> StoreDocument {
        StoreDocument {
            version: DOCUMENT_VERSION,
            players: self
                .players
                .iter()
                .map(|(key, record)| PlayerEntry {
                    key: key.clone(),
                    record: *record,
                })
                .collect(),
            leaderboard: self.leaderboard.clone(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Writes the store to its path. In-memory stores do nothing.
    pub fn save(&self) -> Result<(), PersistenceError> {
        match &self.path {
            Some(path) => persist::write_document(path, &self.to_document()),
            None => Ok(()),
        }
    }

    pub fn add_player(&mut self, key: PlayerKey) -> Result<(), StoreError> {
        if self.players.contains_key(&key) {
            return Err(StoreError::DuplicatePlayer(key));
        }
        debug!(player = %key, "player registered");
        self.players.insert(key, PlayerRecord::fresh(self.max_attempts));
        Ok(())
    }

    pub fn contains(&self, key: &PlayerKey) -> bool {
        self.players.contains_key(key)
    }

    pub fn record(&self, key: &PlayerKey) -> Option<PlayerRecord> {
        self.players.get(key).copied()
    }

    /// Zero for unknown players.
    pub fn remaining_attempts(&self, key: &PlayerKey) -> u32 {
        self.players.get(key).map_or(0, |r| r.remaining_attempts)
    }

    pub fn score(&self, key: &PlayerKey) -> Option<u32> {
        self.players.get(key).map(|r| r.score)
    }

    /// Uses up one attempt. Unknown players are ignored; attempts stop at 0.
    pub fn decrement_attempts(&mut self, key: &PlayerKey) {
        if let Some(record) = self.players.get_mut(key) {
            record.remaining_attempts = record.remaining_attempts.saturating_sub(1);
        }
    }

    /// Raises the player's score to `score` if it is higher. Returns the
    /// resulting score, or None for unknown players.
    pub fn set_score(&mut self, key: &PlayerKey, score: u32) -> Option<u32> {
        let record = self.players.get_mut(key)?;
        record.score = record.score.max(score);
        Some(record.score)
    }

    /// Records `score` on the leaderboard, keeping the best score per player,
    /// then re-sorts and persists.
    ///
    /// The in-memory update always happens; the error only reports a failed save.
    pub fn update_leaderboard(&mut self, key: &PlayerKey, score: u32) -> Result<(), PersistenceError> {
        match self.leaderboard.iter_mut().find(|e| &e.key == key) {
            Some(entry) => entry.best_score = entry.best_score.max(score),
            None => self.leaderboard.push(LeaderboardEntry {
                key: key.clone(),
                best_score: score,
            }),
        }
        sort_leaderboard(&mut self.leaderboard);
        self.save()
    }

    /// 1-based leaderboard position.
    pub fn rank(&self, key: &PlayerKey) -> Result<usize, StoreError> {
        self.leaderboard
            .iter()
            .position(|e| &e.key == key)
            .map(|i| i + 1)
            .ok_or_else(|| StoreError::UnknownPlayer(key.clone()))
    }

    pub fn top(&self, limit: usize) -> &[LeaderboardEntry] {
        &self.leaderboard[..limit.min(self.leaderboard.len())]
    }

    pub fn leaderboard(&self) -> &[LeaderboardEntry] {
        &self.leaderboard
    }

    pub fn players(&self) -> impl Iterator<Item = (&PlayerKey, &PlayerRecord)> {
        self.players.iter()
    }
}

/// Stable, so equal scores keep their relative order.
fn sort_leaderboard(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| b.best_score.cmp(&a.best_score));
}
