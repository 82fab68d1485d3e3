use pose_data::player::{PlayerKey, PlayerRecord};
use tracing::{info, warn};

use crate::error::{SessionError, StoreError};
use crate::gameplay::match_loop::{LoopHandle, MatchLoop};
use crate::pose::source::{LandmarkSource, ReferenceImages};
use crate::store::{PlayerStore, SharedStore};

/// Closing remark for the review screen, picked from the final rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Champion,
    TopFive,
    TopTen,
    NiceTry,
}

impl Verdict {
    pub fn from_rank(rank: usize) -> Self {
        match rank {
            1 => Verdict::Champion,
            2..=5 => Verdict::TopFive,
            6..=10 => Verdict::TopTen,
            _ => Verdict::NiceTry,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Verdict::Champion => "You Did It!",
            Verdict::TopFive => "You Made It!",
            Verdict::TopTen => "Not Bad!",
            Verdict::NiceTry => "Nice Try!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub key: PlayerKey,
    /// Points earned in this session.
    pub session_score: u32,
    /// The player's best score after this session.
    pub best_score: u32,
    pub rank: usize,
    pub remaining_attempts: u32,
    pub verdict: Verdict,
}

impl SessionReport {
    pub fn can_play_again(&self) -> bool {
        self.remaining_attempts > 0
    }
}

/// Registers `key` if it is new and checks it still has an attempt to play.
pub fn admit_player(store: &mut PlayerStore, key: &PlayerKey) -> Result<PlayerRecord, StoreError> {
    if !store.contains(key) {
        store.add_player(key.clone())?;
    }
    match store.record(key) {
        Some(record) if record.remaining_attempts > 0 => Ok(record),
        _ => Err(StoreError::NoAttemptsLeft(key.clone())),
    }
}

/// Books the end of a session: uses up an attempt, ratchets the score and
/// records it on the leaderboard.
///
/// A failed save is logged and does not fail the session.
pub fn settle_session(
    store: &mut PlayerStore,
    key: &PlayerKey,
    session_score: u32,
) -> Result<SessionReport, StoreError> {
    store.decrement_attempts(key);
    let best_score = store
        .set_score(key, session_score)
        .ok_or_else(|| StoreError::UnknownPlayer(key.clone()))?;
    if let Err(e) = store.update_leaderboard(key, best_score) {
        warn!(error = %e, "failed to persist leaderboard");
    }
    let rank = store.rank(key)?;

    let report = SessionReport {
        key: key.clone(),
        session_score,
        best_score,
        rank,
        remaining_attempts: store.remaining_attempts(key),
        verdict: Verdict::from_rank(rank),
    };
    info!(
        player = %key,
        score = session_score,
        rank,
        remaining_attempts = report.remaining_attempts,
        "session finished"
    );
    Ok(report)
}

/// One play-through for one player, with its match loop running in the
/// background.
pub struct GameSession {
    key: PlayerKey,
    store: SharedStore,
    handle: LoopHandle,
}

impl GameSession {
    /// Admits the player, then starts `match_loop` crediting that player.
    pub fn start<F, S, R>(
        store: SharedStore,
        key: PlayerKey,
        match_loop: MatchLoop<F, S, R>,
    ) -> Result<Self, SessionError>
    where
        F: Send + Sync + 'static,
        S: LandmarkSource<F> + 'static,
        R: ReferenceImages<F> + 'static,
    {
        admit_player(&mut store.lock(), &key)?;
        info!(player = %key, "session started");

        let handle = match_loop
            .with_player(store.clone(), key.clone())
            .spawn()?;
        Ok(Self { key, store, handle })
    }

    pub fn key(&self) -> &PlayerKey {
        &self.key
    }

    pub fn skip(&self) {
        self.handle.skip();
    }

    /// True once the loop ended on its own, e.g. when the round timer ran out.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stops the loop, then settles the session in the store.
    pub fn finish(self) -> Result<SessionReport, SessionError> {
        let summary = self.handle.join()?;
        let mut store = self.store.lock();
        Ok(settle_session(&mut store, &self.key, summary.score)?)
    }
}
