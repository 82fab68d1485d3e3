use std::{io, path::PathBuf};

use pose_data::landmark::KeypointId;
use pose_data::player::PlayerKey;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoseError {
    /// The sampler ran out of attempts before every required keypoint showed up.
    #[error("incomplete pose: {found} of {required} required keypoints after {attempts} attempts")]
    IncompletePose {
        found: usize,
        required: usize,
        attempts: u32,
    },

    #[error("keypoint {id} missing from pose")]
    MissingKeypoint { id: KeypointId },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("player {0} already exists")]
    DuplicatePlayer(PlayerKey),

    #[error("player {0} is not on the leaderboard")]
    UnknownPlayer(PlayerKey),

    #[error("player {0} has no attempts left")]
    NoAttemptsLeft(PlayerKey),
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read store {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write store {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse store {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode store: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to start match loop thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("match loop thread panicked")]
    LoopPanicked,
}
