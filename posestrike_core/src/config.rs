use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Largest per-joint angle difference, in degrees, that still counts as a match.
    pub similarity_threshold_deg: f64,
    pub combo_window_secs: f64,
    pub max_combo: u32,
    pub base_gain: u32,
    /// Extra detector passes the sampler may spend on one image.
    pub sample_attempts: u32,
    pub poll_interval_ms: u64,
    /// How long a pose must stay matched before it scores. 0 scores immediately.
    pub match_hold_secs: f64,
    pub round_duration_secs: Option<f64>,
    pub max_attempts: u32,
    pub leaderboard_path: PathBuf,
    pub top_limit: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            similarity_threshold_deg: 25.0,
            combo_window_secs: 5.0,
            max_combo: 5,
            base_gain: 1,
            sample_attempts: 10,
            poll_interval_ms: 10,
            match_hold_secs: 0.0,
            round_duration_secs: None,
            max_attempts: 2,
            leaderboard_path: PathBuf::from("leaderboard.json"),
            top_limit: 5,
        }
    }
}

impl GameConfig {
    /// Reads a JSON config. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read config: {}", path.display()))
            }
        };
        let config: GameConfig = serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse config json: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.similarity_threshold_deg >= 0.0,
            "similarity_threshold_deg must not be negative"
        );
        anyhow::ensure!(self.combo_window_secs > 0.0, "combo_window_secs must be positive");
        anyhow::ensure!(self.max_combo >= 1, "max_combo must be at least 1");
        anyhow::ensure!(self.match_hold_secs >= 0.0, "match_hold_secs must not be negative");
        if let Some(round) = self.round_duration_secs {
            anyhow::ensure!(round > 0.0, "round_duration_secs must be positive");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
