use crate::config::GameConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboState {
    /// No match inside the combo window. Scores like a multiplier of 1.
    Idle,
    Combo(u32),
}

impl ComboState {
    pub fn multiplier(self) -> u32 {
        match self {
            ComboState::Idle => 1,
            ComboState::Combo(m) => m,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    pub multiplier: u32,
    pub gain: u32,
    pub score: u32,
}

pub struct ComboScorer {
    pub state: ComboState,
    pub score: u32,
    pub last_match_time: Option<f64>,

    // Seconds between matches that keep a combo alive
    pub combo_window: f64,
    pub max_combo: u32,
    pub base_gain: u32,
}

impl Default for ComboScorer {
    fn default() -> Self {
        Self {
            state: ComboState::Idle,
            score: 0,
            last_match_time: None,
            combo_window: 5.0,
            max_combo: 5,
            base_gain: 1,
        }
    }
}

impl ComboScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            combo_window: config.combo_window_secs,
            max_combo: config.max_combo.max(1),
            base_gain: config.base_gain,
            ..Self::default()
        }
    }

    pub fn multiplier(&self) -> u32 {
        self.state.multiplier()
    }

    fn within_window(&self, now: f64) -> bool {
        self.last_match_time
            .is_some_and(|last| now - last < self.combo_window)
    }

    /// Registers a match at `now` and credits `base_gain * multiplier`.
    ///
    /// Inside the window an active combo steps up by one and wraps back to 1
    /// past `max_combo`; otherwise the combo restarts at 1.
    pub fn record_match(&mut self, now: f64) -> MatchOutcome {
        let multiplier = match self.state {
            ComboState::Combo(m) if self.within_window(now) => m
                .checked_add(1)
                .filter(|&next| next <= self.max_combo)
                .unwrap_or(1),
            _ => 1,
        };

        let gain = self.base_gain.saturating_mul(multiplier);
        self.state = ComboState::Combo(multiplier);
        self.last_match_time = Some(now);
        self.score = self.score.saturating_add(gain);

        MatchOutcome {
            multiplier,
            gain,
            score: self.score,
        }
    }

    /// Drops an expired combo back to idle. Returns the new multiplier only
    /// when a transition happened, so callers notify once per expiry.
    pub fn expire(&mut self, now: f64) -> Option<u32> {
        match (self.state, self.last_match_time) {
            (ComboState::Combo(_), Some(last)) if now - last >= self.combo_window => {
                self.state = ComboState::Idle;
                Some(self.state.multiplier())
            }
            _ => None,
        }
    }
}
