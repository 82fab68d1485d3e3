use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{select, unbounded, Receiver, Sender};
use pose_data::landmark::LandmarkSet;
use pose_data::player::PlayerKey;
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::error::SessionError;
use crate::events::GameEvent;
use crate::frame::FrameSlot;
use crate::gameplay::combo::{ComboScorer, MatchOutcome};
use crate::pose::compare::{AngleComparator, REQUIRED_KEYPOINTS};
use crate::pose::sampler::PoseSampler;
use crate::pose::source::{LandmarkSource, ReferenceImages};
use crate::pose::ReferencePose;
use crate::store::SharedStore;
use crate::time::clock::Clock;

/// Cyclic cursor over the reference image identifiers.
#[derive(Debug, Clone)]
pub struct ReferenceCycle {
    images: Vec<String>,
    cursor: usize,
}

impl ReferenceCycle {
    pub fn new(images: Vec<String>) -> Self {
        Self { images, cursor: 0 }
    }

    pub fn current(&self) -> Option<(usize, &str)> {
        self.images
            .get(self.cursor)
            .map(|image| (self.cursor, image.as_str()))
    }

    /// Moves to the next image, wrapping at the end.
    pub fn advance(&mut self) {
        if !self.images.is_empty() {
            self.cursor = (self.cursor + 1) % self.images.len();
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// What one tick of the loop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing published since the last processed frame.
    NoFrame,
    /// No reference image could be turned into a complete pose.
    NoReference,
    /// The live frame never produced every required keypoint.
    IncompletePose,
    NoMatch,
    /// Similar, but not yet held long enough to score.
    Holding,
    Matched(MatchOutcome),
    RoundOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    pub score: u32,
    pub matches: u32,
}

enum LoopCommand {
    Skip,
    Wake,
}

/// Compares the newest camera frame against the current reference pose and
/// drives scoring.
///
/// `tick` runs one cycle and can be driven by hand; `spawn` runs ticks on a
/// background thread until stopped.
pub struct MatchLoop<F, S, R> {
    source: S,
    references: R,
    cycle: ReferenceCycle,
    reference: Option<ReferencePose>,
    sampler: PoseSampler,
    comparator: AngleComparator,
    scorer: ComboScorer,
    frames: Arc<FrameSlot<F>>,
    clock: Arc<dyn Clock>,
    events: Sender<GameEvent>,
    player: Option<(SharedStore, PlayerKey)>,

    last_generation: u64,
    matching: bool,
    hold_started: Option<f64>,
    started_at: Option<f64>,
    matches: u32,

    match_hold: f64,
    round_duration: Option<f64>,
    poll_interval: Duration,
}

impl<F, S, R> MatchLoop<F, S, R>
where
    S: LandmarkSource<F>,
    R: ReferenceImages<F>,
{
    pub fn new(
        config: &GameConfig,
        source: S,
        references: R,
        images: Vec<String>,
        frames: Arc<FrameSlot<F>>,
        clock: Arc<dyn Clock>,
        events: Sender<GameEvent>,
    ) -> Self {
        Self {
            source,
            references,
            cycle: ReferenceCycle::new(images),
            reference: None,
            sampler: PoseSampler::new(config.sample_attempts),
            comparator: AngleComparator::new(config.similarity_threshold_deg),
            scorer: ComboScorer::from_config(config),
            frames,
            clock,
            events,
            player: None,
            last_generation: 0,
            matching: false,
            hold_started: None,
            started_at: None,
            matches: 0,
            match_hold: config.match_hold_secs,
            round_duration: config.round_duration_secs,
            poll_interval: config.poll_interval(),
        }
    }

    /// Credits matches to `key` in `store` as they happen.
    pub fn with_player(mut self, store: SharedStore, key: PlayerKey) -> Self {
        self.player = Some((store, key));
        self
    }

    pub fn score(&self) -> u32 {
        self.scorer.score
    }

    pub fn multiplier(&self) -> u32 {
        self.scorer.multiplier()
    }

    pub fn reference(&self) -> Option<&ReferencePose> {
        self.reference.as_ref()
    }

    pub fn is_matching(&self) -> bool {
        self.matching
    }

    pub fn summary(&self) -> LoopSummary {
        LoopSummary {
            score: self.scorer.score,
            matches: self.matches,
        }
    }

    fn emit(&self, event: GameEvent) {
        let _ = self.events.send(event);
    }

    fn set_matching(&mut self, is_match: bool) {
        if self.matching != is_match {
            self.matching = is_match;
            self.emit(GameEvent::MatchStatusChanged { is_match });
        }
    }

    /// Runs one poll cycle.
    pub fn tick(&mut self) -> TickOutcome {
        let now = self.clock.now();
        let started = *self.started_at.get_or_insert(now);

        if let Some(duration) = self.round_duration {
            if now - started >= duration {
                self.emit(GameEvent::RoundOver);
                return TickOutcome::RoundOver;
            }
        }

        if let Some(multiplier) = self.scorer.expire(now) {
            debug!(multiplier, "combo expired");
            self.emit(GameEvent::ComboChanged { multiplier });
        }

        if self.reference.is_none() && !self.load_reference() {
            return TickOutcome::NoReference;
        }

        let frame = match self.frames.latest() {
            Some(frame) if frame.generation != self.last_generation => frame,
            _ => return TickOutcome::NoFrame,
        };
        self.last_generation = frame.generation;

        let live = match self
            .sampler
            .sample(&mut self.source, &*frame.image, &REQUIRED_KEYPOINTS)
        {
            Ok(live) => live,
            Err(e) => {
                debug!(generation = frame.generation, error = %e, "skipping frame");
                self.hold_started = None;
                return TickOutcome::IncompletePose;
            }
        };

        let Some(reference) = self.reference.as_ref() else {
            return TickOutcome::NoReference;
        };
        let result = match self.comparator.compare(&reference.landmarks, &live) {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "comparison rejected a sampled pose");
                self.hold_started = None;
                return TickOutcome::IncompletePose;
            }
        };

        self.set_matching(result.is_match);
        if !result.is_match {
            self.hold_started = None;
            if let Some(joint) = result.failed_joint() {
                debug!(
                    joint = joint.joint,
                    delta = joint.delta_deg,
                    "pose does not match"
                );
            }
            return TickOutcome::NoMatch;
        }

        let since = *self.hold_started.get_or_insert(now);
        if now - since < self.match_hold {
            return TickOutcome::Holding;
        }
        self.hold_started = None;

        let outcome = self.scorer.record_match(now);
        self.matches += 1;
        info!(
            score = outcome.score,
            multiplier = outcome.multiplier,
            "pose matched"
        );
        self.emit(GameEvent::ScoreChanged {
            score: outcome.score,
        });
        self.emit(GameEvent::ComboChanged {
            multiplier: outcome.multiplier,
        });
        self.credit_player(outcome.score);
        self.advance_reference();

        TickOutcome::Matched(outcome)
    }

    /// Moves to the next reference image without scoring.
    pub fn skip(&mut self) {
        info!("reference skipped");
        self.advance_reference();
    }

    fn credit_player(&self, score: u32) {
        if let Some((store, key)) = &self.player {
            let mut store = store.lock();
            store.set_score(key, score);
            if let Err(e) = store.update_leaderboard(key, score) {
                warn!(error = %e, "failed to persist leaderboard");
            }
        }
    }

    fn advance_reference(&mut self) {
        self.cycle.advance();
        self.reference = None;
        self.hold_started = None;
        self.load_reference();
    }

    /// Extracts the pose of the image under the cursor. Images that never
    /// yield a complete pose are skipped, trying each image at most once.
    fn load_reference(&mut self) -> bool {
        for _ in 0..self.cycle.len() {
            let Some((index, image)) = self.cycle.current() else {
                return false;
            };
            let image = image.to_string();
            match self.extract_reference(&image) {
                Ok(pose) => {
                    info!(index, image = %image, "reference pose ready");
                    self.emit(GameEvent::ReferenceChanged {
                        index,
                        image: image.clone(),
                    });
                    self.reference = Some(ReferencePose {
                        index,
                        image,
                        landmarks: pose,
                    });
                    return true;
                }
                Err(e) => {
                    warn!(index, image = %image, error = %e, "unusable reference image");
                    self.cycle.advance();
                }
            }
        }
        false
    }

    fn extract_reference(&mut self, image: &str) -> anyhow::Result<LandmarkSet> {
        let pixels = self.references.resolve(image)?;
        let landmarks = self
            .sampler
            .sample(&mut self.source, &pixels, &REQUIRED_KEYPOINTS)?;
        Ok(landmarks)
    }

    fn run(mut self, stop: &AtomicBool, commands: &Receiver<LoopCommand>) -> LoopSummary {
        info!(references = self.cycle.len(), "match loop started");
        loop {
            if stop.load(Ordering::Acquire) {
                break;
            }
            if self.tick() == TickOutcome::RoundOver {
                break;
            }
            select! {
                recv(commands) -> command => match command {
                    Ok(LoopCommand::Skip) => self.skip(),
                    Ok(LoopCommand::Wake) => {}
                    Err(_) => break,
                },
                default(self.poll_interval) => {}
            }
        }
        let summary = self.summary();
        info!(score = summary.score, matches = summary.matches, "match loop stopped");
        summary
    }
}

impl<F, S, R> MatchLoop<F, S, R>
where
    F: Send + Sync + 'static,
    S: LandmarkSource<F> + 'static,
    R: ReferenceImages<F> + 'static,
{
    /// Starts the loop on its own thread.
    pub fn spawn(self) -> Result<LoopHandle, SessionError> {
        let stop = Arc::new(AtomicBool::new(false));
        let (commands_tx, commands_rx) = unbounded();

        let thread_stop = Arc::clone(&stop);
        let thread = thread::Builder::new()
            .name("match-loop".into())
            .spawn(move || self.run(&thread_stop, &commands_rx))
            .map_err(SessionError::Spawn)?;

        Ok(LoopHandle {
            stop,
            commands: commands_tx,
            thread: Some(thread),
        })
    }
}

/// Control side of a spawned [`MatchLoop`]. Dropping it stops the loop.
pub struct LoopHandle {
    stop: Arc<AtomicBool>,
    commands: Sender<LoopCommand>,
    thread: Option<JoinHandle<LoopSummary>>,
}

impl LoopHandle {
    pub fn skip(&self) {
        let _ = self.commands.send(LoopCommand::Skip);
    }

    /// Asks the loop to exit. It finishes the tick in progress, if any, and
    /// starts no new comparison.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
        let _ = self.commands.send(LoopCommand::Wake);
    }

    /// True once the loop has exited, e.g. when the round timer ran out.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Stops the loop and waits for it.
    pub fn join(mut self) -> Result<LoopSummary, SessionError> {
        self.stop();
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| SessionError::LoopPanicked),
            None => Err(SessionError::LoopPanicked),
        }
    }
}

impl Drop for LoopHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}
