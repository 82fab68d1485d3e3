use std::{fs, path::Path, sync::Arc};

use anyhow::Context;
use pose_data::landmark::Keypoint;
use pose_data::player::PlayerKey;
use posestrike_core::config::GameConfig;
use posestrike_core::events::{EventQueue, GameEvent};
use posestrike_core::frame::FrameSlot;
use posestrike_core::gameplay::match_loop::{MatchLoop, TickOutcome};
use posestrike_core::gameplay::session::{admit_player, settle_session};
use posestrike_core::pose::scripted::{LabelImages, ScriptedSource};
use posestrike_core::store::PlayerStore;
use posestrike_core::time::clock::ManualClock;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
struct Script {
    /// Replaces the CLI config for this run.
    config: Option<GameConfig>,
    references: Vec<ScriptReference>,
    frames: Vec<ScriptFrame>,
}

#[derive(Debug, Deserialize)]
struct ScriptReference {
    image: String,
    landmarks: Vec<Keypoint>,
}

/// One tick of the replay at time `at`. With `landmarks` a new camera frame
/// is published first; with `skip` the reference is skipped first.
#[derive(Debug, Deserialize)]
struct ScriptFrame {
    at: f64,
    #[serde(default)]
    landmarks: Option<Vec<Keypoint>>,
    #[serde(default)]
    skip: bool,
}

fn describe(event: &GameEvent) -> String {
    match event {
        GameEvent::ScoreChanged { score } => format!("score {}", score),
        GameEvent::ComboChanged { multiplier } => format!("combo x{}", multiplier),
        GameEvent::MatchStatusChanged { is_match: true } => "match".to_string(),
        GameEvent::MatchStatusChanged { is_match: false } => "no match".to_string(),
        GameEvent::ReferenceChanged { index, image } => format!("reference #{} {}", index, image),
        GameEvent::RoundOver => "round over".to_string(),
    }
}

fn load_script(path: &Path) -> anyhow::Result<Script> {
    let bytes = fs::read(path).with_context(|| format!("failed to read script: {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse script json: {}", path.display()))
}

pub fn run_simulation(
    path: &Path,
    config: &GameConfig,
    store_path: &Path,
    player: Option<PlayerKey>,
) -> anyhow::Result<()> {
    let script = load_script(path)?;
    let config = script.config.unwrap_or_else(|| config.clone());
    config.validate()?;

    // References are addressed by their image name, camera frames by a
    // synthetic per-step label.
    let mut source = ScriptedSource::new();
    let mut images = Vec::with_capacity(script.references.len());
    for reference in script.references {
        source.push(reference.image.clone(), reference.landmarks);
        images.push(reference.image);
    }
    let mut steps = Vec::with_capacity(script.frames.len());
    for (i, frame) in script.frames.into_iter().enumerate() {
        let label = frame.landmarks.map(|landmarks| {
            let label = format!("frame-{}", i);
            source.push(label.clone(), landmarks);
            label
        });
        steps.push((frame.at, label, frame.skip));
    }

    let clock = ManualClock::new(0.0);
    let frames = FrameSlot::shared();
    let events = EventQueue::new();
    let mut match_loop = MatchLoop::new(
        &config,
        source,
        LabelImages,
        images,
        frames.clone(),
        Arc::new(clock.clone()),
        events.sender(),
    );

    let store = match &player {
        Some(key) => {
            let mut store = PlayerStore::open(store_path, config.max_attempts);
            admit_player(&mut store, key)?;
            let store = store.into_shared();
            match_loop = match_loop.with_player(store.clone(), key.clone());
            Some(store)
        }
        None => None,
    };

    info!(script = %path.display(), steps = steps.len(), "simulation started");
    println!("Simulation Start ({} steps)", steps.len());
    println!("  Time | Event");
    println!("-------|------------------");

    for (at, label, skip) in steps {
        clock.set(at);
        if skip {
            match_loop.skip();
        }
        if let Some(label) = label {
            frames.publish(label);
        }

        let outcome = match_loop.tick();
        for event in events.drain() {
            println!("{:6.2} | {}", at, describe(&event));
        }
        match outcome {
            TickOutcome::IncompletePose => println!("{:6.2} | incomplete pose, frame skipped", at),
            TickOutcome::NoReference => println!("{:6.2} | no usable reference", at),
            TickOutcome::RoundOver => break,
            _ => {}
        }
    }

    println!("Final score {}", match_loop.score());

    if let (Some(store), Some(key)) = (store, player) {
        let report = settle_session(&mut store.lock(), &key, match_loop.score())?;
        println!(
            "{}: best {}, rank #{}, attempts left {} - {}",
            report.key,
            report.best_score,
            report.rank,
            report.remaining_attempts,
            report.verdict.message()
        );
    }

    Ok(())
}
