mod simulate;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pose_data::player::PlayerKey;
use posestrike_core::config::GameConfig;
use posestrike_core::store::PlayerStore;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "posestrike")]
#[command(about = "Pose Striker leaderboard and session tools", long_about = None)]
struct Cli {
    /// Leaderboard file; defaults to the configured path.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// JSON game config.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register a new player.
    Add { name: String, group: String },
    /// Print a player's score and remaining attempts.
    Show { name: String, group: String },
    /// Print a player's leaderboard position.
    Rank { name: String, group: String },
    /// Print the best players.
    Top {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Replay a scripted session through the match engine.
    Simulate {
        script: PathBuf,
        /// Credit the session to this player.
        #[arg(long, requires = "group")]
        player: Option<String>,
        #[arg(long, requires = "player")]
        group: Option<String>,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let store_path = cli
        .store
        .clone()
        .unwrap_or_else(|| config.leaderboard_path.clone());
    debug!(store = %store_path.display(), "using player store");

    match cli.command {
        Command::Add { name, group } => {
            let mut store = PlayerStore::open(&store_path, config.max_attempts);
            let key = PlayerKey::new(name, group);
            store.add_player(key.clone())?;
            store
                .save()
                .with_context(|| format!("failed to save {}", store_path.display()))?;
            println!("added {} with {} attempts", key, config.max_attempts);
        }
        Command::Show { name, group } => {
            let store = PlayerStore::open(&store_path, config.max_attempts);
            let key = PlayerKey::new(name, group);
            let record = store
                .record(&key)
                .with_context(|| format!("player {} does not exist", key))?;
            println!(
                "{}: score {}, attempts left {}",
                key, record.score, record.remaining_attempts
            );
        }
        Command::Rank { name, group } => {
            let store = PlayerStore::open(&store_path, config.max_attempts);
            let key = PlayerKey::new(name, group);
            let rank = store.rank(&key)?;
            let best = store.leaderboard()[rank - 1].best_score;
            println!("{} is ranked #{} with {}", key, rank, best);
        }
        Command::Top { limit } => {
            let store = PlayerStore::open(&store_path, config.max_attempts);
            let top = store.top(limit.unwrap_or(config.top_limit));
            if top.is_empty() {
                println!("Leaderboard is empty.");
            }
            for (i, entry) in top.iter().enumerate() {
                println!("{:>3}. {}  {}", i + 1, entry.key, entry.best_score);
            }
        }
        Command::Simulate {
            script,
            player,
            group,
        } => {
            let key = player.zip(group).map(|(name, group)| PlayerKey::new(name, group));
            simulate::run_simulation(&script, &config, &store_path, key)
                .with_context(|| format!("simulation failed: {}", script.display()))?;
        }
    }

    Ok(())
}
