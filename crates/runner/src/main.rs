//! Traitors Simulation Runner
//!
//! Plays a batch of independent games concurrently and writes one JSON
//! summary line per game.

use advisor::{Advisor, AdvisorConfig, TrainingData};
use clap::Parser;
use runner::{play_game, GameSummary};
use sim_core::{SimConfig, Winner};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

/// Command line arguments for the runner
#[derive(Parser, Debug)]
#[command(name = "traitors-sim")]
#[command(about = "Batch simulation of the Traitors social deduction game")]
struct Args {
    /// Engine configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Advisor configuration (TOML)
    #[arg(long)]
    advisor_config: Option<PathBuf>,

    /// Directory holding the training corpus JSON files
    #[arg(long)]
    training_dir: Option<PathBuf>,

    /// Base random seed; game i uses seed + i
    #[arg(long)]
    seed: Option<u64>,

    /// Number of games to play
    #[arg(long, default_value_t = 1)]
    games: u64,

    /// Players per game
    #[arg(long)]
    players: Option<usize>,

    /// Traitors per game
    #[arg(long)]
    traitors: Option<usize>,

    /// Maximum number of days
    #[arg(long)]
    days: Option<u32>,

    /// Write JSON lines here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Args {
    fn sim_config(&self) -> Result<SimConfig, sim_core::ConfigError> {
        let mut config = match &self.config {
            Some(path) => SimConfig::from_file(path)?,
            None => SimConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.simulation.seed = seed;
        }
        if let Some(players) = self.players {
            config.game.num_players = players;
        }
        if let Some(traitors) = self.traitors {
            config.game.num_traitors = traitors;
        }
        if let Some(days) = self.days {
            config.game.max_days = days;
        }
        Ok(config.validated())
    }

    fn advisor_config(&self) -> Result<AdvisorConfig, advisor::ConfigError> {
        match &self.advisor_config {
            Some(path) => AdvisorConfig::from_file(path),
            None => Ok(AdvisorConfig::default()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the summaries
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let config = args.sim_config()?;
    let advisor_config = args.advisor_config()?;
    let training = Arc::new(match &args.training_dir {
        Some(dir) => TrainingData::load(dir),
        None => {
            tracing::info!("no training directory given, advising from built-in defaults");
            TrainingData::default()
        }
    });
    tracing::info!(
        games = args.games,
        players = config.game.num_players,
        traitors = config.game.num_traitors,
        seed = config.simulation.seed,
        "starting batch"
    );

    let mut games = JoinSet::new();
    for i in 0..args.games {
        let mut game_config = config.clone();
        game_config.simulation.seed = config.simulation.seed.wrapping_add(i);
        let advisor = Advisor::new(Arc::clone(&training), advisor_config.clone());
        games.spawn_blocking(move || play_game(game_config, &advisor));
    }

    let mut summaries: Vec<GameSummary> = Vec::with_capacity(args.games as usize);
    while let Some(joined) = games.join_next().await {
        summaries.push(joined?);
    }
    summaries.sort_by_key(|s| s.seed);

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    for summary in &summaries {
        serde_json::to_writer(&mut out, summary)?;
        writeln!(out)?;
    }
    out.flush()?;

    let wins = |side: Winner| summaries.iter().filter(|s| s.winner == Some(side)).count();
    tracing::info!(
        games = summaries.len(),
        traitor_wins = wins(Winner::Traitors),
        faithful_wins = wins(Winner::Faithful),
        "batch complete"
    );
    Ok(())
}
