//! Xiangqi-MCTS: Chinese chess with a Monte Carlo Tree Search player.
//!
//! ## Usage
//!
//! - `xiangqi-mcts` - Show a demo
//! - `xiangqi-mcts protocol` - Start the text protocol on stdin/stdout
//! - `xiangqi-mcts selfplay` - Let the engine play both sides
//! - `xiangqi-mcts demo` - Run one search from the opening

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use xiangqi_mcts::config::SearchConfig;
use xiangqi_mcts::constants::{DEFAULT_ROLLOUT_PLIES, DEFAULT_ROUNDS};
use xiangqi_mcts::mcts::SearchEngine;
use xiangqi_mcts::position::{Outcome, Position};
use xiangqi_mcts::protocol::ProtocolEngine;
use xiangqi_mcts::selfplay::play_game;

/// Xiangqi-MCTS: a Chinese chess MCTS engine
#[derive(Parser)]
#[command(name = "xiangqi-mcts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    search: SearchArgs,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct SearchArgs {
    /// Search rounds per move
    #[arg(long, global = true, default_value_t = DEFAULT_ROUNDS)]
    rounds: u32,

    /// Ply bound for each random rollout
    #[arg(long, global = true, default_value_t = DEFAULT_ROLLOUT_PLIES)]
    rollout_plies: u32,

    /// Seed for reproducible rollouts and move sampling
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Visit-count temperature for self-play move sampling (0 = most visited)
    #[arg(long, global = true, default_value_t = 1.0)]
    temperature: f32,
}

impl SearchArgs {
    fn to_config(&self) -> Result<SearchConfig> {
        let mut config = SearchConfig::default()
            .with_rounds(self.rounds)
            .with_rollout_plies(self.rollout_plies)
            .with_temperature(self.temperature);
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config.validate().context("invalid search settings")?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start the line-oriented text protocol for use with a UI or script
    Protocol,
    /// Let the engine play against itself, sampling moves by visit count
    Selfplay {
        /// Stop after this many moves if nobody has won
        #[arg(long, default_value_t = 200)]
        max_moves: u32,
    },
    /// Run one search from the opening and print the root statistics
    Demo,
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries protocol responses, so logs go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = cli.search.to_config()?;
    info!(rounds = config.rounds, rollout_plies = config.rollout_plies, seed = ?config.seed, "starting");

    match cli.command {
        Some(Commands::Protocol) => {
            let mut engine = ProtocolEngine::new(config)?;
            engine.run().context("protocol loop failed")?;
        }
        Some(Commands::Selfplay { max_moves }) => run_selfplay(config, max_moves)?,
        Some(Commands::Demo) | None => run_demo(config)?,
    }
    Ok(())
}

fn run_selfplay(config: SearchConfig, max_moves: u32) -> Result<()> {
    let mut engine = SearchEngine::new(Position::start(), config)?;
    let record = play_game(&mut engine, max_moves).context("self-play failed")?;

    for (ply, (mv, example)) in record.moves.iter().zip(&record.examples).enumerate() {
        let mover = example.side_to_move();
        let probability = example.policy[mv.index()];
        println!("{:>3}. {mover:<5} {mv}  p={probability:.3}", ply + 1);
    }

    println!("{}", engine.position());
    match record.outcome {
        Outcome::Win(color) => println!("Result: {color} wins"),
        Outcome::Undecided => println!("Result: undecided after {} moves", record.moves.len()),
    }
    println!("Recorded {} training examples", record.examples.len());
    Ok(())
}

fn run_demo(config: SearchConfig) -> Result<()> {
    println!("Xiangqi-MCTS: Chinese chess MCTS engine\n");

    let position = Position::start();
    println!("{position}");

    println!("Running {} search rounds...", config.rounds);
    let mut engine = SearchEngine::new(position, config)?;
    let summary = engine.search()?;

    println!(
        "Tree: {} nodes, depth {}, root value {:+.3}",
        summary.tree_nodes, summary.max_depth, summary.root_value
    );
    println!("Most visited moves:");
    for child in engine.root_children().into_iter().take(5) {
        println!("  {}  visits {:>4}  mean {:+.3}", child.mv, child.visits, child.mean);
    }

    match engine.best_move() {
        Some(mv) => println!("Best move: {mv}"),
        None => println!("No move available"),
    }
    Ok(())
}
