//! QMind CLI - train and examine a grid evasion agent
//!
//! This CLI provides a unified interface for:
//! - Training the agent and persisting its Q-table
//! - Evaluating a learned table without updating it
//! - Inspecting the rows of a stored table
//!
//! Log output is controlled through `RUST_LOG` (default `info`).

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qmind")]
#[command(version, about = "Tabular Q-learning agent for grid evasion", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the agent and save its table
    Train(Box<qmind::cli::commands::train::TrainArgs>),

    /// Evaluate a trained table against the chaser
    Evaluate(qmind::cli::commands::evaluate::EvaluateArgs),

    /// Print the contents of a stored table
    Inspect(qmind::cli::commands::inspect::InspectArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => qmind::cli::commands::train::execute(*args),
        Commands::Evaluate(args) => qmind::cli::commands::evaluate::execute(args),
        Commands::Inspect(args) => qmind::cli::commands::inspect::execute(args),
    }
}
