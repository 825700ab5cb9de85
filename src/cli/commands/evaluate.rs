//! Evaluate command - Play a trained table greedily without learning

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    adapters::BfsPathFinder,
    app::{App, DEFAULT_TABLE_FILE},
    cli::{
        config::WorldArgs,
        output::{print_kv, print_run_result, print_section},
    },
    pipeline::{ProgressObserver, TrainingConfig, TrainingPipeline},
    q_learning::{QMindTrainer, TrainerParams},
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a trained table", allow_negative_numbers = true)]
pub struct EvaluateArgs {
    /// Path to the trained table
    #[arg(default_value = DEFAULT_TABLE_FILE)]
    pub table: PathBuf,

    /// Number of evaluation episodes
    #[arg(long, short = 'e', default_value_t = 100)]
    pub episodes: usize,

    /// Step cap per episode (-1 for unbounded)
    #[arg(long, default_value_t = 1000)]
    pub max_steps: i64,

    /// Random seed for spawn positions
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub world: WorldArgs,

    /// Pipeline-side step cap per episode
    #[arg(long, default_value_t = 10_000)]
    pub episode_cap: usize,

    /// Show a progress bar
    #[arg(long)]
    pub progress: bool,

    /// Export results to a JSON file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let world = args.world.build()?;

    println!("Loading trained table from: {}", args.table.display());
    let table = App::new()
        .load_table(&args.table)
        .with_context(|| format!("Failed to load table from {}", args.table.display()))?;
    anyhow::ensure!(
        !table.is_empty(),
        "No trained table found at {}",
        args.table.display()
    );

    print_section("Evaluation Configuration");
    print_kv("World", &args.world.describe());
    print_kv("Known states", &table.len().to_string());
    print_kv("Episodes", &args.episodes.to_string());
    if let Some(seed) = args.seed {
        print_kv("Seed", &seed.to_string());
    }

    let params = TrainerParams {
        max_steps: args.max_steps,
        episodes_between_saves: 0,
        ..TrainerParams::default()
    };
    params.validate()?;

    // No storage: evaluation never writes the table back.
    let mut trainer = QMindTrainer::new(params, world, BfsPathFinder, table);
    if let Some(seed) = args.seed {
        trainer = trainer.with_seed(seed);
    }

    let mut pipeline = TrainingPipeline::new(TrainingConfig {
        num_episodes: args.episodes,
        max_steps_per_episode: Some(args.episode_cap),
        train: false,
    });
    if args.progress {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }

    let result = pipeline.run(&mut trainer)?;

    print_section("Evaluation Results");
    print_run_result(&result);

    if let Some(path) = &args.export {
        result
            .save(path)
            .with_context(|| format!("Failed to export results to {}", path.display()))?;
        println!("\n✓ Results exported to: {}", path.display());
    }

    Ok(())
}
