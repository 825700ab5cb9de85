//! Train command - Run Q-learning episodes and persist the table

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use crate::{
    adapters::BfsPathFinder,
    app::{App, TrainerConfig},
    cli::{
        config::WorldArgs,
        output::{print_kv, print_run_result, print_section},
    },
    pipeline::{
        JsonlObserver, ProgressObserver, TracingObserver, TrainingConfig, TrainingPipeline,
        TrainingResult,
    },
};

#[derive(Parser, Debug)]
#[command(about = "Train the evasion agent", allow_negative_numbers = true)]
pub struct TrainArgs {
    /// JSON configuration file; flags below override its values
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Number of training episodes
    #[arg(long, short = 'e')]
    pub episodes: Option<usize>,

    /// Learning rate
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Discount factor
    #[arg(long)]
    pub gamma: Option<f64>,

    /// Exploration rate
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Step cap per episode (-1 for unbounded)
    #[arg(long)]
    pub max_steps: Option<i64>,

    /// Save the table every N finished episodes (0 disables)
    #[arg(long)]
    pub save_every: Option<i64>,

    /// Directory holding the table file
    #[arg(long)]
    pub table_dir: Option<PathBuf>,

    /// Table file name
    #[arg(long)]
    pub table_file: Option<String>,

    /// Field separator written to the table file (`;` or `,`)
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Random seed for reproducibility
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

    /// Log a running summary every N episodes
    #[arg(long)]
    pub log_every: Option<usize>,

    /// Optional file for JSONL episode summaries
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

impl TrainArgs {
    /// Merge the config file (if any) with the command-line overrides.
    pub fn resolve_config(&self) -> Result<TrainerConfig> {
        let mut config = match &self.config {
            Some(path) => TrainerConfig::from_json_file(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?,
            None => TrainerConfig::default(),
        };

        if let Some(episodes) = self.episodes {
            config = config.with_episodes(episodes);
        }
        if let Some(alpha) = self.alpha {
            config = config.with_alpha(alpha);
        }
        if let Some(gamma) = self.gamma {
            config = config.with_gamma(gamma);
        }
        if let Some(epsilon) = self.epsilon {
            config = config.with_epsilon(epsilon);
        }
        if let Some(max_steps) = self.max_steps {
            config = config.with_max_steps(max_steps);
        }
        if let Some(save_every) = self.save_every {
            config = config.with_episodes_between_saves(save_every);
        }
        if let Some(dir) = &self.table_dir {
            config = config.with_table_directory(dir.clone());
        }
        if let Some(file) = &self.table_file {
            config = config.with_table_file(file.clone());
        }
        if let Some(delimiter) = self.delimiter {
            config = config.with_delimiter(delimiter);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }

        config.validate().context("Invalid training configuration")?;
        Ok(config)
    }
}

#[derive(Debug, Serialize)]
struct TrainingSummaryFile<'a> {
    training: &'a TrainingResult,
    config: &'a TrainerConfig,
    world: String,
    table: PathBuf,
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let config = args.resolve_config()?;
    let world = args.world.build()?;
    let table_path = config.storage.table_path();

    print_section("Training Configuration");
    print_kv("World", &args.world.describe());
    print_kv("Episodes", &config.episodes.to_string());
    print_kv("Alpha", &config.params.alpha.to_string());
    print_kv("Gamma", &config.params.gamma.to_string());
    print_kv("Epsilon", &config.params.epsilon.to_string());
    print_kv("Max steps", &config.params.max_steps.to_string());
    print_kv("Table", &table_path.display().to_string());
    if let Some(seed) = config.seed {
        print_kv("Seed", &seed.to_string());
    }

    let app = App::from_config(&config)?;
    let mut trainer = app
        .create_trainer(&config, world, BfsPathFinder)
        .with_context(|| format!("Failed to prepare trainer for {}", table_path.display()))?;
    print_kv("Loaded states", &trainer.table().len().to_string());

    let mut pipeline = TrainingPipeline::new(TrainingConfig {
        num_episodes: config.episodes,
        max_steps_per_episode: Some(args.episode_cap),
        train: true,
    });
    if args.progress {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(interval) = args.log_every {
        pipeline = pipeline.with_observer(Box::new(TracingObserver::new(interval)));
    }
    if let Some(path) = &args.observations {
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        pipeline = pipeline.with_observer(Box::new(observer));
    }

    let result = pipeline.run(&mut trainer)?;

    print_section("Training Results");
    print_run_result(&result);
    println!("\n✓ Table saved to: {}", table_path.display());

    if let Some(path) = &args.summary {
        write_summary(path, &result, &config, &args.world.describe(), &table_path)?;
        println!("✓ Summary written to: {}", path.display());
    }

    Ok(())
}

fn write_summary(
    path: &Path,
    result: &TrainingResult,
    config: &TrainerConfig,
    world: &str,
    table: &Path,
) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let summary = TrainingSummaryFile {
        training: result,
        config,
        world: world.to_string(),
        table: table.to_path_buf(),
    };
    serde_json::to_writer_pretty(file, &summary)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> TrainArgs {
        TrainArgs::try_parse_from(std::iter::once("train").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = parse(&["--episodes", "12", "--alpha", "0.5", "--max-steps", "-1"]);
        let config = args.resolve_config().unwrap();
        assert_eq!(config.episodes, 12);
        assert_eq!(config.params.alpha, 0.5);
        assert_eq!(config.params.max_steps, -1);
        assert_eq!(config.params.gamma, 0.9);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let args = parse(&["--epsilon", "2.0"]);
        assert!(args.resolve_config().is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{ "episodes": 40, "seed": 1 }"#).unwrap();

        let args = parse(&["--config", path.to_str().unwrap(), "--seed", "2"]);
        let config = args.resolve_config().unwrap();
        assert_eq!(config.episodes, 40);
        assert_eq!(config.seed, Some(2));
    }
}
