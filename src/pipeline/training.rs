//! Training pipeline for the Q-learning trainer

use std::{fs::File, path::Path};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    Error, Result,
    ports::{Observer, PathFinder, World},
    q_learning::{EpisodeEnd, EpisodeSummary, QMindTrainer, RewardKind},
};

/// Training configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of episodes to run
    pub num_episodes: usize,

    /// Pipeline-side step cap per episode, on top of the trainer's own
    /// `max_steps`. Keeps unbounded trainers from running forever.
    pub max_steps_per_episode: Option<usize>,

    /// Whether steps update the table. Evaluation runs set this to false.
    pub train: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            num_episodes: 1000,
            max_steps_per_episode: Some(10_000),
            train: true,
        }
    }
}

/// Result of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Episodes completed
    pub episodes: usize,

    /// Steps executed across all episodes
    pub total_steps: usize,

    /// Episodes ended by the other entity reaching the agent
    pub captures: usize,

    /// Episodes ended by walking into a blocked cell
    pub blocked: usize,

    /// Episodes ended by a step cap
    pub timeouts: usize,

    /// Steps rewarded for keeping far away
    pub escape_steps: usize,

    /// Mean episode return
    pub mean_return: f64,

    /// Fraction of episodes ending in capture
    pub capture_rate: f64,

    /// Number of states in the table after the run
    pub table_size: usize,
}

impl TrainingResult {
    /// Save result to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create {path:?}"),
            source,
        })?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open {path:?}"),
            source,
        })?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

#[derive(Default)]
struct Tally {
    episodes: usize,
    total_steps: usize,
    captures: usize,
    blocked: usize,
    timeouts: usize,
    escape_steps: usize,
    return_sum: f64,
}

impl Tally {
    fn record(&mut self, summary: &EpisodeSummary) {
        self.episodes += 1;
        self.total_steps += summary.steps;
        self.return_sum += summary.total_return;
        match summary.end {
            EpisodeEnd::Captured => self.captures += 1,
            EpisodeEnd::Blocked => self.blocked += 1,
            EpisodeEnd::StepLimit => self.timeouts += 1,
        }
    }

    fn finish(self, table_size: usize) -> TrainingResult {
        let ratio = |count: f64| {
            if self.episodes > 0 {
                count / self.episodes as f64
            } else {
                0.0
            }
        };

        TrainingResult {
            episodes: self.episodes,
            total_steps: self.total_steps,
            captures: self.captures,
            blocked: self.blocked,
            timeouts: self.timeouts,
            escape_steps: self.escape_steps,
            mean_return: ratio(self.return_sum),
            capture_rate: ratio(self.captures as f64),
            table_size,
        }
    }
}

/// Runs a fixed number of episodes through a trainer
pub struct TrainingPipeline {
    config: TrainingConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl TrainingPipeline {
    /// Create a new training pipeline
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Run `num_episodes` episodes, then persist the table.
    ///
    /// The trainer's own observers see every event as well; the pipeline
    /// observers additionally receive the run start and end.
    pub fn run<W: World, P: PathFinder>(
        &mut self,
        trainer: &mut QMindTrainer<W, P>,
    ) -> Result<TrainingResult> {
        trainer.initialize()?;

        let total = self.config.num_episodes;
        trainer.notify_training_start(total)?;
        for observer in &mut self.observers {
            observer.on_training_start(total)?;
        }
        info!(episodes = total, train = self.config.train, "training run started");

        let mut tally = Tally::default();
        for _ in 0..total {
            let summary = self.run_episode(trainer, &mut tally)?;
            tally.record(&summary);
            for observer in &mut self.observers {
                observer.on_episode_end(&summary)?;
            }
        }

        trainer.notify_training_end()?;
        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        trainer.save_table()?;

        let result = tally.finish(trainer.table().len());
        info!(
            episodes = result.episodes,
            captures = result.captures,
            mean_return = result.mean_return,
            table_size = result.table_size,
            "training run finished"
        );
        Ok(result)
    }

    fn run_episode<W: World, P: PathFinder>(
        &mut self,
        trainer: &mut QMindTrainer<W, P>,
        tally: &mut Tally,
    ) -> Result<EpisodeSummary> {
        let episode = trainer.current_episode();
        for observer in &mut self.observers {
            observer.on_episode_start(episode)?;
        }

        let mut total_return = 0.0;
        loop {
            if let Some(cap) = self.config.max_steps_per_episode {
                if trainer.current_step() >= cap {
                    warn!(episode, cap, "episode truncated by pipeline step cap");
                    return trainer.truncate_episode();
                }
            }

            let record = trainer.step(self.config.train)?;
            total_return += record.reward.value;
            if record.reward.kind == RewardKind::Escaped {
                tally.escape_steps += 1;
            }
            for observer in &mut self.observers {
                observer.on_step(&record)?;
            }

            if let Some(end) = record.episode_end {
                return Ok(EpisodeSummary {
                    episode: record.episode,
                    steps: record.step + 1,
                    total_return,
                    end,
                });
            }
        }
    }
}
