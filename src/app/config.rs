//! Configuration types for trainer creation.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    adapters::csv_repository::DEFAULT_DELIMITER,
    error::Error,
    q_learning::{RewardPolicy, TrainerParams, codec::ACCEPTED_SEPARATORS},
};

/// Default file name of the persisted table
pub const DEFAULT_TABLE_FILE: &str = "QTable.csv";

/// Where the Q-table lives on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the table file
    pub directory: PathBuf,
    /// File name inside `directory`
    pub file_name: String,
    /// Separator written between fields
    pub delimiter: char,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            file_name: DEFAULT_TABLE_FILE.to_string(),
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl StorageConfig {
    /// Full path of the table file
    pub fn table_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

/// Configuration for creating a trainer.
///
/// This type provides a type-safe, builder-style API for configuring trainers
/// before creation through the dependency injection container.
///
/// # Examples
///
/// ```
/// use qmind::app::TrainerConfig;
///
/// let config = TrainerConfig::default()
///     .with_seed(42)
///     .with_episodes(500)
///     .with_alpha(0.5)
///     .with_table_directory("runs/a");
/// assert!(config.validate().is_ok());
/// assert_eq!(config.storage.table_path().to_str(), Some("runs/a/QTable.csv"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Learning and episode parameters
    pub params: TrainerParams,
    /// Reward magnitudes
    pub rewards: RewardPolicy,
    /// Table persistence
    pub storage: StorageConfig,
    /// Episodes per pipeline run
    pub episodes: usize,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            params: TrainerParams::default(),
            rewards: RewardPolicy::default(),
            storage: StorageConfig::default(),
            episodes: 1000,
            seed: None,
        }
    }
}

impl TrainerConfig {
    /// Read a JSON configuration file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read config {path:?}"),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Set the learning rate.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.params.alpha = alpha;
        self
    }

    /// Set the discount factor.
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.params.gamma = gamma;
        self
    }

    /// Set the exploration rate.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.params.epsilon = epsilon;
        self
    }

    /// Set the per-episode step cap (-1 for unbounded).
    pub fn with_max_steps(mut self, max_steps: i64) -> Self {
        self.params.max_steps = max_steps;
        self
    }

    /// Set the periodic save cadence (0 disables).
    pub fn with_episodes_between_saves(mut self, episodes: i64) -> Self {
        self.params.episodes_between_saves = episodes;
        self
    }

    pub fn with_rewards(mut self, rewards: RewardPolicy) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn with_table_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.storage.directory = directory.into();
        self
    }

    pub fn with_table_file(mut self, file_name: impl Into<String>) -> Self {
        self.storage.file_name = file_name.into();
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.storage.delimiter = delimiter;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;
        self.rewards.validate()?;
        if self.storage.file_name.trim().is_empty() {
            return Err(Error::InvalidConfiguration {
                message: "storage file name must not be empty".to_string(),
            });
        }
        if !ACCEPTED_SEPARATORS.contains(&self.storage.delimiter) {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "delimiter '{}' is not one of {ACCEPTED_SEPARATORS:?}",
                    self.storage.delimiter
                ),
            });
        }
        Ok(())
    }
}
