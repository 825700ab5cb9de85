//! Episode-driven Q-learning trainer
//!
//! The trainer owns the Q-table for the session and runs a small state
//! machine: an episode starts by spawning both entities on random cells,
//! steps until the agent is penalized or the step cap is exceeded, then the
//! next episode starts immediately. The caller decides when to step and
//! whether a step learns.

use std::{path::PathBuf, sync::Arc};

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    Result,
    error::Error,
    grid::Position,
    ports::{Observer, PathFinder, QTableRepository, World},
    q_learning::{
        Action, QTable, State, StateEncoder,
        policy::{Reward, RewardKind, RewardPolicy, epsilon_greedy},
    },
};

/// Longest path requested from the path-finder when moving the other entity
pub const PATH_MAX_LENGTH: usize = 512;

/// Learning and episode parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerParams {
    /// Learning rate α in [0, 1]
    pub alpha: f64,
    /// Discount factor γ in [0, 1]
    pub gamma: f64,
    /// Exploration rate ε in [0, 1]
    pub epsilon: f64,
    /// Step cap per episode; -1 means unbounded
    pub max_steps: i64,
    /// Save the table every N finished episodes; 0 or less disables
    pub episodes_between_saves: i64,
}

impl Default for TrainerParams {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            gamma: 0.9,
            epsilon: 0.2,
            max_steps: 1000,
            episodes_between_saves: 100,
        }
    }
}

impl TrainerParams {
    /// Check that every rate lies in [0, 1] and the step cap is -1 or more.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("alpha", self.alpha),
            ("gamma", self.gamma),
            ("epsilon", self.epsilon),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfiguration {
                    message: format!("{name} must be within [0, 1], got {value}"),
                });
            }
        }
        if self.max_steps < -1 {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "max_steps must be -1 (unbounded) or non-negative, got {}",
                    self.max_steps
                ),
            });
        }
        Ok(())
    }

    /// Whether a finished episode with this index triggers a save
    pub fn saves_after(&self, finished_episode: usize) -> bool {
        self.episodes_between_saves > 0
            && finished_episode as u64 % self.episodes_between_saves as u64 == 0
    }

    /// Whether `step_count` executed steps exceed the cap
    pub fn exceeds_step_cap(&self, step_count: usize) -> bool {
        self.max_steps >= 0 && step_count as u64 > self.max_steps as u64
    }
}

/// Why an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeEnd {
    /// The other entity reached the agent
    Captured,
    /// The agent tried to walk into a blocked cell
    Blocked,
    /// The step cap was exceeded
    StepLimit,
}

impl EpisodeEnd {
    pub fn is_capture(self) -> bool {
        self == EpisodeEnd::Captured
    }
}

/// Everything that happened in one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub episode: usize,
    /// 0-based index of the step within its episode
    pub step: usize,
    pub state: State,
    pub action: Action,
    pub reward: Reward,
    pub next_state: State,
    /// Agent position after the step
    pub agent: Position,
    /// Other entity position after the step
    pub other: Position,
    /// Set when this step ended the episode
    pub episode_end: Option<EpisodeEnd>,
    /// Whether the table was updated
    pub trained: bool,
}

/// Summary handed to observers when an episode ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub steps: usize,
    pub total_return: f64,
    pub end: EpisodeEnd,
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Table storage used for periodic and final saves
struct Storage {
    repository: Arc<dyn QTableRepository + Send + Sync>,
    path: PathBuf,
}

/// Q-learning trainer driving the agent against a path-following chaser
pub struct QMindTrainer<W, P> {
    params: TrainerParams,
    rewards: RewardPolicy,
    world: W,
    path_finder: P,
    table: QTable,
    storage: Option<Storage>,
    observers: Vec<Box<dyn Observer>>,
    rng: StdRng,
    rng_seed: Option<u64>,

    started: bool,
    episode: usize,
    step_count: usize,
    agent: Position,
    other: Position,
    episode_return: f64,
    finished_episodes: usize,
    finished_return_sum: f64,
}

impl<W: World, P: PathFinder> QMindTrainer<W, P> {
    /// Create a trainer over `world` with an initial `table`.
    ///
    /// No episode is started yet; call [`QMindTrainer::initialize`] or simply
    /// [`QMindTrainer::step`], which starts episode 0 on first use.
    pub fn new(params: TrainerParams, world: W, path_finder: P, table: QTable) -> Self {
        Self {
            params,
            rewards: RewardPolicy::default(),
            world,
            path_finder,
            table,
            storage: None,
            observers: Vec::new(),
            rng: build_rng(None),
            rng_seed: None,
            started: false,
            episode: 0,
            step_count: 0,
            agent: Position::new(0, 0),
            other: Position::new(0, 0),
            episode_return: 0.0,
            finished_episodes: 0,
            finished_return_sum: 0.0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        self
    }

    /// Replace the reward magnitudes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] unless the penalty is negative
    /// and the far reward is not, so a step ends the episode exactly when its
    /// reward is negative.
    pub fn with_rewards(mut self, rewards: RewardPolicy) -> Result<Self> {
        rewards.validate()?;
        self.rewards = rewards;
        Ok(self)
    }

    /// Persist the table through `repository` at `path`.
    ///
    /// Without storage, periodic saves are skipped.
    pub fn with_storage(
        mut self,
        repository: Arc<dyn QTableRepository + Send + Sync>,
        path: impl Into<PathBuf>,
    ) -> Self {
        self.storage = Some(Storage {
            repository,
            path: path.into(),
        });
        self
    }

    /// Add an observer for episode and step events
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Start episode 0 if no episode has been started yet
    pub fn initialize(&mut self) -> Result<()> {
        if !self.started {
            self.started = true;
            self.start_episode(0)?;
        }
        Ok(())
    }

    /// Execute one step.
    ///
    /// With `train` set the action is chosen ε-greedily and the table is
    /// updated; otherwise the greedy action is taken and values are left
    /// untouched. When the step ends the episode, the next one has already
    /// started by the time this returns.
    ///
    /// # Errors
    ///
    /// Only persistence and observer failures are reported. World anomalies
    /// (missing neighbors, no path) leave the entity where it is.
    pub fn step(&mut self, train: bool) -> Result<StepRecord> {
        self.initialize()?;

        let state = StateEncoder::encode(self.agent, self.other, &self.world);
        let action = if train {
            epsilon_greedy(&mut self.table, state, self.params.epsilon, &mut self.rng)
        } else {
            self.table.best_action(state)
        };

        if let Some(cell) = self.world.walkable_neighbor(self.agent, action.direction()) {
            self.agent = cell;
        }
        let path = self
            .path_finder
            .find_path(&self.world, self.other, self.agent, PATH_MAX_LENGTH);
        if let Some(&next) = path.first() {
            self.other = next;
        }

        let reward = self
            .rewards
            .evaluate(&state, action, self.agent, self.other, &self.world);
        let next_state = StateEncoder::encode(self.agent, self.other, &self.world);
        if train {
            self.table.update(
                state,
                next_state,
                action,
                reward.value,
                self.params.alpha,
                self.params.gamma,
            );
        }

        let step = self.step_count;
        self.step_count += 1;
        self.episode_return += reward.value;

        let episode_end = match reward.kind {
            RewardKind::Captured => Some(EpisodeEnd::Captured),
            RewardKind::Blocked => Some(EpisodeEnd::Blocked),
            _ if self.params.exceeds_step_cap(self.step_count) => Some(EpisodeEnd::StepLimit),
            _ => None,
        };

        let record = StepRecord {
            episode: self.episode,
            step,
            state,
            action,
            reward,
            next_state,
            agent: self.agent,
            other: self.other,
            episode_end,
            trained: train,
        };
        trace!(
            episode = record.episode,
            step = record.step,
            action = %action,
            reward = reward.value,
            "step"
        );
        for observer in &mut self.observers {
            observer.on_step(&record)?;
        }

        if let Some(end) = episode_end {
            self.finish_episode(end)?;
            self.start_episode(self.episode + 1)?;
        }

        Ok(record)
    }

    /// Put both entities on explicit cells, e.g. when an external driver
    /// owns spawning
    pub fn place_entities(&mut self, agent: Position, other: Position) {
        self.started = true;
        self.agent = agent;
        self.other = other;
    }

    /// Write the table to the configured storage, if any
    pub fn save_table(&self) -> Result<()> {
        match &self.storage {
            Some(storage) => storage.repository.save(&self.table, &storage.path),
            None => Ok(()),
        }
    }

    /// Forward the start of a multi-episode run to observers
    pub fn notify_training_start(&mut self, total_episodes: usize) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_training_start(total_episodes)?;
        }
        Ok(())
    }

    /// Forward the end of a multi-episode run to observers
    pub fn notify_training_end(&mut self) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_training_end()?;
        }
        Ok(())
    }

    /// End the running episode as if the step cap was hit and start the
    /// next one.
    ///
    /// Used by drivers that enforce their own cap on top of `max_steps`.
    pub fn truncate_episode(&mut self) -> Result<EpisodeSummary> {
        self.initialize()?;
        let summary = self.finish_episode(EpisodeEnd::StepLimit)?;
        self.start_episode(self.episode + 1)?;
        Ok(summary)
    }

    fn finish_episode(&mut self, end: EpisodeEnd) -> Result<EpisodeSummary> {
        let summary = EpisodeSummary {
            episode: self.episode,
            steps: self.step_count,
            total_return: self.episode_return,
            end,
        };
        debug!(
            episode = summary.episode,
            steps = summary.steps,
            total_return = summary.total_return,
            end = ?summary.end,
            "episode finished"
        );

        self.finished_episodes += 1;
        self.finished_return_sum += self.episode_return;

        for observer in &mut self.observers {
            observer.on_episode_end(&summary)?;
        }
        Ok(summary)
    }

    fn start_episode(&mut self, episode: usize) -> Result<()> {
        if let Some(finished) = episode.checked_sub(1) {
            if self.params.saves_after(finished) {
                self.save_table()?;
            }
        }

        self.episode = episode;
        self.place_randomly();
        self.step_count = 0;
        self.episode_return = 0.0;
        debug!(episode, agent = %self.agent, other = %self.other, "episode started");

        for observer in &mut self.observers {
            observer.on_episode_start(episode)?;
        }
        Ok(())
    }

    fn place_randomly(&mut self) {
        self.agent = self.world.random_cell(&mut self.rng);
        self.other = self.world.random_cell(&mut self.rng);
    }

    /// Index of the running episode
    pub fn current_episode(&self) -> usize {
        self.episode
    }

    /// Steps executed in the running episode
    pub fn current_step(&self) -> usize {
        self.step_count
    }

    pub fn agent_position(&self) -> Position {
        self.agent
    }

    pub fn other_position(&self) -> Position {
        self.other
    }

    /// Sum of rewards in the running episode
    pub fn episode_return(&self) -> f64 {
        self.episode_return
    }

    /// Mean return over finished episodes, 0.0 before the first one ends
    pub fn return_averaged(&self) -> f64 {
        if self.finished_episodes == 0 {
            0.0
        } else {
            self.finished_return_sum / self.finished_episodes as f64
        }
    }

    pub fn finished_episodes(&self) -> usize {
        self.finished_episodes
    }

    pub fn params(&self) -> &TrainerParams {
        &self.params
    }

    pub fn rng_seed(&self) -> Option<u64> {
        self.rng_seed
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut QTable {
        &mut self.table
    }

    pub fn into_table(self) -> QTable {
        self.table
    }

    pub fn world(&self) -> &W {
        &self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{BfsPathFinder, GridWorld};

    #[test]
    fn test_params_validation() {
        assert!(TrainerParams::default().validate().is_ok());

        let bad_alpha = TrainerParams {
            alpha: 1.5,
            ..TrainerParams::default()
        };
        assert!(matches!(
            bad_alpha.validate(),
            Err(Error::InvalidConfiguration { .. })
        ));

        let bad_cap = TrainerParams {
            max_steps: -2,
            ..TrainerParams::default()
        };
        assert!(bad_cap.validate().is_err());

        let unbounded = TrainerParams {
            max_steps: -1,
            ..TrainerParams::default()
        };
        assert!(unbounded.validate().is_ok());
    }

    #[test]
    fn test_step_cap() {
        let params = TrainerParams {
            max_steps: 5,
            ..TrainerParams::default()
        };
        assert!(!params.exceeds_step_cap(5));
        assert!(params.exceeds_step_cap(6));

        let unbounded = TrainerParams {
            max_steps: -1,
            ..TrainerParams::default()
        };
        assert!(!unbounded.exceeds_step_cap(usize::MAX));
    }

    #[test]
    fn test_save_cadence() {
        let every_three = TrainerParams {
            episodes_between_saves: 3,
            ..TrainerParams::default()
        };
        assert!(every_three.saves_after(0));
        assert!(!every_three.saves_after(1));
        assert!(every_three.saves_after(3));

        for disabled in [0, -4] {
            let params = TrainerParams {
                episodes_between_saves: disabled,
                ..TrainerParams::default()
            };
            assert!(!params.saves_after(0));
            assert!(!params.saves_after(10));
        }
    }

    #[test]
    fn test_first_step_starts_episode_zero() {
        let mut trainer = QMindTrainer::new(
            TrainerParams::default(),
            GridWorld::open(12, 12).unwrap(),
            BfsPathFinder,
            QTable::new(),
        )
        .with_seed(7);

        let record = trainer.step(true).unwrap();
        assert_eq!(record.step, 0);
        assert!(record.trained);
        assert!(!trainer.table().is_empty());
    }

    #[test]
    fn test_inference_steps_do_not_change_values() {
        let mut trainer = QMindTrainer::new(
            TrainerParams::default(),
            GridWorld::open(12, 12).unwrap(),
            BfsPathFinder,
            QTable::new(),
        )
        .with_seed(9);

        for _ in 0..50 {
            trainer.step(false).unwrap();
        }
        assert!(
            trainer
                .table()
                .iter()
                .all(|(_, values)| values.0 == [0.0; 4])
        );
    }

    #[test]
    fn test_seeded_trainers_are_deterministic() {
        let run = |seed| {
            let mut trainer = QMindTrainer::new(
                TrainerParams::default(),
                GridWorld::open(15, 15).unwrap(),
                BfsPathFinder,
                QTable::new(),
            )
            .with_seed(seed);
            (0..200)
                .map(|_| trainer.step(true).unwrap().action)
                .collect::<Vec<_>>()
        };

        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_return_averaged_tracks_finished_episodes() {
        let params = TrainerParams {
            max_steps: 0,
            ..TrainerParams::default()
        };
        let mut trainer = QMindTrainer::new(
            params,
            GridWorld::open(30, 30).unwrap(),
            BfsPathFinder,
            QTable::new(),
        )
        .with_seed(5);

        assert_eq!(trainer.return_averaged(), 0.0);
        for _ in 0..10 {
            trainer.step(true).unwrap();
        }
        // A cap of 0 ends every episode after its first step.
        assert_eq!(trainer.finished_episodes(), 10);
        assert_eq!(trainer.current_episode(), 10);
        assert_eq!(trainer.current_step(), 0);
    }
}
