//! Episode state machine tests against deterministic fakes

use std::{
    cell::Cell,
    path::Path,
    sync::{Arc, Mutex},
};

use qmind::{
    Error, Result,
    adapters::InMemoryRepository,
    grid::{Direction, Position},
    ports::{Observer, PathFinder, QTableRepository, World},
    q_learning::{
        Action, EpisodeEnd, EpisodeSummary, QMindTrainer, QTable, RewardKind, RewardPolicy,
        StateEncoder, StepRecord, TrainerParams,
    },
};
use rand::RngCore;

/// Unbounded open plane. Spawns alternate between two cells far apart.
struct Plane {
    spawns: [Position; 2],
    next_spawn: Cell<usize>,
}

impl Plane {
    fn new() -> Self {
        Self {
            spawns: [Position::new(0, 0), Position::new(100, 100)],
            next_spawn: Cell::new(0),
        }
    }
}

impl World for Plane {
    fn next_cell(&self, position: Position, direction: Direction) -> Option<Position> {
        Some(position.offset(direction))
    }

    fn is_walkable(&self, _position: Position) -> bool {
        true
    }

    fn random_cell(&self, _rng: &mut dyn RngCore) -> Position {
        let index = self.next_spawn.get();
        self.next_spawn.set(index + 1);
        self.spawns[index % 2]
    }
}

/// Plane cut off below `y = 0`. Cells south of the edge do not exist.
struct HalfPlane;

impl World for HalfPlane {
    fn next_cell(&self, position: Position, direction: Direction) -> Option<Position> {
        let cell = position.offset(direction);
        (cell.y >= 0).then_some(cell)
    }

    fn is_walkable(&self, position: Position) -> bool {
        position.y >= 0
    }

    fn random_cell(&self, _rng: &mut dyn RngCore) -> Position {
        Position::new(0, 0)
    }
}

/// Chaser that never moves
struct Stationary;

impl PathFinder for Stationary {
    fn find_path(
        &self,
        _world: &dyn World,
        _from: Position,
        _to: Position,
        _max_length: usize,
    ) -> Vec<Position> {
        Vec::new()
    }
}

fn trainer(params: TrainerParams) -> QMindTrainer<Plane, Stationary> {
    QMindTrainer::new(params, Plane::new(), Stationary, QTable::new()).with_seed(42)
}

#[test]
fn test_step_cap_rolls_over_to_next_episode() {
    let params = TrainerParams {
        max_steps: 5,
        episodes_between_saves: 0,
        ..TrainerParams::default()
    };
    let mut trainer = trainer(params);

    for expected_step in 0..5 {
        let record = trainer.step(true).unwrap();
        assert_eq!(record.step, expected_step);
        assert!(!record.reward.kind.is_penalty());
        assert_eq!(record.episode_end, None);
    }
    assert_eq!(trainer.current_episode(), 0);
    assert_eq!(trainer.current_step(), 5);

    let sixth = trainer.step(true).unwrap();
    assert_eq!(sixth.episode_end, Some(EpisodeEnd::StepLimit));
    assert_eq!(trainer.current_episode(), 1);
    assert_eq!(trainer.current_step(), 0);
    assert_eq!(trainer.finished_episodes(), 1);
}

#[test]
fn test_far_steps_are_rewarded_and_accumulate() {
    let params = TrainerParams {
        max_steps: -1,
        episodes_between_saves: 0,
        ..TrainerParams::default()
    };
    let mut trainer = trainer(params);

    for _ in 0..10 {
        let record = trainer.step(true).unwrap();
        assert_eq!(record.reward.kind, RewardKind::Escaped);
        assert_eq!(record.reward.value, 100.0);
    }
    assert_eq!(trainer.episode_return(), 1000.0);
    assert_eq!(trainer.current_episode(), 0);
}

#[test]
fn test_save_cadence_counts_finished_episodes() {
    let repo = InMemoryRepository::new();
    let params = TrainerParams {
        max_steps: 0,
        episodes_between_saves: 2,
        ..TrainerParams::default()
    };
    let mut trainer = trainer(params).with_storage(Arc::new(repo.clone()), "runs/QTable.csv");

    for _ in 0..5 {
        trainer.step(true).unwrap();
    }

    // Episodes 0, 2 and 4 finished on a multiple of the cadence.
    assert_eq!(trainer.finished_episodes(), 5);
    assert_eq!(repo.save_count(), 3);
    let saved = repo.load(Path::new("runs/QTable.csv")).unwrap();
    assert!(!saved.is_empty());
}

#[test]
fn test_walking_into_the_chaser_ends_the_episode() {
    let params = TrainerParams {
        episodes_between_saves: 0,
        ..TrainerParams::default()
    };
    let agent = Position::new(0, 0);
    let other = Position::new(1, 0);

    let mut table = QTable::new();
    let state = StateEncoder::encode(agent, other, &Plane::new());
    table.set_value(state, Action::East, 1.0);

    let mut trainer = QMindTrainer::new(params, Plane::new(), Stationary, table);
    trainer.initialize().unwrap();
    trainer.place_entities(agent, other);

    let record = trainer.step(false).unwrap();
    assert_eq!(record.action, Action::East);
    assert_eq!(record.reward.kind, RewardKind::Captured);
    assert_eq!(record.episode_end, Some(EpisodeEnd::Captured));
    assert_eq!(trainer.current_episode(), 1);
    // Inference leaves the learned value alone.
    assert_eq!(trainer.table_mut().value(state, Action::East), 1.0);
}

#[derive(Default)]
struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl Observer for Recorder {
    fn on_episode_start(&mut self, episode: usize) -> Result<()> {
        self.events.lock().unwrap().push(format!("start {episode}"));
        Ok(())
    }

    fn on_step(&mut self, record: &StepRecord) -> Result<()> {
        self.events
            .lock()
            .unwrap()
            .push(format!("step {}.{}", record.episode, record.step));
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.events
            .lock()
            .unwrap()
            .push(format!("end {} after {}", summary.episode, summary.steps));
        Ok(())
    }
}

#[test]
fn test_observer_event_order() {
    let recorder = Recorder::default();
    let events = Arc::clone(&recorder.events);
    let params = TrainerParams {
        max_steps: 1,
        episodes_between_saves: 0,
        ..TrainerParams::default()
    };
    let mut trainer = trainer(params).with_observer(Box::new(recorder));

    for _ in 0..3 {
        trainer.step(true).unwrap();
    }

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            "start 0",
            "step 0.0",
            "step 0.1",
            "end 0 after 2",
            "start 1",
            "step 1.0",
        ]
    );
}

#[test]
fn test_walking_off_the_edge_keeps_agent_in_place_and_ends_episode() {
    let params = TrainerParams {
        episodes_between_saves: 0,
        ..TrainerParams::default()
    };
    let agent = Position::new(3, 0);
    let other = Position::new(3, 40);

    let mut table = QTable::new();
    let state = StateEncoder::encode(agent, other, &HalfPlane);
    assert!(!state.south_walkable);
    table.set_value(state, Action::South, 1.0);

    let mut trainer = QMindTrainer::new(params, HalfPlane, Stationary, table);
    trainer.initialize().unwrap();
    trainer.place_entities(agent, other);
    let episode = trainer.current_episode();

    let record = trainer.step(false).unwrap();
    assert_eq!(record.action, Action::South);
    assert_eq!(record.agent, agent);
    assert_eq!(record.reward.kind, RewardKind::Blocked);
    assert_eq!(record.reward.value, -100.0);
    assert_eq!(record.episode_end, Some(EpisodeEnd::Blocked));
    assert_eq!(trainer.current_episode(), episode + 1);
    assert_eq!(trainer.current_step(), 0);
}

#[test]
fn test_reward_policy_must_keep_penalties_negative() {
    let rejected = [
        RewardPolicy {
            penalty: -100.0,
            far_reward: -1.0,
        },
        RewardPolicy {
            penalty: 0.0,
            far_reward: 100.0,
        },
    ];
    for rewards in rejected {
        let result = trainer(TrainerParams::default()).with_rewards(rewards);
        assert!(
            matches!(result, Err(Error::InvalidConfiguration { .. })),
            "{rewards:?} should be rejected"
        );
    }
}

#[test]
fn test_custom_rewards_end_episodes_only_when_negative() {
    let params = TrainerParams {
        max_steps: -1,
        episodes_between_saves: 0,
        ..TrainerParams::default()
    };
    let rewards = RewardPolicy {
        penalty: -5.0,
        far_reward: 2.0,
    };
    let mut trainer = QMindTrainer::new(params, HalfPlane, Stationary, QTable::new())
        .with_rewards(rewards)
        .unwrap();
    trainer.initialize().unwrap();

    // Far away: North is the greedy tie-break and keeps the episode running.
    trainer.place_entities(Position::new(0, 0), Position::new(0, 50));
    let escaped = trainer.step(false).unwrap();
    assert_eq!(escaped.reward.value, 2.0);
    assert_eq!(escaped.episode_end, None);

    // On the edge with South preferred: blocked, negative, episode over.
    let agent = Position::new(0, 0);
    let other = Position::new(0, 50);
    let state = StateEncoder::encode(agent, other, &HalfPlane);
    trainer.table_mut().set_value(state, Action::South, 1.0);
    trainer.place_entities(agent, other);
    let blocked = trainer.step(false).unwrap();
    assert_eq!(blocked.reward.value, -5.0);
    assert_eq!(blocked.episode_end, Some(EpisodeEnd::Blocked));
    assert_eq!(trainer.current_episode(), 1);
}
