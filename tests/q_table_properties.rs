//! Properties of the Q-table, the state encoder and the update rule

use qmind::{
    adapters::GridWorld,
    grid::Position,
    q_learning::{Action, ActionValues, DistanceBucket, QTable, State, StateEncoder},
};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn random_state(rng: &mut StdRng) -> State {
    State {
        north_walkable: rng.random(),
        east_walkable: rng.random(),
        south_walkable: rng.random(),
        west_walkable: rng.random(),
        other_north: rng.random(),
        other_east: rng.random(),
        other_south: rng.random(),
        other_west: rng.random(),
        distance: DistanceBucket::try_from(rng.random_range(0..3usize)).unwrap(),
    }
}

#[test]
fn test_unseen_states_read_as_zero() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut table = QTable::new();

    for _ in 0..100 {
        let state = random_state(&mut rng);
        for action in Action::ALL {
            assert_eq!(table.value(state, action), 0.0);
        }
        assert_eq!(table.max_value(state), 0.0);
    }
}

#[test]
fn test_all_zero_row_prefers_north() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut table = QTable::new();

    for _ in 0..50 {
        assert_eq!(table.best_action(random_state(&mut rng)), Action::North);
    }
}

#[test]
fn test_ties_pick_lowest_ordinal() {
    let mut table = QTable::new();
    let state = State::default();
    table.insert(state, ActionValues::new(-1.0, 3.0, 1.0, 3.0));
    assert_eq!(table.best_action(state), Action::East);

    table.insert(state, ActionValues::new(-1.0, 0.0, 2.0, 2.0));
    assert_eq!(table.best_action(state), Action::South);
}

#[test]
fn test_alpha_one_update_sets_td_target() {
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..50 {
        let mut table = QTable::new();
        let state = random_state(&mut rng);
        let next = random_state(&mut rng);
        let action = Action::from_index(rng.random_range(0..Action::COUNT));
        let reward = rng.random_range(-100.0..100.0);
        let gamma = rng.random_range(0.0..=1.0);

        table.set_value(state, action, rng.random_range(-50.0..50.0));
        if next != state {
            table.set_value(next, Action::West, 7.5);
        }
        let max_next = table.max_value(next);

        table.update(state, next, action, reward, 1.0, gamma);
        assert_eq!(table.value(state, action), reward + gamma * max_next);
    }
}

#[test]
fn test_first_step_on_empty_table() {
    let mut table = QTable::new();
    let state = State {
        north_walkable: true,
        ..State::default()
    };
    let next = State {
        distance: DistanceBucket::Far,
        ..state
    };

    table.update(state, next, Action::North, 100.0, 1.0, 0.9);

    assert_eq!(table.value(state, Action::North), 100.0);
    assert_eq!(table.len(), 2);
}

#[test]
fn test_distance_bucket_boundaries() {
    let world = GridWorld::open(30, 30).unwrap();
    let agent = Position::new(0, 0);

    let bucket = |other| StateEncoder::encode(agent, other, &world).distance;
    assert_eq!(bucket(Position::new(4, 0)), DistanceBucket::Close);
    assert_eq!(bucket(Position::new(2, 3)), DistanceBucket::Middle);
    assert_eq!(bucket(Position::new(9, 0)), DistanceBucket::Middle);
    assert_eq!(bucket(Position::new(5, 5)), DistanceBucket::Far);
}

#[test]
fn test_shared_axis_sets_neither_direction() {
    let world = GridWorld::open(10, 10).unwrap();
    let state = StateEncoder::encode(Position::new(3, 3), Position::new(3, 8), &world);

    assert!(state.other_north);
    assert!(!state.other_south);
    assert!(!state.other_east);
    assert!(!state.other_west);

    let same = StateEncoder::encode(Position::new(3, 3), Position::new(3, 3), &world);
    assert!(!(same.other_north || same.other_east || same.other_south || same.other_west));
}
