//! Q-table implementation for temporal difference learning

use std::{
    collections::{HashMap, hash_map},
    ops::{Index, IndexMut},
};

use serde::{Deserialize, Serialize};

use crate::q_learning::{Action, State};

/// One row of the table: a value per action, indexed by [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ActionValues(pub [f64; Action::COUNT]);

impl ActionValues {
    pub const fn new(north: f64, east: f64, south: f64, west: f64) -> Self {
        Self([north, east, south, west])
    }

    /// Highest value in the row
    pub fn max(&self) -> f64 {
        self.0.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Action with the highest value.
    ///
    /// Only a strictly greater value replaces the current best, so ties go to
    /// the lowest ordinal.
    pub fn best_action(&self) -> Action {
        let mut best = 0;
        for index in 1..Action::COUNT {
            if self.0[index] > self.0[best] {
                best = index;
            }
        }
        Action::from_index(best)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Action, f64)> + '_ {
        Action::ALL.into_iter().zip(self.0.iter().copied())
    }
}

impl Index<Action> for ActionValues {
    type Output = f64;

    fn index(&self, action: Action) -> &f64 {
        &self.0[action.index()]
    }
}

impl IndexMut<Action> for ActionValues {
    fn index_mut(&mut self, action: Action) -> &mut f64 {
        &mut self.0[action.index()]
    }
}

/// Q-table mapping discretized states to action-value rows
///
/// Every lookup is total: asking about a state that was never seen inserts
/// an all-zero row first. After any call the table therefore contains every
/// state it has ever been asked about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QTable {
    rows: HashMap<State, ActionValues>,
}

impl QTable {
    /// Create an empty Q-table
    pub fn new() -> Self {
        Self::default()
    }

    /// The row for `state`, inserting zeros if it is absent.
    ///
    /// This is the only place rows are materialized.
    fn row_mut(&mut self, state: State) -> &mut ActionValues {
        self.rows.entry(state).or_default()
    }

    /// Get Q-value for a state-action pair
    pub fn value(&mut self, state: State, action: Action) -> f64 {
        self.row_mut(state)[action]
    }

    /// Set Q-value for a state-action pair
    pub fn set_value(&mut self, state: State, action: Action, value: f64) {
        self.row_mut(state)[action] = value;
    }

    /// Get maximum Q-value over the four actions in a state
    pub fn max_value(&mut self, state: State) -> f64 {
        self.row_mut(state).max()
    }

    /// Select greedy action (highest Q-value), lowest ordinal on ties
    pub fn best_action(&mut self, state: State) -> Action {
        self.row_mut(state).best_action()
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← lerp(Q(s,a), r + γ max_a' Q(s',a'), α)
    ///
    /// The successor's max is read before the current row is borrowed, so a
    /// self-transition (`state == next_state`) still sees a consistent row.
    pub fn update(
        &mut self,
        state: State,
        next_state: State,
        action: Action,
        reward: f64,
        alpha: f64,
        gamma: f64,
    ) {
        let max_next_q = self.max_value(next_state);
        let td_target = reward + gamma * max_next_q;
        let q = &mut self.row_mut(state)[action];
        *q = (1.0 - alpha) * *q + alpha * td_target;
    }

    /// Stored row for `state`, without materializing it
    pub fn row(&self, state: &State) -> Option<&ActionValues> {
        self.rows.get(state)
    }

    /// Insert or replace a whole row
    pub fn insert(&mut self, state: State, values: ActionValues) {
        self.rows.insert(state, values);
    }

    pub fn contains(&self, state: &State) -> bool {
        self.rows.contains_key(state)
    }

    pub fn iter(&self) -> hash_map::Iter<'_, State, ActionValues> {
        self.rows.iter()
    }

    /// Number of states stored
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Reset all Q-values
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// One human-readable line per stored row
    pub fn describe(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|(state, values)| {
                let [n, e, s, w] = values.0;
                format!("{state} -> N:{n:.3} E:{e:.3} S:{s:.3} W:{w:.3}")
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a QTable {
    type Item = (&'a State, &'a ActionValues);
    type IntoIter = hash_map::Iter<'a, State, ActionValues>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<(State, ActionValues)> for QTable {
    fn from_iter<I: IntoIterator<Item = (State, ActionValues)>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::q_learning::DistanceBucket;

    fn state(distance: DistanceBucket) -> State {
        State {
            north_walkable: true,
            east_walkable: true,
            south_walkable: false,
            west_walkable: true,
            other_north: true,
            other_east: false,
            other_south: false,
            other_west: true,
            distance,
        }
    }

    #[test]
    fn test_qtable_initialization() {
        let mut qtable = QTable::new();
        let s = state(DistanceBucket::Close);
        for action in Action::ALL {
            assert_eq!(qtable.value(s, action), 0.0);
        }
        assert_eq!(qtable.len(), 1);
    }

    #[test]
    fn test_qtable_set_get() {
        let mut qtable = QTable::new();
        let s = state(DistanceBucket::Middle);
        qtable.set_value(s, Action::South, 1.5);
        assert_eq!(qtable.value(s, Action::South), 1.5);
        assert_eq!(qtable.value(s, Action::North), 0.0);
    }

    #[test]
    fn test_max_value() {
        let mut qtable = QTable::new();
        let s = state(DistanceBucket::Far);
        qtable.set_value(s, Action::North, 0.5);
        qtable.set_value(s, Action::East, -1.5);
        qtable.set_value(s, Action::West, 2.5);

        assert_eq!(qtable.max_value(s), 2.5);
    }

    #[test]
    fn test_max_value_of_absent_state_is_zero() {
        let mut qtable = QTable::new();
        let s = state(DistanceBucket::Far);
        assert_eq!(qtable.max_value(s), 0.0);
        assert!(qtable.contains(&s));
    }

    #[test]
    fn test_best_action() {
        let mut qtable = QTable::new();
        let s = state(DistanceBucket::Close);
        qtable.set_value(s, Action::North, 0.5);
        qtable.set_value(s, Action::East, 1.5);
        qtable.set_value(s, Action::South, 0.8);

        assert_eq!(qtable.best_action(s), Action::East);
    }

    #[test]
    fn test_best_action_ties_go_to_lowest_ordinal() {
        let mut qtable = QTable::new();
        let s = state(DistanceBucket::Close);
        assert_eq!(qtable.best_action(s), Action::North);

        qtable.set_value(s, Action::South, 3.0);
        qtable.set_value(s, Action::West, 3.0);
        assert_eq!(qtable.best_action(s), Action::South);
    }

    #[test]
    fn test_best_action_with_all_negative_values() {
        let mut qtable = QTable::new();
        let s = state(DistanceBucket::Close);
        qtable.insert(s, ActionValues::new(-4.0, -2.0, -3.0, -2.0));
        assert_eq!(qtable.best_action(s), Action::East);
    }

    #[test]
    fn test_q_learning_update() {
        let mut qtable = QTable::new();
        let s = state(DistanceBucket::Close);
        let next = state(DistanceBucket::Middle);

        qtable.set_value(next, Action::East, 1.0);
        qtable.set_value(next, Action::South, 2.0);

        qtable.update(s, next, Action::West, 0.0, 0.5, 0.99);

        // Q(s,W) = 0.0 + 0.5 * (0.0 + 0.99 * 2.0 - 0.0) = 0.99
        let updated_q = qtable.value(s, Action::West);
        assert!((updated_q - 0.99).abs() < 1e-12);
    }

    #[test]
    fn test_update_with_unit_alpha_sets_td_target() {
        let mut qtable = QTable::new();
        let s = state(DistanceBucket::Close);
        let next = state(DistanceBucket::Far);
        qtable.set_value(s, Action::North, 42.0);
        qtable.set_value(next, Action::West, 10.0);

        qtable.update(s, next, Action::North, 5.0, 1.0, 0.9);

        assert!((qtable.value(s, Action::North) - 14.0).abs() < 1e-12);
    }

    #[test]
    fn test_update_uses_successor_not_current_max() {
        let mut qtable = QTable::new();
        let s = state(DistanceBucket::Close);
        let next = state(DistanceBucket::Middle);
        qtable.set_value(s, Action::East, 50.0);

        qtable.update(s, next, Action::North, 1.0, 1.0, 0.5);

        assert_eq!(qtable.value(s, Action::North), 1.0);
    }

    #[test]
    fn test_update_self_transition() {
        let mut qtable = QTable::new();
        let s = state(DistanceBucket::Middle);
        qtable.set_value(s, Action::North, 2.0);

        // target = 1 + 0.5 * 2 = 2, lerp(2, 2, 0.5) = 2
        qtable.update(s, s, Action::North, 1.0, 0.5, 0.5);
        assert!((qtable.value(s, Action::North) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_update_materializes_both_states() {
        let mut qtable = QTable::new();
        let s = state(DistanceBucket::Close);
        let next = state(DistanceBucket::Far);

        qtable.update(s, next, Action::South, -1.0, 0.1, 0.9);

        assert!(qtable.contains(&s));
        assert!(qtable.contains(&next));
        assert_eq!(qtable.len(), 2);
    }

    #[test]
    fn test_describe_lists_every_row() {
        let mut qtable = QTable::new();
        qtable.set_value(state(DistanceBucket::Close), Action::North, 1.0);
        qtable.set_value(state(DistanceBucket::Far), Action::West, -1.0);

        let lines = qtable.describe();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().any(|line| line.contains("W:-1.000")));
    }
}
