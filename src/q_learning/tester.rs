//! Greedy inference agent for a trained table

use crate::{
    grid::Position,
    ports::World,
    q_learning::{Action, QTable, StateEncoder},
};

/// Plays a learned table without exploring or learning.
pub struct QMindTester<W> {
    world: W,
    table: QTable,
}

impl<W: World> QMindTester<W> {
    pub fn new(world: W, table: QTable) -> Self {
        Self { world, table }
    }

    /// Greedy action for the agent at `current` with the other entity at
    /// `other`
    pub fn best_action(&mut self, current: Position, other: Position) -> Action {
        let state = StateEncoder::encode(current, other, &self.world);
        self.table.best_action(state)
    }

    /// Cell the agent should move to next, or `None` when the greedy action
    /// points into a wall or off the map.
    pub fn next_step(&mut self, current: Position, other: Position) -> Option<Position> {
        let action = self.best_action(current, other);
        self.world.walkable_neighbor(current, action.direction())
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn world(&self) -> &W {
        &self.world
    }
}
