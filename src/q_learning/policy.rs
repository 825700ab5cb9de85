//! Action selection and reward shaping

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    error::Error,
    grid::{DistanceMetric, Position},
    ports::World,
    q_learning::{Action, DistanceBucket, QTable, State},
};

/// ε-greedy action selection.
///
/// A draw `u ~ U[0, 1)` at or below `epsilon` explores with a uniformly
/// random action; otherwise the table's greedy action is taken.
pub fn epsilon_greedy(
    table: &mut QTable,
    state: State,
    epsilon: f64,
    rng: &mut dyn RngCore,
) -> Action {
    if rng.random::<f64>() <= epsilon {
        random_action(rng)
    } else {
        table.best_action(state)
    }
}

/// Uniformly random action
pub fn random_action(rng: &mut dyn RngCore) -> Action {
    Action::from_index(rng.random_range(0..Action::COUNT))
}

/// What a step's reward was given for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    /// The chosen neighbor was not walkable
    Blocked,
    /// Agent and other ended the step on the same cell
    Captured,
    /// The other entity ended the step `Far` away
    Escaped,
    Neutral,
}

impl RewardKind {
    /// Penalties end the episode
    pub fn is_penalty(self) -> bool {
        matches!(self, RewardKind::Blocked | RewardKind::Captured)
    }
}

/// A step's reward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub value: f64,
    pub kind: RewardKind,
}

/// Reward magnitudes for the evasion task
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardPolicy {
    /// Given for blocked moves and captures; must be negative
    pub penalty: f64,
    /// Given when the other entity ends the step far away
    pub far_reward: f64,
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            penalty: -100.0,
            far_reward: 100.0,
        }
    }
}

impl RewardPolicy {
    /// Check that the penalty is negative and the far reward is not.
    pub fn validate(&self) -> Result<()> {
        if !(self.penalty < 0.0) {
            return Err(Error::InvalidConfiguration {
                message: format!("penalty must be negative, got {}", self.penalty),
            });
        }
        if !(self.far_reward >= 0.0) {
            return Err(Error::InvalidConfiguration {
                message: format!("far_reward must be non-negative, got {}", self.far_reward),
            });
        }
        Ok(())
    }

    /// Score a step.
    ///
    /// Walkability is judged from `state`, the observation the action was
    /// chosen on. Capture and distance are judged from the positions after
    /// both entities moved.
    pub fn evaluate(
        &self,
        state: &State,
        action: Action,
        agent: Position,
        other: Position,
        world: &dyn World,
    ) -> Reward {
        let (value, kind) = if !state.is_walkable(action) {
            (self.penalty, RewardKind::Blocked)
        } else if agent == other {
            (self.penalty, RewardKind::Captured)
        } else if DistanceBucket::from_distance(
            world.distance(agent, other, DistanceMetric::Manhattan),
        ) == DistanceBucket::Far
        {
            (self.far_reward, RewardKind::Escaped)
        } else {
            (0.0, RewardKind::Neutral)
        };
        Reward { value, kind }
    }
}
