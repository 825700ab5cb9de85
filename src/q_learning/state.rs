//! Discretized agent state and the encoder that builds it from the world

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    grid::{Direction, DistanceMetric, Position},
    ports::World,
    q_learning::Action,
};

/// Manhattan distance at which the other entity stops being `Close`
pub const MIDDLE_DISTANCE: f64 = 5.0;

/// Manhattan distance at which the other entity becomes `Far`
pub const FAR_DISTANCE: f64 = 10.0;

/// Coarse distance between the agent and the other entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum DistanceBucket {
    /// d < 5
    Close = 0,
    /// 5 <= d < 10
    Middle = 1,
    /// d >= 10
    Far = 2,
}

impl DistanceBucket {
    /// Bucket a distance. Lower bounds are inclusive.
    pub fn from_distance(distance: f64) -> Self {
        if distance >= FAR_DISTANCE {
            DistanceBucket::Far
        } else if distance >= MIDDLE_DISTANCE {
            DistanceBucket::Middle
        } else {
            DistanceBucket::Close
        }
    }

    pub const fn ordinal(self) -> u8 {
        self as u8
    }
}

impl TryFrom<usize> for DistanceBucket {
    type Error = Error;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(DistanceBucket::Close),
            1 => Ok(DistanceBucket::Middle),
            2 => Ok(DistanceBucket::Far),
            _ => Err(Error::InvalidDistanceBucket { index }),
        }
    }
}

/// Table key: what the agent can see around itself.
///
/// Equality and hashing are field-wise, so two observations that discretize
/// identically share one row in the Q-table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    pub north_walkable: bool,
    pub east_walkable: bool,
    pub south_walkable: bool,
    pub west_walkable: bool,

    pub other_north: bool,
    pub other_east: bool,
    pub other_south: bool,
    pub other_west: bool,

    pub distance: DistanceBucket,
}

impl State {
    /// Whether the neighbor reached by `action` was walkable when the state
    /// was observed
    pub fn is_walkable(&self, action: Action) -> bool {
        match action {
            Action::North => self.north_walkable,
            Action::East => self.east_walkable,
            Action::South => self.south_walkable,
            Action::West => self.west_walkable,
        }
    }
}

impl Default for State {
    fn default() -> Self {
        Self {
            north_walkable: false,
            east_walkable: false,
            south_walkable: false,
            west_walkable: false,
            other_north: false,
            other_east: false,
            other_south: false,
            other_west: false,
            distance: DistanceBucket::Close,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |on: bool, c: char| if on { c } else { '.' };
        write!(
            f,
            "walk[{}{}{}{}] other[{}{}{}{}] {:?}",
            flag(self.north_walkable, 'N'),
            flag(self.east_walkable, 'E'),
            flag(self.south_walkable, 'S'),
            flag(self.west_walkable, 'W'),
            flag(self.other_north, 'N'),
            flag(self.other_east, 'E'),
            flag(self.other_south, 'S'),
            flag(self.other_west, 'W'),
            self.distance,
        )
    }
}

/// Maps raw world observations onto [`State`] keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateEncoder;

impl StateEncoder {
    /// Encode the agent's view of the world.
    ///
    /// A neighbor that does not exist counts as not walkable. Direction flags
    /// use strict comparisons, so sharing a row or column with the other
    /// entity leaves both flags on that axis unset.
    pub fn encode(self_pos: Position, other_pos: Position, world: &dyn World) -> State {
        let walkable = |direction| world.walkable_neighbor(self_pos, direction).is_some();
        let distance = world.distance(self_pos, other_pos, DistanceMetric::Manhattan);

        State {
            north_walkable: walkable(Direction::North),
            east_walkable: walkable(Direction::East),
            south_walkable: walkable(Direction::South),
            west_walkable: walkable(Direction::West),
            other_north: self_pos.y < other_pos.y,
            other_east: self_pos.x < other_pos.x,
            other_south: self_pos.y > other_pos.y,
            other_west: self_pos.x > other_pos.x,
            distance: DistanceBucket::from_distance(distance),
        }
    }
}
