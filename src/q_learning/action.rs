//! The four compass actions available to the agent

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{error::Error, grid::Direction};

/// An agent action.
///
/// The discriminant is the column index used both in memory and in the
/// persisted table, so the order must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Action {
    /// Number of actions
    pub const COUNT: usize = 4;

    /// All actions in ordinal order
    pub const ALL: [Action; Action::COUNT] =
        [Action::North, Action::East, Action::South, Action::West];

    /// Ordinal used for indexing action-value rows
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Action for a raw ordinal.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 4`. An out-of-range ordinal is a programming error;
    /// decoding paths that read untrusted input use `TryFrom` instead.
    pub fn from_index(index: usize) -> Self {
        match Self::try_from(index) {
            Ok(action) => action,
            Err(_) => panic!("action ordinal {index} is out of range (must be 0-3)"),
        }
    }

    /// Compass direction the action moves towards
    pub const fn direction(self) -> Direction {
        match self {
            Action::North => Direction::North,
            Action::East => Direction::East,
            Action::South => Direction::South,
            Action::West => Direction::West,
        }
    }
}

impl TryFrom<usize> for Action {
    type Error = Error;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Action::ALL
            .get(index)
            .copied()
            .ok_or(Error::InvalidActionIndex { index })
    }
}

impl From<Direction> for Action {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::North => Action::North,
            Direction::East => Action::East,
            Direction::South => Action::South,
            Direction::West => Action::West,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::North => "north",
            Action::East => "east",
            Action::South => "south",
            Action::West => "west",
        };
        f.write_str(name)
    }
}
