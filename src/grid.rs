//! Grid primitives shared by the engine and the world adapters

use std::fmt;

use serde::{Deserialize, Serialize};

/// A cell coordinate on the grid.
///
/// `y` grows towards the north and `x` grows towards the east.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The adjacent coordinate in `direction`, without any bounds check.
    pub fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Manhattan (taxicab) distance in cells.
    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A compass direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All directions in compass order
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit step `(dx, dy)` for this direction
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }
}

/// Metric used when the world measures distance between two cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    #[default]
    Manhattan,
    Euclidean,
}

impl DistanceMetric {
    pub fn measure(self, a: Position, b: Position) -> f64 {
        match self {
            DistanceMetric::Manhattan => f64::from(a.manhattan(b)),
            DistanceMetric::Euclidean => {
                let dx = f64::from(a.x - b.x);
                let dy = f64::from(a.y - b.y);
                dx.hypot(dy)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_follows_compass() {
        let origin = Position::new(3, 3);
        assert_eq!(origin.offset(Direction::North), Position::new(3, 4));
        assert_eq!(origin.offset(Direction::East), Position::new(4, 3));
        assert_eq!(origin.offset(Direction::South), Position::new(3, 2));
        assert_eq!(origin.offset(Direction::West), Position::new(2, 3));
    }

    #[test]
    fn test_manhattan_distance() {
        let a = Position::new(-2, 5);
        let b = Position::new(3, 1);
        assert_eq!(a.manhattan(b), 9);
        assert_eq!(DistanceMetric::Manhattan.measure(a, b), 9.0);
    }

    #[test]
    fn test_euclidean_distance() {
        let a = Position::new(0, 0);
        let b = Position::new(3, 4);
        assert!((DistanceMetric::Euclidean.measure(a, b) - 5.0).abs() < 1e-12);
    }
}
