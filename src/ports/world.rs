//! World port - the grid the agent and the chaser move on
//!
//! The engine never owns the map. It only asks for neighbors, walkability,
//! distances and random spawn cells, so any grid representation can be
//! plugged in behind this trait.

use rand::RngCore;

use crate::grid::{Direction, DistanceMetric, Position};

/// World query collaborator.
///
/// # Examples
///
/// ```
/// use qmind::{
///     adapters::GridWorld,
///     grid::{Direction, Position},
///     ports::World,
/// };
///
/// let world = GridWorld::open(4, 4)?;
/// assert_eq!(
///     world.next_cell(Position::new(0, 0), Direction::North),
///     Some(Position::new(0, 1))
/// );
/// assert_eq!(world.next_cell(Position::new(0, 0), Direction::West), None);
/// # Ok::<(), qmind::Error>(())
/// ```
pub trait World {
    /// The neighboring cell in `direction`, or `None` when it falls outside
    /// the world.
    ///
    /// The returned cell may still be blocked; callers check
    /// [`World::is_walkable`] separately.
    fn next_cell(&self, position: Position, direction: Direction) -> Option<Position>;

    /// Whether an agent may stand on `position`.
    ///
    /// Positions outside the world are never walkable.
    fn is_walkable(&self, position: Position) -> bool;

    /// Distance between two cells under `metric`.
    fn distance(&self, a: Position, b: Position, metric: DistanceMetric) -> f64 {
        metric.measure(a, b)
    }

    /// A uniformly sampled walkable cell, used to spawn entities at the start
    /// of an episode.
    fn random_cell(&self, rng: &mut dyn RngCore) -> Position;

    /// The walkable neighbor in `direction`, if there is one.
    fn walkable_neighbor(&self, position: Position, direction: Direction) -> Option<Position> {
        self.next_cell(position, direction)
            .filter(|&cell| self.is_walkable(cell))
    }
}
