//! Path-finder port - how the chaser decides where to go

use crate::{grid::Position, ports::World};

/// Path query collaborator.
///
/// Implementations return the cells to walk through, excluding `from` and
/// ending at `to`. The engine only ever consumes the first element, so an
/// empty result simply means "stay put this step".
pub trait PathFinder {
    /// Find a path of at most `max_length` steps from `from` to `to`.
    fn find_path(
        &self,
        world: &dyn World,
        from: Position,
        to: Position,
        max_length: usize,
    ) -> Vec<Position>;
}
