//! Breadth-first shortest path over walkable cells

use std::collections::{HashMap, VecDeque};

use crate::{
    grid::{Direction, Position},
    ports::{PathFinder, World},
};

/// Unweighted shortest-path search.
///
/// Neighbors are expanded in compass order, so among equally short paths the
/// first step follows North, East, South, West priority.
#[derive(Debug, Clone, Copy, Default)]
pub struct BfsPathFinder;

impl PathFinder for BfsPathFinder {
    fn find_path(
        &self,
        world: &dyn World,
        from: Position,
        to: Position,
        max_length: usize,
    ) -> Vec<Position> {
        if from == to || max_length == 0 {
            return Vec::new();
        }

        let mut parents: HashMap<Position, Position> = HashMap::new();
        let mut frontier = VecDeque::from([(from, 0usize)]);

        while let Some((cell, depth)) = frontier.pop_front() {
            if depth == max_length {
                continue;
            }
            for direction in Direction::ALL {
                let Some(next) = world.walkable_neighbor(cell, direction) else {
                    continue;
                };
                if next == from || parents.contains_key(&next) {
                    continue;
                }
                parents.insert(next, cell);
                if next == to {
                    return unwind(&parents, from, to);
                }
                frontier.push_back((next, depth + 1));
            }
        }

        Vec::new()
    }
}

fn unwind(parents: &HashMap<Position, Position>, from: Position, to: Position) -> Vec<Position> {
    let mut path = vec![to];
    let mut cursor = to;
    while let Some(&parent) = parents.get(&cursor) {
        if parent == from {
            break;
        }
        path.push(parent);
        cursor = parent;
    }
    path.reverse();
    path
}
