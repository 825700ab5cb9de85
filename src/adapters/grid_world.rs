//! Rectangular grid world backed by a wall bitmap.
//!
//! Maps are plain text: `#` is a wall, `.` (or a space) is floor. The first
//! text line is the northern edge, so it holds the highest `y`.

use std::{fs, path::Path};

use rand::{Rng, RngCore};

use crate::{
    Result,
    error::Error,
    grid::{Direction, Position},
    ports::World,
};

/// Grid of `width × height` cells with `(0, 0)` in the south-west corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridWorld {
    width: i32,
    height: i32,
    walls: Vec<bool>,
    floor: Vec<Position>,
}

impl GridWorld {
    /// A grid without interior walls.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWorldMap`] when a dimension is zero or the
    /// grid has more than `i32::MAX` cells.
    pub fn open(width: u32, height: u32) -> Result<Self> {
        let (width, height) = checked_dimensions(width as usize, height as usize)?;
        let cells = width as usize * height as usize;
        Ok(Self::from_walls(width, height, vec![false; cells]))
    }

    /// Parse a text map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWorldMap`] for ragged rows, unknown glyphs or a
    /// map without any floor cell.
    ///
    /// # Examples
    ///
    /// ```
    /// use qmind::{adapters::GridWorld, grid::Position, ports::World};
    ///
    /// let world = GridWorld::parse("...\n.#.\n...")?;
    /// assert!(!world.is_walkable(Position::new(1, 1)));
    /// assert!(world.is_walkable(Position::new(0, 2)));
    /// # Ok::<(), qmind::Error>(())
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();

        let Some(first) = rows.first() else {
            return Err(Error::InvalidWorldMap {
                message: "map has no rows".to_string(),
            });
        };
        let width = first.chars().count();
        let height = rows.len();

        let mut walls = vec![false; width * height];
        for (row_index, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(Error::InvalidWorldMap {
                    message: format!(
                        "row {} has {} cells, expected {width}",
                        row_index + 1,
                        row.chars().count()
                    ),
                });
            }
            let y = height - 1 - row_index;
            for (x, glyph) in row.chars().enumerate() {
                walls[y * width + x] = match glyph {
                    '#' => true,
                    '.' | ' ' => false,
                    other => {
                        return Err(Error::InvalidWorldMap {
                            message: format!(
                                "unknown glyph '{other}' at row {}, column {}",
                                row_index + 1,
                                x + 1
                            ),
                        });
                    }
                };
            }
        }

        let (width, height) = checked_dimensions(width, height)?;
        let world = Self::from_walls(width, height, walls);
        if world.floor.is_empty() {
            return Err(Error::InvalidWorldMap {
                message: "map has no walkable cell".to_string(),
            });
        }
        Ok(world)
    }

    /// Read and parse a map file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read map {path:?}"),
            source,
        })?;
        Self::parse(&text)
    }

    fn from_walls(width: i32, height: i32, walls: Vec<bool>) -> Self {
        let floor = (0..height)
            .flat_map(|y| (0..width).map(move |x| Position::new(x, y)))
            .filter(|&pos| !walls[cell_index(width, pos)])
            .collect();
        Self {
            width,
            height,
            walls,
            floor,
        }
    }

    pub fn width(&self) -> u32 {
        self.width as u32
    }

    pub fn height(&self) -> u32 {
        self.height as u32
    }

    /// Number of walkable cells
    pub fn floor_count(&self) -> usize {
        self.floor.len()
    }

    pub fn contains(&self, position: Position) -> bool {
        (0..self.width).contains(&position.x) && (0..self.height).contains(&position.y)
    }
}

/// Dimensions as coordinates, rejecting empty grids and grids whose cell
/// count does not fit an `i32`
fn checked_dimensions(width: usize, height: usize) -> Result<(i32, i32)> {
    let cells = width.checked_mul(height).unwrap_or(usize::MAX);
    if width == 0 || height == 0 || cells > i32::MAX as usize {
        return Err(Error::InvalidWorldMap {
            message: format!("grid of {width}x{height} cells is empty or too large"),
        });
    }
    Ok((width as i32, height as i32))
}

/// Row-major index of an in-bounds position
fn cell_index(width: i32, position: Position) -> usize {
    position.y as usize * width as usize + position.x as usize
}

impl World for GridWorld {
    fn next_cell(&self, position: Position, direction: Direction) -> Option<Position> {
        let cell = position.offset(direction);
        self.contains(cell).then_some(cell)
    }

    fn is_walkable(&self, position: Position) -> bool {
        self.contains(position) && !self.walls[cell_index(self.width, position)]
    }

    fn random_cell(&self, rng: &mut dyn RngCore) -> Position {
        self.floor[rng.random_range(0..self.floor.len())]
    }
}
