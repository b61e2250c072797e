//! Tile grid: the read-only substrate every other component samples
//!
//! Cells are addressed row-major (`y * width + x`). A grid is never mutated
//! after construction; regeneration builds a new one.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// State of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    Wall,
    Floor,
    Start,
    Goal,
}

impl Tile {
    /// Everything but walls can be walked on
    #[inline]
    pub fn is_walkable(self) -> bool {
        self != Tile::Wall
    }
}

/// Fixed-size grid of tiles with square cells of `cell_size` world units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    width: usize,
    height: usize,
    cell_size: f32,
    tiles: Vec<Tile>,
    start: usize,
    goal: usize,
}

impl TileGrid {
    /// Build a grid from a flat tile list, checking the Start/Goal invariant
    pub fn from_tiles(
        width: usize,
        height: usize,
        cell_size: f32,
        tiles: Vec<Tile>,
    ) -> Result<Self, LayoutError> {
        if width == 0 || height == 0 {
            return Err(LayoutError::InvalidGrid(format!(
                "empty grid {width}x{height}"
            )));
        }
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(LayoutError::InvalidGrid(format!(
                "cell size must be positive, got {cell_size}"
            )));
        }
        if tiles.len() != width * height {
            return Err(LayoutError::CellCount {
                expected: width * height,
                found: tiles.len(),
            });
        }

        let find_unique = |wanted: Tile| -> Result<usize, LayoutError> {
            let mut found = tiles.iter().enumerate().filter(|(_, t)| **t == wanted);
            match (found.next(), found.next()) {
                (Some((index, _)), None) => Ok(index),
                (None, _) => Err(LayoutError::InvalidGrid(format!("no {wanted:?} tile"))),
                (Some(_), Some(_)) => Err(LayoutError::InvalidGrid(format!(
                    "more than one {wanted:?} tile"
                ))),
            }
        };
        let start = find_unique(Tile::Start)?;
        let goal = find_unique(Tile::Goal)?;

        Ok(Self {
            width,
            height,
            cell_size,
            tiles,
            start,
            goal,
        })
    }

    /// Grid produced by a generator that already upholds the invariants
    pub(crate) fn carved(
        width: usize,
        height: usize,
        cell_size: f32,
        tiles: Vec<Tile>,
        start: usize,
        goal: usize,
    ) -> Self {
        debug_assert_eq!(tiles.len(), width * height);
        debug_assert_eq!(tiles[start], Tile::Start);
        debug_assert_eq!(tiles[goal], Tile::Goal);
        Self {
            width,
            height,
            cell_size,
            tiles,
            start,
            goal,
        }
    }

    /// All-floor grid with the given start and goal
    pub fn open(
        width: usize,
        height: usize,
        cell_size: f32,
        start: usize,
        goal: usize,
    ) -> Result<Self, LayoutError> {
        let mut tiles = vec![Tile::Floor; width * height];
        if start >= tiles.len() || goal >= tiles.len() || start == goal {
            return Err(LayoutError::InvalidGrid(format!(
                "start {start} / goal {goal} invalid for {width}x{height}"
            )));
        }
        tiles[start] = Tile::Start;
        tiles[goal] = Tile::Goal;
        Self::from_tiles(width, height, cell_size, tiles)
    }

    /// Parse an ASCII sketch: `#` wall, `.` or space floor, `S` start, `G` goal.
    /// Short rows are padded with walls.
    pub fn from_ascii(rows: &[&str], cell_size: f32) -> Result<Self, LayoutError> {
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let height = rows.len();
        let mut tiles = Vec::with_capacity(width * height);

        for (y, row) in rows.iter().enumerate() {
            let mut count = 0;
            for (x, ch) in row.chars().enumerate() {
                let tile = match ch {
                    '#' => Tile::Wall,
                    '.' | ' ' => Tile::Floor,
                    'S' => Tile::Start,
                    'G' => Tile::Goal,
                    other => {
                        return Err(LayoutError::BadToken {
                            token: other.to_string(),
                            cell: y * width + x,
                        });
                    }
                };
                tiles.push(tile);
                count += 1;
            }
            tiles.extend(std::iter::repeat_n(Tile::Wall, width - count));
        }

        Self::from_tiles(width, height, cell_size, tiles)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn goal(&self) -> usize {
        self.goal
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// World-space size of the whole grid
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(
            self.width as f32 * self.cell_size,
            self.height as f32 * self.cell_size,
        )
    }

    #[inline]
    pub fn tile(&self, index: usize) -> Option<Tile> {
        self.tiles.get(index).copied()
    }

    pub fn tile_at(&self, x: i64, y: i64) -> Option<Tile> {
        self.index(x, y).and_then(|i| self.tile(i))
    }

    /// Row-major index of a cell, if it lies on the grid
    pub fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// (x, y) cell coordinates of an index
    #[inline]
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    pub fn is_walkable(&self, index: usize) -> bool {
        self.tile(index).is_some_and(Tile::is_walkable)
    }

    /// Index of the cell under a world-space position
    pub fn tile_index_at(&self, pos: Vec2) -> Option<usize> {
        if !pos.is_finite() {
            return None;
        }
        let cell = (pos / self.cell_size).floor();
        self.index(cell.x as i64, cell.y as i64)
    }

    /// World-space centre of a cell
    pub fn cell_center(&self, index: usize) -> Vec2 {
        let (x, y) = self.coords(index);
        Vec2::new(
            (x as f32 + 0.5) * self.cell_size,
            (y as f32 + 0.5) * self.cell_size,
        )
    }

    /// 4-connected neighbours in fixed order: left, right, up, down
    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = usize> + use<> {
        let (x, y) = self.coords(index);
        let mut candidates = [None; 4];

        if x > 0 {
            candidates[0] = Some(index - 1);
        }
        if x + 1 < self.width {
            candidates[1] = Some(index + 1);
        }
        if y > 0 {
            candidates[2] = Some(index - self.width);
        }
        if y + 1 < self.height {
            candidates[3] = Some(index + self.width);
        }

        candidates.into_iter().flatten()
    }

    /// Walkable 4-connected neighbours
    pub fn open_neighbors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbors(index).filter(|&n| self.is_walkable(n))
    }

    pub fn floor_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_walkable()).count()
    }

    /// Manhattan distance between two cells
    pub fn manhattan(&self, a: usize, b: usize) -> usize {
        let (ax, ay) = self.coords(a);
        let (bx, by) = self.coords(b);
        ax.abs_diff(bx) + ay.abs_diff(by)
    }
}
