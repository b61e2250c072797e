//! Procedural maze generation
//!
//! Cells sit on the odd lattice (odd x, odd y). Even rows and columns start
//! as walls and get carved between linked cells, so the walkable subgraph is
//! always a spanning tree: one simple path between any two cells.
//!
//! Two carvers share the lattice:
//! - `Dfs`: randomized backtracker (long corridors, few branches)
//! - `Prim`: random frontier growth (short, evenly branching corridors)

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::tile::{Tile, TileGrid};
use crate::error::MazeError;

/// Carving strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MazeAlgorithm {
    #[default]
    Dfs,
    Prim,
}

impl MazeAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            MazeAlgorithm::Dfs => "dfs",
            MazeAlgorithm::Prim => "prim",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dfs" | "backtracker" => Some(MazeAlgorithm::Dfs),
            "prim" | "prims" => Some(MazeAlgorithm::Prim),
            _ => None,
        }
    }
}

/// Validated maze parameters; `generate` can then never fail
#[derive(Debug, Clone)]
pub struct MazeGenerator {
    width: usize,
    height: usize,
    cell_size: f32,
    start: usize,
    goal: usize,
}

impl MazeGenerator {
    pub fn new(
        width: usize,
        height: usize,
        cell_size: f32,
        start: usize,
        goal: usize,
    ) -> Result<Self, MazeError> {
        if width < 3 || height < 3 || width % 2 == 0 || height % 2 == 0 {
            return Err(MazeError::InvalidDimensions { width, height });
        }
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(MazeError::InvalidCellSize(cell_size));
        }

        for (role, index) in [("start", start), ("goal", goal)] {
            if index >= width * height {
                return Err(MazeError::OutOfRange {
                    role,
                    index,
                    width,
                    height,
                });
            }
            let (x, y) = (index % width, index / width);
            if x % 2 == 0 || y % 2 == 0 {
                return Err(MazeError::OffLattice { role, index });
            }
        }

        if start == goal {
            return Err(MazeError::SameStartGoal(start));
        }

        Ok(Self {
            width,
            height,
            cell_size,
            start,
            goal,
        })
    }

    /// Start in the top-left cell, goal in the bottom-right cell
    pub fn corner_to_corner(width: usize, height: usize, cell_size: f32) -> Result<Self, MazeError> {
        let start = width + 1;
        let goal = (height.saturating_sub(2)) * width + width.saturating_sub(2);
        Self::new(width, height, cell_size, start, goal)
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn goal(&self) -> usize {
        self.goal
    }

    /// Carve a fresh maze
    pub fn generate<R: Rng + ?Sized>(&self, algorithm: MazeAlgorithm, rng: &mut R) -> TileGrid {
        let open = match algorithm {
            MazeAlgorithm::Dfs => self.carve_dfs(rng),
            MazeAlgorithm::Prim => self.carve_prim(rng),
        };

        let mut tiles: Vec<Tile> = open
            .iter()
            .map(|&o| if o { Tile::Floor } else { Tile::Wall })
            .collect();
        tiles[self.start] = Tile::Start;
        tiles[self.goal] = Tile::Goal;

        let grid = TileGrid::carved(
            self.width,
            self.height,
            self.cell_size,
            tiles,
            self.start,
            self.goal,
        );
        log::info!(
            "Generated {}x{} maze ({}) with {} walkable cells",
            self.width,
            self.height,
            algorithm.as_str(),
            grid.floor_count()
        );
        grid
    }

    /// Randomized backtracker with an explicit stack
    fn carve_dfs<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<bool> {
        let mut open = vec![false; self.width * self.height];
        let mut visited = vec![false; self.width * self.height];

        visited[self.start] = true;
        open[self.start] = true;
        let mut stack = vec![self.start];
        let mut candidates = Vec::with_capacity(4);

        while let Some(&current) = stack.last() {
            candidates.clear();
            candidates.extend(self.lattice_neighbors(current).filter(|&n| !visited[n]));

            if candidates.is_empty() {
                stack.pop();
                continue;
            }

            let next = candidates[rng.random_range(0..candidates.len())];
            self.carve(&mut open, current, next);
            visited[next] = true;
            stack.push(next);
        }

        open
    }

    /// Randomized Prim's: grow from the start cell through a frontier set
    fn carve_prim<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<bool> {
        let mut open = vec![false; self.width * self.height];
        let mut visited = vec![false; self.width * self.height];
        let mut in_frontier = vec![false; self.width * self.height];
        let mut frontier = Vec::new();
        let mut links = Vec::with_capacity(4);

        visited[self.start] = true;
        open[self.start] = true;
        for n in self.lattice_neighbors(self.start) {
            in_frontier[n] = true;
            frontier.push(n);
        }

        while !frontier.is_empty() {
            let cell = frontier.swap_remove(rng.random_range(0..frontier.len()));
            in_frontier[cell] = false;

            links.clear();
            links.extend(self.lattice_neighbors(cell).filter(|&n| visited[n]));
            // Frontier cells always border the visited region
            let Some(&link) = links.get(rng.random_range(0..links.len().max(1))) else {
                continue;
            };

            self.carve(&mut open, link, cell);
            visited[cell] = true;

            for n in self.lattice_neighbors(cell) {
                if !visited[n] && !in_frontier[n] {
                    in_frontier[n] = true;
                    frontier.push(n);
                }
            }
        }

        open
    }

    /// Open both cells and the wall between them
    fn carve(&self, open: &mut [bool], from: usize, to: usize) {
        open[from] = true;
        open[to] = true;
        open[(from + to) / 2] = true;
    }

    /// Lattice cells two steps away, in order left, right, up, down
    fn lattice_neighbors(&self, index: usize) -> impl Iterator<Item = usize> + use<> {
        let (x, y) = (index % self.width, index / self.width);
        let width = self.width;
        let mut candidates = [None; 4];

        if x >= 3 {
            candidates[0] = Some(index - 2);
        }
        if x + 3 < self.width {
            candidates[1] = Some(index + 2);
        }
        if y >= 3 {
            candidates[2] = Some(index - 2 * width);
        }
        if y + 3 < self.height {
            candidates[3] = Some(index + 2 * width);
        }

        candidates.into_iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn walkable_edges(grid: &TileGrid) -> usize {
        (0..grid.len())
            .filter(|&i| grid.is_walkable(i))
            .map(|i| grid.open_neighbors(i).filter(|&n| n > i).count())
            .sum()
    }

    #[test]
    fn test_rejects_even_dimensions() {
        assert_eq!(
            MazeGenerator::new(8, 9, 1.0, 10, 20).unwrap_err(),
            MazeError::InvalidDimensions { width: 8, height: 9 }
        );
    }

    #[test]
    fn test_rejects_unusable_cell_size() {
        for cell_size in [0.0, -4.0, f32::INFINITY] {
            assert_eq!(
                MazeGenerator::corner_to_corner(9, 9, cell_size).unwrap_err(),
                MazeError::InvalidCellSize(cell_size)
            );
        }
        assert!(matches!(
            MazeGenerator::new(9, 9, f32::NAN, 10, 70),
            Err(MazeError::InvalidCellSize(size)) if size.is_nan()
        ));
    }

    #[test]
    fn test_rejects_off_lattice_start() {
        // index 2 is (2, 0): even column, top border row
        assert!(matches!(
            MazeGenerator::new(7, 7, 1.0, 2, 40),
            Err(MazeError::OffLattice { role: "start", .. })
        ));
    }

    #[test]
    fn test_dfs_maze_is_tree() {
        let generator = MazeGenerator::corner_to_corner(15, 11, 16.0).unwrap();
        let mut rng = Pcg32::seed_from_u64(7);
        let grid = generator.generate(MazeAlgorithm::Dfs, &mut rng);

        assert_eq!(grid.tile(generator.start()), Some(Tile::Start));
        assert_eq!(grid.tile(generator.goal()), Some(Tile::Goal));
        assert_eq!(walkable_edges(&grid), grid.floor_count() - 1);
    }

    #[test]
    fn test_prim_maze_is_tree() {
        let generator = MazeGenerator::corner_to_corner(13, 13, 16.0).unwrap();
        let mut rng = Pcg32::seed_from_u64(99);
        let grid = generator.generate(MazeAlgorithm::Prim, &mut rng);

        // 6x6 lattice cells plus 35 carved passages
        assert_eq!(grid.floor_count(), 36 + 35);
        assert_eq!(walkable_edges(&grid), grid.floor_count() - 1);
    }

    #[test]
    fn test_same_seed_same_maze() {
        let generator = MazeGenerator::corner_to_corner(21, 21, 8.0).unwrap();
        let a = generator.generate(MazeAlgorithm::Prim, &mut Pcg32::seed_from_u64(5));
        let b = generator.generate(MazeAlgorithm::Prim, &mut Pcg32::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_borders_stay_walls() {
        let generator = MazeGenerator::corner_to_corner(9, 7, 1.0).unwrap();
        let grid = generator.generate(MazeAlgorithm::Dfs, &mut Pcg32::seed_from_u64(1));
        for x in 0..9 {
            assert_eq!(grid.tile_at(x, 0), Some(Tile::Wall));
            assert_eq!(grid.tile_at(x, 6), Some(Tile::Wall));
        }
        for y in 0..7 {
            assert_eq!(grid.tile_at(0, y), Some(Tile::Wall));
            assert_eq!(grid.tile_at(8, y), Some(Tile::Wall));
        }
    }
}
