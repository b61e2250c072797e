//! Persisted maze layout
//!
//! One integer tile code per cell, row-major, whitespace separated, one grid
//! row per line. Dimensions and the start/goal indices travel separately
//! (settings), so the file only distinguishes walls from walkable cells.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::tile::{Tile, TileGrid};
use crate::error::{LayoutError, MazeError};

/// Integer codes written for walls and walkable cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileCodes {
    pub wall: u16,
    pub floor: u16,
}

impl Default for TileCodes {
    fn default() -> Self {
        Self { wall: 1, floor: 0 }
    }
}

impl TileCodes {
    pub fn new(wall: u16, floor: u16) -> Result<Self, MazeError> {
        if wall == floor {
            return Err(MazeError::AmbiguousCodes(wall));
        }
        Ok(Self { wall, floor })
    }

    #[inline]
    pub fn code_for(&self, tile: Tile) -> u16 {
        if tile.is_walkable() { self.floor } else { self.wall }
    }
}

/// Render a grid as layout text
pub fn encode_layout(grid: &TileGrid, codes: TileCodes) -> String {
    let mut out = String::with_capacity(grid.len() * 3);
    for row in grid.tiles().chunks(grid.width()) {
        let line: Vec<String> = row.iter().map(|&t| codes.code_for(t).to_string()).collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}

/// Parse layout text back into a grid
pub fn decode_layout(
    text: &str,
    width: usize,
    height: usize,
    cell_size: f32,
    start: usize,
    goal: usize,
    codes: TileCodes,
) -> Result<TileGrid, LayoutError> {
    let mut tiles = Vec::with_capacity(width * height);

    for (cell, token) in text.split_whitespace().enumerate() {
        let code: u16 = token.parse().map_err(|_| LayoutError::BadToken {
            token: token.to_string(),
            cell,
        })?;
        let tile = if code == codes.wall {
            Tile::Wall
        } else if code == codes.floor {
            Tile::Floor
        } else {
            return Err(LayoutError::UnknownCode { code, cell });
        };
        tiles.push(tile);
    }

    if tiles.len() != width * height {
        return Err(LayoutError::CellCount {
            expected: width * height,
            found: tiles.len(),
        });
    }

    for (role, index) in [("start", start), ("goal", goal)] {
        match tiles.get(index) {
            Some(Tile::Floor) => {}
            Some(_) => {
                return Err(LayoutError::InvalidGrid(format!(
                    "{role} index {index} is a wall"
                )));
            }
            None => {
                return Err(LayoutError::InvalidGrid(format!(
                    "{role} index {index} out of range"
                )));
            }
        }
    }
    tiles[start] = Tile::Start;
    tiles[goal] = Tile::Goal;

    TileGrid::from_tiles(width, height, cell_size, tiles)
}

/// Write a grid's layout to disk
pub fn write_layout(path: &Path, grid: &TileGrid, codes: TileCodes) -> Result<(), LayoutError> {
    fs::write(path, encode_layout(grid, codes)).map_err(|source| LayoutError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Maze layout saved to {}", path.display());
    Ok(())
}

/// Read a grid's layout from disk
pub fn read_layout(
    path: &Path,
    width: usize,
    height: usize,
    cell_size: f32,
    start: usize,
    goal: usize,
    codes: TileCodes,
) -> Result<TileGrid, LayoutError> {
    let text = fs::read_to_string(path).map_err(|source| LayoutError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let grid = decode_layout(&text, width, height, cell_size, start, goal, codes)?;
    log::info!("Maze layout loaded from {}", path.display());
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TileGrid {
        TileGrid::from_ascii(&["#####", "#S..#", "###.#", "#G..#", "#####"], 10.0).unwrap()
    }

    #[test]
    fn test_encode_layout_rows() {
        let text = encode_layout(&sample(), TileCodes::new(7, 3).unwrap());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "7 7 7 7 7");
        // start/goal are written as plain walkable codes
        assert_eq!(lines[1], "7 3 3 3 7");
        assert_eq!(lines[3], "7 3 3 3 7");
    }

    #[test]
    fn test_decode_restores_start_goal() {
        let grid = sample();
        let codes = TileCodes::default();
        let text = encode_layout(&grid, codes);
        let loaded = decode_layout(&text, 5, 5, 10.0, grid.start(), grid.goal(), codes).unwrap();
        assert_eq!(loaded, grid);
    }

    #[test]
    fn test_decode_rejects_unknown_code() {
        let err = decode_layout("0 1 5 0", 2, 2, 1.0, 0, 3, TileCodes::default()).unwrap_err();
        assert!(matches!(err, LayoutError::UnknownCode { code: 5, cell: 2 }));
    }

    #[test]
    fn test_decode_rejects_short_layout() {
        let err = decode_layout("0 0 0", 2, 2, 1.0, 0, 2, TileCodes::default()).unwrap_err();
        assert!(matches!(err, LayoutError::CellCount { expected: 4, found: 3 }));
    }

    #[test]
    fn test_decode_rejects_start_on_wall() {
        let err = decode_layout("1 0 0 0", 2, 2, 1.0, 0, 3, TileCodes::default()).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidGrid(_)));
    }

    #[test]
    fn test_codes_must_differ() {
        assert_eq!(TileCodes::new(4, 4), Err(MazeError::AmbiguousCodes(4)));
    }

    #[test]
    fn test_file_round_trip() {
        let grid = sample();
        let path = std::env::temp_dir().join(format!("maze_layout_{}.txt", std::process::id()));
        write_layout(&path, &grid, TileCodes::default()).unwrap();
        let loaded = read_layout(
            &path,
            5,
            5,
            10.0,
            grid.start(),
            grid.goal(),
            TileCodes::default(),
        )
        .unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, grid);
    }
}
