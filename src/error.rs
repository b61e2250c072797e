//! Error types for the fallible setup paths
//!
//! Per-tick operations never fail hard; they log and degrade to
//! "no path / no collision / no time". These enums cover maze generation,
//! layout I/O, quadtree bookkeeping and settings I/O.

use std::path::PathBuf;

use thiserror::Error;

/// Maze generation rejected its parameters
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MazeError {
    #[error("maze dimensions must be odd and at least 3x3, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("{role} index {index} is outside a {width}x{height} grid")]
    OutOfRange {
        role: &'static str,
        index: usize,
        width: usize,
        height: usize,
    },

    #[error("{role} index {index} is not on the cell lattice (needs odd x and y)")]
    OffLattice { role: &'static str, index: usize },

    #[error("cell size must be finite and positive, got {0}")]
    InvalidCellSize(f32),

    #[error("start and goal must differ (both {0})")]
    SameStartGoal(usize),

    #[error("tile codes must differ (wall and floor are both {0})")]
    AmbiguousCodes(u16),
}

/// Reading or writing a persisted maze layout failed
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bad tile code {token:?} at cell {cell}")]
    BadToken { token: String, cell: usize },

    #[error("unknown tile code {code} at cell {cell}")]
    UnknownCode { code: u16, cell: usize },

    #[error("layout holds {found} cells, expected {expected}")]
    CellCount { expected: usize, found: usize },

    #[error("invalid grid: {0}")]
    InvalidGrid(String),
}

/// Quadtree bookkeeping failure (soft: callers log and move on)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuadtreeError {
    #[error("bounds of body {id} are not finite or have negative size")]
    InvalidBounds { id: u32 },

    #[error("body {id} lies outside the quadtree root bounds")]
    OutOfBounds { id: u32 },

    #[error("body {id} is not stored in the quadtree")]
    NotFound { id: u32 },
}

/// Settings could not be loaded or saved
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
