//! Run settings
//!
//! Everything the binary needs to set up a run: maze shape and algorithm,
//! RNG seed, layout codes, view projection, navigation and spatial index
//! tuning. Persisted as JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;
use crate::grid::{MazeAlgorithm, TileCodes};
use crate::renderer::ViewConfig;

/// Maze size presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MazeSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl MazeSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            MazeSize::Small => "Small",
            MazeSize::Medium => "Medium",
            MazeSize::Large => "Large",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "small" | "s" => Some(MazeSize::Small),
            "medium" | "med" | "m" => Some(MazeSize::Medium),
            "large" | "l" => Some(MazeSize::Large),
            _ => None,
        }
    }

    /// Grid cells per side (odd, so cells sit on the odd lattice)
    pub fn dimension(&self) -> usize {
        match self {
            MazeSize::Small => 11,
            MazeSize::Medium => 21,
            MazeSize::Large => 41,
        }
    }

    /// Free-moving bodies scattered through the maze
    pub fn drifters(&self) -> usize {
        match self {
            MazeSize::Small => 2,
            MazeSize::Medium => 6,
            MazeSize::Large => 16,
        }
    }
}

/// Run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Preset the maze shape came from
    pub size: MazeSize,

    // === Maze ===
    pub maze_width: usize,
    pub maze_height: usize,
    pub algorithm: MazeAlgorithm,
    pub seed: u64,
    pub tile_codes: TileCodes,
    /// World units per cell
    pub cell_size: f32,

    // === Navigation ===
    pub agent_speed: f32,
    /// Tiles per turn in discrete-step mode (`None` = continuous)
    #[serde(default)]
    pub step_limit: Option<usize>,

    // === View ===
    pub view: ViewConfig,

    // === Spatial index ===
    pub quadtree_capacity: usize,
    pub quadtree_max_levels: usize,
    /// Rebuild the quadtree every tick instead of updating it
    #[serde(default)]
    pub rebuild_quadtree: bool,

    // === Run ===
    pub drifters: usize,
    /// Safety cap on simulated ticks for headless runs
    pub max_ticks: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_preset(MazeSize::default())
    }
}

impl Settings {
    /// Create settings from a size preset
    pub fn from_preset(size: MazeSize) -> Self {
        let side = size.dimension();
        Self {
            size,
            maze_width: side,
            maze_height: side,
            algorithm: MazeAlgorithm::default(),
            seed: 0x5eed,
            tile_codes: TileCodes::default(),
            cell_size: CELL_SIZE,
            agent_speed: AGENT_SPEED,
            step_limit: None,
            view: ViewConfig::default(),
            quadtree_capacity: QUADTREE_CAPACITY,
            quadtree_max_levels: QUADTREE_MAX_LEVELS,
            rebuild_quadtree: false,
            drifters: size.drifters(),
            max_ticks: 60 * 60 * 10,
        }
    }

    /// Switch to a preset's maze shape, keeping everything else
    pub fn apply_preset(&mut self, size: MazeSize) {
        let side = size.dimension();
        self.size = size;
        self.maze_width = side;
        self.maze_height = side;
        self.drifters = size.drifters();
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
