//! Maze Runner - an agent walking a procedural maze under a raycast view
//!
//! Core modules:
//! - `grid`: Tile grid, maze generation, layout persistence and A* routing
//! - `physics`: Body arena, quadtree broad phase and narrow-phase collision
//! - `sim`: Deterministic simulation (navigation, world state, fixed-order tick)
//! - `renderer`: Per-column raycasting into shaded wall slices
//! - `settings`: Data-driven configuration with size presets

pub mod error;
pub mod geometry;
pub mod grid;
pub mod physics;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{LayoutError, MazeError, QuadtreeError, SettingsError};
pub use geometry::Rect;
pub use settings::{MazeSize, Settings};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// World units per maze cell
    pub const CELL_SIZE: f32 = 32.0;

    /// Agent travel speed (world units per second)
    pub const AGENT_SPEED: f32 = 96.0;

    /// Raycast view defaults
    pub const VIEW_WIDTH: f32 = 800.0;
    pub const VIEW_HEIGHT: f32 = 600.0;
    pub const FOV_DEGREES: f32 = 60.0;
    pub const RAY_COUNT: usize = 120;
    pub const WALL_HEIGHT_SCALE: f32 = 2500.0;
    pub const MAX_RAY_DISTANCE: f32 = 1000.0;
    /// Distance at which wall shading bottoms out
    pub const SHADE_DISTANCE: f32 = 100.0;

    /// Quadtree defaults
    pub const QUADTREE_CAPACITY: usize = 4;
    pub const QUADTREE_MAX_LEVELS: usize = 5;

    /// Headings (degrees, +y down) the navigator treats as on-path
    pub const CARDINAL_HEADINGS: [f32; 4] = [0.0, 90.0, 180.0, 270.0];
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negatives
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Unit vector for a heading in degrees (0° = +x, 90° = +y)
#[inline]
pub fn heading_vector(degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    Vec2::new(radians.cos(), radians.sin())
}

/// True when the heading lies exactly on one of the four grid axes
#[inline]
pub fn is_cardinal(degrees: f32) -> bool {
    let heading = normalize_degrees(degrees);
    consts::CARDINAL_HEADINGS.contains(&heading)
}
