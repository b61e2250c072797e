//! Per-column raycasting
//!
//! One ray per screen column is marched through the tile grid with DDA. Each
//! wall hit becomes a vertical slice whose height falls off with the
//! fish-eye corrected distance and whose grey level darkens with it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::vertex::{Vertex, colors};
use crate::consts::*;
use crate::geometry::Rect;
use crate::grid::{Tile, TileGrid};
use crate::heading_vector;

/// Projection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    pub width: f32,
    pub height: f32,
    pub fov_degrees: f32,
    pub ray_count: usize,
    pub wall_height_scale: f32,
    pub max_distance: f32,
    /// Distance at which shading reaches its floor
    pub shade_distance: f32,
    /// Emit 2D ray segments for overlay drawing
    #[serde(default)]
    pub debug_rays: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: VIEW_WIDTH,
            height: VIEW_HEIGHT,
            fov_degrees: FOV_DEGREES,
            ray_count: RAY_COUNT,
            wall_height_scale: WALL_HEIGHT_SCALE,
            max_distance: MAX_RAY_DISTANCE,
            shade_distance: SHADE_DISTANCE,
            debug_rays: false,
        }
    }
}

impl ViewConfig {
    /// Screen width of one column
    #[inline]
    pub fn column_width(&self) -> f32 {
        self.width / self.ray_count.max(1) as f32
    }

    /// Heading of ray `i` in degrees
    #[inline]
    pub fn ray_angle(&self, heading: f32, i: usize) -> f32 {
        let n = self.ray_count.max(1) as f32;
        heading + (i as f32 - n / 2.0) * (self.fov_degrees / n)
    }
}

/// Viewer position (world units) and heading (degrees, +y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec2,
    pub heading: f32,
}

/// Which grid line a ray crossed when it hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallSide {
    /// Vertical grid line (ray stepped in x)
    Vertical,
    /// Horizontal grid line (ray stepped in y)
    Horizontal,
}

/// First wall along a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub tile: usize,
    /// Euclidean distance in world units
    pub distance: f32,
    pub point: Vec2,
    pub side: WallSide,
}

/// One shaded wall column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallSlice {
    pub column: usize,
    pub rect: Rect,
    /// Fish-eye corrected distance, at least 1
    pub distance: f32,
    pub brightness: f32,
    pub color: [f32; 4],
    pub tile: usize,
    pub side: WallSide,
}

/// Top-down ray segment for debugging overlays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugRay {
    pub from: Vec2,
    pub to: Vec2,
}

/// Output of one render pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub slices: Vec<WallSlice>,
    pub debug_rays: Vec<DebugRay>,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty() && self.debug_rays.is_empty()
    }

    /// Two triangles per slice, ready for a triangle-list draw
    pub fn vertices(&self) -> Vec<Vertex> {
        let mut out = Vec::with_capacity(self.slices.len() * 6);
        for slice in &self.slices {
            let min = slice.rect.min;
            let max = slice.rect.max();
            let c = slice.color;
            out.extend_from_slice(&[
                Vertex::new(min.x, min.y, c),
                Vertex::new(max.x, min.y, c),
                Vertex::new(max.x, max.y, c),
                Vertex::new(min.x, min.y, c),
                Vertex::new(max.x, max.y, c),
                Vertex::new(min.x, max.y, c),
            ]);
        }
        out
    }

    /// Two vertices per debug ray, for a line-list draw
    pub fn debug_vertices(&self) -> Vec<Vertex> {
        self.debug_rays
            .iter()
            .flat_map(|ray| {
                [
                    Vertex::new(ray.from.x, ray.from.y, colors::DEBUG_RAY),
                    Vertex::new(ray.to.x, ray.to.y, colors::DEBUG_RAY),
                ]
            })
            .collect()
    }
}

/// March a ray from `origin` until it enters a wall tile.
///
/// `None` when the origin is off the grid, the ray leaves the grid, or the
/// wall lies beyond `max_distance`.
pub fn cast_ray(grid: &TileGrid, origin: Vec2, angle_degrees: f32, max_distance: f32) -> Option<RayHit> {
    let cell = grid.cell_size();
    let start = grid.tile_index_at(origin)?;
    if grid.tile(start) == Some(Tile::Wall) {
        return Some(RayHit {
            tile: start,
            distance: 0.0,
            point: origin,
            side: WallSide::Vertical,
        });
    }

    let dir = heading_vector(angle_degrees);
    // Work in cell units; distances scale back by `cell`
    let pos = origin / cell;
    let (mut map_x, mut map_y) = (pos.x.floor() as i64, pos.y.floor() as i64);

    let delta_x = if dir.x.abs() < 1e-8 { f32::INFINITY } else { (1.0 / dir.x).abs() };
    let delta_y = if dir.y.abs() < 1e-8 { f32::INFINITY } else { (1.0 / dir.y).abs() };

    let (step_x, mut side_x) = if dir.x < 0.0 {
        (-1, (pos.x - map_x as f32) * delta_x)
    } else {
        (1, ((map_x + 1) as f32 - pos.x) * delta_x)
    };
    let (step_y, mut side_y) = if dir.y < 0.0 {
        (-1, (pos.y - map_y as f32) * delta_y)
    } else {
        (1, ((map_y + 1) as f32 - pos.y) * delta_y)
    };

    let limit = max_distance / cell;
    loop {
        let (travelled, side) = if side_x < side_y {
            let t = side_x;
            side_x += delta_x;
            map_x += step_x;
            (t, WallSide::Vertical)
        } else {
            let t = side_y;
            side_y += delta_y;
            map_y += step_y;
            (t, WallSide::Horizontal)
        };

        if !travelled.is_finite() || travelled > limit {
            return None;
        }
        let index = grid.index(map_x, map_y)?;
        if grid.tile(index) == Some(Tile::Wall) {
            let distance = travelled * cell;
            return Some(RayHit {
                tile: index,
                distance,
                point: origin + dir * distance,
                side,
            });
        }
    }
}

/// Cast every column for the given pose.
///
/// A missing grid or pose is logged and yields an empty frame.
pub fn render(grid: Option<&TileGrid>, pose: Option<Pose>, view: &ViewConfig) -> Frame {
    let (Some(grid), Some(pose)) = (grid, pose) else {
        log::error!("Raycast skipped: missing grid or viewer pose");
        return Frame::default();
    };

    let n = view.ray_count;
    let column_width = view.column_width();
    let center_y = view.height / 2.0;
    let mut frame = Frame {
        slices: Vec::with_capacity(n),
        debug_rays: Vec::new(),
    };

    for i in 0..n {
        let angle = view.ray_angle(pose.heading, i);
        let Some(hit) = cast_ray(grid, pose.position, angle, view.max_distance) else {
            continue;
        };

        let corrected = (hit.distance * (angle - pose.heading).to_radians().cos()).max(1.0);
        let wall_height = view.wall_height_scale / corrected;
        let brightness = shade(corrected, view.shade_distance);
        let grey = (50.0 + 150.0 * brightness) / 255.0;

        frame.slices.push(WallSlice {
            column: i,
            rect: Rect::new(
                i as f32 * column_width,
                center_y - wall_height / 2.0,
                column_width,
                wall_height,
            ),
            distance: corrected,
            brightness,
            color: colors::grey(grey),
            tile: hit.tile,
            side: hit.side,
        });

        if view.debug_rays {
            frame.debug_rays.push(DebugRay {
                from: pose.position,
                to: hit.point,
            });
        }
    }

    frame
}

/// Brightness in [0.2, 1] for a corrected distance
#[inline]
fn shade(distance: f32, shade_distance: f32) -> f32 {
    if shade_distance <= 0.0 {
        return 0.2;
    }
    (1.0 - distance / shade_distance).max(0.2)
}
