//! Axis-aligned rectangles in world space
//!
//! `min` is the top-left corner (screen space, +y down).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle given by its top-left corner and size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    pub fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// Zero-size rectangle at a point
    pub fn point(p: Vec2) -> Self {
        Self {
            min: p,
            size: Vec2::ZERO,
        }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Finite coordinates and non-negative extent
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.size.is_finite() && self.size.x >= 0.0 && self.size.y >= 0.0
    }

    /// Inclusive point containment
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        let max = self.max();
        p.x >= self.min.x && p.x <= max.x && p.y >= self.min.y && p.y <= max.y
    }

    /// Both corners of `other` lie within this rectangle
    #[inline]
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max())
    }

    /// Closed-interval overlap test; touching edges and zero-size rects count.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.min.x <= b_max.x
            && other.min.x <= a_max.x
            && self.min.y <= b_max.y
            && other.min.y <= a_max.y
    }

    /// The four equal quadrants in order: top-left, top-right, bottom-left, bottom-right
    pub fn quadrants(&self) -> [Rect; 4] {
        let half = self.size * 0.5;
        let (x, y) = (self.min.x, self.min.y);
        [
            Rect::new(x, y, half.x, half.y),
            Rect::new(x + half.x, y, half.x, half.y),
            Rect::new(x, y + half.y, half.x, half.y),
            Rect::new(x + half.x, y + half.y, half.x, half.y),
        ]
    }
}
