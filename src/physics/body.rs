//! Collision view of entities
//!
//! Presentation-side entities only need to expose what the broad and narrow
//! phases read. `Collider` is that contract; `Capabilities` says which parts
//! of it an implementor actually provides. `Body` is the arena-stored
//! implementation used by the simulation, addressed by `BodyId`.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bitmask::Bitmask;
use super::collision::Kinematics;
use crate::geometry::Rect;

/// Stable handle into the body arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Set of capabilities a collider exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const NONE: Self = Self(0);
    pub const POSITION: Self = Self(1 << 0);
    pub const BOUNDS: Self = Self(1 << 1);
    pub const BITMASK: Self = Self(1 << 2);
    pub const DIRECTION: Self = Self(1 << 3);

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Capabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// What the quadtree and collision engine need from an entity
pub trait Collider {
    fn id(&self) -> BodyId;

    fn capabilities(&self) -> Capabilities;

    /// Top-left of the bounds
    fn position(&self) -> Option<Vec2>;

    fn bounds(&self) -> Option<Rect>;

    fn bitmask(&self) -> Option<&Bitmask> {
        None
    }

    /// Rotation in degrees about the top-left origin
    fn angle(&self) -> f32 {
        0.0
    }

    fn kinematics(&self) -> Option<Kinematics> {
        None
    }

    /// Movement-active flag consulted by incremental quadtree updates
    fn is_moving(&self) -> bool {
        false
    }
}

/// Arena-stored entity
#[derive(Debug, Clone)]
pub struct Body {
    pub id: BodyId,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Unit travel direction (zero when static)
    pub direction: Vec2,
    pub speed: f32,
    pub acceleration: Vec2,
    /// Degrees
    pub angle: f32,
    pub mask: Option<Bitmask>,
    pub moving: bool,
}

impl Body {
    pub fn new(id: BodyId, pos: Vec2, size: Vec2) -> Self {
        Self {
            id,
            pos,
            size,
            direction: Vec2::ZERO,
            speed: 0.0,
            acceleration: Vec2::ZERO,
            angle: 0.0,
            mask: None,
            moving: false,
        }
    }

    /// Set travel direction (normalized) and speed; marks the body as moving
    pub fn with_velocity(mut self, direction: Vec2, speed: f32) -> Self {
        self.direction = direction.normalize_or_zero();
        self.speed = speed;
        self.moving = self.direction != Vec2::ZERO && speed != 0.0;
        self
    }

    pub fn with_acceleration(mut self, acceleration: Vec2) -> Self {
        self.acceleration = acceleration;
        if acceleration != Vec2::ZERO {
            self.moving = true;
        }
        self
    }

    pub fn with_mask(mut self, mask: Bitmask) -> Self {
        self.size = Vec2::new(mask.width() as f32, mask.height() as f32);
        self.mask = Some(mask);
        self
    }

    pub fn with_angle(mut self, degrees: f32) -> Self {
        self.angle = degrees;
        self
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.direction * self.speed
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Move the centre to `center`, keeping size
    pub fn set_center(&mut self, center: Vec2) {
        self.pos = center - self.size * 0.5;
    }

    /// Advance under constant acceleration for `dt` seconds
    pub fn step(&mut self, dt: f32) {
        if !self.moving {
            return;
        }
        let velocity = self.velocity();
        self.pos += velocity * dt + 0.5 * self.acceleration * dt * dt;

        let new_velocity = velocity + self.acceleration * dt;
        self.speed = new_velocity.length();
        self.direction = new_velocity.normalize_or_zero();
    }
}

impl Collider for Body {
    fn id(&self) -> BodyId {
        self.id
    }

    fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::POSITION | Capabilities::BOUNDS;
        if self.mask.is_some() {
            caps = caps | Capabilities::BITMASK;
        }
        if self.direction != Vec2::ZERO || self.acceleration != Vec2::ZERO {
            caps = caps | Capabilities::DIRECTION;
        }
        caps
    }

    fn position(&self) -> Option<Vec2> {
        Some(self.pos)
    }

    fn bounds(&self) -> Option<Rect> {
        Some(Rect::from_min_size(self.pos, self.size))
    }

    fn bitmask(&self) -> Option<&Bitmask> {
        self.mask.as_ref()
    }

    fn angle(&self) -> f32 {
        self.angle
    }

    fn kinematics(&self) -> Option<Kinematics> {
        Some(Kinematics {
            position: self.center(),
            direction: self.direction,
            speed: self.speed,
            acceleration: self.acceleration,
        })
    }

    fn is_moving(&self) -> bool {
        self.moving
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_set_ops() {
        let caps = Capabilities::POSITION | Capabilities::BITMASK;
        assert!(caps.contains(Capabilities::POSITION));
        assert!(caps.contains(Capabilities::BITMASK));
        assert!(!caps.contains(Capabilities::DIRECTION));
        assert!(Capabilities::NONE.is_empty());
    }

    #[test]
    fn test_body_capabilities_follow_fields() {
        let still = Body::new(BodyId(0), Vec2::ZERO, Vec2::splat(4.0));
        assert!(!still.capabilities().contains(Capabilities::DIRECTION));
        assert!(!still.is_moving());

        let mover = Body::new(BodyId(1), Vec2::ZERO, Vec2::splat(4.0))
            .with_velocity(Vec2::new(3.0, 0.0), 10.0)
            .with_mask(Bitmask::solid(4, 4));
        let caps = mover.capabilities();
        assert!(caps.contains(Capabilities::DIRECTION | Capabilities::BITMASK));
        assert!(mover.is_moving());
        assert_eq!(mover.direction, Vec2::X);
    }

    #[test]
    fn test_step_constant_velocity() {
        let mut body = Body::new(BodyId(0), Vec2::ZERO, Vec2::ONE).with_velocity(Vec2::Y, 2.0);
        body.step(0.5);
        assert!((body.pos.y - 1.0).abs() < 1e-6);
        assert!((body.speed - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_step_with_acceleration() {
        let mut body = Body::new(BodyId(0), Vec2::ZERO, Vec2::ONE).with_acceleration(Vec2::new(2.0, 0.0));
        body.step(1.0);
        // x = 1/2 * a * t^2
        assert!((body.pos.x - 1.0).abs() < 1e-6);
        assert!((body.speed - 2.0).abs() < 1e-6);
        assert_eq!(body.direction, Vec2::X);
    }
}
