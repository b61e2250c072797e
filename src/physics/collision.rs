//! Narrow-phase collision tests
//!
//! Pure functions over geometric primitives and opacity masks:
//! circles, axis-aligned boxes, (rotated) pixel masks, and a predictive
//! time-of-closest-approach solver for bodies under constant acceleration.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bitmask::Bitmask;
use super::body::{Capabilities, Collider};

/// True iff the circles touch or overlap
#[inline]
pub fn circle_collision(p1: Vec2, r1: f32, p2: Vec2, r2: f32) -> bool {
    let reach = r1 + r2;
    p1.distance_squared(p2) <= reach * reach
}

/// True iff the boxes overlap with positive area (touching edges do not count)
#[inline]
pub fn bounding_box_collision(pos1: Vec2, size1: Vec2, pos2: Vec2, size2: Vec2) -> bool {
    overlap_region(pos1, size1, pos2, size2).is_some()
}

/// Intersection of two boxes as (min, max), if it has positive area
fn overlap_region(pos1: Vec2, size1: Vec2, pos2: Vec2, size2: Vec2) -> Option<(Vec2, Vec2)> {
    let min = pos1.max(pos2);
    let max = (pos1 + size1).min(pos2 + size2);
    if min.x >= max.x || min.y >= max.y {
        None
    } else {
        Some((min, max))
    }
}

/// A mask placed in the world: top-left at `pos`, rotated `angle` degrees
/// about that corner
#[derive(Debug, Clone, Copy)]
pub struct MaskedSprite<'a> {
    pub mask: &'a Bitmask,
    pub pos: Vec2,
    pub angle: f32,
}

impl<'a> MaskedSprite<'a> {
    pub fn new(mask: &'a Bitmask, pos: Vec2) -> Self {
        Self {
            mask,
            pos,
            angle: 0.0,
        }
    }

    pub fn rotated(mask: &'a Bitmask, pos: Vec2, angle: f32) -> Self {
        Self { mask, pos, angle }
    }

    #[inline]
    fn size(&self) -> Vec2 {
        Vec2::new(self.mask.width() as f32, self.mask.height() as f32)
    }

    /// Inverse transform of a world point into mask pixel space
    #[inline]
    fn is_solid_at(&self, world: Vec2, inverse: Option<(f32, f32)>) -> bool {
        let mut local = world - self.pos;
        if let Some((cos, sin)) = inverse {
            local = Vec2::new(local.x * cos - local.y * sin, local.x * sin + local.y * cos);
        }
        self.mask
            .is_solid(local.x.floor() as i64, local.y.floor() as i64)
    }
}

/// Pixel-exact overlap, honouring each sprite's rotation.
///
/// Work is restricted to the overlap of the unrotated boxes; each pixel centre
/// in that region is mapped into both sprites' local frames.
pub fn pixel_collision(a: &MaskedSprite<'_>, b: &MaskedSprite<'_>) -> bool {
    let Some((min, max)) = overlap_region(a.pos, a.size(), b.pos, b.size()) else {
        return false;
    };

    let inverse = |angle: f32| {
        if angle == 0.0 {
            None
        } else {
            let rad = (-angle).to_radians();
            Some((rad.cos(), rad.sin()))
        }
    };
    let inv_a = inverse(a.angle);
    let inv_b = inverse(b.angle);

    let (x0, x1) = (min.x.floor() as i64, max.x.ceil() as i64);
    let (y0, y1) = (min.y.floor() as i64, max.y.ceil() as i64);

    for y in y0..y1 {
        for x in x0..x1 {
            let world = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            if a.is_solid_at(world, inv_a) && b.is_solid_at(world, inv_b) {
                return true;
            }
        }
    }
    false
}

/// Pixel-exact overlap of two unrotated masks
pub fn pixel_collision_unrotated(mask1: &Bitmask, pos1: Vec2, mask2: &Bitmask, pos2: Vec2) -> bool {
    pixel_collision(&MaskedSprite::new(mask1, pos1), &MaskedSprite::new(mask2, pos2))
}

/// Kind of overlap found between two colliders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Overlap {
    /// Bounding boxes overlap; at least one side has no mask
    Bounds,
    /// Masks overlap pixel-for-pixel
    Pixels,
}

/// Narrow-phase test choosing the most exact check both sides support
pub fn colliders_overlap<A, B>(a: &A, b: &B) -> Option<Overlap>
where
    A: Collider + ?Sized,
    B: Collider + ?Sized,
{
    let (Some(box_a), Some(box_b)) = (a.bounds(), b.bounds()) else {
        return None;
    };
    if !bounding_box_collision(box_a.min, box_a.size, box_b.min, box_b.size) {
        return None;
    }

    let both_masked = a.capabilities().contains(Capabilities::BITMASK)
        && b.capabilities().contains(Capabilities::BITMASK);
    match (a.bitmask(), b.bitmask()) {
        (Some(mask_a), Some(mask_b)) if both_masked => {
            let sprite_a = MaskedSprite::rotated(mask_a, box_a.min, a.angle());
            let sprite_b = MaskedSprite::rotated(mask_b, box_b.min, b.angle());
            pixel_collision(&sprite_a, &sprite_b).then_some(Overlap::Pixels)
        }
        _ => Some(Overlap::Bounds),
    }
}

/// Motion state for closest-approach prediction
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Kinematics {
    pub position: Vec2,
    /// Unit direction of travel
    pub direction: Vec2,
    pub speed: f32,
    pub acceleration: Vec2,
}

impl Kinematics {
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.direction * self.speed
    }

    /// Position after `t` seconds of constant acceleration
    #[inline]
    pub fn position_at(&self, t: f32) -> Vec2 {
        self.position + self.velocity() * t + 0.5 * self.acceleration * t * t
    }
}

/// Diagnostic accumulator for closest-approach calls
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApproachLog {
    /// Every call, successful or not
    pub calls: u64,
    /// Every time returned, in call order
    pub times: Vec<f32>,
}

impl ApproachLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, time: Option<f32>) {
        self.calls += 1;
        if let Some(t) = time {
            self.times.push(t);
        }
    }

    pub fn clear(&mut self) {
        self.calls = 0;
        self.times.clear();
    }
}

/// Time at which the two bodies are closest, in the relative frame.
///
/// Without relative acceleration this is `-(p·v)/(v·v)` (may be negative when
/// the bodies are already separating). With relative acceleration it is the
/// smallest non-negative root of `a t² + b t + c = 0` where
/// `a = ½|acc|²`, `b = v·acc`, `c = p·v`.
///
/// Returns `None` for no relative motion, a negative discriminant, or when
/// both roots lie in the past. No radius check happens here.
pub fn closest_approach(
    a: &Kinematics,
    b: &Kinematics,
    log: Option<&mut ApproachLog>,
) -> Option<f32> {
    let rel_pos = a.position - b.position;
    let rel_vel = a.velocity() - b.velocity();
    let rel_acc = a.acceleration - b.acceleration;

    let time = if rel_acc == Vec2::ZERO {
        let vel_sq = rel_vel.length_squared();
        if vel_sq == 0.0 {
            None
        } else {
            Some(-rel_pos.dot(rel_vel) / vel_sq)
        }
    } else {
        let qa = 0.5 * rel_acc.length_squared();
        let qb = rel_vel.dot(rel_acc);
        let qc = rel_pos.dot(rel_vel);
        let discriminant = qb * qb - 4.0 * qa * qc;

        if discriminant < 0.0 {
            None
        } else {
            let root = discriminant.sqrt();
            let t1 = (-qb - root) / (2.0 * qa);
            let t2 = (-qb + root) / (2.0 * qa);
            let (early, late) = (t1.min(t2), t1.max(t2));
            if late < 0.0 {
                None
            } else if early >= 0.0 {
                Some(early)
            } else {
                Some(late)
            }
        }
    };
    let time = time.filter(|t| t.is_finite());

    if let Some(log) = log {
        log.record(time);
    }
    time
}

/// Distance between the bodies after `t` seconds
#[inline]
pub fn separation_at(a: &Kinematics, b: &Kinematics, t: f32) -> f32 {
    a.position_at(t).distance(b.position_at(t))
}

/// Predicted contact time, if the bodies come within `combined_radius` at
/// their closest approach. Past closest approaches are checked at t = 0.
pub fn predicts_contact(
    a: &Kinematics,
    b: &Kinematics,
    combined_radius: f32,
    log: Option<&mut ApproachLog>,
) -> Option<f32> {
    let t = closest_approach(a, b, log)?.max(0.0);
    (separation_at(a, b, t) <= combined_radius).then_some(t)
}
