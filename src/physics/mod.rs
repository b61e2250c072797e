//! Bodies, broad phase and narrow phase
//!
//! The quadtree narrows candidate pairs; `collision` holds the pure tests
//! that decide them.

pub mod bitmask;
pub mod body;
pub mod collision;
pub mod quadtree;

pub use bitmask::Bitmask;
pub use body::{Body, BodyId, Capabilities, Collider};
pub use collision::{
    ApproachLog, Kinematics, MaskedSprite, Overlap, bounding_box_collision, circle_collision,
    closest_approach, colliders_overlap, pixel_collision, pixel_collision_unrotated,
    predicts_contact, separation_at,
};
pub use quadtree::{QuadNode, Quadtree};
