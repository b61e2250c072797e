//! Raycast view
//!
//! Produces backend-agnostic wall geometry; uploading and drawing it is left
//! to the presentation layer.

pub mod raycast;
pub mod vertex;

pub use raycast::{
    DebugRay, Frame, Pose, RayHit, ViewConfig, WallSide, WallSlice, cast_ray, render,
};
pub use vertex::Vertex;
