//! Deterministic simulation module
//!
//! This module must stay pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (arena order, sorted query results)

pub mod nav;
pub mod state;
pub mod tick;

pub use nav::{NavState, NavigationController};
pub use state::{AGENT_SCALE, DRIFTER_SCALE, World};
pub use tick::{Contact, TickInput, TickReport, tick};
