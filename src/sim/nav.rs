//! Route following for the agent
//!
//! The controller walks a `Route` one tile at a time. Entering a tile snaps
//! the agent to its centre and turns it toward the next waypoint; between
//! tiles it translates along a cardinal heading. Any non-cardinal heading
//! (manual steering) counts as a deviation and triggers a rejoin.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::grid::{Route, TileGrid};
use crate::physics::Body;
use crate::{is_cardinal, normalize_degrees};

/// Navigation state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NavState {
    /// No route assigned
    #[default]
    Idle,
    /// Walking the route
    Following,
    /// Heading left the grid axes; rejoining this tick
    Deviated,
    /// Route exhausted
    Arrived,
}

impl NavState {
    pub fn as_str(&self) -> &'static str {
        match self {
            NavState::Idle => "idle",
            NavState::Following => "following",
            NavState::Deviated => "deviated",
            NavState::Arrived => "arrived",
        }
    }
}

/// Drives an agent body along a route
#[derive(Debug, Clone)]
pub struct NavigationController {
    route: Route,
    state: NavState,
    speed: f32,
    /// Tile the agent was last snapped to
    current_tile: Option<usize>,
    step_limit: Option<usize>,
    tiles_moved: usize,
    /// Waiting for `begin_turn` after hitting the step limit
    halted: bool,
    last_rejoin: Option<usize>,
    deviations: u32,
}

impl NavigationController {
    pub fn new(speed: f32) -> Self {
        Self {
            route: Route::new(),
            state: NavState::Idle,
            speed,
            current_tile: None,
            step_limit: None,
            tiles_moved: 0,
            halted: false,
            last_rejoin: None,
            deviations: 0,
        }
    }

    /// Cap the number of tiles entered per turn (discrete-step mode)
    pub fn with_step_limit(mut self, limit: Option<usize>) -> Self {
        self.step_limit = limit;
        self
    }

    #[inline]
    pub fn state(&self) -> NavState {
        self.state
    }

    #[inline]
    pub fn route(&self) -> &Route {
        &self.route
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn current_tile(&self) -> Option<usize> {
        self.current_tile
    }

    /// Next waypoint
    pub fn target_tile(&self) -> Option<usize> {
        self.route.peek_next()
    }

    /// Tile the most recent rejoin snapped to
    pub fn last_rejoin(&self) -> Option<usize> {
        self.last_rejoin
    }

    pub fn deviations(&self) -> u32 {
        self.deviations
    }

    pub fn step_limit(&self) -> Option<usize> {
        self.step_limit
    }

    pub fn tiles_moved(&self) -> usize {
        self.tiles_moved
    }

    /// True while translation is allowed
    pub fn is_moving(&self) -> bool {
        self.state == NavState::Following && !self.halted
    }

    /// Start walking `route`. An empty route arrives immediately.
    pub fn follow(&mut self, route: Route) {
        self.current_tile = None;
        self.tiles_moved = 0;
        self.halted = false;
        self.last_rejoin = None;
        if route.is_empty() {
            log::info!("Empty route, already arrived");
            self.route = route;
            self.state = NavState::Arrived;
        } else {
            log::info!("Following route of {} tiles", route.len());
            self.route = route;
            self.state = NavState::Following;
        }
    }

    /// Reset the per-turn tile counter and release a halted agent
    pub fn begin_turn(&mut self) {
        self.tiles_moved = 0;
        self.halted = false;
    }

    /// Rotate the agent's heading by `delta_degrees`
    pub fn steer(&self, agent: &mut Body, delta_degrees: f32) {
        agent.angle = normalize_degrees(agent.angle + delta_degrees);
        log::debug!("Agent steered to {:.1} deg", agent.angle);
    }

    /// Advance one tick. While following, a missing agent or grid is logged
    /// and the tick does nothing.
    pub fn step(&mut self, agent: Option<&mut Body>, grid: Option<&TileGrid>, dt: f32) -> NavState {
        if matches!(self.state, NavState::Idle | NavState::Arrived) {
            return self.state;
        }
        let (Some(agent), Some(grid)) = (agent, grid) else {
            log::warn!("Navigation step skipped: missing agent or grid");
            return self.state;
        };

        let Some(tile) = grid.tile_index_at(agent.center()) else {
            log::warn!("Agent {} is off the grid, stopping", agent.id);
            self.halt_body(agent);
            return self.state;
        };

        let mut rejoin = None;
        if !is_cardinal(agent.angle) {
            self.state = NavState::Deviated;
            self.deviations += 1;
            if let Some(pos) = self.route.closest_entry(tile) {
                self.route.rejoin_at(pos);
                rejoin = self.route.peek_next();
            }
            agent.angle = 0.0;
            self.last_rejoin = rejoin;
            log::debug!("Agent deviated at tile {tile}, rejoining at {rejoin:?}");
        }

        let entered = self.current_tile != Some(tile);
        if entered || self.state == NavState::Deviated {
            let anchor = rejoin.unwrap_or(tile);
            agent.set_center(grid.cell_center(anchor));
            self.current_tile = Some(anchor);

            if self.route.peek_next() == Some(anchor) {
                self.route.pop_next();
                if rejoin.is_none() {
                    self.tiles_moved += 1;
                }
            }

            match self.route.peek_next() {
                Some(next) => agent.angle = face_toward(grid, anchor, next),
                None => return self.arrive(agent),
            }
            self.state = NavState::Following;

            if self.step_limit.is_some_and(|limit| self.tiles_moved >= limit) {
                self.halted = true;
            }
        }

        if self.route.is_empty() {
            return self.arrive(agent);
        }

        if self.is_moving() && is_cardinal(agent.angle) {
            let direction = cardinal_vector(agent.angle);
            // Never carry past the next waypoint's centre in one tick
            let mut travel = self.speed * dt;
            if let Some(next) = self.route.peek_next() {
                let ahead = (grid.cell_center(next) - agent.center()).dot(direction);
                if ahead > 0.0 {
                    travel = travel.min(ahead);
                }
            }
            agent.set_center(agent.center() + direction * travel);
            agent.direction = direction;
            agent.speed = self.speed;
            agent.moving = true;
        } else {
            self.halt_body(agent);
        }

        self.state
    }

    fn arrive(&mut self, agent: &mut Body) -> NavState {
        self.state = NavState::Arrived;
        self.halt_body(agent);
        log::info!("Agent {} arrived at tile {:?}", agent.id, self.current_tile);
        self.state
    }

    fn halt_body(&self, agent: &mut Body) {
        agent.direction = Vec2::ZERO;
        agent.speed = 0.0;
        agent.moving = false;
    }
}

/// Heading from one tile to another, horizontal displacement first
fn face_toward(grid: &TileGrid, from: usize, to: usize) -> f32 {
    let (fx, fy) = grid.coords(from);
    let (tx, ty) = grid.coords(to);
    if tx > fx {
        0.0
    } else if tx < fx {
        180.0
    } else if ty > fy {
        90.0
    } else if ty < fy {
        270.0
    } else {
        0.0
    }
}

/// Exact unit vector for a cardinal heading (+y down)
fn cardinal_vector(degrees: f32) -> Vec2 {
    match normalize_degrees(degrees) {
        h if h == 90.0 => Vec2::Y,
        h if h == 180.0 => Vec2::NEG_X,
        h if h == 270.0 => Vec2::NEG_Y,
        _ => Vec2::X,
    }
}
