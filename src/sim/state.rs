//! World state owned by the simulation
//!
//! One grid, the body arena, the broad-phase index, the agent's navigation
//! controller and the approach log. Everything a tick reads or writes lives
//! here.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::nav::NavigationController;
use crate::geometry::Rect;
use crate::grid::{Route, TileGrid};
use crate::physics::{ApproachLog, Body, BodyId, Collider, Quadtree};
use crate::renderer::Pose;
use crate::settings::Settings;

/// Fraction of a cell the agent's bounds cover
pub const AGENT_SCALE: f32 = 0.5;

/// Fraction of a cell a drifter's bounds cover
pub const DRIFTER_SCALE: f32 = 0.25;

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    pub grid: TileGrid,
    /// Arena; `BodyId(n)` is `bodies[n]`
    pub bodies: Vec<Body>,
    pub agent: Option<BodyId>,
    pub quadtree: Quadtree,
    pub nav: NavigationController,
    pub approach_log: ApproachLog,
    pub settings: Settings,
    pub rng: Pcg32,
    pub tick_count: u64,
}

impl World {
    /// Empty world over `grid`; the quadtree covers the whole grid
    pub fn new(grid: TileGrid, settings: &Settings) -> Self {
        let bounds = Rect::from_min_size(Vec2::ZERO, grid.world_size());
        Self {
            quadtree: Quadtree::new(
                bounds,
                settings.quadtree_capacity,
                settings.quadtree_max_levels,
            ),
            nav: NavigationController::new(settings.agent_speed)
                .with_step_limit(settings.step_limit),
            grid,
            bodies: Vec::new(),
            agent: None,
            approach_log: ApproachLog::new(),
            settings: settings.clone(),
            rng: Pcg32::seed_from_u64(settings.seed),
            tick_count: 0,
        }
    }

    /// Add a body to the arena and index it. The body's id is overwritten
    /// with its arena handle.
    pub fn spawn(&mut self, mut body: Body) -> BodyId {
        let id = BodyId(self.bodies.len() as u32);
        body.id = id;
        if let Some(bounds) = body.bounds() {
            if let Err(err) = self.quadtree.insert(id, bounds) {
                log::warn!("Spawned body {id} not indexed: {err}");
            }
        }
        self.bodies.push(body);
        id
    }

    /// Place the agent at the centre of the grid's start tile
    pub fn spawn_agent(&mut self) -> BodyId {
        let size = Vec2::splat(self.grid.cell_size() * AGENT_SCALE);
        let mut body = Body::new(BodyId(0), Vec2::ZERO, size);
        body.set_center(self.grid.cell_center(self.grid.start()));
        let id = self.spawn(body);
        self.agent = Some(id);
        log::info!("Agent {id} spawned at tile {}", self.grid.start());
        id
    }

    /// Scatter `count` bodies drifting along random axes from random
    /// walkable tiles
    pub fn spawn_drifters(&mut self, count: usize) -> Vec<BodyId> {
        let walkable: Vec<usize> = (0..self.grid.len())
            .filter(|&i| self.grid.is_walkable(i) && i != self.grid.start())
            .collect();
        if walkable.is_empty() {
            return Vec::new();
        }

        let size = Vec2::splat(self.grid.cell_size() * DRIFTER_SCALE);
        let speed = self.settings.agent_speed * 0.5;
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let tile = walkable[self.rng.random_range(0..walkable.len())];
            let direction = match self.rng.random_range(0..4) {
                0 => Vec2::X,
                1 => Vec2::Y,
                2 => Vec2::NEG_X,
                _ => Vec2::NEG_Y,
            };
            let mut body = Body::new(BodyId(0), Vec2::ZERO, size).with_velocity(direction, speed);
            body.set_center(self.grid.cell_center(tile));
            ids.push(self.spawn(body));
        }
        log::debug!("Spawned {} drifters", ids.len());
        ids
    }

    /// Hand the agent a route to walk
    pub fn follow(&mut self, route: Route) {
        self.nav.follow(route);
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.0 as usize)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id.0 as usize)
    }

    pub fn agent_body(&self) -> Option<&Body> {
        self.agent.and_then(|id| self.body(id))
    }

    /// Viewer pose for the raycast pass
    pub fn agent_pose(&self) -> Option<Pose> {
        self.agent_body().map(|body| Pose {
            position: body.center(),
            heading: body.angle,
        })
    }
}
