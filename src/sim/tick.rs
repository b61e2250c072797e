//! Fixed timestep simulation tick
//!
//! Order per tick: steering input, navigation, body integration, broad-phase
//! maintenance, narrow phase on candidate pairs, then the raycast pass once
//! every position is final.

use serde::{Deserialize, Serialize};

use super::nav::NavState;
use super::state::World;
use crate::physics::{BodyId, Collider, Overlap, closest_approach, colliders_overlap};
use crate::renderer::{Frame, render};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickInput {
    /// Manual heading change in degrees
    pub steer: Option<f32>,
    /// Start a new turn in discrete-step mode
    pub begin_turn: bool,
}

/// A narrow-phase hit between two bodies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub a: BodyId,
    pub b: BodyId,
    pub overlap: Overlap,
    /// Time of closest approach, when there is relative motion
    pub approach: Option<f32>,
}

/// What one tick produced
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub nav: NavState,
    /// Bodies the quadtree had to relocate (0 when rebuilding)
    pub relocated: usize,
    /// Candidate pairs handed to the narrow phase
    pub candidates: usize,
    pub contacts: Vec<Contact>,
    pub frame: Frame,
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput, dt: f32) -> TickReport {
    world.tick_count += 1;

    // Input
    if input.begin_turn {
        world.nav.begin_turn();
    }
    let agent_id = world.agent;
    if let (Some(delta), Some(id)) = (input.steer, agent_id) {
        if let Some(agent) = world.bodies.get_mut(id.0 as usize) {
            world.nav.steer(agent, delta);
        }
    }

    // Navigation
    let agent = agent_id.and_then(|id| world.bodies.get_mut(id.0 as usize));
    let nav = world.nav.step(agent, Some(&world.grid), dt);

    // Everything else integrates freely and turns back at walls
    for body in world.bodies.iter_mut() {
        if Some(body.id) == agent_id || !body.moving {
            continue;
        }
        let before = body.pos;
        body.step(dt);
        let blocked = world
            .grid
            .tile_index_at(body.center())
            .is_none_or(|tile| !world.grid.is_walkable(tile));
        if blocked {
            body.pos = before;
            body.direction = -body.direction;
            body.acceleration = -body.acceleration;
        }
    }

    // Broad phase
    let relocated = if world.settings.rebuild_quadtree {
        world.quadtree.rebuild(&world.bodies);
        0
    } else {
        let mut relocated = world.quadtree.update(&world.bodies);
        // A halted agent may still have been snapped this tick
        let halted = world
            .agent_body()
            .filter(|agent| !agent.moving)
            .and_then(|agent| Some((agent.id, agent.bounds()?)));
        if let Some((id, bounds)) = halted {
            if let Ok(true) = world.quadtree.relocate(id, bounds) {
                relocated += 1;
            }
        }
        relocated
    };

    // Narrow phase
    let mut candidates = 0;
    let mut contacts = Vec::new();
    for body in &world.bodies {
        let Some(bounds) = body.bounds() else {
            continue;
        };
        let mut others = world.quadtree.query(&bounds);
        others.sort_unstable();
        for other_id in others.into_iter().filter(|&o| o > body.id) {
            let Some(other) = world.bodies.get(other_id.0 as usize) else {
                continue;
            };
            candidates += 1;

            let approach = match (body.kinematics(), other.kinematics()) {
                (Some(ka), Some(kb)) => closest_approach(&ka, &kb, Some(&mut world.approach_log)),
                _ => None,
            };
            if let Some(overlap) = colliders_overlap(body, other) {
                log::debug!("Contact {} <-> {} ({overlap:?})", body.id, other_id);
                contacts.push(Contact {
                    a: body.id,
                    b: other_id,
                    overlap,
                    approach,
                });
            }
        }
    }

    // View
    let frame = render(Some(&world.grid), world.agent_pose(), &world.settings.view);

    TickReport {
        nav,
        relocated,
        candidates,
        contacts,
        frame,
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::consts::SIM_DT;
    use crate::grid::{TileGrid, find_path};
    use crate::physics::Body;
    use crate::settings::{MazeSize, Settings};

    fn open_world() -> World {
        let grid = TileGrid::open(6, 6, 16.0, 0, 35).unwrap();
        let mut settings = Settings::from_preset(MazeSize::Small);
        settings.view.ray_count = 16;
        World::new(grid, &settings)
    }

    #[test]
    fn test_tick_walks_agent_to_goal() {
        let mut world = open_world();
        world.spawn_agent();
        let route = find_path(&world.grid, 0, 35);
        world.follow(route);

        let mut last = NavState::Following;
        for _ in 0..2_000 {
            last = tick(&mut world, &TickInput::default(), SIM_DT).nav;
            if last == NavState::Arrived {
                break;
            }
        }
        assert_eq!(last, NavState::Arrived);
        assert_eq!(world.agent_pose().unwrap().position, world.grid.cell_center(35));
    }

    #[test]
    fn test_overlapping_bodies_report_contact_once() {
        let mut world = open_world();
        let a = world.spawn(Body::new(BodyId(0), Vec2::new(20.0, 20.0), Vec2::splat(8.0)).with_velocity(Vec2::X, 1.0));
        let b = world.spawn(Body::new(BodyId(0), Vec2::new(24.0, 22.0), Vec2::splat(8.0)));

        let report = tick(&mut world, &TickInput::default(), SIM_DT);
        assert_eq!(report.contacts.len(), 1);
        let contact = report.contacts[0];
        assert_eq!((contact.a, contact.b), (a, b));
        assert_eq!(contact.overlap, Overlap::Bounds);
        assert_eq!(world.approach_log.calls, 1);
        assert_eq!(world.approach_log.times.len(), 1);
    }

    #[test]
    fn test_steer_causes_rejoin() {
        let mut world = open_world();
        world.spawn_agent();
        world.follow(find_path(&world.grid, 0, 35));
        tick(&mut world, &TickInput::default(), SIM_DT);

        let input = TickInput {
            steer: Some(30.0),
            begin_turn: false,
        };
        tick(&mut world, &input, SIM_DT);
        assert_eq!(world.nav.deviations(), 1);
        assert!(world.nav.last_rejoin().is_some());
    }

    #[test]
    fn test_frame_follows_agent() {
        let grid = TileGrid::from_ascii(&["#####", "#S.G#", "#####"], 16.0).unwrap();
        let mut world = World::new(grid, &Settings::from_preset(MazeSize::Small));
        world.spawn_agent();

        let report = tick(&mut world, &TickInput::default(), SIM_DT);
        assert_eq!(report.nav, NavState::Idle);
        assert!(!report.frame.slices.is_empty());
    }

    #[test]
    fn test_ticks_are_deterministic() {
        let run = || {
            let mut world = open_world();
            world.spawn_agent();
            world.spawn_drifters(4);
            world.follow(find_path(&world.grid, 0, 35));
            let mut contacts = Vec::new();
            for n in 0..300 {
                let input = TickInput {
                    steer: (n == 40).then_some(15.0),
                    begin_turn: false,
                };
                contacts.extend(tick(&mut world, &input, SIM_DT).contacts);
            }
            let positions: Vec<Vec2> = world.bodies.iter().map(|b| b.pos).collect();
            (positions, contacts, world.approach_log.clone())
        };
        assert_eq!(run(), run());
    }
}
