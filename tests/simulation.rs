//! End-to-end runs: generate, persist, solve, walk

use maze_runner::consts::SIM_DT;
use maze_runner::grid::{MazeAlgorithm, MazeGenerator, TileGrid, find_path, read_layout, write_layout};
use maze_runner::sim::{NavState, TickInput, World, tick};
use maze_runner::{MazeSize, Settings};
use rand::SeedableRng;
use rand_pcg::Pcg32;

fn settings(size: MazeSize, algorithm: MazeAlgorithm) -> Settings {
    let mut settings = Settings::from_preset(size);
    settings.algorithm = algorithm;
    settings.seed = 42;
    settings.view.ray_count = 24;
    settings
}

fn build(settings: &Settings) -> TileGrid {
    let generator =
        MazeGenerator::corner_to_corner(settings.maze_width, settings.maze_height, settings.cell_size)
            .unwrap();
    generator.generate(settings.algorithm, &mut Pcg32::seed_from_u64(settings.seed))
}

/// Tick until arrival; returns the tick count and total contacts
fn run(world: &mut World, max_ticks: u64, turn_every: Option<u64>) -> (u64, usize) {
    let mut contacts = 0;
    while world.tick_count < max_ticks {
        let input = TickInput {
            steer: None,
            begin_turn: turn_every.is_some_and(|n| world.tick_count % n == 0),
        };
        let report = tick(world, &input, SIM_DT);
        contacts += report.contacts.len();
        if report.nav == NavState::Arrived {
            break;
        }
    }
    (world.tick_count, contacts)
}

#[test]
fn test_agent_walks_generated_maze() {
    for algorithm in [MazeAlgorithm::Dfs, MazeAlgorithm::Prim] {
        let settings = settings(MazeSize::Small, algorithm);
        let grid = build(&settings);
        let route = find_path(&grid, grid.start(), grid.goal());
        assert!(!route.is_empty());

        let mut world = World::new(grid, &settings);
        world.spawn_agent();
        world.spawn_drifters(settings.drifters);
        world.follow(route);

        let (ticks, _) = run(&mut world, settings.max_ticks, None);
        assert!(ticks < settings.max_ticks, "{algorithm:?} run did not finish");
        assert_eq!(world.nav.state(), NavState::Arrived);
        assert_eq!(
            world.agent_pose().unwrap().position,
            world.grid.cell_center(world.grid.goal())
        );
    }
}

#[test]
fn test_rebuild_and_update_agree_on_contacts() {
    let base = settings(MazeSize::Small, MazeAlgorithm::Dfs);
    let mut rebuilt = base.clone();
    rebuilt.rebuild_quadtree = true;

    let outcome = |settings: &Settings| {
        let grid = build(settings);
        let route = find_path(&grid, grid.start(), grid.goal());
        let mut world = World::new(grid, settings);
        world.spawn_agent();
        world.spawn_drifters(settings.drifters);
        world.follow(route);
        run(&mut world, settings.max_ticks, None)
    };

    assert_eq!(outcome(&base), outcome(&rebuilt));
}

#[test]
fn test_discrete_turns_still_arrive() {
    let mut settings = settings(MazeSize::Small, MazeAlgorithm::Prim);
    settings.step_limit = Some(2);
    let grid = build(&settings);
    let route = find_path(&grid, grid.start(), grid.goal());
    let tiles = route.len();

    let mut world = World::new(grid, &settings);
    world.spawn_agent();
    world.follow(route);

    let (ticks, _) = run(&mut world, settings.max_ticks, Some(60));
    assert_eq!(world.nav.state(), NavState::Arrived);
    // At most two tiles per one-second turn
    assert!(ticks as usize >= (tiles / 2).saturating_sub(1) * 60);
}

#[test]
fn test_layout_file_reproduces_maze() {
    let settings = settings(MazeSize::Medium, MazeAlgorithm::Dfs);
    let grid = build(&settings);
    let path = std::env::temp_dir().join(format!("maze-runner-sim-{}.txt", std::process::id()));

    write_layout(&path, &grid, settings.tile_codes).unwrap();
    let loaded = read_layout(
        &path,
        settings.maze_width,
        settings.maze_height,
        settings.cell_size,
        grid.start(),
        grid.goal(),
        settings.tile_codes,
    )
    .unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded, grid);
    assert_eq!(
        find_path(&loaded, loaded.start(), loaded.goal()),
        find_path(&grid, grid.start(), grid.goal())
    );
}
