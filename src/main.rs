//! Maze Runner entry point
//!
//! Headless run: load settings, build a maze, solve it and drive the agent
//! through the full tick pipeline until it arrives.
//!
//! Usage: `maze-runner [small|medium|large] [--settings PATH]
//! [--save-settings PATH] [--layout-out PATH] [--layout-in PATH]`

#[cfg(not(target_arch = "wasm32"))]
use std::error::Error;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use maze_runner::MazeSize;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Parser)]
#[command(name = "maze-runner", version, about = "Generate a maze and walk an agent through it")]
struct Args {
    /// Maze preset: small, medium or large
    #[arg(value_parser = parse_size)]
    size: Option<MazeSize>,
    /// Load settings from this JSON file
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,
    /// Write the effective settings to this JSON file
    #[arg(long, value_name = "PATH")]
    save_settings: Option<PathBuf>,
    /// Write the maze layout to this file
    #[arg(long, value_name = "PATH")]
    layout_out: Option<PathBuf>,
    /// Read the maze layout from this file instead of generating one
    #[arg(long, value_name = "PATH")]
    layout_in: Option<PathBuf>,
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_size(value: &str) -> Result<MazeSize, String> {
    MazeSize::from_str(value).ok_or_else(|| format!("unknown maze size {value:?}"))
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn Error>> {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use maze_runner::Settings;
    use maze_runner::consts::SIM_DT;
    use maze_runner::grid::{MazeGenerator, find_path, read_layout, write_layout};
    use maze_runner::sim::{NavState, TickInput, World, tick};

    let args = Args::parse();

    env_logger::init();
    log::info!("Maze Runner starting...");

    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(size) = args.size {
        settings.apply_preset(size);
    }
    if let Some(path) = &args.save_settings {
        settings.save(path)?;
    }

    let generator =
        MazeGenerator::corner_to_corner(settings.maze_width, settings.maze_height, settings.cell_size)?;
    let grid = match &args.layout_in {
        Some(path) => read_layout(
            path,
            settings.maze_width,
            settings.maze_height,
            settings.cell_size,
            generator.start(),
            generator.goal(),
            settings.tile_codes,
        )?,
        None => {
            let mut rng = Pcg32::seed_from_u64(settings.seed);
            generator.generate(settings.algorithm, &mut rng)
        }
    };
    if let Some(path) = &args.layout_out {
        write_layout(path, &grid, settings.tile_codes)?;
    }

    let route = find_path(&grid, grid.start(), grid.goal());
    if route.is_empty() {
        log::warn!("Goal {} is unreachable from {}", grid.goal(), grid.start());
    } else {
        log::info!("Route found: {} tiles", route.len());
    }

    let mut world = World::new(grid, &settings);
    world.spawn_agent();
    world.spawn_drifters(settings.drifters);
    world.follow(route);

    let mut contacts = 0usize;
    let mut state = world.nav.state();
    while world.tick_count < settings.max_ticks {
        let input = TickInput {
            steer: None,
            // One turn per simulated second in discrete-step mode
            begin_turn: settings.step_limit.is_some() && world.tick_count % 60 == 0,
        };
        let report = tick(&mut world, &input, SIM_DT);
        contacts += report.contacts.len();
        state = report.nav;

        if world.tick_count % 600 == 0 {
            log::info!(
                "tick {}: nav {}, {} waypoints left, {} wall slices",
                world.tick_count,
                state.as_str(),
                world.nav.route().len(),
                report.frame.slices.len()
            );
        }
        if state == NavState::Arrived {
            break;
        }
    }

    log::info!(
        "Finished after {} ticks: nav {}, {} contacts, {} approach checks",
        world.tick_count,
        state.as_str(),
        contacts,
        world.approach_log.calls
    );
    if state != NavState::Arrived {
        log::warn!("Agent did not reach the goal within {} ticks", settings.max_ticks);
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless runner on the web
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_args_take_size_and_paths() {
        let args = Args::try_parse_from(["maze-runner", "large", "--layout-out", "maze.txt"]).unwrap();
        assert_eq!(args.size, Some(MazeSize::Large));
        assert_eq!(args.layout_out, Some(PathBuf::from("maze.txt")));
        assert!(args.settings.is_none() && args.layout_in.is_none());
    }

    #[test]
    fn test_args_default_to_nothing() {
        let args = Args::try_parse_from(["maze-runner"]).unwrap();
        assert!(args.size.is_none());
        assert!(args.save_settings.is_none());
    }

    #[test]
    fn test_args_reject_unknown_size() {
        assert!(Args::try_parse_from(["maze-runner", "huge"]).is_err());
        assert!(Args::try_parse_from(["maze-runner", "--settings"]).is_err());
    }
}
