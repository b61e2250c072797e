//! Property tests over the pure building blocks

use std::collections::VecDeque;

use glam::Vec2;
use maze_runner::Rect;
use maze_runner::grid::{MazeAlgorithm, MazeGenerator, TileGrid, find_path};
use maze_runner::physics::{
    Bitmask, BodyId, Kinematics, MaskedSprite, Quadtree, bounding_box_collision, circle_collision,
    closest_approach, pixel_collision,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

fn algorithm() -> impl Strategy<Value = MazeAlgorithm> {
    prop_oneof![Just(MazeAlgorithm::Dfs), Just(MazeAlgorithm::Prim)]
}

/// Odd side lengths from 5 to 25
fn side() -> impl Strategy<Value = usize> {
    (2usize..=12).prop_map(|k| 2 * k + 1)
}

fn maze(width: usize, height: usize, algorithm: MazeAlgorithm, seed: u64) -> TileGrid {
    let generator = MazeGenerator::corner_to_corner(width, height, 8.0).unwrap();
    generator.generate(algorithm, &mut Pcg32::seed_from_u64(seed))
}

fn reachable_from(grid: &TileGrid, start: usize) -> usize {
    let mut seen = vec![false; grid.len()];
    let mut queue = VecDeque::from([start]);
    seen[start] = true;
    let mut count = 0;
    while let Some(tile) = queue.pop_front() {
        count += 1;
        for n in grid.open_neighbors(tile) {
            if !seen[n] {
                seen[n] = true;
                queue.push_back(n);
            }
        }
    }
    count
}

fn adjacent_open_pairs(grid: &TileGrid) -> usize {
    (0..grid.len())
        .filter(|&i| grid.is_walkable(i))
        .map(|i| grid.open_neighbors(i).filter(|&n| n > i).count())
        .sum()
}

proptest! {
    #[test]
    fn maze_is_a_spanning_tree(
        width in side(),
        height in side(),
        algorithm in algorithm(),
        seed in any::<u64>(),
    ) {
        let grid = maze(width, height, algorithm, seed);
        let walkable = grid.floor_count();

        prop_assert_eq!(reachable_from(&grid, grid.start()), walkable);
        prop_assert_eq!(adjacent_open_pairs(&grid), walkable - 1);
    }

    #[test]
    fn route_is_never_shorter_than_manhattan(
        width in side(),
        height in side(),
        algorithm in algorithm(),
        seed in any::<u64>(),
    ) {
        let grid = maze(width, height, algorithm, seed);
        let route = find_path(&grid, grid.start(), grid.goal());

        prop_assert!(!route.is_empty());
        prop_assert!(route.len() >= grid.manhattan(grid.start(), grid.goal()));
        prop_assert_eq!(route.goal(), Some(grid.goal()));

        // Consecutive tiles are 4-adjacent
        let mut prev = grid.start();
        for tile in route.travel_order() {
            prop_assert_eq!(grid.manhattan(prev, tile), 1);
            prev = tile;
        }
    }

    #[test]
    fn open_grid_route_matches_manhattan(
        width in 2usize..12,
        height in 2usize..12,
        start_seed in any::<usize>(),
        goal_seed in any::<usize>(),
    ) {
        let len = width * height;
        let (start, goal) = (start_seed % len, goal_seed % len);
        prop_assume!(start != goal);

        let grid = TileGrid::open(width, height, 1.0, start, goal).unwrap();
        prop_assert_eq!(find_path(&grid, start, goal).len(), grid.manhattan(start, goal));
    }

    #[test]
    fn quadtree_returns_exactly_what_was_inserted(
        rects in prop::collection::vec((0.0f32..90.0, 0.0f32..90.0, 0.0f32..10.0, 0.0f32..10.0), 0..60),
        capacity in 1usize..6,
    ) {
        let mut tree = Quadtree::new(Rect::new(0.0, 0.0, 100.0, 100.0), capacity, 5);
        for (i, &(x, y, w, h)) in rects.iter().enumerate() {
            prop_assert!(tree.insert(BodyId(i as u32), Rect::new(x, y, w, h)).is_ok());
        }

        let mut found = tree.query(&Rect::new(0.0, 0.0, 100.0, 100.0));
        found.sort_unstable();
        let expected: Vec<BodyId> = (0..rects.len() as u32).map(BodyId).collect();
        prop_assert_eq!(found, expected);
        prop_assert_eq!(tree.len(), rects.len());
        prop_assert!(tree.depth() <= 5);
    }

    #[test]
    fn bounding_box_collision_is_symmetric(
        a in (-50.0f32..50.0, -50.0f32..50.0, 0.0f32..20.0, 0.0f32..20.0),
        b in (-50.0f32..50.0, -50.0f32..50.0, 0.0f32..20.0, 0.0f32..20.0),
    ) {
        let (pa, sa) = (Vec2::new(a.0, a.1), Vec2::new(a.2, a.3));
        let (pb, sb) = (Vec2::new(b.0, b.1), Vec2::new(b.2, b.3));
        prop_assert_eq!(
            bounding_box_collision(pa, sa, pb, sb),
            bounding_box_collision(pb, sb, pa, sa)
        );
    }

    #[test]
    fn circle_overlaps_itself(x in -1e3f32..1e3, y in -1e3f32..1e3, r in 0.001f32..100.0) {
        let p = Vec2::new(x, y);
        prop_assert!(circle_collision(p, r, p, r));
    }

    #[test]
    fn pixel_collision_needs_box_overlap(
        w in 1usize..12,
        h in 1usize..12,
        gap in 0.0f32..20.0,
        dy in -20.0f32..20.0,
    ) {
        let a = Bitmask::solid(w, h);
        let b = Bitmask::solid(h, w);
        let left = MaskedSprite::new(&a, Vec2::ZERO);
        let right = MaskedSprite::new(&b, Vec2::new(w as f32 + gap, dy));
        prop_assert!(!pixel_collision(&left, &right));
    }

    #[test]
    fn static_bodies_have_no_closest_approach(
        ax in -100.0f32..100.0,
        ay in -100.0f32..100.0,
        bx in -100.0f32..100.0,
        by in -100.0f32..100.0,
    ) {
        let a = Kinematics { position: Vec2::new(ax, ay), ..Default::default() };
        let b = Kinematics { position: Vec2::new(bx, by), ..Default::default() };
        prop_assert_eq!(closest_approach(&a, &b, None), None);
    }
}
