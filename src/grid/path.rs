//! A* routing over the tile grid
//!
//! 4-connected, unit step cost, Manhattan heuristic. Ties on f are broken
//! by insertion order and neighbours are expanded left, right, up, down, so a
//! given grid always yields the same route.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use super::tile::TileGrid;

/// Tiles still to be entered, stored goal-first.
///
/// The back of the storage is the next tile to enter; the start tile is never
/// part of a route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    tiles: Vec<usize>,
}

impl Route {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from storage order (goal first, next tile last)
    pub fn from_goal_first(tiles: Vec<usize>) -> Self {
        Self { tiles }
    }

    /// Build from walking order (next tile first, goal last)
    pub fn from_travel_order<I: IntoIterator<Item = usize>>(tiles: I) -> Self {
        let mut tiles: Vec<usize> = tiles.into_iter().collect();
        tiles.reverse();
        Self { tiles }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Next tile to enter
    #[inline]
    pub fn peek_next(&self) -> Option<usize> {
        self.tiles.last().copied()
    }

    pub fn pop_next(&mut self) -> Option<usize> {
        self.tiles.pop()
    }

    pub fn goal(&self) -> Option<usize> {
        self.tiles.first().copied()
    }

    pub fn contains(&self, tile: usize) -> bool {
        self.tiles.contains(&tile)
    }

    pub fn as_goal_first(&self) -> &[usize] {
        &self.tiles
    }

    pub fn travel_order(&self) -> impl Iterator<Item = usize> + '_ {
        self.tiles.iter().rev().copied()
    }

    /// Storage position of the entry closest to `tile` by index distance.
    /// Ties go to the entry nearest the goal.
    pub fn closest_entry(&self, tile: usize) -> Option<usize> {
        self.tiles
            .iter()
            .enumerate()
            .min_by_key(|&(pos, &t)| (t.abs_diff(tile), pos))
            .map(|(pos, _)| pos)
    }

    /// Drop every entry between the agent and storage position `pos`, making
    /// that entry the next tile to enter.
    pub fn rejoin_at(&mut self, pos: usize) {
        self.tiles.truncate(pos + 1);
    }
}

/// Shortest 4-connected route from `start` to `goal`.
///
/// Returns an empty route when the goal is unreachable, when either endpoint
/// is off the grid or a wall, or when `start == goal`.
pub fn find_path(grid: &TileGrid, start: usize, goal: usize) -> Route {
    if !grid.is_walkable(start) || !grid.is_walkable(goal) {
        log::warn!("A* endpoints {start} -> {goal} are not walkable");
        return Route::new();
    }
    if start == goal {
        return Route::new();
    }

    let cells = grid.len();
    let mut g_cost = vec![usize::MAX; cells];
    let mut came_from = vec![usize::MAX; cells];
    let mut closed = vec![false; cells];
    let mut open = BinaryHeap::new();
    let mut seq: u64 = 0;

    g_cost[start] = 0;
    open.push(Reverse((grid.manhattan(start, goal), seq, start)));

    let mut expanded = 0usize;
    let mut found = false;

    while let Some(Reverse((_, _, current))) = open.pop() {
        if closed[current] {
            continue;
        }
        closed[current] = true;
        expanded += 1;

        if current == goal {
            found = true;
            break;
        }

        let next_g = g_cost[current] + 1;
        for neighbor in grid.open_neighbors(current) {
            if closed[neighbor] || next_g >= g_cost[neighbor] {
                continue;
            }
            g_cost[neighbor] = next_g;
            came_from[neighbor] = current;
            seq += 1;
            open.push(Reverse((next_g + grid.manhattan(neighbor, goal), seq, neighbor)));
        }
    }

    if !found {
        log::warn!("A* found no route {start} -> {goal} after {expanded} expansions");
        return Route::new();
    }

    let mut tiles = Vec::with_capacity(g_cost[goal]);
    let mut cursor = goal;
    while cursor != start {
        tiles.push(cursor);
        cursor = came_from[cursor];
    }

    log::debug!(
        "A* route {start} -> {goal}: {} steps, {expanded} expansions",
        tiles.len()
    );
    Route::from_goal_first(tiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_grid_route_is_deterministic() {
        let grid = TileGrid::open(4, 4, 1.0, 0, 15).unwrap();
        let route = find_path(&grid, 0, 15);
        assert_eq!(route.len(), 6);
        assert_eq!(route.travel_order().collect::<Vec<_>>(), vec![1, 2, 3, 7, 11, 15]);
        assert_eq!(route.as_goal_first(), &[15, 11, 7, 3, 2, 1]);
        assert_eq!(route.peek_next(), Some(1));
        assert_eq!(route.goal(), Some(15));
    }

    #[test]
    fn test_route_detours_around_walls() {
        let grid = TileGrid::from_ascii(&["S#.", ".#.", "..G"], 1.0).unwrap();
        let route = find_path(&grid, grid.start(), grid.goal());
        assert_eq!(route.travel_order().collect::<Vec<_>>(), vec![3, 6, 7, 8]);
    }

    #[test]
    fn test_unreachable_goal_gives_empty_route() {
        let grid = TileGrid::from_ascii(&["S#G"], 1.0).unwrap();
        assert!(find_path(&grid, grid.start(), grid.goal()).is_empty());
    }

    #[test]
    fn test_wall_endpoint_gives_empty_route() {
        let grid = TileGrid::from_ascii(&["S#G", "..."], 1.0).unwrap();
        assert!(find_path(&grid, 1, grid.goal()).is_empty());
        assert!(find_path(&grid, grid.start(), 99).is_empty());
    }

    #[test]
    fn test_longer_than_manhattan_when_blocked() {
        let grid = TileGrid::from_ascii(&["S.#..", "..#..", "....G"], 1.0).unwrap();
        let route = find_path(&grid, grid.start(), grid.goal());
        assert_eq!(route.len(), grid.manhattan(grid.start(), grid.goal()));

        let blocked = TileGrid::from_ascii(&["S.#.G", "..#..", "....."], 1.0).unwrap();
        let route = find_path(&blocked, blocked.start(), blocked.goal());
        assert!(route.len() > blocked.manhattan(blocked.start(), blocked.goal()));
    }

    #[test]
    fn test_closest_entry_and_rejoin() {
        let mut route = Route::from_travel_order([5, 9, 20]);
        assert_eq!(route.as_goal_first(), &[20, 9, 5]);

        let pos = route.closest_entry(10).unwrap();
        assert_eq!(route.as_goal_first()[pos], 9);
        route.rejoin_at(pos);
        assert_eq!(route.peek_next(), Some(9));
        assert_eq!(route.len(), 2);
    }

    #[test]
    fn test_closest_entry_tie_prefers_goal_end() {
        // 4 and 8 are both 2 away from 6; 8 is nearer the goal
        let route = Route::from_travel_order([4, 8]);
        let pos = route.closest_entry(6).unwrap();
        assert_eq!(route.as_goal_first()[pos], 8);
    }
}
