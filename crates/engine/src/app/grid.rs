//! Walkability grid and A* search over the 8-connected neighborhood.
//!
//! The open set is a linear minimum scan, so each pop is O(V). That is the
//! scalability limit of this module: fine for office-sized grids of a few
//! hundred cells, wrong for anything map-scale (which would want a binary
//! heap).

use std::f32::consts::SQRT_2;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Integer tile coordinate. Fractional positions between tile centers are
/// a [`GridPoint`](crate::app::GridPoint) concern; the grid itself only
/// knows whole tiles.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },
    #[error("row {row} has {actual} cells, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Boolean walkability mask with immutable dimensions. Every query outside
/// the bounds answers "not walkable" and every mutation outside the bounds
/// is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkGrid {
    width: u32,
    height: u32,
    walkable: Vec<bool>,
}

const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

impl WalkGrid {
    /// Creates a fully walkable grid.
    pub fn new(width: u32, height: u32) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroDimension { width, height });
        }
        Ok(Self {
            width,
            height,
            walkable: vec![true; width as usize * height as usize],
        })
    }

    /// Builds a grid from row-major walkability rows (row 0 is y = 0).
    pub fn from_rows(rows: &[Vec<bool>]) -> Result<Self, GridError> {
        let height = rows.len() as u32;
        let width = rows.first().map(|row| row.len()).unwrap_or(0) as u32;
        if width == 0 || height == 0 {
            return Err(GridError::ZeroDimension { width, height });
        }
        let mut walkable = Vec::with_capacity(width as usize * height as usize);
        for (row_index, row) in rows.iter().enumerate() {
            if row.len() != width as usize {
                return Err(GridError::RaggedRows {
                    row: row_index,
                    expected: width as usize,
                    actual: row.len(),
                });
            }
            walkable.extend_from_slice(row);
        }
        Ok(Self {
            width,
            height,
            walkable,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    fn index_of(&self, pos: GridPos) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some(pos.y as usize * self.width as usize + pos.x as usize)
    }

    pub fn is_walkable(&self, pos: GridPos) -> bool {
        self.index_of(pos)
            .and_then(|index| self.walkable.get(index))
            .copied()
            .unwrap_or(false)
    }

    pub fn set_walkable(&mut self, pos: GridPos, walkable: bool) {
        if let Some(index) = self.index_of(pos) {
            self.walkable[index] = walkable;
        }
    }

    /// A* shortest path from `start` to `goal`, inclusive of both.
    ///
    /// Returns an empty path when either endpoint is unwalkable or out of
    /// bounds, or when no route exists; returns `[start]` when the
    /// endpoints coincide. Diagonal steps cost √2 and are only taken when
    /// both orthogonally adjacent tiles are walkable, so a path can never
    /// clip through a blocked corner. Ties on `f = g + h` resolve to the
    /// node discovered first.
    pub fn find_path(&self, start: GridPos, goal: GridPos) -> Vec<GridPos> {
        if !self.is_walkable(start) || !self.is_walkable(goal) {
            return Vec::new();
        }
        if start == goal {
            return vec![start];
        }

        let node_count = self.width as usize * self.height as usize;
        let mut closed = vec![false; node_count];
        let mut best_g = vec![f32::INFINITY; node_count];
        let mut parent = vec![None::<usize>; node_count];
        let mut open: Vec<OpenNode> = Vec::new();
        let mut next_insertion = 0u64;

        let start_index = match self.index_of(start) {
            Some(index) => index,
            None => return Vec::new(),
        };
        let goal_index = match self.index_of(goal) {
            Some(index) => index,
            None => return Vec::new(),
        };

        best_g[start_index] = 0.0;
        open.push(OpenNode {
            pos: start,
            g: 0.0,
            f: octile_distance(start, goal),
            insertion_order: next_insertion,
        });
        next_insertion += 1;

        while !open.is_empty() {
            let best_index = pick_best_open_node_index(&open);
            let current = open.swap_remove(best_index);
            let Some(current_index) = self.index_of(current.pos) else {
                continue;
            };
            if closed[current_index] {
                continue;
            }
            closed[current_index] = true;

            if current.pos == goal {
                return self.reconstruct_path(&parent, start_index, goal_index);
            }

            for (dx, dy) in NEIGHBOR_OFFSETS {
                let neighbor = GridPos::new(current.pos.x + dx, current.pos.y + dy);
                if !self.is_walkable(neighbor) {
                    continue;
                }
                let diagonal = dx != 0 && dy != 0;
                if diagonal
                    && !(self.is_walkable(GridPos::new(current.pos.x + dx, current.pos.y))
                        && self.is_walkable(GridPos::new(current.pos.x, current.pos.y + dy)))
                {
                    continue;
                }
                let Some(neighbor_index) = self.index_of(neighbor) else {
                    continue;
                };
                if closed[neighbor_index] {
                    continue;
                }

                let step_cost = if diagonal { SQRT_2 } else { 1.0 };
                let tentative_g = current.g + step_cost;
                if tentative_g >= best_g[neighbor_index] {
                    continue;
                }

                best_g[neighbor_index] = tentative_g;
                parent[neighbor_index] = Some(current_index);
                open.push(OpenNode {
                    pos: neighbor,
                    g: tentative_g,
                    f: tentative_g + octile_distance(neighbor, goal),
                    insertion_order: next_insertion,
                });
                next_insertion += 1;
            }
        }

        Vec::new()
    }

    fn reconstruct_path(
        &self,
        parent: &[Option<usize>],
        start_index: usize,
        goal_index: usize,
    ) -> Vec<GridPos> {
        let mut indices = vec![goal_index];
        let mut cursor = goal_index;
        while cursor != start_index {
            match parent.get(cursor).copied().flatten() {
                Some(previous) => {
                    cursor = previous;
                    indices.push(cursor);
                }
                None => return Vec::new(),
            }
        }
        indices.reverse();
        indices
            .into_iter()
            .map(|index| GridPos {
                x: (index % self.width as usize) as i32,
                y: (index / self.width as usize) as i32,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenNode {
    pos: GridPos,
    g: f32,
    f: f32,
    insertion_order: u64,
}

fn pick_best_open_node_index(open: &[OpenNode]) -> usize {
    let mut best_index = 0usize;
    for index in 1..open.len() {
        let current = open[index];
        let best = open[best_index];
        let better = current.f < best.f
            || (current.f == best.f && current.insertion_order < best.insertion_order);
        if better {
            best_index = index;
        }
    }
    best_index
}

/// Heuristic for 8-directional movement with unit cardinal cost and √2
/// diagonal cost. Admissible and consistent for that cost model.
pub fn octile_distance(a: GridPos, b: GridPos) -> f32 {
    let dx = a.x.abs_diff(b.x) as f32;
    let dy = a.y.abs_diff(b.y) as f32;
    dx.max(dy) + (SQRT_2 - 1.0) * dx.min(dy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_blocked(width: u32, height: u32, blocked: &[(i32, i32)]) -> WalkGrid {
        let mut grid = WalkGrid::new(width, height).expect("grid");
        for &(x, y) in blocked {
            grid.set_walkable(GridPos::new(x, y), false);
        }
        grid
    }

    fn path_cost(path: &[GridPos]) -> f32 {
        path.windows(2)
            .map(|pair| {
                let dx = (pair[1].x - pair[0].x).abs();
                let dy = (pair[1].y - pair[0].y).abs();
                assert!(dx <= 1 && dy <= 1, "step is not grid-adjacent: {pair:?}");
                if dx == 1 && dy == 1 {
                    SQRT_2
                } else {
                    1.0
                }
            })
            .sum()
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert_eq!(
            WalkGrid::new(0, 4).expect_err("err"),
            GridError::ZeroDimension {
                width: 0,
                height: 4
            }
        );
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let rows = vec![vec![true, true], vec![true]];
        assert_eq!(
            WalkGrid::from_rows(&rows).expect_err("err"),
            GridError::RaggedRows {
                row: 1,
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn out_of_bounds_queries_are_never_walkable() {
        let grid = WalkGrid::new(3, 3).expect("grid");
        assert!(!grid.is_walkable(GridPos::new(-1, 0)));
        assert!(!grid.is_walkable(GridPos::new(0, -1)));
        assert!(!grid.is_walkable(GridPos::new(3, 0)));
        assert!(!grid.is_walkable(GridPos::new(0, 3)));
    }

    #[test]
    fn out_of_bounds_set_walkable_is_a_noop() {
        let mut grid = WalkGrid::new(2, 2).expect("grid");
        grid.set_walkable(GridPos::new(5, 5), false);
        grid.set_walkable(GridPos::new(-1, 1), false);
        for x in 0..2 {
            for y in 0..2 {
                assert!(grid.is_walkable(GridPos::new(x, y)));
            }
        }
    }

    #[test]
    fn same_tile_path_is_a_single_element() {
        let grid = WalkGrid::new(4, 4).expect("grid");
        let path = grid.find_path(GridPos::new(2, 2), GridPos::new(2, 2));
        assert_eq!(path, vec![GridPos::new(2, 2)]);
    }

    #[test]
    fn unwalkable_goal_yields_empty_path() {
        let grid = grid_with_blocked(4, 4, &[(3, 3)]);
        assert!(grid
            .find_path(GridPos::new(0, 0), GridPos::new(3, 3))
            .is_empty());
    }

    #[test]
    fn out_of_bounds_goal_yields_empty_path() {
        let grid = WalkGrid::new(4, 4).expect("grid");
        assert!(grid
            .find_path(GridPos::new(0, 0), GridPos::new(9, 9))
            .is_empty());
    }

    #[test]
    fn walled_off_goal_yields_empty_path() {
        let grid = grid_with_blocked(5, 5, &[(3, 0), (3, 1), (3, 2), (3, 3), (3, 4)]);
        assert!(grid
            .find_path(GridPos::new(0, 2), GridPos::new(4, 2))
            .is_empty());
    }

    #[test]
    fn open_grid_path_cost_equals_octile_distance() {
        let grid = WalkGrid::new(12, 10).expect("grid");
        let start = GridPos::new(1, 1);
        let goal = GridPos::new(9, 6);
        let path = grid.find_path(start, goal);
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert!((path_cost(&path) - octile_distance(start, goal)).abs() < 0.0001);
    }

    #[test]
    fn every_path_step_is_walkable_and_adjacent() {
        let grid = grid_with_blocked(7, 5, &[(3, 0), (3, 1), (3, 2), (3, 3)]);
        let path = grid.find_path(GridPos::new(1, 2), GridPos::new(5, 2));
        assert!(!path.is_empty());
        for step in &path {
            assert!(grid.is_walkable(*step));
        }
        // path_cost asserts adjacency on every window
        let _ = path_cost(&path);
    }

    #[test]
    fn diagonal_steps_never_cut_blocked_corners() {
        // Both orthogonal neighbors of the only diagonal shortcut are
        // blocked, so the path must go the long way around.
        let grid = grid_with_blocked(3, 3, &[(1, 0), (0, 1)]);
        let path = grid.find_path(GridPos::new(0, 0), GridPos::new(2, 2));
        assert!(path.is_empty(), "corner squeeze should be impassable");

        // With one orthogonal tile open the diagonal is still forbidden,
        // forcing the detour through the open tile.
        let grid = grid_with_blocked(3, 3, &[(1, 0)]);
        let path = grid.find_path(GridPos::new(0, 0), GridPos::new(1, 1));
        assert_eq!(path, vec![GridPos::new(0, 0), GridPos::new(0, 1), GridPos::new(1, 1)]);
    }

    #[test]
    fn path_routes_around_an_obstacle() {
        let grid = grid_with_blocked(7, 5, &[(3, 1), (3, 2), (3, 3)]);
        let start = GridPos::new(1, 2);
        let goal = GridPos::new(5, 2);
        let path = grid.find_path(start, goal);
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert!(path.iter().all(|step| grid.is_walkable(*step)));
        assert!(path_cost(&path) > octile_distance(start, goal));
    }

    #[test]
    fn search_is_deterministic_on_symmetric_maps() {
        let grid = grid_with_blocked(5, 5, &[(2, 2)]);
        let first = grid.find_path(GridPos::new(0, 2), GridPos::new(4, 2));
        let second = grid.find_path(GridPos::new(0, 2), GridPos::new(4, 2));
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn octile_distance_matches_known_values() {
        let origin = GridPos::new(0, 0);
        assert!((octile_distance(origin, GridPos::new(3, 0)) - 3.0).abs() < 0.0001);
        assert!((octile_distance(origin, GridPos::new(3, 3)) - 3.0 * SQRT_2).abs() < 0.0001);
        assert!((octile_distance(origin, GridPos::new(5, 2)) - (3.0 + 2.0 * SQRT_2)).abs() < 0.0001);
    }
}
