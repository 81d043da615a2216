//! Grid pathfinding
//!
//! 8-connected A* over the occupancy grid. Step costs are fixed-point
//! integers (1000 orthogonal, 1500 diagonal) so priority comparisons are
//! exact and every query is bit-for-bit reproducible. There is no closed
//! set: correctness rests on the best-known-cost array alone, and a popped
//! entry whose cost has since improved is just redundant work.
//!
//! The open list is a flat unordered array. Selection is a linear scan for
//! the minimum priority where the first minimum encountered wins; any
//! batched or vectorized scan must preserve that exact tie-break. Removal is
//! swap-with-last.

use glam::IVec2;

use super::grid::{GRID_DIM, OccupancyGrid, cell_coords, cell_index};

/// Maximum number of waypoints a query may return
pub const MAX_PATH_LEN: usize = 4096;

const OPEN_LIST_CAP: usize = 65536 + 8;
const CELLS: usize = (GRID_DIM * GRID_DIM) as usize;

/// Fixed-point step cost for an orthogonal move
const ORTHO_COST: u32 = 1000;
/// Fixed-point step cost for a diagonal move (1000 * sqrt(2), rounded)
const DIAG_COST: u32 = 1500;

/// Neighbor offsets with step costs. Expansion order is part of the
/// deterministic contract.
const NEIGHBORS: [(i32, i32, u32); 8] = [
    (-1, -1, DIAG_COST),
    (0, -1, ORTHO_COST),
    (1, -1, DIAG_COST),
    (-1, 0, ORTHO_COST),
    (1, 0, ORTHO_COST),
    (-1, 1, DIAG_COST),
    (0, 1, ORTHO_COST),
    (1, 1, DIAG_COST),
];

/// Cardinal probe directions for a blocked goal: west, east, south, north.
/// The order is fixed and only these four rays are searched.
const CARDINALS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Waypoints from start to goal inclusive, in traversal order.
///
/// An empty waypoint list is the typed "no path" outcome; callers must check
/// it explicitly (an NPC with an empty path simply holds still that tick).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path {
    pub waypoints: Vec<IVec2>,
}

impl Path {
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }
}

/// Reusable A* scratch state.
///
/// One instance serves any number of queries serially; the buffers are
/// mutated during a query, so concurrent callers each need their own.
/// All buffers are preallocated at fixed capacity and never grow:
/// exceeding the open list or path length is fatal, never truncated.
pub struct Pathfinder {
    best_cost: Box<[u32]>,
    prev: Box<[u16]>,
    open_cell: Box<[u16]>,
    open_f: Box<[u32]>,
    open_len: usize,
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self::new()
    }
}

impl Pathfinder {
    pub fn new() -> Self {
        Self {
            best_cost: vec![u32::MAX; CELLS].into_boxed_slice(),
            prev: vec![0; CELLS].into_boxed_slice(),
            open_cell: vec![0; OPEN_LIST_CAP].into_boxed_slice(),
            open_f: vec![0; OPEN_LIST_CAP].into_boxed_slice(),
            open_len: 0,
        }
    }

    /// Shortest path between two world cells.
    ///
    /// The start cell must be open; a blocked start signals misconfigured
    /// entity placement and is fatal. A blocked goal is substituted with the
    /// first open cell found along the four cardinal rays at increasing
    /// radius; if none exists, or the search exhausts the frontier without
    /// reaching the goal, the result is empty.
    pub fn find_path(&mut self, grid: &OccupancyGrid, start: IVec2, goal: IVec2) -> Path {
        let (start_x, start_y) = grid.world_to_cell(start);
        let (mut goal_x, mut goal_y) = grid.world_to_cell(goal);

        assert!(
            grid.is_open(start_x, start_y),
            "pathfind start cell {start} is blocked; check entity placement"
        );

        if !grid.is_open(goal_x, goal_y) {
            match nearest_open_cardinal(grid, goal_x, goal_y) {
                Some((x, y)) => {
                    goal_x = x;
                    goal_y = y;
                }
                None => return Path::empty(),
            }
        }

        self.best_cost.fill(u32::MAX);
        self.open_len = 0;

        let start_idx = cell_index(start_x, start_y);
        self.best_cost[start_idx as usize] = 0;
        self.prev[start_idx as usize] = start_idx;
        self.push_open(start_idx, 0);

        loop {
            if self.open_len == 0 {
                return Path::empty();
            }

            // Linear scan, first minimum wins. Stable by scan order, not by
            // recency or insertion order.
            let mut i_min = 0;
            let mut min_f = u32::MAX;
            for i in 0..self.open_len {
                let f = self.open_f[i];
                if f < min_f {
                    min_f = f;
                    i_min = i;
                }
            }

            let cur_idx = self.open_cell[i_min];
            let (cur_x, cur_y) = cell_coords(cur_idx);
            let cur_cost = self.best_cost[cur_idx as usize];

            // Swap-with-last removal; the list stays unordered.
            self.open_len -= 1;
            self.open_cell[i_min] = self.open_cell[self.open_len];
            self.open_f[i_min] = self.open_f[self.open_len];

            if cur_x == goal_x && cur_y == goal_y {
                return self.backtrace(grid, start_idx, cur_idx);
            }

            for &(dx, dy, step) in &NEIGHBORS {
                let nx = cur_x as i32 + dx;
                let ny = cur_y as i32 + dy;
                if nx < 0 || nx >= GRID_DIM || ny < 0 || ny >= GRID_DIM {
                    continue;
                }
                let (nx, ny) = (nx as u8, ny as u8);
                if !grid.is_open(nx, ny) {
                    continue;
                }

                let n_idx = cell_index(nx, ny);
                let n_cost = cur_cost + step;
                // Relaxation only on strict improvement.
                if n_cost >= self.best_cost[n_idx as usize] {
                    continue;
                }

                let h = chebyshev(nx, ny, goal_x, goal_y) * ORTHO_COST;
                self.best_cost[n_idx as usize] = n_cost;
                self.prev[n_idx as usize] = cur_idx;
                self.push_open(n_idx, n_cost + h);
            }
        }
    }

    fn push_open(&mut self, cell: u16, f: u32) {
        assert!(
            self.open_len < OPEN_LIST_CAP,
            "pathfind open list overflow; check level geometry"
        );
        self.open_cell[self.open_len] = cell;
        self.open_f[self.open_len] = f;
        self.open_len += 1;
    }

    /// Walk the predecessor chain goal -> start, then reverse into traversal
    /// order.
    fn backtrace(&self, grid: &OccupancyGrid, start_idx: u16, goal_idx: u16) -> Path {
        let mut waypoints = Vec::new();

        let mut idx = goal_idx;
        while idx != start_idx {
            assert!(waypoints.len() < MAX_PATH_LEN, "pathfind result overflow");
            let (x, y) = cell_coords(idx);
            waypoints.push(grid.cell_to_world(x, y));
            idx = self.prev[idx as usize];
        }
        assert!(waypoints.len() < MAX_PATH_LEN, "pathfind result overflow");
        let (x, y) = cell_coords(start_idx);
        waypoints.push(grid.cell_to_world(x, y));

        waypoints.reverse();
        Path { waypoints }
    }
}

/// Admissible heuristic under the 1000/1500 cost model
#[inline]
fn chebyshev(x: u8, y: u8, goal_x: u8, goal_y: u8) -> u32 {
    let dx = (x as i32 - goal_x as i32).unsigned_abs();
    let dy = (y as i32 - goal_y as i32).unsigned_abs();
    dx.max(dy)
}

/// Probe the four cardinal rays at increasing radius for the first open
/// cell. Deliberately incomplete: a diagonally closer open cell is skipped
/// in favor of a farther cardinal one, and gameplay tuning relies on that.
fn nearest_open_cardinal(grid: &OccupancyGrid, goal_x: u8, goal_y: u8) -> Option<(u8, u8)> {
    for radius in 0..GRID_DIM {
        for &(dx, dy) in &CARDINALS {
            let x = goal_x as i32 + dx * radius;
            let y = goal_y as i32 + dy * radius;
            if x >= 0
                && x < GRID_DIM
                && y >= 0
                && y < GRID_DIM
                && grid.is_open(x as u8, y as u8)
            {
                return Some((x as u8, y as u8));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{Level, Wall};
    use proptest::prelude::*;

    fn open_level() -> Level {
        Level::new(128, 64, Vec::new())
    }

    /// Per-step cost between two adjacent waypoints
    fn step_cost(a: IVec2, b: IVec2) -> u32 {
        let d = (b - a).abs();
        assert!(d.x <= 1 && d.y <= 1 && (d.x + d.y) > 0, "waypoints not adjacent: {a} -> {b}");
        if d.x + d.y == 2 { DIAG_COST } else { ORTHO_COST }
    }

    #[test]
    fn test_trivial_path_is_single_cell() {
        let grid = OccupancyGrid::build(&open_level());
        let mut finder = Pathfinder::new();
        let path = finder.find_path(&grid, IVec2::new(3, -7), IVec2::new(3, -7));
        assert_eq!(path.waypoints, vec![IVec2::new(3, -7)]);
    }

    #[test]
    #[should_panic(expected = "blocked")]
    fn test_blocked_start_is_fatal() {
        let level = Level::new(128, 64, vec![Wall { x: 0, y: 0, w: 1, h: 1 }]);
        let grid = OccupancyGrid::build(&level);
        Pathfinder::new().find_path(&grid, IVec2::new(0, 0), IVec2::new(5, 5));
    }

    #[test]
    fn test_straight_path_on_open_ground() {
        let grid = OccupancyGrid::build(&open_level());
        let mut finder = Pathfinder::new();
        let path = finder.find_path(&grid, IVec2::new(0, 0), IVec2::new(10, 0));
        assert_eq!(path.len(), 11);
        assert_eq!(path.waypoints[0], IVec2::new(0, 0));
        assert_eq!(path.waypoints[10], IVec2::new(10, 0));
    }

    #[test]
    fn test_wall_forces_detour() {
        // One wall spanning x in [4, 6], y in [-5, 5] between start and goal.
        let level = Level::new(128, 64, vec![Wall { x: 4, y: -5, w: 3, h: 11 }]);
        let grid = OccupancyGrid::build(&level);
        let mut finder = Pathfinder::new();

        let path = finder.find_path(&grid, IVec2::new(0, 0), IVec2::new(10, 0));
        assert!(!path.is_empty());
        assert!(path.len() > 11, "detour must exceed the straight 11-cell line");
        assert_eq!(*path.waypoints.first().unwrap(), IVec2::new(0, 0));
        assert_eq!(*path.waypoints.last().unwrap(), IVec2::new(10, 0));
        for &cell in &path.waypoints {
            assert!(grid.is_world_cell_open(cell), "path crosses blocked cell {cell}");
        }
    }

    #[test]
    fn test_path_cost_monotonically_increases() {
        let level = Level::new(128, 64, vec![Wall { x: 4, y: -5, w: 3, h: 11 }]);
        let grid = OccupancyGrid::build(&level);
        let mut finder = Pathfinder::new();

        let path = finder.find_path(&grid, IVec2::new(0, 0), IVec2::new(10, 0));
        let mut total = 0u32;
        for pair in path.waypoints.windows(2) {
            let next = total + step_cost(pair[0], pair[1]);
            assert!(next > total);
            total = next;
        }
        assert!(total >= 10 * ORTHO_COST);
    }

    #[test]
    fn test_enclosed_goal_returns_empty() {
        // Bounded search region so exhaustion stays cheap, goal ringed by
        // blocked cells.
        let level = Level::new(64, 64, vec![
            Wall { x: -10, y: -10, w: 21, h: 1 },
            Wall { x: -10, y: 10, w: 21, h: 1 },
            Wall { x: -10, y: -10, w: 1, h: 21 },
            Wall { x: 10, y: -10, w: 1, h: 21 },
            // Ring around (5, 0)
            Wall { x: 4, y: -1, w: 1, h: 3 },
            Wall { x: 6, y: -1, w: 1, h: 3 },
            Wall { x: 5, y: -1, w: 1, h: 1 },
            Wall { x: 5, y: 1, w: 1, h: 1 },
        ]);
        let grid = OccupancyGrid::build(&level);
        assert!(grid.is_world_cell_open(IVec2::new(5, 0)));

        let mut finder = Pathfinder::new();
        let path = finder.find_path(&grid, IVec2::new(0, 0), IVec2::new(5, 0));
        assert!(path.is_empty());
    }

    #[test]
    fn test_blocked_goal_substitutes_cardinal_cell() {
        // Goal (1, 1) with all four cardinal neighbors blocked; the west ray
        // reaches (-1, 1) at radius 2. The open diagonal (0, 0) is closer but
        // cardinal probing skips it.
        let level = Level::new(128, 64, vec![
            Wall { x: 1, y: 0, w: 1, h: 3 },
            Wall { x: 0, y: 1, w: 3, h: 1 },
        ]);
        let grid = OccupancyGrid::build(&level);
        assert!(grid.is_world_cell_open(IVec2::new(0, 0)));

        let mut finder = Pathfinder::new();
        let path = finder.find_path(&grid, IVec2::new(-5, -5), IVec2::new(1, 1));
        assert!(!path.is_empty());
        assert_eq!(*path.waypoints.last().unwrap(), IVec2::new(-1, 1));
    }

    #[test]
    fn test_no_open_cell_on_any_cardinal_ray() {
        // The goal's entire row and column are blocked across the grid, so
        // every cardinal probe fails and the query resolves to empty.
        let level = Level::new(256, 256, vec![
            Wall { x: -128, y: 5, w: 256, h: 1 },
            Wall { x: 10, y: -128, w: 1, h: 256 },
        ]);
        let grid = OccupancyGrid::build(&level);
        let mut finder = Pathfinder::new();
        let path = finder.find_path(&grid, IVec2::new(0, 0), IVec2::new(10, 5));
        assert!(path.is_empty());
    }

    #[test]
    fn test_repeated_queries_are_bit_identical() {
        let level = Level::demo();
        let grid = OccupancyGrid::build(&level);
        let mut finder = Pathfinder::new();

        let first = finder.find_path(&grid, IVec2::new(-49, 0), IVec2::new(45, 3));
        for _ in 0..3 {
            let again = finder.find_path(&grid, IVec2::new(-49, 0), IVec2::new(45, 3));
            assert_eq!(first, again);
        }
    }

    #[test]
    fn test_fresh_scratch_matches_reused_scratch() {
        let grid = OccupancyGrid::build(&Level::demo());
        let mut warm = Pathfinder::new();
        // Unrelated query first to dirty the scratch buffers.
        warm.find_path(&grid, IVec2::new(10, 10), IVec2::new(-20, -20));
        let warm_path = warm.find_path(&grid, IVec2::new(-49, 0), IVec2::new(45, 3));

        let cold_path = Pathfinder::new().find_path(&grid, IVec2::new(-49, 0), IVec2::new(45, 3));
        assert_eq!(warm_path, cold_path);
    }

    fn wall_strategy() -> impl Strategy<Value = Wall> {
        (-60i32..56, -28i32..24, 1u32..8, 1u32..8)
            .prop_map(|(x, y, w, h)| Wall { x, y, w, h })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_paths_deterministic_and_open(walls in prop::collection::vec(wall_strategy(), 0..12)) {
            let level = Level::new(128, 64, walls);
            let grid = OccupancyGrid::build(&level);
            let start = IVec2::new(-63, -31);
            prop_assume!(grid.is_world_cell_open(start));

            let mut finder = Pathfinder::new();
            let first = finder.find_path(&grid, start, IVec2::new(60, 28));
            let second = finder.find_path(&grid, start, IVec2::new(60, 28));
            prop_assert_eq!(&first, &second);

            for &cell in &first.waypoints {
                prop_assert!(grid.is_world_cell_open(cell));
            }
            for pair in first.waypoints.windows(2) {
                let d = (pair[1] - pair[0]).abs();
                prop_assert!(d.x <= 1 && d.y <= 1);
            }
        }
    }
}
