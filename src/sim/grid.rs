//! Static occupancy grid
//!
//! One bit per cell over a fixed 256x256 lattice, true = blocked. Built once
//! from the level's wall rectangles and immutable afterwards; rebuilt only on
//! level (re)load. World coordinates are centered on the arena origin, so
//! lookups offset by the level half extents before indexing.

use glam::IVec2;

use super::level::Level;

/// Grid dimension in cells, both axes
pub const GRID_DIM: i32 = 256;

const GRID_BYTES: usize = (GRID_DIM * GRID_DIM) as usize / 8;

/// Pack a grid cell into its 16-bit array index (`y * 256 + x`)
#[inline]
pub(crate) fn cell_index(x: u8, y: u8) -> u16 {
    ((y as u16) << 8) | x as u16
}

/// Unpack a 16-bit cell index back into grid coordinates
#[inline]
pub(crate) fn cell_coords(index: u16) -> (u8, u8) {
    ((index & 0xFF) as u8, (index >> 8) as u8)
}

/// Blocked/open bitset for one level's geometry
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    bits: Box<[u8; GRID_BYTES]>,
    half_w: i32,
    half_h: i32,
}

impl OccupancyGrid {
    pub fn build(level: &Level) -> Self {
        let mut grid = Self {
            bits: Box::new([0; GRID_BYTES]),
            half_w: 0,
            half_h: 0,
        };
        grid.rebuild(level);
        grid
    }

    /// Clear the grid and re-mark every wall rectangle, clamped to bounds.
    pub fn rebuild(&mut self, level: &Level) {
        assert!(
            level.width <= GRID_DIM as u32 && level.height <= GRID_DIM as u32,
            "level {}x{} exceeds the {GRID_DIM}x{GRID_DIM} grid",
            level.width,
            level.height
        );

        self.bits.fill(0);
        let (half_w, half_h) = level.half_extents();
        self.half_w = half_w;
        self.half_h = half_h;

        for wall in &level.walls {
            let x0 = (half_w + wall.x).clamp(0, GRID_DIM);
            let x1 = (half_w + wall.x + wall.w as i32).clamp(0, GRID_DIM);
            let y0 = (half_h + wall.y).clamp(0, GRID_DIM);
            let y1 = (half_h + wall.y + wall.h as i32).clamp(0, GRID_DIM);

            for y in y0..y1 {
                for x in x0..x1 {
                    let idx = cell_index(x as u8, y as u8) as usize;
                    self.bits[idx / 8] |= 1 << (idx % 8);
                }
            }
        }

        log::info!(
            "occupancy grid built: {} walls, {} blocked cells",
            level.walls.len(),
            self.bits.iter().map(|b| b.count_ones()).sum::<u32>()
        );
    }

    #[inline]
    pub(crate) fn is_open(&self, x: u8, y: u8) -> bool {
        let idx = cell_index(x, y) as usize;
        self.bits[idx / 8] & (1 << (idx % 8)) == 0
    }

    /// Map a world cell onto the grid, clamping into the level bounds
    #[inline]
    pub fn world_to_cell(&self, world: IVec2) -> (u8, u8) {
        let x = world.x.clamp(-self.half_w, self.half_w - 1) + self.half_w;
        let y = world.y.clamp(-self.half_h, self.half_h - 1) + self.half_h;
        (x as u8, y as u8)
    }

    /// Map a grid cell back to centered world coordinates
    #[inline]
    pub fn cell_to_world(&self, x: u8, y: u8) -> IVec2 {
        IVec2::new(x as i32 - self.half_w, y as i32 - self.half_h)
    }

    /// Whether the cell containing this world coordinate is open
    pub fn is_world_cell_open(&self, world: IVec2) -> bool {
        let (x, y) = self.world_to_cell(world);
        self.is_open(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::Wall;

    #[test]
    fn test_empty_level_is_all_open() {
        let grid = OccupancyGrid::build(&Level::new(128, 64, Vec::new()));
        assert!(grid.is_world_cell_open(IVec2::new(0, 0)));
        assert!(grid.is_world_cell_open(IVec2::new(-64, -32)));
        assert!(grid.is_world_cell_open(IVec2::new(63, 31)));
    }

    #[test]
    fn test_wall_cells_blocked_inclusive_exclusive() {
        let level = Level::new(128, 64, vec![Wall { x: 4, y: -5, w: 3, h: 11 }]);
        let grid = OccupancyGrid::build(&level);

        // Covered: x in [4, 7), y in [-5, 6)
        assert!(!grid.is_world_cell_open(IVec2::new(4, -5)));
        assert!(!grid.is_world_cell_open(IVec2::new(6, 5)));
        assert!(grid.is_world_cell_open(IVec2::new(7, 0)));
        assert!(grid.is_world_cell_open(IVec2::new(4, 6)));
        assert!(grid.is_world_cell_open(IVec2::new(3, 0)));
    }

    #[test]
    fn test_out_of_bounds_wall_is_clamped() {
        let level = Level::new(128, 64, vec![Wall { x: -200, y: 0, w: 140, h: 1 }]);
        let grid = OccupancyGrid::build(&level);

        // Only the in-bounds span [-64, -60) is marked.
        assert!(!grid.is_world_cell_open(IVec2::new(-64, 0)));
        assert!(!grid.is_world_cell_open(IVec2::new(-61, 0)));
        assert!(grid.is_world_cell_open(IVec2::new(-60, 0)));
    }

    #[test]
    fn test_world_cell_roundtrip() {
        let grid = OccupancyGrid::build(&Level::new(128, 64, Vec::new()));
        for world in [IVec2::new(0, 0), IVec2::new(-64, -32), IVec2::new(63, 31)] {
            let (x, y) = grid.world_to_cell(world);
            assert_eq!(grid.cell_to_world(x, y), world);
        }
    }

    #[test]
    fn test_world_to_cell_clamps_outside_positions() {
        let grid = OccupancyGrid::build(&Level::new(128, 64, Vec::new()));
        assert_eq!(grid.world_to_cell(IVec2::new(-1000, 0)), grid.world_to_cell(IVec2::new(-64, 0)));
        assert_eq!(grid.world_to_cell(IVec2::new(1000, 0)), grid.world_to_cell(IVec2::new(63, 0)));
    }

    #[test]
    fn test_rebuild_clears_previous_level() {
        let mut grid = OccupancyGrid::build(&Level::new(128, 64, vec![Wall { x: 0, y: 0, w: 4, h: 4 }]));
        assert!(!grid.is_world_cell_open(IVec2::new(1, 1)));

        grid.rebuild(&Level::new(128, 64, Vec::new()));
        assert!(grid.is_world_cell_open(IVec2::new(1, 1)));
    }
}
