//! Level geometry: axis-aligned wall rectangles
//!
//! Walls are specified in integer cell units with each rectangle's origin at
//! its bottom-left corner; the world origin sits at the arena center. The
//! same rectangles feed both the occupancy grid (pathfinding) and the
//! physics solver (wall collisions), so a level cannot disagree with itself.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned wall rectangle in cell units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wall {
    /// Bottom-left corner x
    pub x: i32,
    /// Bottom-left corner y
    pub y: i32,
    /// Width in cells
    pub w: u32,
    /// Height in cells
    pub h: u32,
}

impl Wall {
    #[inline]
    pub fn left(&self) -> f32 {
        self.x as f32
    }

    #[inline]
    pub fn right(&self) -> f32 {
        (self.x + self.w as i32) as f32
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y as f32
    }

    #[inline]
    pub fn top(&self) -> f32 {
        (self.y + self.h as i32) as f32
    }

    /// Corners in counter-clockwise order starting at the bottom-left
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.left(), self.bottom()),
            Vec2::new(self.right(), self.bottom()),
            Vec2::new(self.right(), self.top()),
            Vec2::new(self.left(), self.top()),
        ]
    }

    /// The four boundary edges as segments, for swept bullet tests
    pub fn edges(&self) -> [(Vec2, Vec2); 4] {
        let [bl, br, tr, tl] = self.corners();
        [(bl, br), (br, tr), (tr, tl), (tl, bl)]
    }
}

/// Arena bounds plus wall list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    /// Playfield extent in cells, centered on the world origin
    pub width: u32,
    /// Playfield extent in cells, centered on the world origin
    pub height: u32,
    pub walls: Vec<Wall>,
}

impl Level {
    pub fn new(width: u32, height: u32, walls: Vec<Wall>) -> Self {
        Self {
            width,
            height,
            walls,
        }
    }

    /// Half extents used to map centered world coordinates onto the grid
    #[inline]
    pub fn half_extents(&self) -> (i32, i32) {
        (self.width as i32 / 2, self.height as i32 / 2)
    }

    /// The built-in 128x64 skirmish arena: a bordered box with four interior
    /// wall strips leaving a gap at mid-height on each side.
    pub fn demo() -> Self {
        let walls = vec![
            // Border
            Wall { x: -64, y: -32, w: 1, h: 64 },
            Wall { x: 63, y: -32, w: 1, h: 64 },
            Wall { x: -64, y: -32, w: 128, h: 1 },
            Wall { x: -64, y: 31, w: 128, h: 1 },
            // Interior strips
            Wall { x: -28, y: -26, w: 2, h: 20 },
            Wall { x: -28, y: 6, w: 2, h: 20 },
            Wall { x: 28, y: -26, w: 2, h: 20 },
            Wall { x: 28, y: 6, w: 2, h: 20 },
        ];
        Self::new(128, 64, walls)
    }
}
