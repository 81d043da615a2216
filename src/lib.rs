//! Gridfire - deterministic top-down arena combat core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (occupancy grid, pathfinding, physics,
//!   tick orchestration)
//!
//! Rendering, window/input capture and NPC target selection are external
//! collaborators; this crate advances entity state one fixed tick at a time
//! and exposes read-only snapshots of the result.

pub mod sim;

use glam::{IVec2, Vec2};

/// Simulation tuning constants
pub mod consts {
    /// Fixed simulation tick duration (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Physics substeps per tick, for stability under fast bullets
    pub const NUM_SUBSTEPS: u32 = 16;

    /// Peak driving acceleration, pre-scaled across substeps
    pub const MAX_ACCEL: f32 = 4000.0 / NUM_SUBSTEPS as f32;
    /// Proportional drag coefficient (negative). Together with `MAX_ACCEL`
    /// this caps player speed at `MAX_ACCEL / |DRAG|` = 16 units/s.
    pub const DRAG: f32 = -250.0 / NUM_SUBSTEPS as f32;

    /// Player collision radius in world units
    pub const PLAYER_RADIUS: f32 = 0.5;
    /// Player capacity of the entity arrays
    pub const MAX_PLAYERS: usize = 32;
    /// Bullet capacity of the entity arrays
    pub const MAX_BULLETS: usize = 256;

    /// Starting player health
    pub const MAX_HEALTH: u32 = 100;
    /// Health removed per bullet hit
    pub const BULLET_DAMAGE: u32 = 10;
    /// Muzzle speed of a spawned bullet, units/s
    pub const BULLET_SPEED: f32 = 200.0;
    /// Impulse applied to a hit player per unit of bullet velocity
    pub const BULLET_IMPULSE: f32 = 0.05;

    /// Any entity position outside this bound after integration is a logic
    /// defect (runaway velocity, corrupted state) and fatal.
    pub const POSITION_BOUND: f32 = 4096.0;
}

/// World-space center of a grid cell
#[inline]
pub fn cell_center(cell: IVec2) -> Vec2 {
    cell.as_vec2() + Vec2::splat(0.5)
}
