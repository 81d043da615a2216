//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - No RNG
//! - Stable iteration order (by entity index)
//! - No rendering or platform dependencies

pub mod collision;
pub mod grid;
pub mod level;
pub mod path;
pub mod physics;
pub mod state;
pub mod tick;

pub use grid::OccupancyGrid;
pub use level::{Level, Wall};
pub use path::{MAX_PATH_LEN, Path, Pathfinder};
pub use state::{GameState, PlayerCommand};
pub use tick::{PlayerSpawn, Simulation, TickInput};
