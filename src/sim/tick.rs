//! Fixed timestep simulation tick
//!
//! Orchestrates one frame: read per-player commands, derive steering for
//! nav-driven players from the pathfinder, spawn bullets, run the physics
//! substeps, compact dead bullets and swap the state buffers.

use glam::Vec2;

use super::grid::OccupancyGrid;
use super::level::Level;
use super::path::{Path, Pathfinder};
use super::physics;
use super::state::{GameState, PlayerCommand};
use crate::cell_center;
use crate::consts::BULLET_SPEED;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// One command per player, indexed by player slot
    pub commands: Vec<PlayerCommand>,
}

/// Initial placement for one player
#[derive(Debug, Clone, Copy)]
pub struct PlayerSpawn {
    pub pos: Vec2,
    pub team: u8,
    pub kind: u8,
}

/// The full simulation: level geometry, pathfinder and the double-buffered
/// entity state.
///
/// Each tick reads only the previous buffer and writes only the next one;
/// the buffers swap roles at the tick boundary and are never aliased
/// mid-tick. Everything is owned here: no global mutable state.
pub struct Simulation {
    level: Level,
    grid: OccupancyGrid,
    pathfinder: Pathfinder,
    states: [GameState; 2],
    cur: usize,
    frame_num: u64,
    /// Pathfinding destination per player, set by the external NPC layer.
    /// A player with a target gets its movement direction from the
    /// pathfinder; others use their command's `move_dir` as-is.
    nav_targets: Vec<Option<Vec2>>,
}

impl Simulation {
    pub fn new(level: Level, spawns: &[PlayerSpawn]) -> Self {
        let grid = OccupancyGrid::build(&level);

        let mut initial = GameState::new();
        for spawn in spawns {
            initial.spawn_player(spawn.pos, spawn.team, spawn.kind);
        }
        log::info!(
            "simulation ready: {} players, {} walls",
            initial.num_players(),
            level.walls.len()
        );

        Self {
            level,
            grid,
            pathfinder: Pathfinder::new(),
            nav_targets: vec![None; initial.num_players()],
            states: [initial, GameState::new()],
            cur: 0,
            frame_num: 0,
        }
    }

    /// The built-in two-team skirmish: 16 players per side in 4x4 blocks on
    /// opposite ends of the demo arena.
    pub fn demo_skirmish() -> Self {
        let mut spawns = Vec::new();
        for (team, center) in [(0u8, Vec2::new(-49.0, 0.0)), (1u8, Vec2::new(45.0, 0.0))] {
            for i in 0..16 {
                let offset = Vec2::new((i % 4) as f32, (i / 4) as f32 - 2.0) * 1.2;
                spawns.push(PlayerSpawn {
                    pos: center + offset,
                    team,
                    kind: 0,
                });
            }
        }
        Self::new(Level::demo(), &spawns)
    }

    /// Read-only snapshot of the most recently completed tick
    #[inline]
    pub fn state(&self) -> &GameState {
        &self.states[self.cur]
    }

    #[inline]
    pub fn frame_num(&self) -> u64 {
        self.frame_num
    }

    #[inline]
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Set or clear a player's pathfinding destination
    pub fn set_nav_target(&mut self, player: usize, target: Option<Vec2>) {
        self.nav_targets[player] = target;
    }

    /// Advance the simulation by one fixed tick
    pub fn tick(&mut self, input: &TickInput) {
        let [s0, s1] = &mut self.states;
        let (prev, next) = if self.cur == 0 {
            (&*s0, s1)
        } else {
            (&*s1, s0)
        };
        assert_eq!(
            input.commands.len(),
            prev.num_players(),
            "one command per player"
        );

        next.copy_from(prev);

        // Steering: nav-driven players get their movement direction from the
        // pathfinder; an empty path means holding still this tick.
        let mut commands = input.commands.clone();
        for i in 0..prev.num_players() {
            let Some(target) = self.nav_targets[i] else {
                continue;
            };
            let pos = prev.player_pos[i];
            let path = self.pathfinder.find_path(
                &self.grid,
                pos.floor().as_ivec2(),
                target.floor().as_ivec2(),
            );
            commands[i].move_dir = steer_along_path(&path, pos);
        }

        // Bullet spawns read shooter state from the previous buffer.
        for i in 0..prev.num_players() {
            if commands[i].shoot {
                let vel = commands[i].aim_dir.normalize_or_zero() * BULLET_SPEED;
                next.spawn_bullet(prev.player_pos[i], vel, prev.player_team[i]);
            }
        }

        physics::run_substeps(next, &commands, &self.level);
        next.compact_bullets();

        self.cur ^= 1;
        self.frame_num += 1;
    }
}

/// Movement direction toward the next waypoint, braking smoothly as the
/// remaining waypoint count shrinks to one.
fn steer_along_path(path: &Path, pos: Vec2) -> Vec2 {
    if path.is_empty() {
        return Vec2::ZERO;
    }

    let next_cell = if path.len() > 1 {
        path.waypoints[1]
    } else {
        path.waypoints[0]
    };
    let delta = cell_center(next_cell) - pos;
    let len = delta.length();
    let mut dir = delta.normalize_or_zero();

    // Put on the brakes near the end of the path.
    if path.len() == 3 {
        dir *= 0.6;
    }
    if path.len() == 2 {
        dir *= 0.4;
    }
    if path.len() == 1 {
        dir *= 3.0 * len * len - 2.0 * len * len * len;
        dir *= 0.3;
    }

    dir
}
