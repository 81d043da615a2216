//! Entity state arrays
//!
//! All per-tick entity state lives here as structure-of-arrays: parallel
//! vectors indexed by entity slot, preallocated at fixed capacity and never
//! grown past it. The simulation owns two `GameState` buffers; physics reads
//! the previous one and writes the next one, and the roles swap at each tick
//! boundary.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{MAX_BULLETS, MAX_HEALTH, MAX_PLAYERS};

/// One player's driving input for a tick
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PlayerCommand {
    /// Movement direction, caller-normalized or zero
    pub move_dir: Vec2,
    /// Facing direction used for bullet spawns
    pub aim_dir: Vec2,
    /// Spawn a bullet this tick
    pub shoot: bool,
}

/// Full entity state for one tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameState {
    pub player_pos: Vec<Vec2>,
    pub player_vel: Vec<Vec2>,
    pub player_health: Vec<u32>,
    pub player_team: Vec<u8>,
    pub player_kind: Vec<u8>,

    pub bullet_pos: Vec<Vec2>,
    /// Position at the previous substep, forming the swept segment
    pub bullet_prev_pos: Vec<Vec2>,
    pub bullet_vel: Vec<Vec2>,
    pub bullet_team: Vec<u8>,
    /// Cleared when a bullet hits something; compacted away at tick end
    pub bullet_alive: Vec<bool>,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            player_pos: Vec::with_capacity(MAX_PLAYERS),
            player_vel: Vec::with_capacity(MAX_PLAYERS),
            player_health: Vec::with_capacity(MAX_PLAYERS),
            player_team: Vec::with_capacity(MAX_PLAYERS),
            player_kind: Vec::with_capacity(MAX_PLAYERS),
            bullet_pos: Vec::with_capacity(MAX_BULLETS),
            bullet_prev_pos: Vec::with_capacity(MAX_BULLETS),
            bullet_vel: Vec::with_capacity(MAX_BULLETS),
            bullet_team: Vec::with_capacity(MAX_BULLETS),
            bullet_alive: Vec::with_capacity(MAX_BULLETS),
        }
    }

    #[inline]
    pub fn num_players(&self) -> usize {
        self.player_pos.len()
    }

    #[inline]
    pub fn num_bullets(&self) -> usize {
        self.bullet_pos.len()
    }

    pub fn spawn_player(&mut self, pos: Vec2, team: u8, kind: u8) -> usize {
        assert!(self.num_players() < MAX_PLAYERS, "player overflow");
        self.player_pos.push(pos);
        self.player_vel.push(Vec2::ZERO);
        self.player_health.push(MAX_HEALTH);
        self.player_team.push(team);
        self.player_kind.push(kind);
        self.num_players() - 1
    }

    /// Append a bullet at rest on its shooter: the swept segment stays
    /// degenerate until the first position integration moves it.
    pub fn spawn_bullet(&mut self, pos: Vec2, vel: Vec2, team: u8) {
        assert!(self.num_bullets() < MAX_BULLETS, "bullet overflow");
        self.bullet_pos.push(pos);
        self.bullet_prev_pos.push(pos);
        self.bullet_vel.push(vel);
        self.bullet_team.push(team);
        self.bullet_alive.push(true);
    }

    /// Overwrite this buffer with another tick's state, reusing allocations
    pub fn copy_from(&mut self, other: &GameState) {
        self.player_pos.clone_from(&other.player_pos);
        self.player_vel.clone_from(&other.player_vel);
        self.player_health.clone_from(&other.player_health);
        self.player_team.clone_from(&other.player_team);
        self.player_kind.clone_from(&other.player_kind);
        self.bullet_pos.clone_from(&other.bullet_pos);
        self.bullet_prev_pos.clone_from(&other.bullet_prev_pos);
        self.bullet_vel.clone_from(&other.bullet_vel);
        self.bullet_team.clone_from(&other.bullet_team);
        self.bullet_alive.clone_from(&other.bullet_alive);
    }

    /// Drop dead bullets, preserving the relative order of survivors.
    /// Runs once at the end of each tick.
    pub fn compact_bullets(&mut self) {
        let mut write = 0;
        for read in 0..self.bullet_alive.len() {
            if self.bullet_alive[read] {
                if write != read {
                    self.bullet_pos[write] = self.bullet_pos[read];
                    self.bullet_prev_pos[write] = self.bullet_prev_pos[read];
                    self.bullet_vel[write] = self.bullet_vel[read];
                    self.bullet_team[write] = self.bullet_team[read];
                    self.bullet_alive[write] = true;
                }
                write += 1;
            }
        }
        self.bullet_pos.truncate(write);
        self.bullet_prev_pos.truncate(write);
        self.bullet_vel.truncate(write);
        self.bullet_team.truncate(write);
        self.bullet_alive.truncate(write);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_player_defaults() {
        let mut state = GameState::new();
        let id = state.spawn_player(Vec2::new(1.0, 2.0), 1, 0);
        assert_eq!(id, 0);
        assert_eq!(state.player_health[0], MAX_HEALTH);
        assert_eq!(state.player_vel[0], Vec2::ZERO);
        assert_eq!(state.player_team[0], 1);
    }

    #[test]
    fn test_spawned_bullet_has_degenerate_sweep() {
        let mut state = GameState::new();
        state.spawn_bullet(Vec2::new(3.0, 4.0), Vec2::new(200.0, 0.0), 0);
        assert_eq!(state.bullet_pos[0], state.bullet_prev_pos[0]);
        assert!(state.bullet_alive[0]);
    }

    #[test]
    #[should_panic(expected = "bullet overflow")]
    fn test_bullet_overflow_is_fatal() {
        let mut state = GameState::new();
        for _ in 0..=MAX_BULLETS {
            state.spawn_bullet(Vec2::ZERO, Vec2::ZERO, 0);
        }
    }

    #[test]
    fn test_compaction_preserves_survivor_order() {
        let mut state = GameState::new();
        for i in 0..5 {
            state.spawn_bullet(Vec2::new(i as f32, 0.0), Vec2::ZERO, i as u8);
        }
        state.bullet_alive[1] = false;
        state.bullet_alive[3] = false;

        state.compact_bullets();

        assert_eq!(state.num_bullets(), 3);
        assert_eq!(state.bullet_team, vec![0, 2, 4]);
        assert_eq!(
            state.bullet_pos,
            vec![Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0), Vec2::new(4.0, 0.0)]
        );
        assert!(state.bullet_alive.iter().all(|&a| a));
    }

    #[test]
    fn test_copy_from_replaces_contents() {
        let mut a = GameState::new();
        a.spawn_player(Vec2::ONE, 0, 0);
        a.spawn_bullet(Vec2::ONE, Vec2::X, 0);

        let mut b = GameState::new();
        b.spawn_player(Vec2::ZERO, 1, 0);

        b.copy_from(&a);
        assert_eq!(b.num_players(), 1);
        assert_eq!(b.player_team[0], 0);
        assert_eq!(b.num_bullets(), 1);
    }
}
