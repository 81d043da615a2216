//! Iterative physics solver
//!
//! Advances all entity kinematics for exactly one tick, split into
//! `NUM_SUBSTEPS` fixed fractional steps for stability. Within a substep the
//! stage order is load-bearing and must not be rearranged:
//!
//! 1. integrate input into player velocity (drive + proportional drag)
//! 2. bullet-wall collisions (swept segment vs wall edges)
//! 3. bullet-player collisions (swept segment vs opposing circles)
//! 4. player-player collisions (elastic impulse, equal mass)
//! 5. player-wall collisions (after player-player, so walls win)
//! 6. integrate velocity into position
//!
//! Player-player resolution is order-dependent within a substep: later pairs
//! observe the already-updated velocities of earlier pairs. That coupling is
//! accepted rather than corrected with an intermediate buffer.

use glam::Vec2;

use super::collision::{point_segment_distance, segments_intersect};
use super::level::Level;
use super::state::{GameState, PlayerCommand};
use crate::consts::{
    BULLET_DAMAGE, BULLET_IMPULSE, DRAG, FRAME_DT, MAX_ACCEL, NUM_SUBSTEPS, PLAYER_RADIUS,
    POSITION_BOUND,
};

/// Run the full substep pipeline for one tick, in place.
///
/// `state` starts as a copy of the previous tick's state (plus any bullets
/// spawned this tick) and ends as the next tick's state.
pub fn run_substeps(state: &mut GameState, commands: &[PlayerCommand], level: &Level) {
    assert_eq!(commands.len(), state.num_players(), "one command per player");
    let sub_dt = FRAME_DT / NUM_SUBSTEPS as f32;

    for _ in 0..NUM_SUBSTEPS {
        integrate_velocities(state, commands, sub_dt);
        resolve_bullet_wall(state, level);
        resolve_bullet_player(state);
        resolve_player_player(state);
        resolve_player_wall(state, level);
        integrate_positions(state, sub_dt);
    }
}

/// Stage 1: drive acceleration plus proportional drag.
///
/// `accel = move_dir * MAX_ACCEL + vel * DRAG`. Drag scales with velocity,
/// which caps speed at `MAX_ACCEL / |DRAG|` under sustained input.
fn integrate_velocities(state: &mut GameState, commands: &[PlayerCommand], sub_dt: f32) {
    for i in 0..state.num_players() {
        let vel = state.player_vel[i];
        let accel = commands[i].move_dir * MAX_ACCEL + vel * DRAG;
        state.player_vel[i] = vel + accel * sub_dt;
    }
}

/// Stage 2: swept bullet segments against every wall's four edges.
/// The first hit marks the bullet dead for the rest of the tick; there is no
/// partial advance or back-off response.
fn resolve_bullet_wall(state: &mut GameState, level: &Level) {
    for i in 0..state.num_bullets() {
        if !state.bullet_alive[i] {
            continue;
        }
        let swept = (state.bullet_prev_pos[i], state.bullet_pos[i]);

        'walls: for wall in &level.walls {
            for (edge_a, edge_b) in wall.edges() {
                if segments_intersect(swept.0, swept.1, edge_a, edge_b) {
                    state.bullet_alive[i] = false;
                    break 'walls;
                }
            }
        }
    }
}

/// Stage 3: swept bullet segments against opposing players.
///
/// A hit knocks the player back along the bullet velocity, removes a fixed
/// amount of health (clamped at zero) and kills the bullet.
fn resolve_bullet_player(state: &mut GameState) {
    for b in 0..state.num_bullets() {
        if !state.bullet_alive[b] {
            continue;
        }

        for p in 0..state.num_players() {
            if state.player_team[p] == state.bullet_team[b] {
                continue;
            }
            let dist = point_segment_distance(
                state.player_pos[p],
                state.bullet_prev_pos[b],
                state.bullet_pos[b],
            );
            if dist < PLAYER_RADIUS {
                state.player_vel[p] += state.bullet_vel[b] * BULLET_IMPULSE;
                state.player_health[p] = state.player_health[p].saturating_sub(BULLET_DAMAGE);
                state.bullet_alive[b] = false;
                break;
            }
        }
    }
}

/// Stage 4: pairwise elastic player collisions, equal mass.
///
/// Triggers only when the circles overlap and the pair is approaching along
/// the connecting normal. Player `a`'s velocity accumulates in a local
/// across the inner loop and is written back once afterwards; `b` writes
/// land immediately.
fn resolve_player_player(state: &mut GameState) {
    let num_players = state.num_players();
    for a in 0..num_players {
        let a_pos = state.player_pos[a];
        let mut a_vel = state.player_vel[a];

        for b in 0..num_players {
            if b == a {
                continue;
            }
            let b_pos = state.player_pos[b];
            let b_vel = state.player_vel[b];

            let n = a_pos - b_pos;
            let rel_vel = a_vel - b_vel;
            let radii = PLAYER_RADIUS + PLAYER_RADIUS;
            if n.length_squared() < radii * radii && rel_vel.dot(n) < 0.0 {
                // 1-D elastic impulse projected on the normal, equal masses.
                let j = (-rel_vel).dot(n) / (n.length_squared() * 2.0);
                a_vel += n * j;
                state.player_vel[b] = b_vel - n * j;
            }
        }

        state.player_vel[a] = a_vel;
    }
}

/// Stage 5: player circles against wall bounding boxes.
///
/// Clamping the center into the box yields the nearest boundary point; a
/// single corrective impulse along the separation normal cancels any
/// remaining approach. Runs after player-player resolution so walls always
/// win the final correction.
fn resolve_player_wall(state: &mut GameState, level: &Level) {
    for i in 0..state.num_players() {
        let pos = state.player_pos[i];
        let mut vel = state.player_vel[i];

        for wall in &level.walls {
            let clamped = pos.clamp(
                Vec2::new(wall.left(), wall.bottom()),
                Vec2::new(wall.right(), wall.top()),
            );
            let n = pos - clamped;
            if n.length_squared() < PLAYER_RADIUS * PLAYER_RADIUS && n.dot(vel) < 0.0 {
                let j = (-vel).dot(n) / n.length_squared();
                vel += n * j;
            }
        }

        state.player_vel[i] = vel;
    }
}

/// Stage 6: position integration for all players and bullets.
///
/// Bullets record their previous position first; that segment is what
/// stages 2 and 3 of the next substep sweep. Any position leaving the padded
/// sane bound is a logic defect and fatal.
fn integrate_positions(state: &mut GameState, sub_dt: f32) {
    for i in 0..state.num_players() {
        let pos = state.player_pos[i] + state.player_vel[i] * sub_dt;
        assert!(
            pos.x.abs() <= POSITION_BOUND && pos.y.abs() <= POSITION_BOUND,
            "player {i} position {pos} out of bounds"
        );
        state.player_pos[i] = pos;
    }
    for i in 0..state.num_bullets() {
        state.bullet_prev_pos[i] = state.bullet_pos[i];
        let pos = state.bullet_pos[i] + state.bullet_vel[i] * sub_dt;
        assert!(
            pos.x.abs() <= POSITION_BOUND && pos.y.abs() <= POSITION_BOUND,
            "bullet {i} position {pos} out of bounds"
        );
        state.bullet_pos[i] = pos;
    }
}
