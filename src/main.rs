//! Headless demo: two 16-player teams skirmish in the built-in arena.
//!
//! Team 1 wanders between seeded random waypoints while team 0 holds
//! formation and fires eastward bursts. Runs a fixed number of ticks and
//! logs a state summary once per simulated second.

use glam::Vec2;
use gridfire::consts::FRAME_DT;
use gridfire::sim::{PlayerCommand, Simulation, TickInput};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

const DEMO_TICKS: u64 = 600;
const DEMO_SEED: u64 = 0x6772_6964;

fn main() {
    env_logger::init();
    log::info!("gridfire demo starting: seed {DEMO_SEED:#x}");

    let mut sim = Simulation::demo_skirmish();
    let mut rng = Pcg32::seed_from_u64(DEMO_SEED);
    let num_players = sim.state().num_players();

    for frame in 0..DEMO_TICKS {
        // Re-roll wander targets for team 1 every two seconds. Target
        // selection is the "personality" layer, so it lives out here, not in
        // the simulation.
        if frame % 120 == 0 {
            for i in 0..num_players {
                if sim.state().player_team[i] == 1 {
                    let target = Vec2::new(
                        rng.random_range(-60..60) as f32,
                        rng.random_range(-28..28) as f32,
                    );
                    sim.set_nav_target(i, Some(target));
                }
            }
        }

        let mut input = TickInput {
            commands: vec![PlayerCommand::default(); num_players],
        };
        // Team 0 fires a staggered eastward volley twice per second.
        for i in 0..num_players {
            if sim.state().player_team[i] == 0 && (frame + i as u64) % 30 == 0 {
                input.commands[i].aim_dir = Vec2::X;
                input.commands[i].shoot = true;
            }
        }

        sim.tick(&input);

        if frame % 60 == 0 {
            let state = sim.state();
            let total_health: u32 = state.player_health.iter().sum();
            log::info!(
                "t={:.1}s bullets={} total health={}",
                frame as f32 * FRAME_DT,
                state.num_bullets(),
                total_health
            );
        }
    }

    log::info!("demo finished after {} ticks", sim.frame_num());
}
