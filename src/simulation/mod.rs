//! Multi-agent kinematic simulation.
//!
//! - Trajectory library and formation coordinator
//! - Agent registry bound to renderable handles
//! - Frame scheduler: one `tick` per rendered frame
//!
//! Everything below `Simulation` is engine-agnostic; this module only wires
//! it into the host loop.

use bevy::prelude::*;

pub mod agents;
pub mod articulation;
pub mod formation;
pub mod handle;
pub mod kinematics;
pub mod population;
pub mod scheduler;
pub mod trajectory;

use crate::game_state::{SceneState, SimulationSpeed};
use crate::render::rig::RigHandle;

/// Ordering of the per-frame work.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// Advance the clock and pose every agent.
    Advance,
    /// Copy poses into ECS transforms.
    Sync,
}

/// The scene's simulation, inserted once construction finishes.
#[derive(Resource)]
pub struct CitySimulation(pub scheduler::Simulation<RigHandle>);

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<kinematics::KinematicsConfig>()
            .init_resource::<population::PopulationConfig>()
            .configure_sets(Update, (FrameSet::Advance, FrameSet::Sync).chain())
            .add_systems(
                Update,
                advance_simulation
                    .in_set(FrameSet::Advance)
                    .run_if(in_state(SceneState::Running)),
            )
            .add_systems(Update, simulation_controls);
    }
}

/// Exactly one tick per frame. Paused frames still tick with `dt = 0` so
/// handles stay posed.
fn advance_simulation(
    time: Res<Time>,
    speed: Res<SimulationSpeed>,
    mut simulation: ResMut<CitySimulation>,
) {
    let dt = if speed.paused {
        0.0
    } else {
        time.delta_secs_f64() * speed.speed as f64
    };
    simulation.0.tick(dt);
}

/// Keyboard controls for simulation speed and pause.
fn simulation_controls(keyboard: Res<ButtonInput<KeyCode>>, mut speed: ResMut<SimulationSpeed>) {
    // Space: Toggle pause
    if keyboard.just_pressed(KeyCode::Space) {
        speed.paused = !speed.paused;
        if speed.paused {
            info!("Simulation PAUSED");
        } else {
            info!("Simulation RESUMED ({}x speed)", speed.speed);
        }
    }

    let presets = [
        (KeyCode::Digit1, 1.0),
        (KeyCode::Digit2, 2.0),
        (KeyCode::Digit3, 3.0),
        (KeyCode::Digit4, 4.0),
    ];
    for (key, preset) in presets {
        if keyboard.just_pressed(key) {
            speed.speed = preset;
            info!("Simulation speed: {}x", speed.speed);
        }
    }

    // +/- for speed adjustment
    if keyboard.just_pressed(KeyCode::Equal) || keyboard.just_pressed(KeyCode::NumpadAdd) {
        speed.step(0.5);
        info!("Simulation speed: {}x", speed.speed);
    }
    if keyboard.just_pressed(KeyCode::Minus) || keyboard.just_pressed(KeyCode::NumpadSubtract) {
        speed.step(-0.5);
        info!("Simulation speed: {}x", speed.speed);
    }
}
