//! Rendering collaborator for the simulation core.
//!
//! - `factory`: primitive-mesh models behind `RenderableFactory`
//! - `rig`: ECS-backed handles and the per-frame transform sync
//! - `environment`: sky, lights, ocean, island, roads

use bevy::prelude::*;

pub mod environment;
pub mod factory;
pub mod rig;

use crate::game_state::SceneState;
use crate::simulation::FrameSet;

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<environment::EnvironmentConfig>()
            .add_systems(Startup, environment::setup_environment)
            .add_systems(
                Update,
                rig::sync_rigs
                    .in_set(FrameSet::Sync)
                    .run_if(in_state(SceneState::Running)),
            );
    }
}
