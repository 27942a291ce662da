//! Island Backdrop - animated city diorama
//!
//! A Bevy app that builds the island once at startup and then drives
//! every agent from a single per-frame tick.

use bevy::prelude::*;

use island_backdrop::{camera, game_state, procgen, render, scene, simulation, world};

fn main() -> AppExit {
    // Force Vulkan backend on Windows (DX12 causes crashes on some systems)
    #[cfg(target_os = "windows")]
    std::env::set_var("WGPU_BACKEND", "vulkan");
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Island Backdrop".into(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        // Scene lifecycle and playback speed
        .add_plugins(game_state::GameStatePlugin)
        // Zones, placement, population config
        .add_plugins(world::WorldPlugin)
        .add_plugins(procgen::ProcgenPlugin)
        .add_plugins(simulation::SimulationPlugin)
        // Rendering and view
        .add_plugins(render::RenderPlugin)
        .add_plugins(camera::CameraPlugin)
        // One-shot construction
        .add_plugins(scene::ScenePlugin)
        .run()
}
