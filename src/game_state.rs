//! Scene lifecycle and playback speed.

use bevy::prelude::*;

pub struct GameStatePlugin;

impl Plugin for GameStatePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<SceneState>()
            .init_resource::<SimulationSpeed>();
    }
}

/// Construction runs to completion before the first tick.
#[derive(States, Default, Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum SceneState {
    /// Placement and population in progress; no ticks.
    #[default]
    Building,
    /// Scheduler ticks once per frame until the app exits.
    Running,
}

/// Controls simulation tick speed.
#[derive(Resource, Debug)]
pub struct SimulationSpeed {
    /// True if simulation is paused (time doesn't advance).
    pub paused: bool,
    /// Speed multiplier: 1.0 = normal, 2.0 = fast, 0.5 = slow.
    pub speed: f32,
}

impl SimulationSpeed {
    pub const MIN: f32 = 0.5;
    pub const MAX: f32 = 4.0;

    /// Nudge the multiplier, staying within `[MIN, MAX]`.
    pub fn step(&mut self, delta: f32) {
        self.speed = (self.speed + delta).clamp(Self::MIN, Self::MAX);
    }
}

impl Default for SimulationSpeed {
    fn default() -> Self {
        Self {
            paused: false,
            speed: 1.0,
        }
    }
}
