//! Animated island city backdrop.
//!
//! A deterministic placement engine lays out the island's static content,
//! then a frame-driven kinematic simulation moves a fixed population of
//! vehicles, pedestrians, vessels, and aircraft along parametric paths.

pub mod camera;
pub mod error;
pub mod game_state;
pub mod procgen;
pub mod render;
pub mod scene;
pub mod simulation;
pub mod world;

pub use error::SceneBuildError;
pub use scene::CityScene;
pub use simulation::scheduler::Simulation;
