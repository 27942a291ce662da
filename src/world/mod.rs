//! World description: island zoning, landmarks, and spatial lookups.

use bevy::prelude::*;

pub mod grid;
pub mod landmarks;
pub mod zones;

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<zones::ZoneModel>();
    }
}
