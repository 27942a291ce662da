//! Procedural generation of static content.
//!
//! - Density field and zoning tiers
//! - Jittered-grid building placement with clash avoidance
//! - Tree scatter

use bevy::prelude::*;

pub mod density;
pub mod placement;

pub struct ProcgenPlugin;

impl Plugin for ProcgenPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<placement::PlacementConfig>();
    }
}
