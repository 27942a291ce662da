//! One-shot scene construction.
//!
//! Placement runs first and hands static content to the factory, then the
//! registry is populated and handed to a fresh [`Simulation`]. Nothing ticks
//! until the whole build has succeeded.

use bevy::prelude::*;

use crate::error::SceneBuildError;
use crate::game_state::SceneState;
use crate::procgen::placement::{PlacementConfig, PlacementEngine, PlacementPlan};
use crate::render::factory::BevyFactory;
use crate::simulation::agents::AgentRegistry;
use crate::simulation::handle::{MovableHandle, RenderableFactory, StaticContent};
use crate::simulation::kinematics::KinematicsConfig;
use crate::simulation::population::{populate, PopulationConfig, PopulationStats};
use crate::simulation::scheduler::Simulation;
use crate::simulation::CitySimulation;
use crate::world::zones::ZoneModel;

pub struct CityScene<H> {
    pub plan: PlacementPlan,
    pub population: PopulationStats,
    pub simulation: Simulation<H>,
}

impl<H: MovableHandle> CityScene<H> {
    /// Build every static structure and agent through `factory`.
    ///
    /// Fails on a malformed ring zone or on the first agent the factory
    /// cannot produce a handle for.
    pub fn build<F>(
        factory: &mut F,
        zones: &ZoneModel,
        placement: &PlacementConfig,
        population: &PopulationConfig,
        kinematics: &KinematicsConfig,
    ) -> Result<Self, SceneBuildError>
    where
        F: RenderableFactory<Handle = H>,
    {
        zones.validate()?;

        let plan = PlacementEngine::new(placement, zones).plan();
        for landmark in &plan.landmarks {
            factory.build_static(StaticContent::Landmark(landmark));
        }
        for building in &plan.buildings {
            factory.build_static(StaticContent::Building(building));
        }
        for tree in &plan.trees {
            factory.build_static(StaticContent::Tree(tree));
        }

        let mut registry = AgentRegistry::new();
        let stats = populate(&mut registry, factory, zones, population)?;

        let mut kinematics = kinematics.clone();
        kinematics.calibrate(|kind| factory.forward_axis(kind));

        Ok(Self {
            plan,
            population: stats,
            simulation: Simulation::new(registry, kinematics),
        })
    }
}

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, build_scene);
    }
}

#[allow(clippy::too_many_arguments)]
fn build_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    zones: Res<ZoneModel>,
    placement: Res<PlacementConfig>,
    population: Res<PopulationConfig>,
    kinematics: Res<KinematicsConfig>,
    mut next_state: ResMut<NextState<SceneState>>,
    mut exit: EventWriter<AppExit>,
) {
    let mut factory = BevyFactory::new(&mut commands, &mut meshes, &mut materials);
    match CityScene::build(&mut factory, &zones, &placement, &population, &kinematics) {
        Ok(scene) => {
            info!(
                "Scene built: {} landmarks, {} buildings, {} trees, {} agents",
                scene.plan.landmarks.len(),
                scene.plan.buildings.len(),
                scene.plan.trees.len(),
                scene.population.total()
            );
            commands.insert_resource(CitySimulation(scene.simulation));
            next_state.set(SceneState::Running);
        }
        Err(err) => {
            error!("Scene build failed: {err}");
            exit.send(AppExit::error());
        }
    }
}
