//! ECS-backed renderable handles.
//!
//! The simulation writes poses into [`RigHandle`]s; `sync_rigs` copies them
//! onto entity transforms once per frame, converting to `f32` only here.

use bevy::math::{DQuat, DVec3};
use bevy::prelude::*;
use smallvec::SmallVec;

use crate::simulation::handle::{MovableHandle, Pose};
use crate::simulation::CitySimulation;

/// Root entity of a simulated agent.
#[derive(Component, Debug)]
pub struct AgentRig;

#[derive(Clone, Debug)]
struct RigPart {
    name: &'static str,
    entity: Entity,
    rotation: DQuat,
}

#[derive(Clone, Debug)]
pub struct RigHandle {
    root: Entity,
    pose: Pose,
    parts: SmallVec<[RigPart; 4]>,
}

impl RigHandle {
    pub fn new(root: Entity) -> Self {
        Self {
            root,
            pose: Pose::IDENTITY,
            parts: SmallVec::new(),
        }
    }

    /// Register a named child whose local rotation the simulation may drive.
    pub fn add_part(&mut self, name: &'static str, entity: Entity, rest: Quat) {
        self.parts.push(RigPart {
            name,
            entity,
            rotation: rest.as_dquat(),
        });
    }

    pub fn root(&self) -> Entity {
        self.root
    }
}

impl MovableHandle for RigHandle {
    fn translation(&self) -> DVec3 {
        self.pose.translation
    }

    fn set_translation(&mut self, translation: DVec3) {
        self.pose.translation = translation;
    }

    fn rotation(&self) -> DQuat {
        self.pose.rotation
    }

    fn set_rotation(&mut self, rotation: DQuat) {
        self.pose.rotation = rotation;
    }

    fn part_count(&self) -> usize {
        self.parts.len()
    }

    fn part_name(&self, index: usize) -> Option<&str> {
        self.parts.get(index).map(|part| part.name)
    }

    fn part_rotation(&self, index: usize) -> Option<DQuat> {
        self.parts.get(index).map(|part| part.rotation)
    }

    fn set_part_rotation(&mut self, index: usize, rotation: DQuat) {
        if let Some(part) = self.parts.get_mut(index) {
            part.rotation = rotation;
        }
    }
}

/// Copy every handle's pose onto its entities.
pub fn sync_rigs(simulation: Res<CitySimulation>, mut transforms: Query<&mut Transform>) {
    for agent in simulation.0.registry().iter() {
        let rig = agent.handle();
        if let Ok(mut transform) = transforms.get_mut(rig.root) {
            transform.translation = rig.pose.translation.as_vec3();
            transform.rotation = rig.pose.rotation.as_quat();
        }
        for part in &rig.parts {
            if let Ok(mut transform) = transforms.get_mut(part.entity) {
                transform.rotation = part.rotation.as_quat();
            }
        }
    }
}
