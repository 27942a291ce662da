//! The narrow seam between the simulation core and whatever draws it.
//!
//! The core only ever moves transforms: a root pose plus the local rotations
//! of named sub-parts. Geometry, materials, and entity bookkeeping stay on
//! the factory side of [`RenderableFactory`].

use bevy::math::{DQuat, DVec3};
use smallvec::SmallVec;

use super::agents::AgentKind;
use super::kinematics::ForwardAxis;
use crate::procgen::placement::{Placement, TreePlacement};
use crate::world::landmarks::Landmark;

/// World-space root transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub translation: DVec3,
    pub rotation: DQuat,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        translation: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
    };

    pub fn is_finite(&self) -> bool {
        self.translation.is_finite() && self.rotation.is_finite()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A movable transform with ordered, named sub-parts. Part rotations are
/// relative to the root.
pub trait MovableHandle {
    fn translation(&self) -> DVec3;
    fn set_translation(&mut self, translation: DVec3);
    fn rotation(&self) -> DQuat;
    fn set_rotation(&mut self, rotation: DQuat);

    fn part_count(&self) -> usize;
    fn part_name(&self, index: usize) -> Option<&str>;
    fn part_rotation(&self, index: usize) -> Option<DQuat>;
    fn set_part_rotation(&mut self, index: usize, rotation: DQuat);

    fn pose(&self) -> Pose {
        Pose {
            translation: self.translation(),
            rotation: self.rotation(),
        }
    }

    fn set_pose(&mut self, pose: Pose) {
        self.set_translation(pose.translation);
        self.set_rotation(pose.rotation);
    }

    fn find_part(&self, name: &str) -> Option<usize> {
        (0..self.part_count()).find(|&index| self.part_name(index) == Some(name))
    }
}

/// What the factory is asked to build for an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Archetype {
    pub kind: AgentKind,
    /// Visual variant within the kind (car body style, ship class...).
    pub variant: u8,
    /// Per-instance seed for colors and small details.
    pub seed: u64,
}

/// Static content produced by the placement engine.
#[derive(Clone, Copy, Debug)]
pub enum StaticContent<'a> {
    Landmark(&'a Landmark),
    Building(&'a Placement),
    Tree(&'a TreePlacement),
}

pub trait RenderableFactory {
    type Handle: MovableHandle;

    /// `None` means the factory cannot produce this archetype; the scene
    /// build treats that as fatal.
    fn build_agent(&mut self, archetype: Archetype) -> Option<Self::Handle>;

    /// Static content is fire-and-forget; the core keeps no handle to it.
    fn build_static(&mut self, content: StaticContent<'_>);

    /// The model-space axis this factory's meshes treat as forward.
    fn forward_axis(&self, _kind: AgentKind) -> ForwardAxis {
        ForwardAxis::PosX
    }
}

/// Named sub-parts every factory is expected to attach for a kind.
pub fn standard_parts(kind: AgentKind) -> &'static [&'static str] {
    match kind {
        AgentKind::Car | AgentKind::Truck => &["wheel_fl", "wheel_fr", "wheel_rl", "wheel_rr"],
        AgentKind::Scooter => &["wheel_f", "wheel_r"],
        AgentKind::Pedestrian => &["leg_l", "leg_r", "arm_l", "arm_r"],
        AgentKind::Drone => &["rotor_0", "rotor_1", "rotor_2", "rotor_3"],
        AgentKind::Submarine => &["prop"],
        AgentKind::Ship | AgentKind::Yacht | AgentKind::Jet | AgentKind::Fighter | AgentKind::Bomber => {
            &[]
        }
    }
}

#[derive(Clone, Debug)]
struct DetachedPart {
    name: String,
    rotation: DQuat,
}

/// In-memory handle with no renderer behind it.
#[derive(Clone, Debug, Default)]
pub struct DetachedRig {
    pose: Pose,
    parts: SmallVec<[DetachedPart; 4]>,
}

impl DetachedRig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parts<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            pose: Pose::IDENTITY,
            parts: names
                .into_iter()
                .map(|name| DetachedPart {
                    name: name.to_owned(),
                    rotation: DQuat::IDENTITY,
                })
                .collect(),
        }
    }
}

impl MovableHandle for DetachedRig {
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
        self.parts.get(index).map(|part| part.name.as_str())
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

/// Factory for tests and benches: builds [`DetachedRig`]s with the standard
/// part names and counts static content instead of drawing it.
#[derive(Clone, Debug, Default)]
pub struct HeadlessFactory {
    refused: Vec<AgentKind>,
    pub agents_built: usize,
    pub landmarks_built: usize,
    pub buildings_built: usize,
    pub trees_built: usize,
}

impl HeadlessFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `build_agent` fail for `kind`.
    pub fn refusing(mut self, kind: AgentKind) -> Self {
        self.refused.push(kind);
        self
    }

    pub fn statics_built(&self) -> usize {
        self.landmarks_built + self.buildings_built + self.trees_built
    }
}

impl RenderableFactory for HeadlessFactory {
    type Handle = DetachedRig;

    fn build_agent(&mut self, archetype: Archetype) -> Option<DetachedRig> {
        if self.refused.contains(&archetype.kind) {
            return None;
        }
        self.agents_built += 1;
        Some(DetachedRig::with_parts(standard_parts(archetype.kind).iter().copied()))
    }

    fn build_static(&mut self, content: StaticContent<'_>) {
        match content {
            StaticContent::Landmark(_) => self.landmarks_built += 1,
            StaticContent::Building(_) => self.buildings_built += 1,
            StaticContent::Tree(_) => self.trees_built += 1,
        }
    }
}
