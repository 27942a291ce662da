//! Live agents and the registry that owns them.
//!
//! The population is fixed at construction: agents are spawned once and
//! dropped together with the registry. [`AgentRegistry::for_each_mut`] is
//! the only per-frame mutation entrypoint.

use bevy::math::DVec3;

use super::articulation::Articulation;
use super::handle::{MovableHandle, Pose};
use super::kinematics::BankProfile;
use super::trajectory::{LaneOrbit, Oscillation, Trajectory, TravelDirection};
use crate::error::SceneBuildError;
use crate::world::zones::{RingZone, ZoneModel, LANE_COUNT};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgentKind {
    Car,
    Truck,
    Scooter,
    Pedestrian,
    Ship,
    Yacht,
    Jet,
    Fighter,
    Bomber,
    Drone,
    Submarine,
}

impl AgentKind {
    pub const ALL: [AgentKind; 11] = [
        AgentKind::Car,
        AgentKind::Truck,
        AgentKind::Scooter,
        AgentKind::Pedestrian,
        AgentKind::Ship,
        AgentKind::Yacht,
        AgentKind::Jet,
        AgentKind::Fighter,
        AgentKind::Bomber,
        AgentKind::Drone,
        AgentKind::Submarine,
    ];

    /// Ground agents bound to a ring road lane.
    pub fn is_road_vehicle(self) -> bool {
        matches!(self, AgentKind::Car | AgentKind::Truck | AgentKind::Scooter)
    }

    pub fn label(self) -> &'static str {
        match self {
            AgentKind::Car => "car",
            AgentKind::Truck => "truck",
            AgentKind::Scooter => "scooter",
            AgentKind::Pedestrian => "pedestrian",
            AgentKind::Ship => "ship",
            AgentKind::Yacht => "yacht",
            AgentKind::Jet => "jet",
            AgentKind::Fighter => "fighter",
            AgentKind::Bomber => "bomber",
            AgentKind::Drone => "drone",
            AgentKind::Submarine => "submarine",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u32);

/// Surface motion layered on top of the trajectory.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bob {
    /// Vertical offset.
    pub heave: Oscillation,
    /// Roll about the travel axis, added to the bank angle.
    pub roll: Oscillation,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentParams {
    /// Multiplier on simulation time for this agent's trajectory.
    pub speed_scale: f64,
    pub bank: BankProfile,
    pub bob: Bob,
    /// Per-agent walk-cycle phase offset.
    pub gait_phase: f64,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            speed_scale: 1.0,
            bank: BankProfile::Level,
            bob: Bob::default(),
            gait_phase: 0.0,
        }
    }
}

pub struct Agent<H> {
    id: AgentId,
    kind: AgentKind,
    pub(super) handle: H,
    trajectory: Trajectory,
    params: AgentParams,
    pub(super) articulation: Articulation,
    /// Heading used while the trajectory is standing still.
    pub(super) last_heading: DVec3,
    /// Last finite root pose written to the handle.
    pub(super) last_pose: Pose,
    /// Set once a non-finite pose has been clamped and logged.
    pub(super) clamped: bool,
}

impl<H> Agent<H> {
    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    pub fn params(&self) -> &AgentParams {
        &self.params
    }

    pub fn articulation(&self) -> &Articulation {
        &self.articulation
    }

    /// The agent's own time for a given simulation clock.
    pub fn local_time(&self, clock: f64) -> f64 {
        clock * self.params.speed_scale
    }

    pub fn last_heading(&self) -> DVec3 {
        self.last_heading
    }
}

pub struct AgentRegistry<H> {
    agents: Vec<Agent<H>>,
}

impl<H> Default for AgentRegistry<H> {
    fn default() -> Self {
        Self { agents: Vec::new() }
    }
}

impl<H: MovableHandle> AgentRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `handle` and bind it to `trajectory`. Malformed
    /// trajectory parameters are replaced with safe defaults here, once.
    pub fn spawn(
        &mut self,
        kind: AgentKind,
        trajectory: Trajectory,
        handle: H,
        mut params: AgentParams,
    ) -> AgentId {
        let id = AgentId(self.agents.len() as u32);
        let trajectory = trajectory.sanitized();
        if !params.speed_scale.is_finite() {
            params.speed_scale = 1.0;
        }
        let articulation = Articulation::bind(&handle, params.gait_phase);
        let last_pose = handle.pose();
        let last_heading = trajectory.rest_heading();
        self.agents.push(Agent {
            id,
            kind,
            handle,
            trajectory,
            params,
            articulation,
            last_heading,
            last_pose: if last_pose.is_finite() {
                last_pose
            } else {
                Pose::IDENTITY
            },
            clamped: false,
        });
        id
    }

    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut Agent<H>)) {
        for agent in &mut self.agents {
            f(agent);
        }
    }
}

impl<H> AgentRegistry<H> {
    pub fn get(&self, id: AgentId) -> Option<&Agent<H>> {
        self.agents.get(id.0 as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent<H>> {
        self.agents.iter()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn count(&self, kind: AgentKind) -> usize {
        self.agents.iter().filter(|agent| agent.kind == kind).count()
    }
}

/// A ground agent's lane on a ring road.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaneAssignment {
    pub ring_index: usize,
    pub ring: RingZone,
    pub lane_index: usize,
    /// Radial displacement from the ring's center radius.
    pub offset: f64,
    pub direction: TravelDirection,
}

impl LaneAssignment {
    pub fn orbit(&self, speed: f64, phase: f64) -> LaneOrbit {
        LaneOrbit::new(self.ring_index, self.ring, self.lane_index, speed, phase)
    }
}

/// Resolve lane `lane_index` (clamped to `0..3`) of ring `ring_index`.
pub fn lane_assignment(
    zones: &ZoneModel,
    ring_index: usize,
    lane_index: usize,
) -> Result<LaneAssignment, SceneBuildError> {
    let ring = *zones
        .ring(ring_index)
        .ok_or(SceneBuildError::UnknownRing(ring_index))?;
    let lane_index = lane_index.min(LANE_COUNT - 1);
    Ok(LaneAssignment {
        ring_index,
        ring,
        lane_index,
        offset: ring.lane_offset(lane_index),
        direction: TravelDirection::for_lane(lane_index),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::handle::DetachedRig;
    use crate::simulation::trajectory::Orbit;

    #[test]
    fn spawn_assigns_sequential_ids() {
        let mut registry = AgentRegistry::new();
        let a = registry.spawn(
            AgentKind::Ship,
            Orbit::new(360.0, 0.02, -1.6, 0.0).into(),
            DetachedRig::new(),
            AgentParams::default(),
        );
        let b = registry.spawn(
            AgentKind::Yacht,
            Orbit::new(300.0, 0.04, -1.6, 1.0).into(),
            DetachedRig::new(),
            AgentParams::default(),
        );
        assert_eq!((a, b), (AgentId(0), AgentId(1)));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(b).map(Agent::kind), Some(AgentKind::Yacht));
        assert_eq!(registry.count(AgentKind::Ship), 1);
        assert!(registry.get(AgentId(7)).is_none());
    }

    #[test]
    fn spawn_sanitizes_trajectories() {
        let mut registry = AgentRegistry::new();
        let id = registry.spawn(
            AgentKind::Drone,
            Orbit::new(f64::NAN, 1.0, 60.0, 0.0).into(),
            DetachedRig::new(),
            AgentParams {
                speed_scale: f64::INFINITY,
                ..AgentParams::default()
            },
        );
        let agent = registry.get(id).unwrap();
        assert!(agent.trajectory().position_at(5.0).is_finite());
        assert_eq!(agent.params().speed_scale, 1.0);
        assert!(agent.last_heading().is_finite());
    }

    #[test]
    fn lanes_alternate_direction_and_stay_on_the_road() {
        let zones = ZoneModel::standard();
        for ring_index in 0..zones.rings().len() {
            for lane in 0..LANE_COUNT {
                let assignment = lane_assignment(&zones, ring_index, lane).unwrap();
                assert!(assignment.offset.abs() <= assignment.ring.half_width());
                assert_eq!(assignment.direction, TravelDirection::for_lane(lane));
            }
        }
        let centre = lane_assignment(&zones, 0, 1).unwrap();
        assert_eq!(centre.offset, 0.0);
    }

    #[test]
    fn unknown_ring_is_an_error() {
        let zones = ZoneModel::standard();
        assert!(matches!(
            lane_assignment(&zones, 9, 0),
            Err(SceneBuildError::UnknownRing(9))
        ));
    }
}
