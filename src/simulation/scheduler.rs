//! The per-frame update.
//!
//! One tick advances the clock, then poses every agent from its trajectory
//! alone. No agent reads another agent's state, so the order of updates
//! never matters.

use bevy::math::{DQuat, DVec3};
use bevy::prelude::*;

use super::agents::{Agent, AgentRegistry};
use super::handle::{MovableHandle, Pose};
use super::kinematics::{look_rotation, KinematicsConfig};

/// Owns the registry for the lifetime of the scene.
pub struct Simulation<H> {
    registry: AgentRegistry<H>,
    kinematics: KinematicsConfig,
    clock: f64,
    ticks: u64,
}

impl<H: MovableHandle> Simulation<H> {
    /// Take over a fully populated registry and pose every agent at `t = 0`.
    pub fn new(registry: AgentRegistry<H>, kinematics: KinematicsConfig) -> Self {
        let mut simulation = Self {
            registry,
            kinematics,
            clock: 0.0,
            ticks: 0,
        };
        simulation.update_agents(0.0);
        simulation
    }

    /// Advance by `dt` seconds. Negative or non-finite deltas count as zero,
    /// which re-poses every agent without moving anything.
    pub fn tick(&mut self, dt: f64) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.clock += dt;
        self.ticks += 1;
        self.update_agents(dt);
    }

    /// Advance to an absolute host time. A time behind the clock is a
    /// zero-length tick; the clock never runs backwards.
    pub fn tick_to(&mut self, seconds: f64) {
        let dt = if seconds.is_finite() {
            seconds - self.clock
        } else {
            0.0
        };
        self.tick(dt);
    }

    fn update_agents(&mut self, dt: f64) {
        let clock = self.clock;
        let kinematics = &self.kinematics;
        self.registry
            .for_each_mut(|agent| update_agent(agent, kinematics, clock, dt));
    }
}

impl<H> Simulation<H> {
    /// Seconds since scene start.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn registry(&self) -> &AgentRegistry<H> {
        &self.registry
    }

    pub fn kinematics(&self) -> &KinematicsConfig {
        &self.kinematics
    }
}

/// Pose one agent at simulation time `clock`.
///
/// Orientation is composed as: face the look-ahead point, bank about the
/// travel axis, pitch, then the archetype's fixed basis correction.
pub fn update_agent<H: MovableHandle>(
    agent: &mut Agent<H>,
    kinematics: &KinematicsConfig,
    clock: f64,
    dt: f64,
) {
    let t = agent.local_time(clock);
    let local_dt = dt * agent.params().speed_scale.abs();
    let profile = kinematics.profile(agent.kind());
    let trajectory = agent.trajectory();
    let params = *agent.params();

    let heading = trajectory
        .heading_at(t)
        .filter(|heading| heading.is_finite())
        .unwrap_or(agent.last_heading);
    let yaw_rate = trajectory.yaw_rate_at(t);
    let speed = trajectory.speed_at(t);

    let mut translation = trajectory.position_at(t);
    translation.y += params.bob.heave.at(t);

    let roll = params.bank.bank(yaw_rate) + params.bob.roll.at(t);
    let rotation = look_rotation(heading, DVec3::Y)
        * DQuat::from_rotation_z(roll)
        * DQuat::from_rotation_x(-profile.pitch)
        * DQuat::from_rotation_y(profile.yaw_offset);

    let pose = Pose {
        translation,
        rotation,
    };
    let pose = if pose.is_finite() {
        agent.last_heading = heading;
        agent.last_pose = pose;
        pose
    } else {
        if !agent.clamped {
            debug!(
                "{} {:?} produced a non-finite pose at t={t:.3}; holding last valid transform",
                agent.kind().label(),
                agent.id()
            );
            agent.clamped = true;
        }
        agent.last_pose
    };

    agent.handle.set_pose(pose);
    agent
        .articulation
        .advance(&mut agent.handle, profile, speed, local_dt, t);
}
