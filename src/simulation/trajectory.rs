//! Parametric, time-driven paths.
//!
//! Every trajectory is a pure function of simulation time to world
//! position. Heading is never stored by a trajectory: it is the normalized
//! difference between the position one look-ahead step in the future and
//! the position now.

use std::f64::consts::TAU;
use std::sync::Arc;

use bevy::math::DVec3;

use super::kinematics::{travel_frame, yaw_between};
use crate::world::zones::{RingZone, LANE_COUNT};

/// Look-ahead used for heading, speed, and turn-rate estimates, in seconds.
pub const LOOK_AHEAD: f64 = 0.1;

/// Displacements shorter than this over one look-ahead count as standing still.
const MIN_DISPLACEMENT: f64 = 1e-9;

/// `amplitude * sin(t * frequency + phase)`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Oscillation {
    pub amplitude: f64,
    pub frequency: f64,
    pub phase: f64,
}

impl Oscillation {
    pub const NONE: Oscillation = Oscillation {
        amplitude: 0.0,
        frequency: 0.0,
        phase: 0.0,
    };

    pub const fn new(amplitude: f64, frequency: f64, phase: f64) -> Self {
        Self {
            amplitude,
            frequency,
            phase,
        }
    }

    pub fn at(&self, t: f64) -> f64 {
        if self.amplitude == 0.0 {
            return 0.0;
        }
        self.amplitude * (t * self.frequency + self.phase).sin()
    }

    fn sanitized(self) -> Self {
        Self {
            amplitude: finite_or(self.amplitude, 0.0),
            frequency: finite_or(self.frequency, 0.0),
            phase: finite_or(self.phase, 0.0),
        }
    }
}

/// Travel direction on a ring, in the scene's x→z angle convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TravelDirection {
    CounterClockwise,
    Clockwise,
}

impl TravelDirection {
    /// Even lanes run counter-clockwise, odd lanes clockwise.
    pub fn for_lane(lane: usize) -> Self {
        if lane % 2 == 0 {
            TravelDirection::CounterClockwise
        } else {
            TravelDirection::Clockwise
        }
    }

    pub fn sign(self) -> f64 {
        match self {
            TravelDirection::CounterClockwise => 1.0,
            TravelDirection::Clockwise => -1.0,
        }
    }
}

/// Circle or ellipse around the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orbit {
    pub radius: f64,
    /// rad/s; negative runs clockwise.
    pub angular_speed: f64,
    pub altitude: f64,
    pub phase: f64,
    /// Ratio of the z semi-axis to the x semi-axis.
    pub aspect: f64,
    pub altitude_wave: Oscillation,
}

impl Orbit {
    pub fn new(radius: f64, angular_speed: f64, altitude: f64, phase: f64) -> Self {
        Self {
            radius,
            angular_speed,
            altitude,
            phase,
            aspect: 1.0,
            altitude_wave: Oscillation::NONE,
        }
    }

    pub fn with_aspect(mut self, aspect: f64) -> Self {
        self.aspect = aspect;
        self
    }

    pub fn with_altitude_wave(mut self, wave: Oscillation) -> Self {
        self.altitude_wave = wave;
        self
    }

    pub fn position_at(&self, t: f64) -> DVec3 {
        let theta = self.phase + self.angular_speed * t;
        DVec3::new(
            self.radius * theta.cos(),
            self.altitude + self.altitude_wave.at(t),
            self.radius * self.aspect * theta.sin(),
        )
    }

    fn sanitized(self) -> Self {
        Self {
            radius: non_negative(self.radius),
            angular_speed: finite_or(self.angular_speed, 0.0),
            altitude: finite_or(self.altitude, 0.0),
            phase: finite_or(self.phase, 0.0),
            aspect: finite_or(self.aspect, 1.0).abs(),
            altitude_wave: self.altitude_wave.sanitized(),
        }
    }
}

/// One lane of a ring road.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaneOrbit {
    /// Index of the ring in the zone model.
    pub ring_index: usize,
    pub ring: RingZone,
    pub lane_index: usize,
    pub direction: TravelDirection,
    /// Linear speed along the lane in units/s.
    pub speed: f64,
    pub phase: f64,
    pub altitude: f64,
}

impl LaneOrbit {
    /// Lane direction follows lane parity.
    pub fn new(ring_index: usize, ring: RingZone, lane_index: usize, speed: f64, phase: f64) -> Self {
        let lane_index = lane_index.min(LANE_COUNT - 1);
        Self {
            ring_index,
            ring,
            lane_index,
            direction: TravelDirection::for_lane(lane_index),
            speed,
            phase,
            altitude: 0.0,
        }
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = altitude;
        self
    }

    pub fn radius(&self) -> f64 {
        self.ring.lane_radius(self.lane_index).max(0.0)
    }

    pub fn angular_speed(&self) -> f64 {
        let radius = self.radius();
        if radius > 0.0 {
            self.direction.sign() * self.speed / radius
        } else {
            0.0
        }
    }

    pub fn position_at(&self, t: f64) -> DVec3 {
        let radius = self.radius();
        let theta = self.phase + self.angular_speed() * t;
        DVec3::new(radius * theta.cos(), self.altitude, radius * theta.sin())
    }

    fn sanitized(self) -> Self {
        Self {
            lane_index: self.lane_index.min(LANE_COUNT - 1),
            speed: finite_or(self.speed, 0.0).abs(),
            phase: finite_or(self.phase, 0.0),
            altitude: finite_or(self.altitude, 0.0),
            ..self
        }
    }
}

/// Lemniscate-like patrol: `x = rx·sin(θ)`, `z = rz·sin(2θ)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FigureEight {
    pub radius_x: f64,
    pub radius_z: f64,
    pub angular_speed: f64,
    pub altitude: f64,
    pub phase: f64,
    pub altitude_wave: Oscillation,
}

impl FigureEight {
    pub fn new(radius_x: f64, radius_z: f64, angular_speed: f64) -> Self {
        Self {
            radius_x,
            radius_z,
            angular_speed,
            altitude: 0.0,
            phase: 0.0,
            altitude_wave: Oscillation::NONE,
        }
    }

    pub fn at_altitude(mut self, altitude: f64) -> Self {
        self.altitude = altitude;
        self
    }

    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_altitude_wave(mut self, wave: Oscillation) -> Self {
        self.altitude_wave = wave;
        self
    }

    pub fn position_at(&self, t: f64) -> DVec3 {
        let theta = self.phase + self.angular_speed * t;
        DVec3::new(
            self.radius_x * theta.sin(),
            self.altitude + self.altitude_wave.at(t),
            self.radius_z * (2.0 * theta).sin(),
        )
    }

    fn sanitized(self) -> Self {
        Self {
            radius_x: non_negative(self.radius_x),
            radius_z: non_negative(self.radius_z),
            angular_speed: finite_or(self.angular_speed, 0.0),
            altitude: finite_or(self.altitude, 0.0),
            phase: finite_or(self.phase, 0.0),
            altitude_wave: self.altitude_wave.sanitized(),
        }
    }
}

/// Fixed translation in a leader's travel frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FormationOffset {
    pub leader: Arc<Trajectory>,
    /// `x` ahead of the leader, `y` above, `z` to the side.
    pub local_offset: DVec3,
}

impl FormationOffset {
    pub fn position_at(&self, t: f64) -> DVec3 {
        let anchor = self.leader.position_at(t);
        let heading = self
            .leader
            .heading_at(t)
            .unwrap_or_else(|| self.leader.rest_heading());
        anchor + travel_frame(heading).to_world(self.local_offset)
    }
}

/// The closed set of motion laws.
#[derive(Clone, Debug, PartialEq)]
pub enum Trajectory {
    Orbit(Orbit),
    LaneOrbit(LaneOrbit),
    FigureEight(FigureEight),
    FormationOffset(FormationOffset),
}

impl Trajectory {
    pub fn position_at(&self, t: f64) -> DVec3 {
        match self {
            Trajectory::Orbit(orbit) => orbit.position_at(t),
            Trajectory::LaneOrbit(lane) => lane.position_at(t),
            Trajectory::FigureEight(eight) => eight.position_at(t),
            Trajectory::FormationOffset(member) => member.position_at(t),
        }
    }

    /// Unit vector toward the look-ahead sample, `None` while the path does
    /// not move across the ground. Vertical-only motion (an altitude wave on
    /// a stationary point) has no heading. Formation members report their
    /// leader's heading.
    pub fn heading_at(&self, t: f64) -> Option<DVec3> {
        if let Trajectory::FormationOffset(member) = self {
            return member.leader.heading_at(t);
        }
        let step = self.position_at(t + LOOK_AHEAD) - self.position_at(t);
        let ground = step.x.hypot(step.z);
        if !(ground.is_finite() && ground > MIN_DISPLACEMENT) {
            return None;
        }
        let length = step.length();
        length.is_finite().then(|| step / length)
    }

    /// Heading to fall back on when the path does not move. Sampled once at
    /// construction: the ground-plane tangent at the starting phase, `+X`
    /// when the path has no extent.
    pub fn rest_heading(&self) -> DVec3 {
        if let Some(heading) = self.heading_at(0.0) {
            return heading;
        }
        let tangent = match self {
            Trajectory::Orbit(orbit) if orbit.radius > 0.0 => {
                DVec3::new(-orbit.phase.sin(), 0.0, orbit.aspect * orbit.phase.cos())
            }
            Trajectory::LaneOrbit(lane) if lane.radius() > 0.0 => {
                DVec3::new(-lane.phase.sin(), 0.0, lane.phase.cos()) * lane.direction.sign()
            }
            Trajectory::FigureEight(eight) => DVec3::new(
                eight.radius_x * eight.phase.cos(),
                0.0,
                2.0 * eight.radius_z * (2.0 * eight.phase).cos(),
            ),
            Trajectory::FormationOffset(member) => return member.leader.rest_heading(),
            _ => DVec3::X,
        };
        tangent
            .try_normalize()
            .filter(|heading| heading.is_finite())
            .unwrap_or(DVec3::X)
    }

    /// Linear speed in units/s, estimated over one look-ahead step.
    pub fn speed_at(&self, t: f64) -> f64 {
        let speed = (self.position_at(t + LOOK_AHEAD) - self.position_at(t)).length() / LOOK_AHEAD;
        finite_or(speed, 0.0)
    }

    /// Turn rate about world `+Y` in rad/s, positive for left turns.
    /// Formation members turn with their leader.
    pub fn yaw_rate_at(&self, t: f64) -> f64 {
        let leader = self.leader();
        match (leader.heading_at(t), leader.heading_at(t + LOOK_AHEAD)) {
            (Some(now), Some(next)) => yaw_between(now, next) / LOOK_AHEAD,
            _ => 0.0,
        }
    }

    /// The trajectory whose curvature governs this one.
    pub fn leader(&self) -> &Trajectory {
        match self {
            Trajectory::FormationOffset(member) => member.leader.leader(),
            other => other,
        }
    }

    /// Seconds per lap, `None` for stationary paths.
    pub fn period(&self) -> Option<f64> {
        let angular_speed = match self {
            Trajectory::Orbit(orbit) => orbit.angular_speed,
            Trajectory::LaneOrbit(lane) => lane.angular_speed(),
            Trajectory::FigureEight(eight) => eight.angular_speed,
            Trajectory::FormationOffset(member) => return member.leader.period(),
        };
        (angular_speed != 0.0 && angular_speed.is_finite()).then(|| TAU / angular_speed.abs())
    }

    /// Replace non-finite or negative parameters with safe defaults: a bad
    /// radius collapses to a stationary point, a bad phase or speed to zero.
    pub fn sanitized(self) -> Self {
        match self {
            Trajectory::Orbit(orbit) => Trajectory::Orbit(orbit.sanitized()),
            Trajectory::LaneOrbit(lane) => Trajectory::LaneOrbit(lane.sanitized()),
            Trajectory::FigureEight(eight) => Trajectory::FigureEight(eight.sanitized()),
            Trajectory::FormationOffset(member) => {
                let local_offset = if member.local_offset.is_finite() {
                    member.local_offset
                } else {
                    DVec3::ZERO
                };
                let leader = Arc::unwrap_or_clone(member.leader).sanitized();
                Trajectory::FormationOffset(FormationOffset {
                    leader: Arc::new(leader),
                    local_offset,
                })
            }
        }
    }
}

impl From<Orbit> for Trajectory {
    fn from(orbit: Orbit) -> Self {
        Trajectory::Orbit(orbit)
    }
}

impl From<LaneOrbit> for Trajectory {
    fn from(lane: LaneOrbit) -> Self {
        Trajectory::LaneOrbit(lane)
    }
}

impl From<FigureEight> for Trajectory {
    fn from(eight: FigureEight) -> Self {
        Trajectory::FigureEight(eight)
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
