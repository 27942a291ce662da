//! Orientation, banking, and per-archetype kinematic constants.
//!
//! Orientation is built in two explicit steps: a path-facing rotation that
//! points local `-Z` along the travel tangent, then a fixed per-archetype
//! basis correction that maps the model's own forward axis onto `-Z`.

use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, PI};

use bevy::math::{DMat3, DQuat, DVec3};
use bevy::prelude::*;

use super::agents::AgentKind;

/// Yaw rates below this are treated as straight travel.
const TURN_EPSILON: f64 = 1e-9;

/// Orthonormal frame attached to a moving point.
/// `forward × up = lateral`, so a local offset `(x, y, z)` reads as
/// "x ahead, y above, z to the side".
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TravelFrame {
    pub forward: DVec3,
    pub up: DVec3,
    pub lateral: DVec3,
}

impl TravelFrame {
    pub fn to_world(&self, local: DVec3) -> DVec3 {
        self.forward * local.x + self.up * local.y + self.lateral * local.z
    }
}

pub fn travel_frame(forward: DVec3) -> TravelFrame {
    let forward = forward.try_normalize().unwrap_or(DVec3::X);
    let lateral = forward
        .cross(DVec3::Y)
        .try_normalize()
        .unwrap_or(DVec3::Z);
    let up = lateral.cross(forward);
    TravelFrame {
        forward,
        up,
        lateral,
    }
}

/// Rotation that points local `-Z` along `forward` with local `+Y` as close
/// to `up` as possible.
pub fn look_rotation(forward: DVec3, up: DVec3) -> DQuat {
    let back = -forward.try_normalize().unwrap_or(DVec3::NEG_Z);
    let right = up
        .cross(back)
        .try_normalize()
        .unwrap_or_else(|| back.any_orthonormal_vector());
    let up = back.cross(right);
    DQuat::from_mat3(&DMat3::from_cols(right, up, back)).normalize()
}

/// Signed yaw change from `from` to `to` about world `+Y`, ignoring the
/// vertical component. Positive means a left turn.
pub fn yaw_between(from: DVec3, to: DVec3) -> f64 {
    let cross = from.z * to.x - from.x * to.z;
    let dot = from.x * to.x + from.z * to.z;
    if cross == 0.0 && dot == 0.0 {
        return 0.0;
    }
    cross.atan2(dot)
}

/// How an agent rolls about its travel axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum BankProfile {
    #[default]
    Level,
    /// Constant magnitude, sign following the turn direction.
    Fixed { angle: f64 },
    /// Linear in the instantaneous yaw rate, clamped to `limit`.
    Curvature { gain: f64, limit: f64 },
}

impl BankProfile {
    /// Bank angle for a yaw rate in rad/s (positive = turning left).
    /// Positive bank lowers the left side.
    pub fn bank(&self, yaw_rate: f64) -> f64 {
        if !yaw_rate.is_finite() {
            return 0.0;
        }
        match *self {
            BankProfile::Level => 0.0,
            BankProfile::Fixed { angle } => {
                if yaw_rate.abs() < TURN_EPSILON {
                    0.0
                } else {
                    angle.abs() * yaw_rate.signum()
                }
            }
            BankProfile::Curvature { gain, limit } => {
                let limit = limit.abs();
                (gain * yaw_rate).clamp(-limit, limit)
            }
        }
    }
}

/// The model-space axis an archetype's mesh treats as "forward".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForwardAxis {
    PosX,
    NegX,
    PosZ,
    NegZ,
}

impl ForwardAxis {
    /// Yaw about `+Y` mapping this axis onto `-Z`.
    pub fn yaw_correction(self) -> f64 {
        match self {
            ForwardAxis::PosX => FRAC_PI_2,
            ForwardAxis::NegX => -FRAC_PI_2,
            ForwardAxis::PosZ => PI,
            ForwardAxis::NegZ => 0.0,
        }
    }
}

/// Per-archetype constants. Measured from the asset, not derived.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KindProfile {
    /// Basis correction applied after the path-facing rotation.
    pub yaw_offset: f64,
    /// Constant nose-down pitch.
    pub pitch: f64,
    /// Radians of wheel, rotor, or propeller spin per world unit travelled.
    pub spin_gain: f64,
    /// Walk-cycle angular frequency in rad/s.
    pub gait_frequency: f64,
    /// Peak leg swing in radians; arms swing half as far.
    pub gait_amplitude: f64,
}

impl Default for KindProfile {
    fn default() -> Self {
        Self {
            yaw_offset: ForwardAxis::PosX.yaw_correction(),
            pitch: 0.0,
            spin_gain: 0.0,
            gait_frequency: 0.0,
            gait_amplitude: 0.0,
        }
    }
}

#[derive(Resource, Clone, Debug)]
pub struct KinematicsConfig {
    profiles: HashMap<AgentKind, KindProfile>,
    fallback: KindProfile,
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        let base = KindProfile::default();
        let mut profiles = HashMap::new();

        profiles.insert(AgentKind::Car, KindProfile { spin_gain: 1.0 / 0.45, ..base });
        profiles.insert(AgentKind::Truck, KindProfile { spin_gain: 1.0 / 0.55, ..base });
        profiles.insert(AgentKind::Scooter, KindProfile { spin_gain: 1.0 / 0.3, ..base });
        profiles.insert(
            AgentKind::Pedestrian,
            KindProfile {
                gait_frequency: 12.0,
                gait_amplitude: 0.6,
                ..base
            },
        );
        profiles.insert(
            AgentKind::Drone,
            KindProfile {
                pitch: 0.2,
                spin_gain: 3.0,
                ..base
            },
        );
        profiles.insert(AgentKind::Submarine, KindProfile { spin_gain: 0.7, ..base });

        Self {
            profiles,
            fallback: base,
        }
    }
}

impl KinematicsConfig {
    pub fn profile(&self, kind: AgentKind) -> &KindProfile {
        self.profiles.get(&kind).unwrap_or(&self.fallback)
    }

    pub fn set_profile(&mut self, kind: AgentKind, profile: KindProfile) {
        self.profiles.insert(kind, profile);
    }

    /// Replace every archetype's yaw offset with the one implied by the
    /// factory's model forward axis.
    pub fn calibrate(&mut self, forward_axis: impl Fn(AgentKind) -> ForwardAxis) {
        for kind in AgentKind::ALL {
            let fallback = self.fallback;
            let profile = self.profiles.entry(kind).or_insert(fallback);
            profile.yaw_offset = forward_axis(kind).yaw_correction();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: DVec3, b: DVec3) {
        assert!(a.abs_diff_eq(b, 1e-9), "{a:?} != {b:?}");
    }

    #[test]
    fn look_rotation_points_negative_z_along_forward() {
        for forward in [DVec3::X, DVec3::Z, DVec3::new(1.0, 0.3, -2.0).normalize()] {
            let rotation = look_rotation(forward, DVec3::Y);
            assert_close(rotation * DVec3::NEG_Z, forward);
            assert!((rotation * DVec3::Y).y > 0.0);
        }
    }

    #[test]
    fn look_rotation_survives_vertical_forward() {
        let rotation = look_rotation(DVec3::Y, DVec3::Y);
        assert!(rotation.is_finite());
        assert_close(rotation * DVec3::NEG_Z, DVec3::Y);
    }

    #[test]
    fn yaw_correction_maps_model_forward_onto_negative_z() {
        for axis in [ForwardAxis::PosX, ForwardAxis::NegX, ForwardAxis::PosZ, ForwardAxis::NegZ] {
            let model_forward = match axis {
                ForwardAxis::PosX => DVec3::X,
                ForwardAxis::NegX => DVec3::NEG_X,
                ForwardAxis::PosZ => DVec3::Z,
                ForwardAxis::NegZ => DVec3::NEG_Z,
            };
            let corrected = DQuat::from_rotation_y(axis.yaw_correction()) * model_forward;
            assert_close(corrected, DVec3::NEG_Z);
        }
    }

    #[test]
    fn travel_frame_is_right_handed() {
        let frame = travel_frame(DVec3::X);
        assert_close(frame.lateral, DVec3::Z);
        assert_close(frame.up, DVec3::Y);
        assert_close(frame.to_world(DVec3::new(-15.0, 0.0, 10.0)), DVec3::new(-15.0, 0.0, 10.0));
    }

    #[test]
    fn positive_yaw_is_a_left_turn() {
        // Facing -Z, a left turn swings the heading toward -X.
        let yaw = yaw_between(DVec3::NEG_Z, DVec3::new(-0.1, 0.0, -1.0));
        assert!(yaw > 0.0);
        let rotated = DQuat::from_rotation_y(0.1) * DVec3::NEG_Z;
        assert!(rotated.x < 0.0);
    }

    #[test]
    fn fixed_bank_follows_turn_sign_only() {
        let bank = BankProfile::Fixed { angle: 0.45 };
        assert_eq!(bank.bank(0.02), 0.45);
        assert_eq!(bank.bank(-3.0), -0.45);
        assert_eq!(bank.bank(0.0), 0.0);
        assert_eq!(bank.bank(f64::NAN), 0.0);
    }

    #[test]
    fn curvature_bank_is_clamped() {
        let bank = BankProfile::Curvature { gain: 2.0, limit: 0.5 };
        assert_eq!(bank.bank(0.1), 0.2);
        assert_eq!(bank.bank(1.0), 0.5);
        assert_eq!(bank.bank(-1.0), -0.5);
    }

    #[test]
    fn calibrate_overrides_yaw_offsets_for_every_kind() {
        let mut config = KinematicsConfig::default();
        config.calibrate(|kind| {
            if kind == AgentKind::Pedestrian {
                ForwardAxis::NegZ
            } else {
                ForwardAxis::PosZ
            }
        });
        assert_eq!(config.profile(AgentKind::Pedestrian).yaw_offset, 0.0);
        assert_eq!(config.profile(AgentKind::Jet).yaw_offset, PI);
        // Other constants survive calibration.
        assert_eq!(config.profile(AgentKind::Pedestrian).gait_frequency, 12.0);
    }
}
