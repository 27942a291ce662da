//! Secondary animation of named sub-parts.
//!
//! Spinning parts accumulate an angle proportional to distance travelled,
//! so wheels never slip against the ground. Limbs follow a periodic gait
//! with legs and arms in opposing phase.

use std::f64::consts::TAU;

use bevy::math::DQuat;
use smallvec::SmallVec;

use super::handle::MovableHandle;
use super::kinematics::KindProfile;

/// Arms swing this fraction of the leg amplitude.
const ARM_SWING_RATIO: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    fn sign(self) -> f64 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartRole {
    /// Rolls about the model's lateral axis.
    Wheel,
    /// Spins about the model's up axis.
    Rotor,
    /// Spins about the model's forward axis.
    Propeller,
    Leg(Side),
    Arm(Side),
}

impl PartRole {
    /// Role implied by a sub-part name, `None` for parts the core leaves alone.
    pub fn classify(name: &str) -> Option<PartRole> {
        match name {
            "leg_l" => Some(PartRole::Leg(Side::Left)),
            "leg_r" => Some(PartRole::Leg(Side::Right)),
            "arm_l" => Some(PartRole::Arm(Side::Left)),
            "arm_r" => Some(PartRole::Arm(Side::Right)),
            "prop" => Some(PartRole::Propeller),
            _ if name.starts_with("wheel_") => Some(PartRole::Wheel),
            _ if name.starts_with("rotor_") => Some(PartRole::Rotor),
            _ if name.starts_with("prop_") => Some(PartRole::Propeller),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PartBinding {
    index: usize,
    role: PartRole,
    rest: DQuat,
}

/// Per-agent articulation state. The only state a tick mutates besides the
/// clock and the handle transforms.
#[derive(Clone, Debug, Default)]
pub struct Articulation {
    bindings: SmallVec<[PartBinding; 8]>,
    spin: f64,
    gait_phase: f64,
}

impl Articulation {
    /// Bind every recognised sub-part of `handle`, remembering its rest
    /// rotation. Motion is applied in the root's frame, on top of the rest
    /// pose, so a wheel mesh may be built lying on any axis.
    pub fn bind<H: MovableHandle>(handle: &H, gait_phase: f64) -> Self {
        let bindings = (0..handle.part_count())
            .filter_map(|index| {
                let role = PartRole::classify(handle.part_name(index)?)?;
                let rest = handle.part_rotation(index)?;
                Some(PartBinding { index, role, rest })
            })
            .collect();
        Self {
            bindings,
            spin: 0.0,
            gait_phase: if gait_phase.is_finite() { gait_phase } else { 0.0 },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn bound_parts(&self) -> usize {
        self.bindings.len()
    }

    /// Accumulated spin in radians. Never decreases.
    pub fn spin(&self) -> f64 {
        self.spin
    }

    /// Leg swing angle at agent time `t`.
    pub fn gait_swing(&self, t: f64, profile: &KindProfile) -> f64 {
        if profile.gait_amplitude == 0.0 {
            return 0.0;
        }
        profile.gait_amplitude * (t * profile.gait_frequency + self.gait_phase).sin()
    }

    /// Advance spin by `|speed| * spin_gain * dt` and write every bound
    /// part's rotation for agent time `t`.
    pub fn advance<H: MovableHandle>(
        &mut self,
        handle: &mut H,
        profile: &KindProfile,
        speed: f64,
        dt: f64,
        t: f64,
    ) {
        if self.bindings.is_empty() {
            return;
        }
        let increment = speed.abs() * profile.spin_gain.abs() * dt.max(0.0);
        if increment.is_finite() {
            self.spin += increment;
        }

        let spin = self.spin.rem_euclid(TAU);
        let swing = self.gait_swing(t, profile);
        for binding in &self.bindings {
            let motion = match binding.role {
                PartRole::Wheel => DQuat::from_rotation_z(-spin),
                PartRole::Rotor => DQuat::from_rotation_y(spin),
                PartRole::Propeller => DQuat::from_rotation_x(spin),
                PartRole::Leg(side) => DQuat::from_rotation_z(side.sign() * swing),
                PartRole::Arm(side) => DQuat::from_rotation_z(-side.sign() * swing * ARM_SWING_RATIO),
            };
            handle.set_part_rotation(binding.index, motion * binding.rest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::handle::DetachedRig;

    fn walker() -> KindProfile {
        KindProfile {
            gait_frequency: 12.0,
            gait_amplitude: 0.6,
            ..KindProfile::default()
        }
    }

    #[test]
    fn classifies_part_names() {
        assert_eq!(PartRole::classify("wheel_fl"), Some(PartRole::Wheel));
        assert_eq!(PartRole::classify("rotor_3"), Some(PartRole::Rotor));
        assert_eq!(PartRole::classify("prop"), Some(PartRole::Propeller));
        assert_eq!(PartRole::classify("leg_r"), Some(PartRole::Leg(Side::Right)));
        assert_eq!(PartRole::classify("hull"), None);
    }

    #[test]
    fn spin_is_monotonic_in_distance() {
        let mut rig = DetachedRig::with_parts(["wheel_fl", "body"]);
        let mut articulation = Articulation::bind(&rig, 0.0);
        assert_eq!(articulation.bound_parts(), 1);

        let profile = KindProfile {
            spin_gain: 2.0,
            ..KindProfile::default()
        };
        let mut last = articulation.spin();
        for step in 0..100 {
            let speed = if step % 2 == 0 { 15.0 } else { -15.0 };
            articulation.advance(&mut rig, &profile, speed, 1.0 / 60.0, step as f64 / 60.0);
            assert!(articulation.spin() > last);
            last = articulation.spin();
        }
        assert!((last - 100.0 * 15.0 * 2.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn legs_and_arms_swing_in_opposition() {
        let mut rig = DetachedRig::with_parts(["leg_l", "leg_r", "arm_l", "arm_r"]);
        let mut articulation = Articulation::bind(&rig, 0.3);
        let t = 0.05;
        articulation.advance(&mut rig, &walker(), 1.5, 0.0, t);

        let swing = 0.6 * (t * 12.0 + 0.3).sin();
        let angle = |index: usize| {
            let (axis, angle) = rig.part_rotation(index).unwrap().to_axis_angle();
            angle * axis.z.signum()
        };
        assert!((angle(0) - swing).abs() < 1e-9);
        assert!((angle(1) + swing).abs() < 1e-9);
        assert!((angle(2) + swing * 0.5).abs() < 1e-9);
        assert!((angle(3) - swing * 0.5).abs() < 1e-9);
    }

    #[test]
    fn zero_dt_is_idempotent() {
        let mut rig = DetachedRig::with_parts(["rotor_0", "leg_l"]);
        let mut articulation = Articulation::bind(&rig, 1.0);
        articulation.advance(&mut rig, &walker(), 3.0, 0.5, 2.0);
        let before = (rig.part_rotation(0), rig.part_rotation(1));
        articulation.advance(&mut rig, &walker(), 3.0, 0.0, 2.0);
        articulation.advance(&mut rig, &walker(), 3.0, 0.0, 2.0);
        assert_eq!(before, (rig.part_rotation(0), rig.part_rotation(1)));
    }
}
