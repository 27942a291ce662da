//! Leader/follower groups.
//!
//! Followers never integrate their own motion: each member's trajectory is
//! a fixed offset in the leader's travel frame, so the group holds its shape
//! through every turn and frame-rate hiccup.

use std::sync::Arc;

use bevy::math::DVec3;

use super::trajectory::{FormationOffset, Trajectory};

/// Staggered slot layout. Slot 0 is the leader position, then members
/// alternate sides: slot 1 left row 1, slot 2 right row 1, slot 3 left row 2...
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Echelon {
    /// Spacing behind the previous row.
    pub back: f64,
    /// Spacing to the side per row.
    pub side: f64,
    /// Lift per row; zero keeps the group in one plane.
    pub rise: f64,
}

impl Echelon {
    pub const fn new(back: f64, side: f64) -> Self {
        Self {
            back,
            side,
            rise: 0.0,
        }
    }

    /// Local offset for slot `index` in the leader frame.
    pub fn slot(&self, index: usize) -> DVec3 {
        if index == 0 {
            return DVec3::ZERO;
        }
        let row = index.div_ceil(2) as f64;
        let side = if index % 2 == 1 { -1.0 } else { 1.0 };
        DVec3::new(-self.back * row, self.rise * row, side * self.side * row)
    }
}

#[derive(Clone, Debug)]
pub struct Formation {
    leader: Arc<Trajectory>,
    pattern: Echelon,
}

impl Formation {
    pub fn new(leader: impl Into<Trajectory>, pattern: Echelon) -> Self {
        Self {
            leader: Arc::new(leader.into()),
            pattern,
        }
    }

    pub fn leader(&self) -> &Arc<Trajectory> {
        &self.leader
    }

    /// Trajectory for member `index`; member 0 flies the leader path itself.
    pub fn member(&self, index: usize) -> Trajectory {
        Trajectory::FormationOffset(FormationOffset {
            leader: Arc::clone(&self.leader),
            local_offset: self.pattern.slot(index),
        })
    }

    pub fn members(&self, count: usize) -> impl Iterator<Item = Trajectory> + '_ {
        (0..count).map(|index| self.member(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::trajectory::{FigureEight, Orbit};

    #[test]
    fn slots_alternate_sides_and_step_back() {
        let v = Echelon::new(8.0, 8.0);
        assert_eq!(v.slot(0), DVec3::ZERO);
        assert_eq!(v.slot(1), DVec3::new(-8.0, 0.0, -8.0));
        assert_eq!(v.slot(2), DVec3::new(-8.0, 0.0, 8.0));
        assert_eq!(v.slot(3), DVec3::new(-16.0, 0.0, -16.0));
        assert_eq!(v.slot(4), DVec3::new(-16.0, 0.0, 16.0));
    }

    #[test]
    fn member_distances_are_constant_through_turns() {
        let squadron = Formation::new(
            FigureEight::new(300.0, 150.0, 0.15).at_altitude(180.0),
            Echelon::new(8.0, 8.0),
        );
        let members: Vec<_> = squadron.members(5).collect();
        let expected: Vec<f64> = (0..5).map(|i| Echelon::new(8.0, 8.0).slot(i).length()).collect();

        for step in 0..400 {
            let t = step as f64 * 0.25;
            let lead = squadron.leader().position_at(t);
            for (member, expected) in members.iter().zip(&expected) {
                let distance = (member.position_at(t) - lead).length();
                assert!((distance - expected).abs() < 1e-6, "t={t} {distance} vs {expected}");
            }
        }
    }

    #[test]
    fn members_share_the_leader_heading() {
        let pack = Formation::new(Orbit::new(420.0, 0.05, -2.8, 0.0), Echelon::new(15.0, 10.0));
        let member = pack.member(3);
        for step in 0..20 {
            let t = step as f64 * 1.5;
            assert_eq!(member.heading_at(t), pack.leader().heading_at(t));
        }
    }
}
