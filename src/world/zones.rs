//! Static zone model: ring roads, radial avenues, and exclusion footprints.
//!
//! All geometry lives on the ground plane. A [`DVec2`] here is `(x, z)` in
//! world space; the vertical axis never enters a zone query.

use std::f64::consts::{FRAC_PI_2, PI};

use bevy::math::DVec2;
use bevy::prelude::*;

use crate::error::SceneBuildError;
use crate::world::landmarks::standard_landmarks;

/// Every ring road carries three lanes.
pub const LANE_COUNT: usize = 3;

/// Fraction of a lane's width used as the spacing between lane centers.
const LANE_SPREAD: f64 = 0.6;

/// An annulus centered at the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingZone {
    pub radius: f64,
    pub width: f64,
}

impl RingZone {
    pub const fn new(radius: f64, width: f64) -> Self {
        Self { radius, width }
    }

    pub fn half_width(&self) -> f64 {
        self.width * 0.5
    }

    /// `radius > width / 2 >= 0`, all finite.
    pub fn is_valid(&self) -> bool {
        self.radius.is_finite()
            && self.width.is_finite()
            && self.width >= 0.0
            && self.radius > self.half_width()
    }

    /// Radial displacement of a lane from the ring's center line.
    ///
    /// Lane 1 runs on the center line; lanes 0 and 2 sit inside and outside
    /// it. Out-of-range lanes clamp to the outermost lane.
    pub fn lane_offset(&self, lane: usize) -> f64 {
        let lane = lane.min(LANE_COUNT - 1) as f64;
        (lane - 1.0) * (self.width / LANE_COUNT as f64) * LANE_SPREAD
    }

    pub fn lane_radius(&self, lane: usize) -> f64 {
        self.radius + self.lane_offset(lane)
    }

    pub fn distance_to_centerline(&self, point: DVec2) -> f64 {
        (point.length() - self.radius).abs()
    }

    /// Distance to the paved surface, zero when on it.
    pub fn distance_to_surface(&self, point: DVec2) -> f64 {
        (self.distance_to_centerline(point) - self.half_width()).max(0.0)
    }
}

/// The four avenue headings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cardinal {
    East,
    North,
    West,
    South,
}

impl Cardinal {
    pub const ALL: [Cardinal; 4] = [Cardinal::East, Cardinal::North, Cardinal::West, Cardinal::South];

    pub fn angle(self) -> f64 {
        match self {
            Cardinal::East => 0.0,
            Cardinal::North => FRAC_PI_2,
            Cardinal::West => PI,
            Cardinal::South => PI + FRAC_PI_2,
        }
    }

    pub fn unit(self) -> DVec2 {
        DVec2::from_angle(self.angle())
    }
}

/// A straight corridor from the central plaza to the island edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialZone {
    pub direction: Cardinal,
    pub width: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl RadialZone {
    /// Distance from `point` to the avenue's paved strip, zero when on it.
    pub fn distance_to_surface(&self, point: DVec2) -> f64 {
        let axis = self.direction.unit();
        let along = point.dot(axis);
        let across = axis.perp_dot(point).abs();

        let beyond_ends = along - along.clamp(self.inner_radius, self.outer_radius);
        let beyond_sides = (across - self.width * 0.5).max(0.0);
        beyond_ends.hypot(beyond_sides)
    }
}

/// A disk inside which static placement is forbidden.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExclusionZone {
    pub center: DVec2,
    pub radius: f64,
}

impl ExclusionZone {
    pub fn contains(&self, point: DVec2) -> bool {
        point.distance(self.center) < self.radius
    }
}

/// Immutable description of the island's roads and reserved footprints.
#[derive(Resource, Clone, Debug)]
pub struct ZoneModel {
    rings: Vec<RingZone>,
    radials: Vec<RadialZone>,
    exclusions: Vec<ExclusionZone>,
    plaza_radius: f64,
    island_radius: f64,
}

impl Default for ZoneModel {
    fn default() -> Self {
        Self::standard()
    }
}

impl ZoneModel {
    pub const ISLAND_RADIUS: f64 = 200.0;
    pub const PLAZA_RADIUS: f64 = 45.0;

    /// Build a zone model, rejecting malformed rings.
    pub fn new(
        rings: Vec<RingZone>,
        radials: Vec<RadialZone>,
        exclusions: Vec<ExclusionZone>,
        plaza_radius: f64,
        island_radius: f64,
    ) -> Result<Self, SceneBuildError> {
        let zones = Self {
            rings,
            radials,
            exclusions,
            plaza_radius,
            island_radius,
        };
        zones.validate()?;
        Ok(zones)
    }

    /// First ring violating `radius > width / 2 >= 0`, if any.
    pub fn validate(&self) -> Result<(), SceneBuildError> {
        match self.rings.iter().position(|ring| !ring.is_valid()) {
            Some(index) => {
                let ring = self.rings[index];
                Err(SceneBuildError::InvalidZone {
                    index,
                    radius: ring.radius,
                    width: ring.width,
                })
            }
            None => Ok(()),
        }
    }

    /// The island as shipped: inner-city loop, midtown ring, coastal
    /// highway, four avenues, and the landmark footprints.
    pub fn standard() -> Self {
        let radials = Cardinal::ALL
            .iter()
            .map(|&direction| RadialZone {
                direction,
                width: 20.0,
                inner_radius: 20.0,
                outer_radius: 190.0,
            })
            .collect();

        Self {
            rings: vec![
                RingZone::new(70.0, 22.0),
                RingZone::new(130.0, 22.0),
                RingZone::new(175.0, 18.0),
            ],
            radials,
            exclusions: standard_landmarks().iter().map(|l| l.exclusion()).collect(),
            plaza_radius: Self::PLAZA_RADIUS,
            island_radius: Self::ISLAND_RADIUS,
        }
    }

    pub fn rings(&self) -> &[RingZone] {
        &self.rings
    }

    pub fn ring(&self, index: usize) -> Option<&RingZone> {
        self.rings.get(index)
    }

    pub fn radials(&self) -> &[RadialZone] {
        &self.radials
    }

    pub fn exclusions(&self) -> &[ExclusionZone] {
        &self.exclusions
    }

    pub fn plaza_radius(&self) -> f64 {
        self.plaza_radius
    }

    pub fn island_radius(&self) -> f64 {
        self.island_radius
    }

    /// Distance to the nearest paved surface, ring or avenue.
    /// Returns `f64::INFINITY` when the model has no roads.
    pub fn distance_to_nearest_road(&self, point: DVec2) -> f64 {
        let rings = self.rings.iter().map(|r| r.distance_to_surface(point));
        let radials = self.radials.iter().map(|r| r.distance_to_surface(point));
        rings.chain(radials).fold(f64::INFINITY, f64::min)
    }

    pub fn is_within_exclusion(&self, point: DVec2) -> bool {
        self.exclusions.iter().any(|zone| zone.contains(point))
    }

    /// True when `point` is closer to a ring's center line than half its
    /// width plus `margin`.
    pub fn is_on_ring_road(&self, point: DVec2, margin: f64) -> bool {
        self.rings
            .iter()
            .any(|ring| ring.distance_to_centerline(point) < ring.half_width() + margin)
    }

    pub fn is_on_avenue(&self, point: DVec2, margin: f64) -> bool {
        self.radials
            .iter()
            .any(|avenue| avenue.distance_to_surface(point) < margin.max(f64::EPSILON))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_offsets_are_symmetric_around_the_center_lane() {
        let ring = RingZone::new(70.0, 22.0);
        assert_eq!(ring.lane_offset(1), 0.0);
        assert!((ring.lane_offset(0) + ring.lane_offset(2)).abs() < 1e-12);
        assert!((ring.lane_offset(2) - 22.0 / 3.0 * 0.6).abs() < 1e-12);
        // Clamped to the outer lane.
        assert_eq!(ring.lane_offset(7), ring.lane_offset(2));
    }

    #[test]
    fn lanes_stay_on_the_paved_surface() {
        for ring in ZoneModel::standard().rings() {
            for lane in 0..LANE_COUNT {
                assert!(ring.lane_offset(lane).abs() <= ring.half_width());
            }
        }
    }

    #[test]
    fn malformed_rings_are_rejected() {
        let err = ZoneModel::new(vec![RingZone::new(5.0, 12.0)], vec![], vec![], 0.0, 100.0);
        assert!(matches!(err, Err(SceneBuildError::InvalidZone { index: 0, .. })));

        let err = ZoneModel::new(vec![RingZone::new(50.0, -1.0)], vec![], vec![], 0.0, 100.0);
        assert!(err.is_err());
    }

    #[test]
    fn validation_reports_the_first_bad_ring() {
        assert!(ZoneModel::standard().validate().is_ok());
        let rings = vec![
            RingZone::new(70.0, 22.0),
            RingZone::new(f64::NAN, 10.0),
            RingZone::new(3.0, 40.0),
        ];
        let err = ZoneModel::new(rings, vec![], vec![], 45.0, 200.0);
        assert!(matches!(err, Err(SceneBuildError::InvalidZone { index: 1, .. })));
    }

    #[test]
    fn road_distance_covers_rings_and_avenues() {
        let zones = ZoneModel::standard();
        // On the inner loop.
        assert_eq!(zones.distance_to_nearest_road(DVec2::new(0.0, -70.0)), 0.0);
        // On the east avenue between rings.
        assert_eq!(zones.distance_to_nearest_road(DVec2::new(100.0, 5.0)), 0.0);
        // Diagonal, between the inner loop and the midtown ring.
        let p = DVec2::from_angle(PI / 4.0) * 100.0;
        let expected = (100.0_f64 - 81.0).min(119.0 - 100.0);
        assert!((zones.distance_to_nearest_road(p) - expected).abs() < 1e-9);
    }

    #[test]
    fn avenue_distance_respects_its_ends() {
        let avenue = RadialZone {
            direction: Cardinal::North,
            width: 20.0,
            inner_radius: 20.0,
            outer_radius: 190.0,
        };
        assert_eq!(avenue.distance_to_surface(DVec2::new(0.0, 50.0)), 0.0);
        assert!((avenue.distance_to_surface(DVec2::new(0.0, 10.0)) - 10.0).abs() < 1e-9);
        assert!((avenue.distance_to_surface(DVec2::new(15.0, 100.0)) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn ring_road_test_uses_the_safety_margin() {
        let zones = ZoneModel::standard();
        assert!(zones.is_on_ring_road(DVec2::new(84.0, 0.0), 4.0));
        assert!(!zones.is_on_ring_road(DVec2::new(86.0, 0.0), 4.0));
    }

    #[test]
    fn exclusions_come_from_the_landmarks() {
        let zones = ZoneModel::standard();
        assert!(zones.is_within_exclusion(DVec2::new(1.0, 1.0)));
        assert!(!zones.is_within_exclusion(DVec2::new(100.0, -100.0)));
    }
}
