//! Named high-value structures placed ahead of the procedural fill.

use bevy::math::DVec2;

use super::zones::ExclusionZone;

/// Clash radius used for downtown towers.
pub const TOWER_CLASH_RADIUS: f64 = 12.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LandmarkKind {
    HelixTower,
    BrutalistTower,
    ArtDecoTower,
    GothicTower,
    Statue,
    CoolingTower,
    ReactorBlock,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Landmark {
    pub name: &'static str,
    pub kind: LandmarkKind,
    pub position: DVec2,
    pub height: f64,
    pub clash_radius: f64,
}

impl Landmark {
    pub fn new(name: &'static str, kind: LandmarkKind, x: f64, z: f64, height: f64) -> Self {
        let clash_radius = match kind {
            LandmarkKind::Statue => 16.0,
            LandmarkKind::CoolingTower => 18.0,
            LandmarkKind::ReactorBlock => 14.0,
            _ => TOWER_CLASH_RADIUS,
        };
        Self {
            name,
            kind,
            position: DVec2::new(x, z),
            height,
            clash_radius,
        }
    }

    /// Exact distance test against the footprint.
    pub fn clashes_with(&self, point: DVec2) -> bool {
        point.distance(self.position) < self.clash_radius
    }

    pub fn exclusion(&self) -> ExclusionZone {
        ExclusionZone {
            center: self.position,
            radius: self.clash_radius,
        }
    }
}

/// Downtown skyline, the harbor statue, and the power station.
pub fn standard_landmarks() -> Vec<Landmark> {
    use LandmarkKind::*;

    vec![
        Landmark::new("Helix One", HelixTower, 0.0, 0.0, 140.0),
        Landmark::new("Helix Two", HelixTower, 35.0, 35.0, 110.0),
        Landmark::new("Helix Three", HelixTower, -35.0, 20.0, 100.0),
        Landmark::new("Civic Block", BrutalistTower, 20.0, -35.0, 90.0),
        Landmark::new("Meridian", ArtDecoTower, -25.0, -25.0, 85.0),
        Landmark::new("Cathedral Spire", GothicTower, 0.0, 45.0, 80.0),
        Landmark::new("Eastgate", ArtDecoTower, 45.0, 0.0, 75.0),
        Landmark::new("Archive", BrutalistTower, -15.0, 50.0, 70.0),
        Landmark::new("Harbor Statue", Statue, 60.0, -60.0, 32.0),
        Landmark::new("Cooling Tower A", CoolingTower, -140.0, 40.0, 45.0),
        Landmark::new("Cooling Tower B", CoolingTower, -120.0, 55.0, 45.0),
        Landmark::new("Reactor West", ReactorBlock, -130.0, 25.0, 20.0),
        Landmark::new("Cooling Tower C", CoolingTower, -90.0, 130.0, 45.0),
        Landmark::new("Reactor North", ReactorBlock, -70.0, 130.0, 20.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clash_is_an_exact_distance_test() {
        let tower = Landmark::new("t", LandmarkKind::HelixTower, 0.0, 0.0, 10.0);
        assert!(tower.clashes_with(DVec2::new(11.9, 0.0)));
        assert!(!tower.clashes_with(DVec2::new(12.0, 0.0)));
        assert!(!tower.clashes_with(DVec2::new(9.0, 9.0)));
    }

    #[test]
    fn standard_landmarks_stay_on_the_island() {
        for landmark in standard_landmarks() {
            assert!(landmark.position.length() < 200.0, "{}", landmark.name);
        }
    }
}
