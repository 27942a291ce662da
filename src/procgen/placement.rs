//! Procedural placement of static content.
//!
//! A single deterministic pass over a jittered square grid. Each sample is
//! either dropped (off the island, on a road, inside a landmark footprint,
//! or an empty suburb lot) or resolved to a zoning tier and an archetype
//! index. The engine never decides what gets built, only where and in
//! which tier; the renderable factory owns the "what".

use std::f64::consts::TAU;

use bevy::math::DVec2;
use bevy::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::density::{classify_tier, DensityField, DensityNoise, TierThresholds, ZoningTier};
use crate::world::grid::SpatialGrid;
use crate::world::landmarks::{standard_landmarks, Landmark};
use crate::world::zones::ZoneModel;

/// Settings for the building scan and tree scatter.
#[derive(Resource, Clone, Debug)]
pub struct PlacementConfig {
    /// Grid step between candidate samples.
    pub step: f64,
    /// Maximum jitter per axis; never more than half the step.
    pub jitter: f64,
    /// Samples further than `island_radius - island_margin` are dropped.
    pub island_margin: f64,
    /// Extra clearance beyond a road's half width.
    pub road_safety_margin: f64,
    /// Also keep buildings off the radial avenues.
    pub avoid_avenues: bool,
    pub noise: DensityNoise,
    pub thresholds: TierThresholds,
    /// Probability that a suburb sample receives a house.
    pub suburb_fill: f64,
    pub landmarks: Vec<Landmark>,
    /// Number of tree samples drawn (each either placed or dropped).
    pub tree_samples: usize,
    /// Trees start outside the downtown plaza.
    pub tree_inner_radius: f64,
    pub tree_edge_margin: f64,
    /// Minimum distance between a tree and any building center.
    pub tree_clearance: f64,
    pub seed: u64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            step: 14.0,
            jitter: 3.0,
            island_margin: 15.0,
            road_safety_margin: 4.0,
            avoid_avenues: true,
            noise: DensityNoise::default(),
            thresholds: TierThresholds::default(),
            suburb_fill: 0.7,
            landmarks: standard_landmarks(),
            tree_samples: 500,
            tree_inner_radius: ZoneModel::PLAZA_RADIUS,
            tree_edge_margin: 2.0,
            tree_clearance: 6.0,
            seed: 31415,
        }
    }
}

/// A candidate slot that survived the rejection rules.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementCell {
    pub position: DVec2,
    pub distance: f64,
    pub density: f64,
    pub tier: ZoningTier,
}

/// A resolved building slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub cell: PlacementCell,
    /// Uniformly drawn index into the tier's archetypes.
    pub archetype: usize,
    /// Seed the factory may use for per-building variation.
    pub variant_seed: u64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreePlacement {
    pub position: DVec2,
    pub scale: f64,
    pub yaw: f64,
}

/// Why a sample was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    OutsideIsland,
    LandmarkClash,
    OnRingRoad,
    OnAvenue,
    Crowded,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlacementStats {
    pub sampled: usize,
    pub outside_island: usize,
    pub landmark_clash: usize,
    pub on_ring_road: usize,
    pub on_avenue: usize,
    pub crowded: usize,
    pub empty_lots: usize,
    pub inner: usize,
    pub midtown: usize,
    pub suburb: usize,
    pub trees: usize,
}

impl PlacementStats {
    fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::OutsideIsland => self.outside_island += 1,
            Rejection::LandmarkClash => self.landmark_clash += 1,
            Rejection::OnRingRoad => self.on_ring_road += 1,
            Rejection::OnAvenue => self.on_avenue += 1,
            Rejection::Crowded => self.crowded += 1,
        }
    }

    fn count_tier(&mut self, tier: ZoningTier) {
        match tier {
            ZoningTier::Inner => self.inner += 1,
            ZoningTier::Midtown => self.midtown += 1,
            ZoningTier::Suburb => self.suburb += 1,
        }
    }
}

/// Everything the scene needs to hand to the factory.
#[derive(Clone, Debug, Default)]
pub struct PlacementPlan {
    pub landmarks: Vec<Landmark>,
    pub buildings: Vec<Placement>,
    pub trees: Vec<TreePlacement>,
    pub stats: PlacementStats,
}

pub struct PlacementEngine<'a> {
    config: &'a PlacementConfig,
    zones: &'a ZoneModel,
    field: DensityField,
    max_radius: f64,
}

impl<'a> PlacementEngine<'a> {
    pub fn new(config: &'a PlacementConfig, zones: &'a ZoneModel) -> Self {
        let max_radius = (zones.island_radius() - config.island_margin).max(0.0);
        Self {
            config,
            zones,
            field: DensityField::new(config.noise.clone(), max_radius),
            max_radius,
        }
    }

    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    /// Apply the rejection rules shared by buildings and trees.
    pub fn check(&self, point: DVec2, limit: f64) -> Result<(), Rejection> {
        if point.length() > limit {
            return Err(Rejection::OutsideIsland);
        }
        if self.config.landmarks.iter().any(|l| l.clashes_with(point))
            || self.zones.is_within_exclusion(point)
        {
            return Err(Rejection::LandmarkClash);
        }
        if self.zones.is_on_ring_road(point, self.config.road_safety_margin) {
            return Err(Rejection::OnRingRoad);
        }
        if self.config.avoid_avenues
            && self.zones.is_on_avenue(point, self.config.road_safety_margin)
        {
            return Err(Rejection::OnAvenue);
        }
        Ok(())
    }

    pub fn evaluate(&self, point: DVec2) -> PlacementCell {
        let distance = point.length();
        let density = self.field.score(point);
        PlacementCell {
            position: point,
            distance,
            density,
            tier: classify_tier(density, distance, &self.config.thresholds),
        }
    }

    /// One pass over the jittered grid covering `[-max_r, max_r]²`.
    pub fn place_buildings(&self, rng: &mut StdRng, stats: &mut PlacementStats) -> Vec<Placement> {
        let step = self.config.step.max(1.0);
        let jitter = self.config.jitter.clamp(0.0, step * 0.5);
        let steps = (2.0 * self.max_radius / step).floor() as i64;

        let mut placements = Vec::new();

        for ix in 0..=steps {
            for iz in 0..=steps {
                let base = DVec2::new(
                    -self.max_radius + ix as f64 * step,
                    -self.max_radius + iz as f64 * step,
                );
                let offset = if jitter > 0.0 {
                    DVec2::new(rng.gen_range(-jitter..=jitter), rng.gen_range(-jitter..=jitter))
                } else {
                    DVec2::ZERO
                };
                let point = base + offset;
                stats.sampled += 1;

                if let Err(rejection) = self.check(point, self.max_radius) {
                    stats.record(rejection);
                    continue;
                }

                let cell = self.evaluate(point);
                if cell.tier == ZoningTier::Suburb && rng.gen::<f64>() >= self.config.suburb_fill {
                    stats.empty_lots += 1;
                    continue;
                }

                stats.count_tier(cell.tier);
                placements.push(Placement {
                    cell,
                    archetype: rng.gen_range(0..cell.tier.archetype_count()),
                    variant_seed: rng.gen(),
                });
            }
        }

        placements
    }

    /// Scatter trees through the suburbs, clear of roads, landmarks, and
    /// already placed buildings.
    pub fn scatter_trees(
        &self,
        buildings: &[Placement],
        rng: &mut StdRng,
        stats: &mut PlacementStats,
    ) -> Vec<TreePlacement> {
        let inner = self.config.tree_inner_radius.max(0.0);
        let outer = (self.zones.island_radius() - self.config.tree_edge_margin).max(inner);

        let mut occupied = SpatialGrid::new(self.config.step);
        for building in buildings {
            occupied.insert(building.cell.position);
        }

        let mut trees = Vec::new();

        for _ in 0..self.config.tree_samples {
            let radius = inner + rng.gen::<f64>() * (outer - inner);
            let theta = rng.gen::<f64>() * TAU;
            let scale = rng.gen_range(0.5..1.0);
            let yaw = rng.gen::<f64>() * TAU;
            let point = DVec2::from_angle(theta) * radius;
            stats.sampled += 1;

            if let Err(rejection) = self.check(point, outer) {
                stats.record(rejection);
                continue;
            }
            if occupied.any_within(point, self.config.tree_clearance) {
                stats.record(Rejection::Crowded);
                continue;
            }

            stats.trees += 1;
            trees.push(TreePlacement {
                position: point,
                scale,
                yaw,
            });
        }

        trees
    }

    /// Landmarks first, then the building scan, then trees.
    pub fn plan(&self) -> PlacementPlan {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut stats = PlacementStats::default();

        let buildings = self.place_buildings(&mut rng, &mut stats);
        let trees = self.scatter_trees(&buildings, &mut rng, &mut stats);

        info!(
            "Placement: {} landmarks, {} buildings ({} inner / {} midtown / {} suburb), {} trees from {} samples",
            self.config.landmarks.len(),
            buildings.len(),
            stats.inner,
            stats.midtown,
            stats.suburb,
            trees.len(),
            stats.sampled,
        );

        PlacementPlan {
            landmarks: self.config.landmarks.clone(),
            buildings,
            trees,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::landmarks::LandmarkKind;
    use crate::world::zones::{RingZone, ZoneModel};

    fn lone_tower_setup() -> (PlacementConfig, ZoneModel) {
        let tower = Landmark::new("Core", LandmarkKind::HelixTower, 0.0, 0.0, 100.0);
        let zones = ZoneModel::new(
            vec![RingZone::new(70.0, 22.0)],
            vec![],
            vec![tower.exclusion()],
            45.0,
            200.0,
        )
        .expect("valid zones");
        let config = PlacementConfig {
            landmarks: vec![tower],
            ..Default::default()
        };
        (config, zones)
    }

    #[test]
    fn nothing_is_placed_inside_the_landmark_footprint() {
        let (config, zones) = lone_tower_setup();
        let plan = PlacementEngine::new(&config, &zones).plan();

        assert!(!plan.buildings.is_empty());
        for building in &plan.buildings {
            assert!(building.cell.position.length() >= 12.0);
        }
        for tree in &plan.trees {
            assert!(tree.position.length() >= 12.0);
        }
        assert!(plan.stats.landmark_clash > 0);
    }

    #[test]
    fn buildings_stay_off_roads_and_on_the_island() {
        let config = PlacementConfig::default();
        let zones = ZoneModel::standard();
        let engine = PlacementEngine::new(&config, &zones);
        let plan = engine.plan();

        for building in &plan.buildings {
            let p = building.cell.position;
            assert!(p.length() <= engine.max_radius());
            for ring in zones.rings() {
                assert!(ring.distance_to_centerline(p) >= ring.half_width() + config.road_safety_margin);
            }
            assert!(building.archetype < building.cell.tier.archetype_count());
        }
    }

    #[test]
    fn plan_is_deterministic_for_a_seed() {
        let config = PlacementConfig::default();
        let zones = ZoneModel::standard();
        let a = PlacementEngine::new(&config, &zones).plan();
        let b = PlacementEngine::new(&config, &zones).plan();
        assert_eq!(a.buildings, b.buildings);
        assert_eq!(a.trees, b.trees);
        assert_eq!(a.stats, b.stats);
    }

    #[test]
    fn all_three_tiers_appear_on_the_standard_island() {
        let config = PlacementConfig::default();
        let zones = ZoneModel::standard();
        let plan = PlacementEngine::new(&config, &zones).plan();
        assert!(plan.stats.inner > 0);
        assert!(plan.stats.midtown > 0);
        assert!(plan.stats.suburb > 0);
        assert!(plan.stats.empty_lots > 0);
    }

    #[test]
    fn trees_keep_clear_of_buildings() {
        let config = PlacementConfig::default();
        let zones = ZoneModel::standard();
        let plan = PlacementEngine::new(&config, &zones).plan();
        assert!(!plan.trees.is_empty());
        for tree in &plan.trees {
            for building in &plan.buildings {
                assert!(tree.position.distance(building.cell.position) >= config.tree_clearance);
            }
        }
    }

    #[test]
    fn jitter_never_exceeds_half_a_step() {
        let config = PlacementConfig {
            jitter: 50.0,
            avoid_avenues: false,
            landmarks: vec![],
            suburb_fill: 1.0,
            ..Default::default()
        };
        let zones = ZoneModel::new(vec![], vec![], vec![], 45.0, 200.0).expect("valid zones");
        let engine = PlacementEngine::new(&config, &zones);
        let plan = engine.plan();
        let half = config.step * 0.5;
        for building in &plan.buildings {
            let rel = building.cell.position + DVec2::splat(engine.max_radius());
            let dx = rel.x - (rel.x / config.step).round() * config.step;
            let dz = rel.y - (rel.y / config.step).round() * config.step;
            assert!(dx.abs() <= half + 1e-9 && dz.abs() <= half + 1e-9);
        }
    }
}
