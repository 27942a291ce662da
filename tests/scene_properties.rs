//! Whole-scene properties checked against a headless build.

use std::f64::consts::{FRAC_PI_4, TAU};

use bevy::math::{DVec2, DVec3};
use island_backdrop::procgen::placement::{PlacementConfig, PlacementEngine};
use island_backdrop::simulation::agents::AgentKind;
use island_backdrop::simulation::handle::{DetachedRig, HeadlessFactory, MovableHandle, Pose};
use island_backdrop::simulation::kinematics::{ForwardAxis, KinematicsConfig};
use island_backdrop::simulation::population::PopulationConfig;
use island_backdrop::simulation::trajectory::{FigureEight, LaneOrbit, Orbit, Trajectory};
use island_backdrop::world::landmarks::{Landmark, LandmarkKind};
use island_backdrop::world::zones::{RingZone, ZoneModel};
use island_backdrop::{CityScene, SceneBuildError};

const FRAME: f64 = 1.0 / 60.0;

fn build(factory: &mut HeadlessFactory) -> Result<CityScene<DetachedRig>, SceneBuildError> {
    CityScene::build(
        factory,
        &ZoneModel::standard(),
        &PlacementConfig::default(),
        &PopulationConfig::default(),
        &KinematicsConfig::default(),
    )
}

fn poses(scene: &CityScene<DetachedRig>) -> Vec<(Pose, Vec<Option<bevy::math::DQuat>>)> {
    scene
        .simulation
        .registry()
        .iter()
        .map(|agent| {
            let rig = agent.handle();
            let parts = (0..rig.part_count()).map(|i| rig.part_rotation(i)).collect();
            (rig.pose(), parts)
        })
        .collect()
}

#[test]
fn static_content_stays_out_of_every_exclusion_zone() {
    let mut factory = HeadlessFactory::new();
    let scene = build(&mut factory).unwrap();
    let zones = ZoneModel::standard();

    assert!(!scene.plan.buildings.is_empty());
    assert!(!scene.plan.trees.is_empty());
    let points = scene
        .plan
        .buildings
        .iter()
        .map(|b| b.cell.position)
        .chain(scene.plan.trees.iter().map(|t| t.position));
    for point in points {
        for zone in zones.exclusions() {
            assert!(
                point.distance(zone.center) >= zone.radius,
                "{point:?} inside exclusion at {:?}",
                zone.center
            );
        }
    }
    assert_eq!(
        factory.statics_built(),
        scene.plan.landmarks.len() + scene.plan.buildings.len() + scene.plan.trees.len()
    );
}

#[test]
fn ground_agents_stay_on_their_road() {
    let mut scene = build(&mut HeadlessFactory::new()).unwrap();
    for _ in 0..600 {
        scene.simulation.tick(FRAME);
        for agent in scene.simulation.registry().iter() {
            if !agent.kind().is_road_vehicle() {
                continue;
            }
            let Trajectory::LaneOrbit(lane) = agent.trajectory() else {
                panic!("{:?} is not on a lane", agent.kind());
            };
            let p = agent.handle().translation();
            let radius = DVec2::new(p.x, p.z).length();
            assert!((radius - lane.ring.radius).abs() <= lane.ring.half_width() + 1e-9);
        }
    }
}

#[test]
fn headings_are_unit_length_every_tick() {
    let mut scene = build(&mut HeadlessFactory::new()).unwrap();
    for _ in 0..300 {
        scene.simulation.tick(FRAME);
        let clock = scene.simulation.clock();
        for agent in scene.simulation.registry().iter() {
            let t = agent.local_time(clock);
            let heading = agent.trajectory().heading_at(t).unwrap_or(agent.last_heading());
            assert!((heading.length() - 1.0).abs() < 1e-6, "{:?}", agent.kind());
            assert!(agent.handle().pose().is_finite());
        }
    }
}

#[test]
fn orbits_are_periodic() {
    let orbit = Trajectory::from(Orbit::new(330.0, 0.048, -1.6, 1.0));
    let period = TAU / 0.048;
    for i in 0..50 {
        let t = i as f64 * 3.3;
        assert!(orbit.position_at(t).abs_diff_eq(orbit.position_at(t + period), 1e-6));
    }
}

#[test]
fn zero_dt_ticks_leave_every_transform_unchanged() {
    let mut scene = build(&mut HeadlessFactory::new()).unwrap();
    for _ in 0..30 {
        scene.simulation.tick(FRAME);
    }
    scene.simulation.tick(0.0);
    let first = poses(&scene);
    scene.simulation.tick(0.0);
    assert_eq!(first, poses(&scene));
}

#[test]
fn centre_lane_of_the_inner_loop_runs_at_radius_seventy() {
    let lane = Trajectory::from(LaneOrbit::new(0, RingZone::new(70.0, 22.0), 1, 15.0, 0.0));
    for i in 0..100 {
        let p = lane.position_at(i as f64 * 0.5);
        assert!((DVec2::new(p.x, p.z).length() - 70.0).abs() < 1e-9);
    }
}

#[test]
fn figure_eight_scenario() {
    let eight = Trajectory::from(FigureEight::new(50.0, 30.0, 2.0));
    let start = eight.position_at(0.0);
    assert!(start.x.abs() < 1e-12 && start.z.abs() < 1e-12);
    assert!((eight.position_at(FRAC_PI_4).x - 50.0).abs() < 1e-9);
}

#[test]
fn landmark_at_origin_rejects_nearby_samples() {
    let standard = ZoneModel::standard();
    let zones = ZoneModel::new(
        standard.rings().to_vec(),
        standard.radials().to_vec(),
        Vec::new(),
        standard.plaza_radius(),
        200.0,
    )
    .unwrap();
    let config = PlacementConfig {
        landmarks: vec![Landmark::new("pin", LandmarkKind::HelixTower, 0.0, 0.0, 50.0)],
        avoid_avenues: false,
        ..PlacementConfig::default()
    };
    let plan = PlacementEngine::new(&config, &zones).plan();
    assert!(!plan.buildings.is_empty());
    for building in &plan.buildings {
        assert!(building.cell.position.length() >= 12.0);
    }
}

#[test]
fn formations_hold_their_shape_in_the_running_scene() {
    let mut scene = build(&mut HeadlessFactory::new()).unwrap();
    let spacing = |kind: AgentKind, scene: &CityScene<DetachedRig>| -> Vec<f64> {
        let members: Vec<DVec3> = scene
            .simulation
            .registry()
            .iter()
            .filter(|agent| agent.kind() == kind)
            .map(|agent| agent.handle().translation())
            .collect();
        members.iter().map(|p| (*p - members[0]).length()).collect()
    };

    let initial = spacing(AgentKind::Submarine, &scene);
    assert_eq!(initial.len(), 7);
    for _ in 0..240 {
        scene.simulation.tick(0.25);
        let now = spacing(AgentKind::Submarine, &scene);
        for (a, b) in initial.iter().zip(&now) {
            assert!((a - b).abs() < 1e-6);
        }
    }
}

#[test]
fn road_vehicle_wheels_roll_with_distance_travelled() {
    let mut scene = build(&mut HeadlessFactory::new()).unwrap();
    let spins = |scene: &CityScene<DetachedRig>| -> Vec<f64> {
        scene
            .simulation
            .registry()
            .iter()
            .filter(|agent| agent.kind().is_road_vehicle())
            .map(|agent| {
                assert!(!agent.articulation().is_empty(), "{:?} has no wheels", agent.kind());
                agent.articulation().spin()
            })
            .collect()
    };

    let before = spins(&scene);
    assert_eq!(before.len(), 120);
    for _ in 0..60 {
        scene.simulation.tick(FRAME);
    }
    for (start, end) in before.iter().zip(spins(&scene)) {
        assert!(end > *start);
    }
}

#[test]
fn yaw_offsets_are_calibrated_from_the_factory() {
    let scene = build(&mut HeadlessFactory::new()).unwrap();
    let expected = ForwardAxis::PosX.yaw_correction();
    for kind in AgentKind::ALL {
        assert_eq!(scene.simulation.kinematics().profile(kind).yaw_offset, expected);
    }
}

#[test]
fn a_missing_handle_aborts_the_build() {
    let mut factory = HeadlessFactory::new().refusing(AgentKind::Drone);
    match build(&mut factory) {
        Err(SceneBuildError::MissingHandle { kind, index }) => {
            assert_eq!(kind, AgentKind::Drone);
            assert_eq!(index, 0);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("build should fail without a drone handle"),
    }
}

#[test]
fn malformed_rings_are_rejected() {
    let result = ZoneModel::new(vec![RingZone::new(5.0, 22.0)], Vec::new(), Vec::new(), 45.0, 200.0);
    assert!(matches!(result, Err(SceneBuildError::InvalidZone { index: 0, .. })));
}

#[test]
fn scene_build_is_deterministic() {
    let a = build(&mut HeadlessFactory::new()).unwrap();
    let b = build(&mut HeadlessFactory::new()).unwrap();
    assert_eq!(a.plan.buildings, b.plan.buildings);
    assert_eq!(a.plan.trees, b.plan.trees);
    assert_eq!(poses(&a), poses(&b));
}
