//! One-shot population of the agent registry.
//!
//! Every agent gets its trajectory here, at construction, and keeps it for
//! the life of the scene. Rates are per second.

use std::collections::BTreeMap;
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::ops::Range;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::agents::{lane_assignment, AgentId, AgentKind, AgentParams, AgentRegistry, Bob};
use super::formation::{Echelon, Formation};
use super::handle::{Archetype, RenderableFactory};
use super::kinematics::BankProfile;
use super::trajectory::{FigureEight, Orbit, Oscillation, Trajectory};
use crate::error::SceneBuildError;
use crate::world::zones::{ZoneModel, LANE_COUNT};

#[derive(Clone, Debug)]
pub struct TrafficConfig {
    pub count: usize,
    /// Fraction of road vehicles that are trucks.
    pub truck_share: f64,
    pub truck_speed_scale: f64,
    /// Linear lane speed in units/s.
    pub speed: Range<f64>,
    pub car_variants: u8,
}

#[derive(Clone, Debug)]
pub struct ScooterConfig {
    pub count: usize,
    pub ring: usize,
    pub speed: Range<f64>,
    /// Constant lean into the turn.
    pub lean: f64,
    pub altitude: f64,
}

#[derive(Clone, Debug)]
pub struct PedestrianConfig {
    pub count: usize,
    /// Circling radius around the plaza center.
    pub radius: Range<f64>,
    pub speed: Range<f64>,
}

#[derive(Clone, Debug)]
pub struct VesselClass {
    pub count: usize,
    pub variant: u8,
    pub radius: Range<f64>,
    pub angular_speed: f64,
    /// Phase of the first vessel; the rest spread evenly around the orbit.
    pub phase: f64,
    /// Extra random phase per vessel.
    pub phase_jitter: f64,
}

#[derive(Clone, Debug)]
pub struct FleetConfig {
    pub cargo: VesselClass,
    pub cruise: VesselClass,
    pub yachts: VesselClass,
    pub waterline: f64,
    pub heave: f64,
    pub heave_frequency: f64,
    pub roll: f64,
    pub roll_frequency: f64,
}

#[derive(Clone, Debug)]
pub struct AirlinerConfig {
    pub radius_x: f64,
    pub radius_z: f64,
    pub angular_speed: f64,
    pub altitude: f64,
    pub altitude_wave: Oscillation,
}

#[derive(Clone, Debug)]
pub struct DroneConfig {
    pub count: usize,
    pub radius_x: f64,
    pub radius_z: f64,
    pub angular_speed: f64,
    pub altitude: f64,
    pub hover: Oscillation,
}

#[derive(Clone, Debug)]
pub struct BomberConfig {
    pub radius: f64,
    pub aspect: f64,
    pub angular_speed: f64,
    /// One bomber per altitude, spread evenly in phase.
    pub altitudes: Vec<f64>,
    pub altitude_wave: f64,
    pub bank: f64,
}

#[derive(Clone, Debug)]
pub struct SquadronConfig {
    pub count: usize,
    pub radius_x: f64,
    pub radius_z: f64,
    pub angular_speed: f64,
    pub altitude: f64,
    pub altitude_wave: Oscillation,
    pub bank_gain: f64,
    pub bank_limit: f64,
    pub spacing: Echelon,
    /// Per-jet heave; each jet's phase is offset by its slot index.
    pub micro_bob: Oscillation,
}

#[derive(Clone, Debug)]
pub struct WolfpackConfig {
    pub count: usize,
    pub radius: f64,
    pub angular_speed: f64,
    pub depth: f64,
    pub spacing: Echelon,
}

#[derive(Resource, Clone, Debug)]
pub struct PopulationConfig {
    pub seed: u64,
    pub traffic: TrafficConfig,
    pub scooters: ScooterConfig,
    pub pedestrians: PedestrianConfig,
    pub fleet: FleetConfig,
    pub airliner: Option<AirlinerConfig>,
    pub drones: DroneConfig,
    pub bombers: BomberConfig,
    pub squadron: SquadronConfig,
    pub wolfpack: WolfpackConfig,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            seed: 27_182,
            traffic: TrafficConfig {
                count: 100,
                truck_share: 0.15,
                truck_speed_scale: 0.6,
                speed: 12.0..18.0,
                car_variants: 3,
            },
            scooters: ScooterConfig {
                count: 20,
                ring: 0,
                speed: 21.0..29.0,
                lean: 0.2,
                altitude: 0.1,
            },
            pedestrians: PedestrianConfig {
                count: 60,
                radius: 14.0..22.0,
                speed: 1.2..2.4,
            },
            fleet: FleetConfig {
                cargo: VesselClass {
                    count: 3,
                    variant: 0,
                    radius: 360.0..400.0,
                    angular_speed: 0.03,
                    phase: 0.0,
                    phase_jitter: 0.0,
                },
                cruise: VesselClass {
                    count: 1,
                    variant: 1,
                    radius: 330.0..330.0,
                    angular_speed: 0.048,
                    phase: PI,
                    phase_jitter: 0.0,
                },
                yachts: VesselClass {
                    count: 5,
                    variant: 0,
                    radius: 300.0..320.0,
                    angular_speed: 0.09,
                    phase: 0.0,
                    phase_jitter: 1.0,
                },
                waterline: -1.6,
                heave: 0.2,
                heave_frequency: 0.6,
                roll: 0.05,
                roll_frequency: 0.3,
            },
            airliner: Some(AirlinerConfig {
                radius_x: 250.0,
                radius_z: 200.0,
                angular_speed: 0.24,
                altitude: 140.0,
                altitude_wave: Oscillation::new(10.0, 0.3, 0.0),
            }),
            drones: DroneConfig {
                count: 1,
                radius_x: 50.0,
                radius_z: 30.0,
                angular_speed: 0.6,
                altitude: 60.0,
                hover: Oscillation::new(2.0, 1.8, FRAC_PI_2),
            },
            bombers: BomberConfig {
                radius: 280.0,
                aspect: 0.9,
                angular_speed: 1.2,
                altitudes: vec![280.0, 360.0],
                altitude_wave: 15.0,
                bank: 0.45,
            },
            squadron: SquadronConfig {
                count: 5,
                radius_x: 300.0,
                radius_z: 150.0,
                angular_speed: 0.48,
                altitude: 180.0,
                altitude_wave: Oscillation::new(20.0, 1.44, FRAC_PI_2),
                bank_gain: 1.5,
                bank_limit: 0.5,
                spacing: Echelon::new(8.0, 8.0),
                micro_bob: Oscillation::new(0.2, 4.8, 0.0),
            },
            wolfpack: WolfpackConfig {
                count: 7,
                radius: 420.0,
                angular_speed: 0.06,
                depth: -2.8,
                spacing: Echelon::new(15.0, 10.0),
            },
        }
    }
}

/// Agents spawned per kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PopulationStats {
    pub per_kind: BTreeMap<AgentKind, usize>,
}

impl PopulationStats {
    pub fn total(&self) -> usize {
        self.per_kind.values().sum()
    }

    pub fn count(&self, kind: AgentKind) -> usize {
        self.per_kind.get(&kind).copied().unwrap_or(0)
    }
}

struct Spawner<'a, F: RenderableFactory> {
    registry: &'a mut AgentRegistry<F::Handle>,
    factory: &'a mut F,
    rng: StdRng,
    stats: PopulationStats,
}

impl<F: RenderableFactory> Spawner<'_, F> {
    fn spawn(
        &mut self,
        kind: AgentKind,
        variant: u8,
        trajectory: Trajectory,
        params: AgentParams,
    ) -> Result<AgentId, SceneBuildError> {
        let index = self.stats.count(kind);
        let archetype = Archetype {
            kind,
            variant,
            seed: self.rng.gen(),
        };
        let handle = self
            .factory
            .build_agent(archetype)
            .ok_or(SceneBuildError::MissingHandle { kind, index })?;
        *self.stats.per_kind.entry(kind).or_default() += 1;
        Ok(self.registry.spawn(kind, trajectory, handle, params))
    }
}

fn sample(rng: &mut StdRng, range: &Range<f64>) -> f64 {
    if range.start < range.end {
        rng.gen_range(range.clone())
    } else {
        range.start
    }
}

/// Spawn the whole moving population. Fails on the first agent the factory
/// cannot build or on a lane assignment to a ring the zone model lacks.
pub fn populate<F: RenderableFactory>(
    registry: &mut AgentRegistry<F::Handle>,
    factory: &mut F,
    zones: &ZoneModel,
    config: &PopulationConfig,
) -> Result<PopulationStats, SceneBuildError> {
    let mut spawner = Spawner {
        registry,
        factory,
        rng: StdRng::seed_from_u64(config.seed),
        stats: PopulationStats::default(),
    };

    spawn_traffic(&mut spawner, zones, config)?;
    spawn_pedestrians(&mut spawner, config)?;
    spawn_fleet(&mut spawner, &config.fleet)?;
    spawn_aircraft(&mut spawner, config)?;
    spawn_formations(&mut spawner, config)?;

    let stats = spawner.stats;
    for (kind, count) in &stats.per_kind {
        debug!("Spawned {count} {}", kind.label());
    }
    info!("Population ready: {} agents", stats.total());
    Ok(stats)
}

fn spawn_traffic<F: RenderableFactory>(
    spawner: &mut Spawner<'_, F>,
    zones: &ZoneModel,
    config: &PopulationConfig,
) -> Result<(), SceneBuildError> {
    let traffic = &config.traffic;
    let ring_count = zones.rings().len();
    if traffic.count > 0 && ring_count == 0 {
        return Err(SceneBuildError::UnknownRing(0));
    }

    for _ in 0..traffic.count {
        let ring = spawner.rng.gen_range(0..ring_count);
        let lane = spawner.rng.gen_range(0..LANE_COUNT);
        let assignment = lane_assignment(zones, ring, lane)?;
        let speed = sample(&mut spawner.rng, &traffic.speed);
        let phase = spawner.rng.gen_range(0.0..TAU);

        let is_truck = spawner.rng.gen_bool(traffic.truck_share.clamp(0.0, 1.0));
        let (kind, variant, speed_scale) = if is_truck {
            (AgentKind::Truck, 0, traffic.truck_speed_scale)
        } else {
            let variant = spawner.rng.gen_range(0..traffic.car_variants.max(1));
            (AgentKind::Car, variant, 1.0)
        };

        spawner.spawn(
            kind,
            variant,
            assignment.orbit(speed, phase).into(),
            AgentParams {
                speed_scale,
                ..AgentParams::default()
            },
        )?;
    }

    let scooters = &config.scooters;
    for _ in 0..scooters.count {
        let lane = spawner.rng.gen_range(0..LANE_COUNT);
        let assignment = lane_assignment(zones, scooters.ring, lane)?;
        let speed = sample(&mut spawner.rng, &scooters.speed);
        let phase = spawner.rng.gen_range(0.0..TAU);
        spawner.spawn(
            AgentKind::Scooter,
            0,
            assignment
                .orbit(speed, phase)
                .with_altitude(scooters.altitude)
                .into(),
            AgentParams {
                bank: BankProfile::Fixed {
                    angle: scooters.lean,
                },
                ..AgentParams::default()
            },
        )?;
    }
    Ok(())
}

fn spawn_pedestrians<F: RenderableFactory>(
    spawner: &mut Spawner<'_, F>,
    config: &PopulationConfig,
) -> Result<(), SceneBuildError> {
    let walkers = &config.pedestrians;
    for _ in 0..walkers.count {
        let radius = sample(&mut spawner.rng, &walkers.radius);
        let speed = sample(&mut spawner.rng, &walkers.speed);
        let direction = if spawner.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let angular_speed = if radius > 0.0 {
            direction * speed / radius
        } else {
            0.0
        };
        let phase = spawner.rng.gen_range(0.0..TAU);
        let gait_phase = spawner.rng.gen_range(0.0..TAU);
        let variant = spawner.rng.gen_range(0..4);

        spawner.spawn(
            AgentKind::Pedestrian,
            variant,
            Orbit::new(radius, angular_speed, 0.0, phase).into(),
            AgentParams {
                gait_phase,
                ..AgentParams::default()
            },
        )?;
    }
    Ok(())
}

fn spawn_fleet<F: RenderableFactory>(
    spawner: &mut Spawner<'_, F>,
    fleet: &FleetConfig,
) -> Result<(), SceneBuildError> {
    let classes = [
        (AgentKind::Ship, &fleet.cargo),
        (AgentKind::Ship, &fleet.cruise),
        (AgentKind::Yacht, &fleet.yachts),
    ];
    for (kind, class) in classes {
        for i in 0..class.count {
            let radius = sample(&mut spawner.rng, &class.radius);
            let spread = i as f64 / class.count as f64 * TAU;
            let jitter = if class.phase_jitter > 0.0 {
                spawner.rng.gen_range(0.0..class.phase_jitter)
            } else {
                0.0
            };
            let sway_phase = spawner.rng.gen_range(0.0..10.0);
            let bob = Bob {
                heave: Oscillation::new(fleet.heave, fleet.heave_frequency, sway_phase),
                roll: Oscillation::new(fleet.roll, fleet.roll_frequency, sway_phase),
            };

            spawner.spawn(
                kind,
                class.variant,
                Orbit::new(radius, class.angular_speed, fleet.waterline, class.phase + spread + jitter)
                    .into(),
                AgentParams {
                    bob,
                    ..AgentParams::default()
                },
            )?;
        }
    }
    Ok(())
}

fn spawn_aircraft<F: RenderableFactory>(
    spawner: &mut Spawner<'_, F>,
    config: &PopulationConfig,
) -> Result<(), SceneBuildError> {
    if let Some(airliner) = &config.airliner {
        let path = Orbit::new(airliner.radius_x, airliner.angular_speed, airliner.altitude, 0.0)
            .with_aspect(airliner.radius_z / airliner.radius_x)
            .with_altitude_wave(airliner.altitude_wave);
        spawner.spawn(
            AgentKind::Jet,
            0,
            path.into(),
            AgentParams {
                bank: BankProfile::Curvature {
                    gain: 1.5,
                    limit: 0.3,
                },
                ..AgentParams::default()
            },
        )?;
    }

    let drones = &config.drones;
    for i in 0..drones.count {
        let phase = i as f64 / drones.count as f64 * TAU;
        let path = FigureEight::new(drones.radius_x, drones.radius_z, drones.angular_speed)
            .at_altitude(drones.altitude)
            .with_phase(phase)
            .with_altitude_wave(drones.hover);
        spawner.spawn(AgentKind::Drone, 0, path.into(), AgentParams::default())?;
    }

    let bombers = &config.bombers;
    let count = bombers.altitudes.len();
    for (i, &altitude) in bombers.altitudes.iter().enumerate() {
        let phase = i as f64 / count as f64 * TAU;
        let path = Orbit::new(bombers.radius, bombers.angular_speed, altitude, phase)
            .with_aspect(bombers.aspect)
            .with_altitude_wave(Oscillation::new(
                bombers.altitude_wave,
                2.0 * bombers.angular_speed,
                2.0 * phase,
            ));
        spawner.spawn(
            AgentKind::Bomber,
            0,
            path.into(),
            AgentParams {
                bank: BankProfile::Fixed {
                    angle: bombers.bank,
                },
                ..AgentParams::default()
            },
        )?;
    }
    Ok(())
}

fn spawn_formations<F: RenderableFactory>(
    spawner: &mut Spawner<'_, F>,
    config: &PopulationConfig,
) -> Result<(), SceneBuildError> {
    let squadron = &config.squadron;
    let lead = FigureEight::new(squadron.radius_x, squadron.radius_z, squadron.angular_speed)
        .at_altitude(squadron.altitude)
        .with_phase(FRAC_PI_2)
        .with_altitude_wave(squadron.altitude_wave);
    let formation = Formation::new(lead, squadron.spacing);
    for (slot, trajectory) in formation.members(squadron.count).enumerate() {
        let micro_bob = Oscillation {
            phase: squadron.micro_bob.phase + slot as f64,
            ..squadron.micro_bob
        };
        spawner.spawn(
            AgentKind::Fighter,
            0,
            trajectory,
            AgentParams {
                bank: BankProfile::Curvature {
                    gain: squadron.bank_gain,
                    limit: squadron.bank_limit,
                },
                bob: Bob {
                    heave: micro_bob,
                    roll: Oscillation::NONE,
                },
                ..AgentParams::default()
            },
        )?;
    }

    let wolfpack = &config.wolfpack;
    let formation = Formation::new(
        Orbit::new(wolfpack.radius, wolfpack.angular_speed, wolfpack.depth, 0.0),
        wolfpack.spacing,
    );
    for trajectory in formation.members(wolfpack.count) {
        spawner.spawn(AgentKind::Submarine, 0, trajectory, AgentParams::default())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::handle::HeadlessFactory;

    #[test]
    fn default_population_matches_the_manifest() {
        let mut registry = AgentRegistry::new();
        let mut factory = HeadlessFactory::new();
        let stats = populate(
            &mut registry,
            &mut factory,
            &ZoneModel::standard(),
            &PopulationConfig::default(),
        )
        .unwrap();

        assert_eq!(stats.count(AgentKind::Car) + stats.count(AgentKind::Truck), 100);
        assert_eq!(stats.count(AgentKind::Scooter), 20);
        assert_eq!(stats.count(AgentKind::Pedestrian), 60);
        assert_eq!(stats.count(AgentKind::Ship), 4);
        assert_eq!(stats.count(AgentKind::Yacht), 5);
        assert_eq!(stats.count(AgentKind::Jet), 1);
        assert_eq!(stats.count(AgentKind::Drone), 1);
        assert_eq!(stats.count(AgentKind::Bomber), 2);
        assert_eq!(stats.count(AgentKind::Fighter), 5);
        assert_eq!(stats.count(AgentKind::Submarine), 7);
        assert_eq!(stats.total(), registry.len());
        assert_eq!(factory.agents_built, registry.len());
    }

    #[test]
    fn population_is_deterministic_for_a_seed() {
        let build = || {
            let mut registry = AgentRegistry::new();
            populate(
                &mut registry,
                &mut HeadlessFactory::new(),
                &ZoneModel::standard(),
                &PopulationConfig::default(),
            )
            .unwrap();
            registry
                .iter()
                .map(|agent| agent.trajectory().position_at(3.0))
                .collect::<Vec<_>>()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn missing_handle_aborts_with_the_kind_and_index() {
        let mut registry = AgentRegistry::new();
        let mut factory = HeadlessFactory::new().refusing(AgentKind::Submarine);
        let result = populate(
            &mut registry,
            &mut factory,
            &ZoneModel::standard(),
            &PopulationConfig::default(),
        );
        assert!(matches!(
            result,
            Err(SceneBuildError::MissingHandle {
                kind: AgentKind::Submarine,
                index: 0
            })
        ));
    }

    #[test]
    fn scooters_need_their_ring() {
        let mut config = PopulationConfig::default();
        config.scooters.ring = 7;
        let result = populate(
            &mut AgentRegistry::new(),
            &mut HeadlessFactory::new(),
            &ZoneModel::standard(),
            &config,
        );
        assert!(matches!(result, Err(SceneBuildError::UnknownRing(7))));
    }
}
