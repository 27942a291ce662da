use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use island_backdrop::procgen::placement::{PlacementConfig, PlacementEngine};
use island_backdrop::simulation::handle::HeadlessFactory;
use island_backdrop::simulation::kinematics::KinematicsConfig;
use island_backdrop::simulation::population::PopulationConfig;
use island_backdrop::world::zones::ZoneModel;
use island_backdrop::CityScene;

fn build_scene() -> CityScene<island_backdrop::simulation::handle::DetachedRig> {
    match CityScene::build(
        &mut HeadlessFactory::new(),
        &ZoneModel::standard(),
        &PlacementConfig::default(),
        &PopulationConfig::default(),
        &KinematicsConfig::default(),
    ) {
        Ok(scene) => scene,
        Err(err) => panic!("scene build failed: {err}"),
    }
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_tick");

    let mut scene = build_scene();
    group.bench_function("tick_full_population", |b| {
        b.iter(|| scene.simulation.tick(black_box(1.0 / 60.0)))
    });

    group.bench_function("tick_paused", |b| {
        b.iter(|| scene.simulation.tick(black_box(0.0)))
    });

    group.bench_function("tick_600_frames", |b| {
        b.iter_batched(
            build_scene,
            |mut scene| {
                for _ in 0..600 {
                    scene.simulation.tick(1.0 / 60.0);
                }
                scene
            },
            BatchSize::LargeInput,
        )
    });
    group.finish();
}

fn bench_placement(c: &mut Criterion) {
    let zones = ZoneModel::standard();
    let config = PlacementConfig::default();
    c.bench_function("placement_plan", |b| {
        b.iter(|| PlacementEngine::new(black_box(&config), &zones).plan())
    });
}

criterion_group!(benches, bench_tick, bench_placement);
criterion_main!(benches);
