//! Static environment: sky, lights, ocean, island, and road surfaces.

use bevy::{
    pbr::{CascadeShadowConfigBuilder, DirectionalLightShadowMap},
    prelude::*,
};

use crate::world::zones::ZoneModel;

/// Configuration for the backdrop's surroundings.
#[derive(Resource, Clone)]
pub struct EnvironmentConfig {
    pub sky: Color,
    pub ocean: Color,
    /// Ocean disc radius; large enough to reach the fog.
    pub ocean_radius: f32,
    pub ocean_level: f32,
    pub island: Color,
    pub plaza: Color,
    pub asphalt: Color,
    pub sun_illuminance: f32,
    pub ambient_brightness: f32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            sky: Color::srgb(0.62, 0.76, 0.9),
            ocean: Color::srgb(0.1, 0.28, 0.42),
            ocean_radius: 1400.0,
            ocean_level: -1.5,
            island: Color::srgb(0.36, 0.48, 0.3),
            plaza: Color::srgb(0.78, 0.75, 0.7),
            asphalt: Color::srgb(0.16, 0.16, 0.18),
            sun_illuminance: 20000.0,
            ambient_brightness: 400.0,
        }
    }
}

/// Lies a 2D primitive mesh flat, facing up.
fn flat(y: f32) -> Transform {
    Transform::from_xyz(0.0, y, 0.0).with_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2))
}

pub fn setup_environment(
    mut commands: Commands,
    config: Res<EnvironmentConfig>,
    zones: Res<ZoneModel>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(ClearColor(config.sky));
    commands.insert_resource(DirectionalLightShadowMap { size: 2048 });
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: config.ambient_brightness,
    });

    commands.spawn((
        DirectionalLight {
            illuminance: config.sun_illuminance,
            shadows_enabled: true,
            shadow_depth_bias: 0.3,
            shadow_normal_bias: 1.8,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::XYZ,
            -std::f32::consts::FRAC_PI_4,
            std::f32::consts::FRAC_PI_4,
            0.0,
        )),
        // Island plus the outer shipping lanes
        CascadeShadowConfigBuilder {
            num_cascades: 3,
            minimum_distance: 0.1,
            maximum_distance: 900.0,
            first_cascade_far_bound: 120.0,
            overlap_proportion: 0.3,
        }
        .build(),
        Name::new("sun"),
    ));

    let ocean = materials.add(StandardMaterial {
        base_color: config.ocean,
        perceptual_roughness: 0.15,
        reflectance: 0.6,
        ..default()
    });
    commands.spawn((
        Mesh3d(meshes.add(Circle::new(config.ocean_radius))),
        MeshMaterial3d(ocean),
        flat(config.ocean_level),
        Name::new("ocean"),
    ));

    // Island slab, top face at y = 0
    let island_radius = zones.island_radius() as f32;
    commands.spawn((
        Mesh3d(meshes.add(Cylinder::new(island_radius, 6.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: config.island,
            perceptual_roughness: 0.95,
            ..default()
        })),
        Transform::from_xyz(0.0, -3.0, 0.0),
        Name::new("island"),
    ));

    commands.spawn((
        Mesh3d(meshes.add(Circle::new(zones.plaza_radius() as f32))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: config.plaza,
            perceptual_roughness: 0.8,
            ..default()
        })),
        flat(0.02),
        Name::new("plaza"),
    ));

    let asphalt = materials.add(StandardMaterial {
        base_color: config.asphalt,
        perceptual_roughness: 0.9,
        ..default()
    });

    for ring in zones.rings() {
        let inner = (ring.radius - ring.half_width()) as f32;
        let outer = (ring.radius + ring.half_width()) as f32;
        commands.spawn((
            Mesh3d(meshes.add(Annulus::new(inner, outer))),
            MeshMaterial3d(asphalt.clone()),
            flat(0.04),
            Name::new("ring_road"),
        ));
    }

    for avenue in zones.radials() {
        let length = (avenue.outer_radius - avenue.inner_radius) as f32;
        let middle = ((avenue.outer_radius + avenue.inner_radius) * 0.5) as f32;
        let direction = avenue.direction.unit().as_vec2();
        // Rotate the strip's long X axis onto the avenue direction.
        let yaw = (-direction.y).atan2(direction.x);
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(length, 0.05, avenue.width as f32))),
            MeshMaterial3d(asphalt.clone()),
            Transform::from_xyz(direction.x * middle, 0.03, direction.y * middle)
                .with_rotation(Quat::from_rotation_y(yaw)),
            Name::new("avenue"),
        ));
    }

    info!(
        "Environment ready: {} ring roads, {} avenues",
        zones.rings().len(),
        zones.radials().len()
    );
}
