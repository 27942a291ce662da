//! Slowly orbiting perspective camera with zoom and rotate controls.

use bevy::{
    core_pipeline::{
        bloom::{Bloom, BloomPrefilter},
        tonemapping::Tonemapping,
    },
    input::mouse::MouseWheel,
    pbr::{DistanceFog, FogFalloff},
    prelude::*,
};

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OrbitCameraConfig>()
            .add_systems(Startup, setup_camera)
            .add_systems(Update, (camera_zoom, camera_rotate, apply_orbit).chain());
    }
}

/// Configuration for the backdrop camera.
#[derive(Resource, Clone, Debug)]
pub struct OrbitCameraConfig {
    /// Point the camera circles around.
    pub target: Vec3,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Angle above the horizon in radians.
    pub elevation: f32,
    /// Idle drift in rad/s.
    pub auto_rotate: f32,
    /// Q/E rotation speed in rad/s.
    pub rotate_speed: f32,
    pub bloom_intensity: f32,
}

impl Default for OrbitCameraConfig {
    fn default() -> Self {
        Self {
            target: Vec3::new(0.0, 20.0, 0.0),
            distance: 520.0,
            min_distance: 120.0,
            max_distance: 1100.0,
            elevation: 0.55,
            auto_rotate: 0.04,
            rotate_speed: 1.0,
            bloom_intensity: 0.15,
        }
    }
}

/// Per-camera orbit state.
#[derive(Component, Debug)]
pub struct OrbitCamera {
    pub yaw: f32,
    pub elevation: f32,
    pub distance: f32,
}

/// Eye position for an orbit around `target`.
pub fn orbit_eye(target: Vec3, yaw: f32, elevation: f32, distance: f32) -> Vec3 {
    let horizontal = distance * elevation.cos();
    target
        + Vec3::new(
            horizontal * yaw.cos(),
            distance * elevation.sin(),
            horizontal * yaw.sin(),
        )
}

fn setup_camera(mut commands: Commands, config: Res<OrbitCameraConfig>) {
    let orbit = OrbitCamera {
        yaw: std::f32::consts::FRAC_PI_4,
        elevation: config.elevation,
        distance: config.distance,
    };
    let eye = orbit_eye(config.target, orbit.yaw, orbit.elevation, orbit.distance);

    commands.spawn((
        Camera3d::default(),
        Camera {
            hdr: true, // Required for bloom
            ..default()
        },
        Transform::from_translation(eye).looking_at(config.target, Vec3::Y),
        DistanceFog {
            color: Color::srgba(0.62, 0.74, 0.86, 1.0),
            falloff: FogFalloff::Exponential { density: 0.0009 },
            directional_light_color: Color::srgba(1.0, 0.85, 0.65, 0.3),
            directional_light_exponent: 12.0,
        },
        Bloom {
            intensity: config.bloom_intensity,
            prefilter: BloomPrefilter {
                threshold: 0.9,
                threshold_softness: 0.3,
            },
            ..default()
        },
        Tonemapping::TonyMcMapface,
        orbit,
    ));
}

fn camera_zoom(
    mut query: Query<&mut OrbitCamera>,
    mut scroll_events: EventReader<MouseWheel>,
    config: Res<OrbitCameraConfig>,
) {
    let scroll: f32 = scroll_events.read().map(|e| e.y).sum();
    if scroll == 0.0 {
        return;
    }

    for mut orbit in &mut query {
        orbit.distance =
            (orbit.distance * (1.0 - scroll * 0.1)).clamp(config.min_distance, config.max_distance);
    }
}

fn camera_rotate(
    mut query: Query<&mut OrbitCamera>,
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    config: Res<OrbitCameraConfig>,
) {
    let mut rotation_delta = config.auto_rotate * time.delta_secs();

    if keys.pressed(KeyCode::KeyQ) {
        rotation_delta -= config.rotate_speed * time.delta_secs();
    }
    if keys.pressed(KeyCode::KeyE) {
        rotation_delta += config.rotate_speed * time.delta_secs();
    }

    for mut orbit in &mut query {
        orbit.yaw = (orbit.yaw + rotation_delta).rem_euclid(std::f32::consts::TAU);
    }
}

fn apply_orbit(
    mut query: Query<(&mut Transform, &OrbitCamera), Changed<OrbitCamera>>,
    config: Res<OrbitCameraConfig>,
) {
    for (mut transform, orbit) in &mut query {
        let eye = orbit_eye(config.target, orbit.yaw, orbit.elevation, orbit.distance);
        *transform = Transform::from_translation(eye).looking_at(config.target, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_keeps_its_distance_from_the_target() {
        let target = Vec3::new(0.0, 20.0, 0.0);
        for step in 0..16 {
            let yaw = step as f32 * 0.4;
            let eye = orbit_eye(target, yaw, 0.55, 520.0);
            assert!(((eye - target).length() - 520.0).abs() < 1e-2);
            assert!(eye.y > target.y);
        }
    }
}
