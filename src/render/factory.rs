//! Primitive-mesh models for every agent archetype and static structure.
//!
//! Models are composed from a handful of shared unit meshes, scaled per
//! part. Every agent model faces `+X` with `+Z` as its right side.

use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::rig::{AgentRig, RigHandle};
use crate::procgen::density::ZoningTier;
use crate::procgen::placement::{Placement, TreePlacement};
use crate::simulation::agents::AgentKind;
use crate::simulation::handle::{Archetype, RenderableFactory, StaticContent};
use crate::world::landmarks::{Landmark, LandmarkKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Shape {
    Cube,
    Cylinder,
    Sphere,
    Cone,
    Frustum,
    Capsule,
}

/// `(key, srgb)` swatches; the key doubles as the material cache key.
const CAR_PAINTS: [(&str, [f32; 3]); 6] = [
    ("paint_red", [0.72, 0.12, 0.1]),
    ("paint_blue", [0.12, 0.25, 0.62]),
    ("paint_white", [0.9, 0.9, 0.88]),
    ("paint_black", [0.08, 0.08, 0.09]),
    ("paint_silver", [0.62, 0.64, 0.66]),
    ("paint_yellow", [0.9, 0.72, 0.12]),
];

const SHIRTS: [(&str, [f32; 3]); 4] = [
    ("shirt_teal", [0.1, 0.55, 0.55]),
    ("shirt_orange", [0.85, 0.45, 0.15]),
    ("shirt_navy", [0.12, 0.16, 0.35]),
    ("shirt_white", [0.88, 0.88, 0.86]),
];

const FACADES: [(&str, [f32; 3]); 4] = [
    ("facade_glass", [0.35, 0.5, 0.62]),
    ("facade_sand", [0.82, 0.76, 0.64]),
    ("facade_grey", [0.55, 0.56, 0.58]),
    ("facade_brick", [0.6, 0.32, 0.24]),
];

const CONTAINERS: [(&str, [f32; 3]); 4] = [
    ("container_red", [0.65, 0.15, 0.12]),
    ("container_blue", [0.15, 0.3, 0.6]),
    ("container_green", [0.18, 0.45, 0.25]),
    ("container_orange", [0.85, 0.45, 0.1]),
];

fn block(x: f32, y: f32, z: f32, sx: f32, sy: f32, sz: f32) -> Transform {
    Transform::from_xyz(x, y, z).with_scale(Vec3::new(sx, sy, sz))
}

fn pick<T: Copy>(items: &[T], seed: u64) -> T {
    items[(seed % items.len() as u64) as usize]
}

/// Builds archetype models as entity hierarchies during scene construction.
pub struct BevyFactory<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    meshes: &'a mut Assets<Mesh>,
    materials: &'a mut Assets<StandardMaterial>,
    shapes: HashMap<Shape, Handle<Mesh>>,
    palette: HashMap<&'static str, Handle<StandardMaterial>>,
}

impl<'a, 'w, 's> BevyFactory<'a, 'w, 's> {
    pub fn new(
        commands: &'a mut Commands<'w, 's>,
        meshes: &'a mut Assets<Mesh>,
        materials: &'a mut Assets<StandardMaterial>,
    ) -> Self {
        Self {
            commands,
            meshes,
            materials,
            shapes: HashMap::new(),
            palette: HashMap::new(),
        }
    }

    fn shape(&mut self, shape: Shape) -> Handle<Mesh> {
        let meshes = &mut *self.meshes;
        self.shapes
            .entry(shape)
            .or_insert_with(|| match shape {
                Shape::Cube => meshes.add(Cuboid::new(1.0, 1.0, 1.0)),
                Shape::Cylinder => meshes.add(Cylinder::new(0.5, 1.0)),
                Shape::Sphere => meshes.add(Sphere::new(0.5)),
                Shape::Cone => meshes.add(Cone::new(0.5, 1.0)),
                Shape::Frustum => meshes.add(ConicalFrustum {
                    radius_top: 0.36,
                    radius_bottom: 0.5,
                    height: 1.0,
                }),
                Shape::Capsule => meshes.add(Capsule3d::new(0.5, 1.0)),
            })
            .clone()
    }

    fn material(&mut self, key: &'static str, rgb: [f32; 3], roughness: f32, metallic: f32) -> Handle<StandardMaterial> {
        let materials = &mut *self.materials;
        self.palette
            .entry(key)
            .or_insert_with(|| {
                materials.add(StandardMaterial {
                    base_color: Color::srgb(rgb[0], rgb[1], rgb[2]),
                    perceptual_roughness: roughness,
                    metallic,
                    ..default()
                })
            })
            .clone()
    }

    fn paint(&mut self, swatch: (&'static str, [f32; 3])) -> Handle<StandardMaterial> {
        self.material(swatch.0, swatch.1, 0.45, 0.3)
    }

    fn matte(&mut self, key: &'static str, rgb: [f32; 3]) -> Handle<StandardMaterial> {
        self.material(key, rgb, 0.85, 0.0)
    }

    fn spawn_root(&mut self, transform: Transform, name: &'static str) -> Entity {
        self.commands
            .spawn((transform, Visibility::default(), Name::new(name)))
            .id()
    }

    fn attach(&mut self, parent: Entity, shape: Shape, material: Handle<StandardMaterial>, transform: Transform) -> Entity {
        let mesh = self.shape(shape);
        let child = self
            .commands
            .spawn((Mesh3d(mesh), MeshMaterial3d(material), transform))
            .id();
        self.commands.entity(parent).add_child(child);
        child
    }

    /// Spawn a named pivot under the rig root and register it as a part.
    /// Returns the pivot so meshes can hang off it.
    fn attach_part(&mut self, rig: &mut RigHandle, name: &'static str, pivot: Transform) -> Entity {
        let entity = self
            .commands
            .spawn((pivot, Visibility::default(), Name::new(name)))
            .id();
        self.commands.entity(rig.root()).add_child(entity);
        rig.add_part(name, entity, pivot.rotation);
        entity
    }

    fn wheel(&mut self, rig: &mut RigHandle, name: &'static str, at: Vec3, radius: f32, width: f32) {
        let rubber = self.matte("rubber", [0.05, 0.05, 0.05]);
        let pivot = self.attach_part(
            rig,
            name,
            Transform::from_translation(at).with_rotation(Quat::from_rotation_x(FRAC_PI_2)),
        );
        self.attach(
            pivot,
            Shape::Cylinder,
            rubber,
            Transform::from_scale(Vec3::new(radius * 2.0, width, radius * 2.0)),
        );
    }

    fn four_wheels(&mut self, rig: &mut RigHandle, front: f32, rear: f32, track: f32, radius: f32) {
        let half = track * 0.5;
        self.wheel(rig, "wheel_fl", Vec3::new(front, radius, -half), radius, 0.3);
        self.wheel(rig, "wheel_fr", Vec3::new(front, radius, half), radius, 0.3);
        self.wheel(rig, "wheel_rl", Vec3::new(rear, radius, -half), radius, 0.3);
        self.wheel(rig, "wheel_rr", Vec3::new(rear, radius, half), radius, 0.3);
    }

    fn build_car(&mut self, rig: &mut RigHandle, variant: u8, seed: u64) {
        let root = rig.root();
        // (length, body height, width, cabin length)
        let (length, height, width, cabin) = match variant {
            1 => (4.6, 1.2, 2.0, 2.8),
            2 => (4.4, 0.7, 1.9, 1.6),
            _ => (4.2, 0.9, 1.9, 2.2),
        };
        let paint = self.paint(pick(&CAR_PAINTS, seed));
        let glass = self.material("glass", [0.12, 0.16, 0.2], 0.1, 0.6);
        self.attach(root, Shape::Cube, paint, block(0.0, 0.45 + height * 0.5, 0.0, length, height, width));
        self.attach(
            root,
            Shape::Cube,
            glass,
            block(-0.2, 0.45 + height + 0.35, 0.0, cabin, 0.7, width * 0.9),
        );
        self.four_wheels(rig, length * 0.32, -length * 0.32, width, 0.42);
    }

    fn build_truck(&mut self, rig: &mut RigHandle, seed: u64) {
        let root = rig.root();
        let cab = self.paint(pick(&CAR_PAINTS, seed));
        let trailer = self.matte("trailer", [0.86, 0.86, 0.84]);
        self.attach(root, Shape::Cube, cab, block(2.4, 1.6, 0.0, 1.8, 2.2, 2.2));
        self.attach(root, Shape::Cube, trailer, block(-1.0, 2.1, 0.0, 4.8, 2.8, 2.3));
        self.four_wheels(rig, 2.4, -2.2, 2.2, 0.55);
    }

    fn build_scooter(&mut self, rig: &mut RigHandle, seed: u64) {
        let root = rig.root();
        let chrome = self.material("chrome", [0.8, 0.8, 0.8], 0.3, 0.8);
        let rider = self.paint(pick(&SHIRTS, seed));
        let skin = self.matte("skin", [0.8, 0.62, 0.5]);
        self.attach(root, Shape::Cube, chrome.clone(), block(0.0, 0.35, 0.0, 1.3, 0.15, 0.45));
        self.attach(root, Shape::Cube, chrome, block(0.55, 0.9, 0.0, 0.08, 1.1, 0.08));
        self.attach(root, Shape::Capsule, rider, block(-0.1, 1.35, 0.0, 0.45, 0.35, 0.45));
        self.attach(root, Shape::Sphere, skin, block(-0.1, 2.0, 0.0, 0.36, 0.36, 0.36));
        self.wheel(rig, "wheel_f", Vec3::new(0.6, 0.25, 0.0), 0.25, 0.12);
        self.wheel(rig, "wheel_r", Vec3::new(-0.55, 0.25, 0.0), 0.25, 0.12);
    }

    fn build_pedestrian(&mut self, rig: &mut RigHandle, variant: u8) {
        let root = rig.root();
        let shirt = self.paint(pick(&SHIRTS, variant as u64));
        let trousers = self.matte("trousers", [0.18, 0.2, 0.26]);
        let skin = self.matte("skin", [0.8, 0.62, 0.5]);
        self.attach(root, Shape::Capsule, shirt.clone(), block(0.0, 1.3, 0.0, 0.45, 0.32, 0.35));
        self.attach(root, Shape::Sphere, skin.clone(), block(0.0, 1.95, 0.0, 0.36, 0.36, 0.36));

        for (name, z) in [("leg_l", -0.12), ("leg_r", 0.12)] {
            let hip = self.attach_part(rig, name, Transform::from_xyz(0.0, 0.9, z));
            self.attach(hip, Shape::Capsule, trousers.clone(), block(0.0, -0.45, 0.0, 0.18, 0.45, 0.18));
        }
        for (name, z) in [("arm_l", -0.32), ("arm_r", 0.32)] {
            let shoulder = self.attach_part(rig, name, Transform::from_xyz(0.0, 1.55, z));
            self.attach(shoulder, Shape::Capsule, shirt.clone(), block(0.0, -0.35, 0.0, 0.14, 0.35, 0.14));
        }
    }

    fn build_ship(&mut self, rig: &mut RigHandle, variant: u8, seed: u64) {
        let root = rig.root();
        let white = self.matte("hull_white", [0.92, 0.92, 0.9]);
        if variant == 1 {
            // Cruise liner
            let navy = self.matte("hull_navy", [0.1, 0.14, 0.3]);
            let funnel = self.matte("funnel_red", [0.75, 0.12, 0.1]);
            self.attach(root, Shape::Cube, navy, block(0.0, 2.0, 0.0, 60.0, 6.0, 11.0));
            self.attach(root, Shape::Cube, white.clone(), block(-2.0, 6.5, 0.0, 46.0, 3.0, 9.5));
            self.attach(root, Shape::Cube, white, block(-4.0, 9.5, 0.0, 36.0, 3.0, 8.0));
            self.attach(root, Shape::Cylinder, funnel, block(-18.0, 13.0, 0.0, 3.0, 5.0, 3.0));
            return;
        }

        let hull = self.matte("hull_rust", [0.45, 0.12, 0.1]);
        self.attach(root, Shape::Cube, hull, block(0.0, 1.5, 0.0, 44.0, 5.0, 9.0));
        for i in 0..6 {
            let container = self.matte(
                pick(&CONTAINERS, seed.wrapping_add(i)).0,
                pick(&CONTAINERS, seed.wrapping_add(i)).1,
            );
            let x = -13.0 + i as f32 * 5.5;
            self.attach(root, Shape::Cube, container, block(x, 5.5, 0.0, 5.0, 3.0, 8.0));
        }
        self.attach(root, Shape::Cube, white, block(-19.0, 7.0, 0.0, 4.0, 8.0, 8.0));
    }

    fn build_yacht(&mut self, rig: &mut RigHandle) {
        let root = rig.root();
        let white = self.matte("hull_white", [0.92, 0.92, 0.9]);
        let glass = self.material("glass", [0.12, 0.16, 0.2], 0.1, 0.6);
        self.attach(root, Shape::Cube, white, block(0.0, 0.8, 0.0, 12.0, 1.6, 3.6));
        self.attach(root, Shape::Cube, glass, block(-1.0, 2.1, 0.0, 5.0, 1.2, 2.6));
    }

    fn build_airliner(&mut self, rig: &mut RigHandle) {
        let root = rig.root();
        let body = self.material("airframe", [0.9, 0.9, 0.92], 0.4, 0.2);
        let engines = self.material("engine", [0.55, 0.56, 0.6], 0.3, 0.7);
        let along_x = Quat::from_rotation_z(FRAC_PI_2);
        self.attach(
            root,
            Shape::Cylinder,
            body.clone(),
            block(0.0, 0.0, 0.0, 2.6, 26.0, 2.6).with_rotation(along_x),
        );
        self.attach(root, Shape::Sphere, body.clone(), block(13.0, 0.0, 0.0, 2.6, 2.6, 2.6));
        self.attach(root, Shape::Cube, body.clone(), block(1.0, -0.4, 0.0, 5.0, 0.35, 30.0));
        self.attach(root, Shape::Cube, body.clone(), block(-11.5, 2.5, 0.0, 3.0, 4.0, 0.3));
        self.attach(root, Shape::Cube, body, block(-11.5, 0.8, 0.0, 2.5, 0.25, 9.0));
        for z in [-6.0, 6.0] {
            self.attach(
                root,
                Shape::Cylinder,
                engines.clone(),
                block(2.0, -1.2, z, 1.3, 3.5, 1.3).with_rotation(along_x),
            );
        }
    }

    fn build_fighter(&mut self, rig: &mut RigHandle) {
        let root = rig.root();
        let grey = self.material("stealth_grey", [0.36, 0.38, 0.4], 0.6, 0.3);
        self.attach(root, Shape::Cube, grey.clone(), block(0.0, 0.0, 0.0, 10.0, 1.1, 1.6));
        self.attach(
            root,
            Shape::Cone,
            grey.clone(),
            block(6.0, 0.0, 0.0, 1.4, 2.5, 1.4).with_rotation(Quat::from_rotation_z(-FRAC_PI_2)),
        );
        self.attach(root, Shape::Cube, grey.clone(), block(-1.0, 0.0, 0.0, 4.0, 0.2, 8.5));
        for z in [-0.8, 0.8] {
            self.attach(root, Shape::Cube, grey.clone(), block(-4.0, 1.0, z, 1.8, 1.6, 0.15));
        }
    }

    fn build_bomber(&mut self, rig: &mut RigHandle) {
        let root = rig.root();
        let dark = self.material("bomber_dark", [0.14, 0.15, 0.17], 0.7, 0.2);
        self.attach(root, Shape::Cube, dark.clone(), block(0.0, 0.0, 0.0, 10.0, 1.5, 6.0));
        // Wings swept back toward -X.
        self.attach(
            root,
            Shape::Cube,
            dark.clone(),
            block(-3.0, 0.0, -9.0, 5.0, 0.6, 20.0).with_rotation(Quat::from_rotation_y(0.45)),
        );
        self.attach(
            root,
            Shape::Cube,
            dark,
            block(-3.0, 0.0, 9.0, 5.0, 0.6, 20.0).with_rotation(Quat::from_rotation_y(-0.45)),
        );
    }

    fn build_drone(&mut self, rig: &mut RigHandle) {
        let root = rig.root();
        let body = self.material("drone_body", [0.2, 0.2, 0.22], 0.5, 0.4);
        let blade = self.matte("rotor_blade", [0.7, 0.7, 0.72]);
        self.attach(root, Shape::Cube, body.clone(), block(0.0, 0.0, 0.0, 1.2, 0.4, 1.2));
        for angle in [FRAC_PI_4, -FRAC_PI_4] {
            self.attach(
                root,
                Shape::Cube,
                body.clone(),
                block(0.0, 0.15, 0.0, 2.6, 0.1, 0.12).with_rotation(Quat::from_rotation_y(angle)),
            );
        }
        let rotors = [
            ("rotor_0", 0.9, -0.9),
            ("rotor_1", 0.9, 0.9),
            ("rotor_2", -0.9, -0.9),
            ("rotor_3", -0.9, 0.9),
        ];
        for (name, x, z) in rotors {
            let hub = self.attach_part(rig, name, Transform::from_xyz(x, 0.3, z));
            self.attach(hub, Shape::Cube, blade.clone(), block(0.0, 0.0, 0.0, 1.3, 0.03, 0.12));
        }
    }

    fn build_submarine(&mut self, rig: &mut RigHandle) {
        let root = rig.root();
        let hull = self.material("sub_hull", [0.1, 0.11, 0.12], 0.6, 0.3);
        let bronze = self.material("bronze", [0.6, 0.45, 0.2], 0.35, 0.8);
        let along_x = Quat::from_rotation_z(FRAC_PI_2);
        self.attach(
            root,
            Shape::Cylinder,
            hull.clone(),
            block(0.0, 0.0, 0.0, 3.2, 20.0, 3.2).with_rotation(along_x),
        );
        self.attach(root, Shape::Sphere, hull.clone(), block(10.0, 0.0, 0.0, 3.2, 3.2, 3.2));
        self.attach(
            root,
            Shape::Cone,
            hull.clone(),
            block(-12.0, 0.0, 0.0, 3.2, 4.0, 3.2).with_rotation(along_x),
        );
        self.attach(root, Shape::Cube, hull, block(3.0, 2.6, 0.0, 4.0, 2.6, 1.2));

        let prop = self.attach_part(rig, "prop", Transform::from_xyz(-14.2, 0.0, 0.0));
        self.attach(prop, Shape::Cube, bronze.clone(), block(0.0, 0.0, 0.0, 0.2, 2.6, 0.4));
        self.attach(prop, Shape::Cube, bronze, block(0.0, 0.0, 0.0, 0.2, 0.4, 2.6));
    }

    fn build_landmark(&mut self, landmark: &Landmark) {
        let position = landmark.position.as_vec2();
        let height = landmark.height as f32;
        let root = self.spawn_root(Transform::from_xyz(position.x, 0.0, position.y), landmark.name);

        match landmark.kind {
            LandmarkKind::HelixTower => {
                let glass = self.material("helix_glass", [0.3, 0.55, 0.7], 0.15, 0.6);
                let floors = (height / 5.0).max(1.0) as usize;
                for floor in 0..floors {
                    let y = floor as f32 * 5.0 + 2.5;
                    self.attach(
                        root,
                        Shape::Cube,
                        glass.clone(),
                        block(0.0, y, 0.0, 14.0, 4.6, 14.0)
                            .with_rotation(Quat::from_rotation_y(floor as f32 * 0.12)),
                    );
                }
            }
            LandmarkKind::BrutalistTower => {
                let concrete = self.matte("concrete", [0.58, 0.57, 0.55]);
                self.attach(root, Shape::Cube, concrete.clone(), block(0.0, height * 0.3, 0.0, 18.0, height * 0.6, 18.0));
                self.attach(root, Shape::Cube, concrete, block(3.0, height * 0.8, -2.0, 12.0, height * 0.4, 14.0));
            }
            LandmarkKind::ArtDecoTower => {
                let stone = self.matte("deco_stone", [0.85, 0.78, 0.66]);
                let gold = self.material("deco_gold", [0.85, 0.68, 0.3], 0.3, 0.9);
                let tiers = [(18.0, 0.5), (13.0, 0.3), (8.0, 0.2)];
                let mut base = 0.0;
                for (width, share) in tiers {
                    let tier = height * share;
                    self.attach(root, Shape::Cube, stone.clone(), block(0.0, base + tier * 0.5, 0.0, width, tier, width));
                    base += tier;
                }
                self.attach(root, Shape::Cone, gold, block(0.0, base + 6.0, 0.0, 4.0, 12.0, 4.0));
            }
            LandmarkKind::GothicTower => {
                let stone = self.matte("gothic_stone", [0.35, 0.34, 0.36]);
                let body = height * 0.8;
                self.attach(root, Shape::Cube, stone.clone(), block(0.0, body * 0.5, 0.0, 14.0, body, 14.0));
                let spire = height - body;
                self.attach(root, Shape::Cone, stone.clone(), block(0.0, body + spire * 0.5, 0.0, 12.0, spire, 12.0));
                for (x, z) in [(-6.0, -6.0), (6.0, -6.0), (-6.0, 6.0), (6.0, 6.0)] {
                    self.attach(root, Shape::Cone, stone.clone(), block(x, body + 3.0, z, 2.0, 6.0, 2.0));
                }
            }
            LandmarkKind::Statue => {
                let plinth = self.matte("plinth", [0.7, 0.68, 0.64]);
                let copper = self.material("verdigris", [0.36, 0.6, 0.52], 0.6, 0.4);
                self.attach(root, Shape::Cube, plinth, block(0.0, 4.0, 0.0, 10.0, 8.0, 10.0));
                self.attach(root, Shape::Capsule, copper.clone(), block(0.0, 15.0, 0.0, 3.0, 3.5, 3.0));
                self.attach(root, Shape::Cube, copper, block(0.0, 23.0, 1.2, 0.8, 6.0, 0.8));
            }
            LandmarkKind::CoolingTower => {
                let concrete = self.matte("cooling_concrete", [0.74, 0.73, 0.7]);
                self.attach(root, Shape::Frustum, concrete, block(0.0, 20.0, 0.0, 30.0, 40.0, 30.0));
            }
            LandmarkKind::ReactorBlock => {
                let concrete = self.matte("concrete", [0.58, 0.57, 0.55]);
                let dome = self.matte("reactor_dome", [0.8, 0.8, 0.78]);
                self.attach(root, Shape::Cube, concrete, block(0.0, 8.0, 0.0, 22.0, 16.0, 16.0));
                self.attach(root, Shape::Sphere, dome, block(0.0, 16.0, 0.0, 12.0, 12.0, 12.0));
            }
        }
    }

    fn build_building(&mut self, placement: &Placement) {
        let mut rng = StdRng::seed_from_u64(placement.variant_seed);
        let position = placement.cell.position.as_vec2();
        let yaw = rng.gen_range(0..4) as f32 * FRAC_PI_2;
        let root = self.spawn_root(
            Transform::from_xyz(position.x, 0.0, position.y).with_rotation(Quat::from_rotation_y(yaw)),
            placement.cell.tier.label(),
        );
        let facade = self.paint(pick(&FACADES, placement.variant_seed));

        match (placement.cell.tier, placement.archetype) {
            (ZoningTier::Inner, 0) => {
                let width = rng.gen_range(8.0..12.0);
                let height = rng.gen_range(35.0..70.0);
                self.attach(root, Shape::Cube, facade, block(0.0, height * 0.5, 0.0, width, height, width));
            }
            (ZoningTier::Inner, 1) => {
                let height = rng.gen_range(30.0..55.0);
                let top = height * 0.4;
                self.attach(root, Shape::Cube, facade.clone(), block(0.0, height * 0.5, 0.0, 11.0, height, 11.0));
                self.attach(root, Shape::Cube, facade, block(0.0, height + top * 0.5, 0.0, 6.0, top, 6.0));
            }
            (ZoningTier::Inner, _) => {
                let height = rng.gen_range(40.0..65.0);
                self.attach(root, Shape::Cylinder, facade, block(0.0, height * 0.5, 0.0, 10.0, height, 10.0));
            }
            (ZoningTier::Midtown, _) => {
                let width = rng.gen_range(9.0..12.0);
                let depth = rng.gen_range(8.0..11.0);
                let height = rng.gen_range(12.0..28.0);
                self.attach(root, Shape::Cube, facade, block(0.0, height * 0.5, 0.0, width, height, depth));
            }
            (ZoningTier::Suburb, archetype) => {
                let roof = self.matte("roof_slate", [0.3, 0.3, 0.34]);
                let (width, depth) = match archetype {
                    0 => (7.0, 6.0),
                    1 => (9.0, 7.0),
                    _ => (11.0, 5.0),
                };
                self.attach(root, Shape::Cube, facade, block(0.0, 1.75, 0.0, width, 3.5, depth));
                if archetype == 1 {
                    self.attach(root, Shape::Cube, roof, block(0.0, 3.65, 0.0, width + 0.4, 0.3, depth + 0.4));
                } else {
                    // Gable roof: a cube turned 45 degrees about the ridge.
                    let side = depth / std::f32::consts::SQRT_2;
                    self.attach(
                        root,
                        Shape::Cube,
                        roof,
                        block(0.0, 3.5, 0.0, width, side, side)
                            .with_rotation(Quat::from_rotation_x(FRAC_PI_4)),
                    );
                }
            }
        }
    }

    fn build_tree(&mut self, tree: &TreePlacement) {
        let position = tree.position.as_vec2();
        let scale = tree.scale as f32;
        let root = self.spawn_root(
            Transform::from_xyz(position.x, 0.0, position.y)
                .with_rotation(Quat::from_rotation_y(tree.yaw as f32))
                .with_scale(Vec3::splat(scale)),
            "tree",
        );
        let bark = self.matte("bark", [0.36, 0.25, 0.16]);
        let leaves = self.matte("leaves", [0.2, 0.45, 0.2]);
        self.attach(root, Shape::Cylinder, bark, block(0.0, 1.25, 0.0, 0.5, 2.5, 0.5));
        self.attach(root, Shape::Cone, leaves, block(0.0, 4.5, 0.0, 3.2, 5.0, 3.2));
    }
}

impl RenderableFactory for BevyFactory<'_, '_, '_> {
    type Handle = RigHandle;

    fn build_agent(&mut self, archetype: Archetype) -> Option<RigHandle> {
        let root = self
            .commands
            .spawn((
                Transform::default(),
                Visibility::default(),
                Name::new(archetype.kind.label()),
                AgentRig,
            ))
            .id();
        let mut rig = RigHandle::new(root);

        match archetype.kind {
            AgentKind::Car => self.build_car(&mut rig, archetype.variant, archetype.seed),
            AgentKind::Truck => self.build_truck(&mut rig, archetype.seed),
            AgentKind::Scooter => self.build_scooter(&mut rig, archetype.seed),
            AgentKind::Pedestrian => self.build_pedestrian(&mut rig, archetype.variant),
            AgentKind::Ship => self.build_ship(&mut rig, archetype.variant, archetype.seed),
            AgentKind::Yacht => self.build_yacht(&mut rig),
            AgentKind::Jet => self.build_airliner(&mut rig),
            AgentKind::Fighter => self.build_fighter(&mut rig),
            AgentKind::Bomber => self.build_bomber(&mut rig),
            AgentKind::Drone => self.build_drone(&mut rig),
            AgentKind::Submarine => self.build_submarine(&mut rig),
        }
        Some(rig)
    }

    fn build_static(&mut self, content: StaticContent<'_>) {
        match content {
            StaticContent::Landmark(landmark) => self.build_landmark(landmark),
            StaticContent::Building(placement) => self.build_building(placement),
            StaticContent::Tree(tree) => self.build_tree(tree),
        }
    }
}
