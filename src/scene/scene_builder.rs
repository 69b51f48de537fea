//! SceneBuilder - Declarative scene construction
//!
//! Provides a fluent API for building the military base diorama. Every
//! random choice (terrain noise, scatter, colour jitter) comes from one
//! seeded generator, so a seed always yields the same base.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4, FRAC_PI_6, PI, TAU};

use diorama_core::{
    AnimatedEntity, AnimationUpdater, Axis, Entity, EntityKey, Material, ParticleSystem, PointLight,
    Shape, Vec3, World,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// Palette (sRGB hex, as authored)
const OLIVE_DRAB: u32 = 0x2d4a2d;
const GUNMETAL: u32 = 0x1a1a1a;
const DARK_GRAY: u32 = 0x333333;
const CONCRETE: u32 = 0x4a4a4a;
const STEEL: u32 = 0x666666;
const GRASS: u32 = 0x228B22;
const DIRT_ROAD: u32 = 0x8B7355;
const SCORCHED: u32 = 0x8B4513;

/// A built diorama: the world plus the animations that run on it
pub struct Scene {
    pub world: World,
    pub animation: AnimationUpdater,
}

/// Builder for constructing the diorama
///
/// # Example
/// ```ignore
/// let scene = SceneBuilder::new(7)
///     .add_terrain()
///     .add_main_tank()
///     .add_fires()
///     .build();
/// ```
pub struct SceneBuilder {
    world: World,
    animation: AnimationUpdater,
    rng: StdRng,
}

impl SceneBuilder {
    /// Create a new scene builder seeded with `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            world: World::new(),
            animation: AnimationUpdater::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a scene builder with a pre-allocated world capacity
    pub fn with_capacity(seed: u64, capacity: usize) -> Self {
        Self {
            world: World::with_capacity(capacity),
            ..Self::new(seed)
        }
    }

    /// The complete military base
    pub fn military_base(seed: u64) -> Scene {
        Self::with_capacity(seed, 1024)
            .add_reference_cube()
            .add_lights()
            .add_terrain()
            .add_roads()
            .add_craters()
            .add_main_tank()
            .add_tank_fleet()
            .add_command_center()
            .add_watchtowers()
            .add_barracks()
            .add_radar()
            .add_jets()
            .add_helicopters()
            .add_trucks()
            .add_armored_vehicles()
            .add_soldier_squads()
            .add_aa_guns()
            .add_missile_launchers()
            .add_trees()
            .add_crate_depot()
            .add_fuel_barrels()
            .add_comm_towers()
            .add_fires()
            .add_smoke()
            .build()
    }

    // --- Helpers ---

    /// Uniform sample in [0, 1)
    fn random(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Uniform sample in [-0.5, 0.5)
    fn centered(&mut self) -> f32 {
        self.random() - 0.5
    }

    /// Add a named group standing on the ground at (x, z), turned about Y
    fn ground_group(&mut self, name: &str, tag: &str, x: f32, z: f32, heading: f32) -> EntityKey {
        self.world.add_entity(
            Entity::group()
                .with_name(name)
                .with_tag(tag)
                .at(Vec3::new(x, 0.0, z))
                .rotated(Vec3::new(0.0, heading, 0.0)),
        )
    }

    fn part(&mut self, parent: EntityKey, entity: Entity) -> EntityKey {
        self.world.add_child(parent, entity)
    }

    fn spin(&mut self, target: EntityKey, axis: Axis, angular_speed: f32) {
        if let Some(entity) = self.world.get_entity_mut(target) {
            entity.tags.insert("animated".to_string());
        }
        self.animation.push(AnimatedEntity::Rotate { target, axis, angular_speed });
    }

    // --- Ground ---

    /// Red cube at the origin, useful for checking the camera frames the base
    pub fn add_reference_cube(mut self) -> Self {
        self.world.add_entity(
            Entity::with_material(Shape::cuboid(10.0, 10.0, 10.0), Material::from_hex(0xff0000))
                .with_name("reference_cube")
                .at(Vec3::new(0.0, 5.0, 0.0)),
        );
        self
    }

    /// Orange point lights over the burning areas
    pub fn add_lights(mut self) -> Self {
        let [r, g, b, _] = Material::from_hex(0xffa500).base_color;
        for position in [
            Vec3::new(-40.0, 15.0, -30.0),
            Vec3::new(50.0, 20.0, 40.0),
            Vec3::new(0.0, 25.0, -50.0),
        ] {
            self.world.add_point_light(PointLight {
                position,
                color: [r, g, b],
                intensity: 2.0,
                range: 100.0,
            });
        }
        self
    }

    /// Rolling 300 x 300 battlefield
    pub fn add_terrain(mut self) -> Self {
        let rng = &mut self.rng;
        let shape = Shape::terrain(300.0, 100, |x, z| {
            (x * 0.01).sin() * 3.0 + (z * 0.01).cos() * 2.0 + rng.random::<f32>() * 1.5
        });
        self.world.add_entity(
            Entity::with_material(shape, Material::from_hex(GRASS).with_alpha(0.9))
                .with_name("terrain")
                .with_tag("terrain"),
        );
        self
    }

    pub fn add_roads(mut self) -> Self {
        // (x, z, width, length, heading)
        let roads = [
            (0.0, 0.0, 12.0, 200.0, 0.0),
            (0.0, 0.0, 8.0, 150.0, FRAC_PI_2),
            (30.0, 30.0, 6.0, 100.0, FRAC_PI_4),
        ];
        for (x, z, width, length, heading) in roads {
            self.world.add_entity(
                Entity::with_material(Shape::plane(width, length), Material::from_hex(DIRT_ROAD))
                    .with_tag("road")
                    .at(Vec3::new(x, 0.02, z))
                    .rotated(Vec3::new(0.0, heading, 0.0)),
            );
        }
        self
    }

    pub fn add_craters(mut self) -> Self {
        for _ in 0..15 {
            let top = 4.0 + self.random() * 6.0;
            let bottom = 5.0 + self.random() * 8.0;
            let depth = 1.0 + self.random() * 2.0;
            let x = self.centered() * 200.0;
            let z = self.centered() * 200.0;
            self.world.add_entity(
                Entity::with_material(Shape::cylinder(top, bottom, depth, 12), Material::from_hex(SCORCHED))
                    .with_tag("crater")
                    .at(Vec3::new(x, -0.5, z)),
            );
        }
        self
    }

    // --- Armour ---

    /// The centrepiece tank with a slowly traversing turret
    pub fn add_main_tank(mut self) -> Self {
        let tank = self.ground_group("main_tank", "vehicle", 0.0, 0.0, 0.0);
        let hull = Material::from_hex(OLIVE_DRAB);

        self.part(tank, Entity::with_material(Shape::cuboid(12.0, 3.0, 18.0), hull).at(Vec3::new(0.0, 2.0, 0.0)));
        let turret = self.part(
            tank,
            Entity::with_material(Shape::cylinder(4.0, 4.0, 2.5, 12), hull)
                .with_name("main_tank_turret")
                .at(Vec3::new(0.0, 4.5, 0.0)),
        );
        self.part(
            tank,
            Entity::with_material(Shape::cylinder(0.6, 0.6, 16.0, 12), Material::from_hex(GUNMETAL))
                .at(Vec3::new(8.0, 4.5, 0.0))
                .rotated(Vec3::new(0.0, 0.0, FRAC_PI_2)),
        );

        for side in [-7.5, 7.5] {
            self.part(
                tank,
                Entity::with_material(Shape::cuboid(3.0, 2.5, 20.0), Material::from_hex(GUNMETAL))
                    .at(Vec3::new(side, 1.25, 0.0)),
            );
            for j in 0..6 {
                self.part(
                    tank,
                    Entity::with_material(Shape::cylinder(1.2, 1.2, 0.8, 8), Material::from_hex(DARK_GRAY))
                        .at(Vec3::new(side, 1.25, -8.0 + j as f32 * 3.2))
                        .rotated(Vec3::new(0.0, 0.0, FRAC_PI_2)),
                );
            }
        }

        self.part(
            tank,
            Entity::with_material(Shape::cylinder(0.05, 0.05, 4.0, 8), Material::from_hex(STEEL))
                .at(Vec3::new(-2.0, 7.0, 2.0)),
        );

        self.spin(turret, Axis::Y, 0.3);
        self
    }

    pub fn add_tank_fleet(mut self) -> Self {
        let fleet = [
            (-25.0, -15.0, 0.3),
            (30.0, -20.0, -0.5),
            (-40.0, 25.0, 1.2),
            (45.0, 30.0, -1.8),
            (-15.0, 40.0, 0.8),
            (25.0, -45.0, -0.2),
        ];
        for (n, (x, z, heading)) in fleet.into_iter().enumerate() {
            let tank = self.ground_group(&format!("tank_{n}"), "vehicle", x, z, heading);
            let lightness = 0.15 + self.random() * 0.1;
            let hull = Material::from_hsl(0.25, 0.3, lightness);

            self.part(tank, Entity::with_material(Shape::cuboid(10.0, 2.5, 15.0), hull).at(Vec3::new(0.0, 1.75, 0.0)));
            self.part(tank, Entity::with_material(Shape::cylinder(3.0, 3.0, 2.0, 10), hull).at(Vec3::new(0.0, 3.5, 0.0)));
            self.part(
                tank,
                Entity::with_material(Shape::cylinder(0.4, 0.4, 12.0, 8), Material::from_hex(GUNMETAL))
                    .at(Vec3::new(6.0, 3.5, 0.0))
                    .rotated(Vec3::new(0.0, 0.0, FRAC_PI_2)),
            );
            for side in [-6.0, 6.0] {
                self.part(
                    tank,
                    Entity::with_material(Shape::cuboid(2.5, 2.0, 16.0), Material::from_hex(GUNMETAL))
                        .at(Vec3::new(side, 1.0, 0.0)),
                );
            }
        }
        self
    }

    // --- Base structures ---

    pub fn add_command_center(mut self) -> Self {
        self.world.add_entity(
            Entity::with_material(Shape::cuboid(25.0, 8.0, 20.0), Material::from_hex(CONCRETE))
                .with_name("command_center")
                .with_tag("building")
                .at(Vec3::new(-60.0, 4.0, -30.0)),
        );
        self
    }

    /// Six watchtowers, each with a sweeping searchlight
    pub fn add_watchtowers(mut self) -> Self {
        let positions = [(-80.0, -50.0), (80.0, -50.0), (-80.0, 50.0), (80.0, 50.0), (0.0, -70.0), (0.0, 70.0)];
        for (n, (x, z)) in positions.into_iter().enumerate() {
            let tower = self.ground_group(&format!("watchtower_{n}"), "building", x, z, 0.0);
            self.part(
                tower,
                Entity::with_material(Shape::cuboid(6.0, 20.0, 6.0), Material::from_hex(0x654321))
                    .at(Vec3::new(0.0, 10.0, 0.0)),
            );
            self.part(
                tower,
                Entity::with_material(Shape::cuboid(8.0, 3.0, 8.0), Material::from_hex(CONCRETE))
                    .at(Vec3::new(0.0, 21.5, 0.0)),
            );
            let searchlight = self.part(
                tower,
                Entity::with_material(Shape::cylinder(1.0, 1.5, 2.0, 8), Material::from_hex(0xffff00))
                    .with_name(format!("searchlight_{n}"))
                    .at(Vec3::new(0.0, 24.0, 0.0)),
            );
            self.spin(searchlight, Axis::Y, 0.5);
        }
        self
    }

    pub fn add_barracks(mut self) -> Self {
        // (x, z, width, height, depth)
        let barracks = [
            (-40.0, 60.0, 30.0, 8.0, 12.0),
            (40.0, 60.0, 30.0, 8.0, 12.0),
            (-40.0, -60.0, 25.0, 6.0, 10.0),
            (40.0, -60.0, 25.0, 6.0, 10.0),
        ];
        for (x, z, w, h, d) in barracks {
            self.world.add_entity(
                Entity::with_material(Shape::cuboid(w, h, d), Material::from_hex(0x696969))
                    .with_tag("building")
                    .at(Vec3::new(x, h / 2.0, z)),
            );
        }
        self
    }

    /// Radar mast with a tilted, rotating dish
    pub fn add_radar(mut self) -> Self {
        self.world.add_entity(
            Entity::with_material(Shape::cylinder(0.5, 0.5, 25.0, 8), Material::from_hex(STEEL))
                .with_name("radar_pole")
                .with_tag("building")
                .at(Vec3::new(60.0, 12.5, 0.0)),
        );
        let dish = self.world.add_entity(
            Entity::with_material(Shape::cylinder(8.0, 8.0, 1.0, 16), Material::from_hex(0xcccccc))
                .with_name("radar_dish")
                .with_tag("building")
                .at(Vec3::new(60.0, 25.0, 0.0))
                .rotated(Vec3::new(FRAC_PI_6, 0.0, 0.0)),
        );
        self.spin(dish, Axis::Y, 1.0);
        self
    }

    // --- Aircraft ---

    pub fn add_jets(mut self) -> Self {
        let jets = [(-70.0, 20.0, 0.5), (-70.0, 30.0, 0.5), (70.0, -20.0, -2.5)];
        for (n, (x, z, heading)) in jets.into_iter().enumerate() {
            let jet = self.ground_group(&format!("jet_{n}"), "aircraft", x, z, heading);
            self.part(
                jet,
                Entity::with_material(Shape::cylinder(1.5, 0.8, 20.0, 8), Material::from_hex(CONCRETE))
                    .at(Vec3::new(0.0, 2.0, 0.0))
                    .rotated(Vec3::new(0.0, 0.0, FRAC_PI_2)),
            );
            self.part(
                jet,
                Entity::with_material(Shape::cuboid(16.0, 0.5, 8.0), Material::from_hex(CONCRETE))
                    .at(Vec3::new(0.0, 2.0, 0.0)),
            );
        }
        self
    }

    /// Parked helicopters with idling main and tail rotors
    pub fn add_helicopters(mut self) -> Self {
        for (n, (x, z)) in [(-50.0, -40.0), (50.0, 40.0)].into_iter().enumerate() {
            let heli = self.ground_group(&format!("helicopter_{n}"), "aircraft", x, z, 0.0);
            let rotor_material = Material::from_hex(GUNMETAL);

            self.part(
                heli,
                Entity::with_material(Shape::capsule(2.0, 8.0, 8), Material::from_hex(OLIVE_DRAB))
                    .at(Vec3::new(0.0, 3.0, 0.0))
                    .rotated(Vec3::new(0.0, 0.0, FRAC_PI_2)),
            );
            let rotor = self.part(
                heli,
                Entity::with_material(Shape::cuboid(0.2, 0.2, 16.0), rotor_material)
                    .with_name(format!("helicopter_{n}_rotor"))
                    .at(Vec3::new(0.0, 6.0, 0.0)),
            );
            let tail_rotor = self.part(
                heli,
                Entity::with_material(Shape::cuboid(3.0, 0.1, 0.1), rotor_material)
                    .with_name(format!("helicopter_{n}_tail_rotor"))
                    .at(Vec3::new(-6.0, 4.0, 0.0)),
            );

            self.spin(rotor, Axis::Y, 10.0);
            self.spin(tail_rotor, Axis::X, 15.0);
        }
        self
    }

    // --- Ground vehicles ---

    pub fn add_trucks(mut self) -> Self {
        let positions = [(20.0, 50.0), (30.0, 50.0), (40.0, 50.0), (-20.0, -50.0), (-30.0, -50.0)];
        for (n, (x, z)) in positions.into_iter().enumerate() {
            let truck = self.ground_group(&format!("truck_{n}"), "vehicle", x, z, 0.0);
            self.part(
                truck,
                Entity::with_material(Shape::cuboid(4.0, 4.0, 6.0), Material::from_hex(OLIVE_DRAB))
                    .at(Vec3::new(0.0, 2.0, 3.0)),
            );
            self.part(
                truck,
                Entity::with_material(Shape::cuboid(4.0, 3.0, 10.0), Material::from_hex(0x4a5d23))
                    .at(Vec3::new(0.0, 1.5, -5.0)),
            );
            for i in 0..6 {
                let x = if i % 2 == 0 { -2.5 } else { 2.5 };
                let z = match i {
                    0 | 1 => 2.0,
                    2 | 3 => -2.0,
                    _ => -8.0,
                };
                self.part(
                    truck,
                    Entity::with_material(Shape::cylinder(1.0, 1.0, 0.8, 8), Material::from_hex(GUNMETAL))
                        .at(Vec3::new(x, 1.0, z))
                        .rotated(Vec3::new(0.0, 0.0, FRAC_PI_2)),
                );
            }
        }
        self
    }

    pub fn add_armored_vehicles(mut self) -> Self {
        for (n, (x, z)) in [(-35.0, 15.0), (35.0, -15.0)].into_iter().enumerate() {
            let apc = self.ground_group(&format!("armored_{n}"), "vehicle", x, z, 0.0);
            let hull = Material::from_hex(OLIVE_DRAB);
            self.part(apc, Entity::with_material(Shape::cuboid(6.0, 3.0, 12.0), hull).at(Vec3::new(0.0, 2.0, 0.0)));
            self.part(apc, Entity::with_material(Shape::cylinder(1.5, 1.5, 1.0, 8), hull).at(Vec3::new(0.0, 4.0, 0.0)));
            self.part(
                apc,
                Entity::with_material(Shape::cylinder(0.2, 0.2, 6.0, 8), Material::from_hex(GUNMETAL))
                    .at(Vec3::new(3.0, 4.0, 0.0))
                    .rotated(Vec3::new(0.0, 0.0, FRAC_PI_2)),
            );
            for i in 0..8 {
                let x = if i % 2 == 0 { -3.5 } else { 3.5 };
                let z = -4.0 + (i / 2) as f32 * 2.5;
                self.part(
                    apc,
                    Entity::with_material(Shape::cylinder(0.8, 0.8, 0.6, 8), Material::from_hex(GUNMETAL))
                        .at(Vec3::new(x, 0.8, z))
                        .rotated(Vec3::new(0.0, 0.0, FRAC_PI_2)),
                );
            }
        }
        self
    }

    // --- Infantry ---

    /// Soldiers standing in rings, facing their squad's centre
    pub fn add_soldier_squads(mut self) -> Self {
        let squads = [(10.0, 15.0, 8), (-15.0, -10.0, 6), (25.0, -25.0, 10), (-30.0, 20.0, 7), (0.0, -35.0, 12)];
        for (squad, (cx, cz, count)) in squads.into_iter().enumerate() {
            for i in 0..count {
                let uniform = Material::from_hsl(0.25, 0.4, 0.2 + self.random() * 0.1);
                let angle = i as f32 / count as f32 * TAU;
                let radius = 3.0 + self.random() * 4.0;

                let soldier = self.ground_group(
                    &format!("squad_{squad}_soldier_{i}"),
                    "infantry",
                    cx + angle.cos() * radius,
                    cz + angle.sin() * radius,
                    angle + PI,
                );
                self.part(soldier, Entity::with_material(Shape::capsule(0.6, 2.0, 8), uniform).at(Vec3::new(0.0, 1.5, 0.0)));
                self.part(
                    soldier,
                    Entity::with_material(Shape::sphere(0.35, 8, 8), Material::from_hex(0xffdbac))
                        .at(Vec3::new(0.0, 2.8, 0.0)),
                );
                self.part(
                    soldier,
                    Entity::with_material(Shape::sphere(0.4, 8, 8), Material::from_hex(OLIVE_DRAB))
                        .at(Vec3::new(0.0, 2.9, 0.0)),
                );
                self.part(
                    soldier,
                    Entity::with_material(Shape::cuboid(0.1, 0.1, 2.0), Material::from_hex(GUNMETAL))
                        .at(Vec3::new(0.5, 2.0, 0.0))
                        .rotated(Vec3::new(0.0, 0.0, -FRAC_PI_6)),
                );
            }
        }
        self
    }

    // --- Defenses ---

    pub fn add_aa_guns(mut self) -> Self {
        let positions = [(-45.0, -35.0), (45.0, 35.0), (-45.0, 35.0), (45.0, -35.0)];
        for (n, (x, z)) in positions.into_iter().enumerate() {
            let gun = self.ground_group(&format!("aa_gun_{n}"), "defense", x, z, 0.0);
            self.part(
                gun,
                Entity::with_material(Shape::cylinder(3.0, 4.0, 2.0, 8), Material::from_hex(CONCRETE))
                    .at(Vec3::new(0.0, 1.0, 0.0)),
            );
            self.part(
                gun,
                Entity::with_material(Shape::cylinder(0.3, 0.3, 8.0, 8), Material::from_hex(GUNMETAL))
                    .at(Vec3::new(0.0, 3.0, 4.0))
                    .rotated(Vec3::new(-FRAC_PI_4, 0.0, 0.0)),
            );
        }
        self
    }

    pub fn add_missile_launchers(mut self) -> Self {
        for (n, z) in [45.0, -45.0].into_iter().enumerate() {
            let launcher = self.ground_group(&format!("missile_launcher_{n}"), "defense", 0.0, z, 0.0);
            for i in 0..4 {
                self.part(
                    launcher,
                    Entity::with_material(Shape::cylinder(0.3, 0.3, 6.0, 8), Material::from_hex(STEEL))
                        .at(Vec3::new(-1.5 + i as f32, 3.0, 0.0))
                        .rotated(Vec3::new(-FRAC_PI_6, 0.0, 0.0)),
                );
            }
            self.part(
                launcher,
                Entity::with_material(Shape::cuboid(6.0, 2.0, 12.0), Material::from_hex(OLIVE_DRAB))
                    .at(Vec3::new(0.0, 1.0, 0.0)),
            );
        }
        self
    }

    // --- Environment ---

    /// Ring of trees around the perimeter
    pub fn add_trees(mut self) -> Self {
        const TREE_COUNT: usize = 60;
        for i in 0..TREE_COUNT {
            let trunk_height = 8.0 + self.random() * 12.0;
            let trunk_top = 0.8 + self.random() * 0.4;
            let trunk_bottom = 1.2 + self.random() * 0.6;
            let bark = Material::from_hsl(0.1, 0.6, 0.2 + self.random() * 0.2);
            let foliage_size = 4.0 + self.random() * 6.0;
            let leaves = Material::from_hsl(0.3, 0.7, 0.3 + self.random() * 0.3);

            let angle = i as f32 / TREE_COUNT as f32 * TAU;
            let distance = 90.0 + self.random() * 40.0;

            let tree = self.world.add_entity(
                Entity::group()
                    .with_tag("tree")
                    .at(Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance)),
            );
            self.part(
                tree,
                Entity::with_material(Shape::cylinder(trunk_top, trunk_bottom, trunk_height, 8), bark)
                    .at(Vec3::new(0.0, trunk_height / 2.0, 0.0)),
            );
            self.part(
                tree,
                Entity::with_material(Shape::sphere(foliage_size, 8, 6), leaves)
                    .at(Vec3::new(0.0, trunk_height + foliage_size * 0.7, 0.0)),
            );
        }
        self
    }

    /// Grid of jittered supply crates north of the base
    pub fn add_crate_depot(mut self) -> Self {
        for x in (-10..=10).step_by(4) {
            for z in (70..=85).step_by(4) {
                let (w, h, d) = (2.0 + self.random(), 2.0 + self.random(), 2.0 + self.random());
                let wood = Material::from_hsl(0.1, 0.3, 0.4 + self.random() * 0.2);
                let position = Vec3::new(x as f32 + self.random() * 2.0, 1.0, z as f32 + self.random() * 2.0);
                let heading = self.random() * PI;
                self.world.add_entity(
                    Entity::with_material(Shape::cuboid(w, h, d), wood)
                        .with_tag("crate")
                        .at(position)
                        .rotated(Vec3::new(0.0, heading, 0.0)),
                );
            }
        }
        self
    }

    pub fn add_fuel_barrels(mut self) -> Self {
        for (x, z) in [(55.0, 25.0), (58.0, 25.0), (61.0, 25.0), (-55.0, -25.0), (-58.0, -25.0), (-61.0, -25.0)] {
            self.world.add_entity(
                Entity::with_material(Shape::cylinder(1.0, 1.0, 3.0, 12), Material::from_hex(0x8b0000))
                    .with_tag("fuel")
                    .at(Vec3::new(x, 1.5, z)),
            );
        }
        self
    }

    pub fn add_comm_towers(mut self) -> Self {
        for (n, x) in [-90.0, 90.0].into_iter().enumerate() {
            let tower = self.ground_group(&format!("comm_tower_{n}"), "building", x, 0.0, 0.0);
            for i in 0..3 {
                self.part(
                    tower,
                    Entity::with_material(Shape::cuboid(8.0, 0.2, 0.2), Material::from_hex(0x888888))
                        .at(Vec3::new(0.0, 35.0 + i as f32 * 2.0, 0.0))
                        .rotated(Vec3::new(0.0, i as f32 * FRAC_PI_3, 0.0)),
                );
            }
            self.part(
                tower,
                Entity::with_material(Shape::cylinder(0.3, 0.5, 40.0, 8), Material::from_hex(STEEL))
                    .at(Vec3::new(0.0, 20.0, 0.0)),
            );
        }
        self
    }

    // --- Effects ---

    /// Three flickering fires of 100 particles each
    pub fn add_fires(mut self) -> Self {
        const PARTICLES: usize = 100;
        for (n, (x, z)) in [(-25.0, -40.0), (30.0, 35.0), (-50.0, 20.0)].into_iter().enumerate() {
            let mut positions = Vec::with_capacity(PARTICLES * 3);
            let mut colors = Vec::with_capacity(PARTICLES * 3);
            for _ in 0..PARTICLES {
                positions.extend([x + self.centered() * 8.0, self.random() * 15.0, z + self.centered() * 8.0]);
                colors.extend([1.0, 0.3 + self.random() * 0.7, 0.0]);
            }
            let fire = self.world.add_particles(
                ParticleSystem::new(positions, colors)
                    .with_name(format!("fire_{n}"))
                    .with_size(1.5)
                    .with_opacity(0.8)
                    .with_additive(true),
            );
            self.animation.push(AnimatedEntity::FireParticles { target: fire });
        }
        self
    }

    /// Haze of 800 rising smoke particles over the whole battlefield
    pub fn add_smoke(mut self) -> Self {
        const PARTICLES: usize = 800;
        let mut positions = Vec::with_capacity(PARTICLES * 3);
        let mut colors = Vec::with_capacity(PARTICLES * 3);
        for _ in 0..PARTICLES {
            positions.extend([self.centered() * 300.0, self.random() * 80.0, self.centered() * 300.0]);
            let intensity = 0.2 + self.random() * 0.4;
            colors.extend([intensity * 0.8, intensity * 0.6, intensity * 0.4]);
        }
        let smoke = self.world.add_particles(
            ParticleSystem::new(positions, colors)
                .with_name("smoke")
                .with_size(3.0)
                .with_opacity(0.4)
                .with_additive(true),
        );
        self.animation.push(AnimatedEntity::SmokeParticles { target: smoke });
        self
    }

    /// Add a custom entity to the scene
    ///
    /// For entities that don't fit the standard patterns.
    pub fn add_entity(mut self, entity: Entity) -> Self {
        self.world.add_entity(entity);
        self
    }

    /// Build the scene
    pub fn build(self) -> Scene {
        log::info!(
            "Built scene: {} entities, {} particle systems, {} animations",
            self.world.entity_count(),
            self.world.particle_system_count(),
            self.animation.len()
        );
        Scene {
            world: self.world,
            animation: self.animation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diorama_core::SMOKE_CEILING;

    fn terrain_heights(world: &World) -> Vec<f32> {
        let key = world.find_by_name("terrain").unwrap();
        match &world.get_entity(key).unwrap().shape {
            Some(Shape::Terrain { heights, .. }) => heights.clone(),
            other => panic!("terrain has unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_empty_scene() {
        let scene = SceneBuilder::new(0).build();
        assert!(scene.world.is_empty());
        assert!(scene.animation.is_empty());
    }

    #[test]
    fn test_main_tank_turret_rotates() {
        let scene = SceneBuilder::new(0).add_main_tank().build();
        let turret = scene.world.find_by_name("main_tank_turret").unwrap();

        // Group + body, turret, barrel, 2 tracks, 12 wheels, antenna
        assert_eq!(scene.world.entity_count(), 19);
        assert!(scene.animation.rotation_targets().contains(&turret));
        assert!(scene.world.get_entity(turret).unwrap().has_tag("animated"));
    }

    #[test]
    fn test_full_base_animations() {
        let scene = SceneBuilder::military_base(42);

        // turret + 6 searchlights + radar dish + 2 main rotors + 2 tail rotors
        assert_eq!(scene.animation.rotation_targets().len(), 12);
        // ... plus 3 fires and the smoke
        assert_eq!(scene.animation.len(), 16);
        assert_eq!(scene.world.particle_system_count(), 4);
        assert_eq!(scene.world.point_lights().len(), 3);
    }

    #[test]
    fn test_full_base_counts() {
        let world = SceneBuilder::military_base(42).world;

        assert_eq!(world.find_by_tag("tree").count(), 60);
        assert_eq!(world.find_by_tag("crate").count(), 24);
        assert_eq!(world.find_by_tag("crater").count(), 15);
        assert_eq!(world.find_by_tag("road").count(), 3);
        assert_eq!(world.find_by_tag("infantry").count(), 8 + 6 + 10 + 7 + 12);
        assert_eq!(world.find_by_tag("fuel").count(), 6);
        assert!(world.find_by_name("reference_cube").is_some());
        assert!(world.find_by_name("command_center").is_some());
    }

    #[test]
    fn test_particle_systems() {
        let world = SceneBuilder::new(3).add_fires().add_smoke().build().world;

        let mut fire_particles = 0;
        for (_, system) in world.particle_systems() {
            assert!(system.additive);
            match system.name.as_deref() {
                Some("smoke") => {
                    assert_eq!(system.particle_count(), 800);
                    assert!(system.positions().chunks_exact(3).all(|p| (0.0..=SMOKE_CEILING).contains(&p[1])));
                }
                _ => {
                    assert_eq!(system.particle_count(), 100);
                    assert!(system.colors().chunks_exact(3).all(|c| c[0] == 1.0 && c[2] == 0.0));
                    fire_particles += system.particle_count();
                }
            }
        }
        assert_eq!(fire_particles, 300);
    }

    #[test]
    fn test_same_seed_same_base() {
        let a = SceneBuilder::new(7).add_terrain().build().world;
        let b = SceneBuilder::new(7).add_terrain().build().world;
        let c = SceneBuilder::new(8).add_terrain().build().world;

        assert_eq!(terrain_heights(&a), terrain_heights(&b));
        assert_ne!(terrain_heights(&a), terrain_heights(&c));
    }

    #[test]
    fn test_terrain_height_band() {
        let world = SceneBuilder::new(1).add_terrain().build().world;
        let heights = terrain_heights(&world);

        assert_eq!(heights.len(), 101 * 101);
        // |sin| * 3 + |cos| * 2 + [0, 1.5)
        assert!(heights.iter().all(|h| (-5.0..6.5).contains(h)));
    }
}
