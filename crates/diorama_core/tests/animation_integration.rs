//! Integration tests for the world + animation pipeline
//!
//! These tests verify that:
//! 1. Rotating a group part moves its children in world space
//! 2. Dirty flags report exactly what the renderer has to rebuild
//! 3. Fire and smoke systems stay bounded over long sessions

use std::f32::consts::FRAC_PI_2;

use diorama_core::{
    AnimatedEntity, AnimationUpdater, Axis, DirtyFlags, Entity, Material, ParticleSystem, Shape,
    Vec3, World, SMOKE_CEILING,
};
use diorama_math::mat4;

const FRAME: f32 = 1.0 / 60.0;

// ==================== Rotating Parts ====================

/// Turret rotation carries the barrel mounted on it
#[test]
fn test_turret_rotation_moves_child_barrel() {
    let mut world = World::new();
    let tank = world.add_entity(Entity::group().with_name("tank").at(Vec3::new(20.0, 0.0, 0.0)));
    let turret = world.add_child(
        tank,
        Entity::with_material(Shape::cylinder(4.0, 4.0, 2.5, 12), Material::from_hex(0x2d4a2d))
            .at(Vec3::new(0.0, 4.5, 0.0)),
    );
    let barrel = world.add_child(
        turret,
        Entity::new(Shape::cylinder(0.6, 0.6, 16.0, 12))
            .at(Vec3::new(8.0, 0.0, 0.0))
            .rotated(Vec3::new(0.0, 0.0, FRAC_PI_2)),
    );

    let before = mat4::transform_point(world.world_matrix(barrel), Vec3::ZERO);
    assert!(before.approx_eq(Vec3::new(28.0, 4.5, 0.0), 1e-4), "got {:?}", before);

    // Quarter turn about Y: 0.3 rad/s-equivalent steps until 90° is reached
    let mut updater = AnimationUpdater::with_entities(vec![AnimatedEntity::Rotate {
        target: turret,
        axis: Axis::Y,
        angular_speed: 0.3,
    }]);
    let seconds = FRAC_PI_2 / (0.3 * 0.01 * 60.0);
    updater.tick(&mut world, seconds);

    let after = mat4::transform_point(world.world_matrix(barrel), Vec3::ZERO);
    assert!(after.approx_eq(Vec3::new(20.0, 4.5, -8.0), 1e-3), "got {:?}", after);
}

/// Rotation accumulates monotonically and never wraps
#[test]
fn test_rotation_accumulates_without_wrapping() {
    let mut world = World::new();
    let rotor = world.add_entity(Entity::new(Shape::cuboid(0.2, 0.2, 16.0)));
    let mut updater = AnimationUpdater::with_entities(vec![AnimatedEntity::Rotate {
        target: rotor,
        axis: Axis::Y,
        angular_speed: 10.0,
    }]);

    let mut previous = 0.0f32;
    for _ in 0..600 {
        updater.tick(&mut world, FRAME);
        let angle = world.get_entity(rotor).unwrap().transform.rotation.y;
        assert!(angle.abs() >= previous.abs());
        previous = angle;
    }
    // 600 frames * 10 * 0.01 = 60 rad, well past 2π
    assert!((previous - 60.0).abs() < 0.01, "got {}", previous);
}

// ==================== Dirty Tracking ====================

/// Only the animated subtree reports a dirty transform
#[test]
fn test_dirty_flags_limited_to_animated_subtree() {
    let mut world = World::new();
    let tower = world.add_entity(Entity::group());
    let base = world.add_child(tower, Entity::new(Shape::cuboid(6.0, 20.0, 6.0)));
    let light = world.add_child(tower, Entity::new(Shape::cylinder(1.0, 1.5, 2.0, 8)));
    world.clear_all_dirty();

    let mut updater = AnimationUpdater::with_entities(vec![AnimatedEntity::Rotate {
        target: light,
        axis: Axis::Y,
        angular_speed: 0.5,
    }]);
    let update = updater.tick(&mut world, FRAME);

    assert!(update.transforms_changed);
    assert!(world.get_entity(light).unwrap().dirty_flags().contains(DirtyFlags::TRANSFORM));
    assert!(!world.get_entity(base).unwrap().is_dirty());
    assert!(!world.has_dirty_transform(base));

    world.clear_all_dirty();
    assert!(!world.has_dirty_entities());
}

/// Every touched particle system is reported and flagged
#[test]
fn test_particle_systems_reported_dirty() {
    let mut world = World::new();
    let fire = world.add_particles(ParticleSystem::new(vec![0.0, 5.0, 0.0], vec![1.0, 0.5, 0.0]));
    let smoke = world.add_particles(ParticleSystem::new(vec![0.0, 5.0, 0.0], vec![0.2; 3]));
    let idle = world.add_particles(ParticleSystem::new(vec![0.0; 3], vec![0.0; 3]));
    for key in [fire, smoke, idle] {
        world.get_particles_mut(key).unwrap().clear_dirty();
    }

    let mut updater = AnimationUpdater::with_entities(vec![
        AnimatedEntity::FireParticles { target: fire },
        AnimatedEntity::SmokeParticles { target: smoke },
    ]);
    let update = updater.tick(&mut world, FRAME);

    assert_eq!(update.particles.len(), 2);
    assert!(update.particles.contains(&fire));
    assert!(update.particles.contains(&smoke));
    assert!(!update.transforms_changed);
    assert!(world.get_particles(fire).unwrap().is_dirty());
    assert!(world.get_particles(smoke).unwrap().is_dirty());
    assert!(!world.get_particles(idle).unwrap().is_dirty());
}

// ==================== Long Sessions ====================

/// Fire oscillation stays near its base height over many frames
#[test]
fn test_fire_stays_bounded() {
    let mut world = World::new();
    let positions: Vec<f32> = (0..100).flat_map(|i| [i as f32, 7.5, -(i as f32)]).collect();
    let fire = world.add_particles(ParticleSystem::new(positions, vec![1.0; 300]));
    let mut updater = AnimationUpdater::with_entities(vec![AnimatedEntity::FireParticles { target: fire }]);

    for _ in 0..3600 {
        updater.tick(&mut world, FRAME);
    }

    let system = world.get_particles(fire).unwrap();
    for (p, base) in system.positions().chunks_exact(3).zip(system.base_positions().chunks_exact(3)) {
        assert_eq!(p[0], base[0]);
        assert_eq!(p[2], base[2]);
        // Amplitude per frame is 0.1; a phase that keeps drifting in one
        // direction for a whole half period cannot exceed ~20 units
        assert!((p[1] - base[1]).abs() < 20.0, "particle drifted to {}", p[1]);
    }
}

/// Smoke never leaves the [0, ceiling] height band
#[test]
fn test_smoke_height_band() {
    let mut world = World::new();
    let positions: Vec<f32> = (0..800).flat_map(|i| [0.0, (i % 80) as f32, 0.0]).collect();
    let smoke = world.add_particles(ParticleSystem::new(positions, vec![0.3; 2400]));
    let mut updater = AnimationUpdater::with_entities(vec![AnimatedEntity::SmokeParticles { target: smoke }]);

    for _ in 0..200 {
        updater.tick(&mut world, FRAME);
        let system = world.get_particles(smoke).unwrap();
        assert!(system
            .positions()
            .chunks_exact(3)
            .all(|p| (0.0..=SMOKE_CEILING).contains(&p[1])));
    }
}
