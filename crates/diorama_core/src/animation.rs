//! Per-frame animation of rotating parts and particle effects
//!
//! Every step constant below is the displacement for one frame at
//! [`REFERENCE_FRAME_RATE`]. A tick of `elapsed` seconds applies
//! `elapsed * REFERENCE_FRAME_RATE` such steps, so motion speed does not
//! depend on the display refresh rate.

use std::collections::HashSet;

use diorama_math::Axis;

use crate::{EntityKey, ParticleKey, World};

/// Frame rate the step constants are tuned for
pub const REFERENCE_FRAME_RATE: f32 = 60.0;

/// Radians per reference frame per unit of angular speed
const ROTATION_STEP: f32 = 0.01;

const FIRE_FREQUENCY: f64 = 2.0;
const FIRE_AMPLITUDE: f32 = 0.1;

const SMOKE_FREQUENCY_X: f64 = 0.5;
const SMOKE_FREQUENCY_Z: f64 = 0.3;
const SMOKE_DRIFT: f32 = 0.02;
const SMOKE_RISE: f32 = 0.05;

/// Height above which a smoke particle is recycled to the ground
pub const SMOKE_CEILING: f32 = 80.0;

/// One animated thing in the scene
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnimatedEntity {
    /// Spin an entity about one of its local axes
    Rotate {
        target: EntityKey,
        axis: Axis,
        angular_speed: f32,
    },
    /// Flicker particles up and down in place
    FireParticles { target: ParticleKey },
    /// Drift particles sideways while rising, wrapping back to the ground
    SmokeParticles { target: ParticleKey },
}

/// What changed during a tick
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameUpdate {
    /// Particle systems whose position buffers must be re-uploaded
    pub particles: Vec<ParticleKey>,
    /// Whether any entity transform changed
    pub transforms_changed: bool,
}

impl FrameUpdate {
    /// Whether nothing changed
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty() && !self.transforms_changed
    }
}

/// Advances all animated entities once per frame
#[derive(Clone, Debug, Default)]
pub struct AnimationUpdater {
    entities: Vec<AnimatedEntity>,
    /// Seconds of animation time accumulated so far
    clock: f64,
}

impl AnimationUpdater {
    /// Create an updater with no entities
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an updater for the given entities
    pub fn with_entities(entities: Vec<AnimatedEntity>) -> Self {
        Self { entities, clock: 0.0 }
    }

    /// Register another animated entity
    pub fn push(&mut self, entity: AnimatedEntity) {
        self.entities.push(entity);
    }

    /// All registered entities
    pub fn entities(&self) -> &[AnimatedEntity] {
        &self.entities
    }

    /// Number of registered entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entities are registered
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Animation clock in seconds
    pub fn time(&self) -> f64 {
        self.clock
    }

    /// Entities that `Rotate` entries move
    pub fn rotation_targets(&self) -> HashSet<EntityKey> {
        self.entities
            .iter()
            .filter_map(|e| match e {
                AnimatedEntity::Rotate { target, .. } => Some(*target),
                _ => None,
            })
            .collect()
    }

    /// Advance every entity by `elapsed_seconds`
    ///
    /// Negative or non-finite elapsed time counts as zero, in which case
    /// nothing moves and the returned update is empty.
    pub fn tick(&mut self, world: &mut World, elapsed_seconds: f32) -> FrameUpdate {
        let elapsed = if elapsed_seconds.is_finite() { elapsed_seconds.max(0.0) } else { 0.0 };
        let mut update = FrameUpdate::default();
        if elapsed == 0.0 {
            return update;
        }

        self.clock += f64::from(elapsed);
        let frames = elapsed * REFERENCE_FRAME_RATE;
        let t = self.clock;

        for entity in &self.entities {
            match *entity {
                AnimatedEntity::Rotate { target, axis, angular_speed } => {
                    if let Some(e) = world.get_entity_mut(target) {
                        e.rotate_about(axis, angular_speed * ROTATION_STEP * frames);
                        update.transforms_changed = true;
                    }
                }
                AnimatedEntity::FireParticles { target } => {
                    if let Some(system) = world.get_particles_mut(target) {
                        advance_fire(system.positions_mut(), t, frames);
                        update.particles.push(target);
                    }
                }
                AnimatedEntity::SmokeParticles { target } => {
                    if let Some(system) = world.get_particles_mut(target) {
                        advance_smoke(system.positions_mut(), t, frames);
                        update.particles.push(target);
                    }
                }
            }
        }

        update
    }
}

/// Phase of particle with flat buffer index `i` at time `t`
#[inline]
fn phase(t: f64, frequency: f64, i: usize) -> f64 {
    t * frequency + i as f64
}

fn advance_fire(positions: &mut [f32], t: f64, frames: f32) {
    for (n, p) in positions.chunks_exact_mut(3).enumerate() {
        let i = n * 3;
        p[1] += phase(t, FIRE_FREQUENCY, i).sin() as f32 * FIRE_AMPLITUDE * frames;
    }
}

fn advance_smoke(positions: &mut [f32], t: f64, frames: f32) {
    for (n, p) in positions.chunks_exact_mut(3).enumerate() {
        let i = n * 3;
        p[0] += phase(t, SMOKE_FREQUENCY_X, i).sin() as f32 * SMOKE_DRIFT * frames;
        p[1] += SMOKE_RISE * frames;
        p[2] += phase(t, SMOKE_FREQUENCY_Z, i).cos() as f32 * SMOKE_DRIFT * frames;

        // Only height recycles; the horizontal drift is kept
        if p[1] > SMOKE_CEILING {
            p[1] = 0.0;
        }
    }
}
