//! World container for entities, particle systems and lights
//!
//! The World owns everything that makes up the diorama. Entities form a
//! forest through their optional parent links; the world matrix of an entity
//! is the composition of its own transform with every ancestor's.

use std::collections::HashSet;

use diorama_math::{mat4, Mat4, Vec3};
use slotmap::{new_key_type, SlotMap};

use crate::{DirtyFlags, Entity, ParticleSystem};

// Define generational key types for world contents
new_key_type! {
    /// Key to an entity in the world
    ///
    /// Uses generational indexing so a stale key returns None instead of
    /// pointing at an unrelated entity.
    pub struct EntityKey;

    /// Key to a particle system in the world
    pub struct ParticleKey;
}

/// A point light with linear falloff to zero at `range`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    /// Linear RGB color
    pub color: [f32; 3],
    pub intensity: f32,
    pub range: f32,
}

/// The diorama world containing all entities, particle systems and lights
#[derive(Default)]
pub struct World {
    entities: SlotMap<EntityKey, Entity>,
    particles: SlotMap<ParticleKey, ParticleSystem>,
    lights: Vec<PointLight>,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a world with pre-allocated capacity for entities
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entities: SlotMap::with_capacity_and_key(capacity),
            particles: SlotMap::with_key(),
            lights: Vec::new(),
        }
    }

    // --- Entities ---

    /// Add an entity to the world, returning its key
    pub fn add_entity(&mut self, entity: Entity) -> EntityKey {
        self.entities.insert(entity)
    }

    /// Add an entity as a child of `parent`
    pub fn add_child(&mut self, parent: EntityKey, entity: Entity) -> EntityKey {
        self.entities.insert(entity.with_parent(parent))
    }

    /// Get a reference to an entity by key
    pub fn get_entity(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    /// Get a mutable reference to an entity by key
    pub fn get_entity_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(key)
    }

    /// Get the number of entities
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Check if the world has no entities and no particle systems
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.particles.is_empty()
    }

    /// Iterate over keys and entities
    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &Entity)> {
        self.entities.iter()
    }

    /// Iterate over keys and entities mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityKey, &mut Entity)> {
        self.entities.iter_mut()
    }

    /// Find the first entity with the given name
    pub fn find_by_name(&self, name: &str) -> Option<EntityKey> {
        self.entities
            .iter()
            .find(|(_, e)| e.name.as_deref() == Some(name))
            .map(|(key, _)| key)
    }

    /// Iterate over entities carrying a tag
    pub fn find_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = EntityKey> + 'a {
        self.entities
            .iter()
            .filter(move |(_, e)| e.has_tag(tag))
            .map(|(key, _)| key)
    }

    /// Walk from `key` up through its ancestors (including `key` itself).
    ///
    /// Stops at a missing parent, and after `entity_count` steps so a
    /// malformed parent cycle cannot loop forever.
    pub fn ancestors(&self, key: EntityKey) -> impl Iterator<Item = EntityKey> + '_ {
        let mut next = self.entities.contains_key(key).then_some(key);
        let mut remaining = self.entities.len();
        std::iter::from_fn(move || {
            let current = next?;
            if remaining == 0 {
                return None;
            }
            remaining -= 1;
            next = self
                .entities
                .get(current)
                .and_then(|e| e.parent)
                .filter(|p| self.entities.contains_key(*p));
            Some(current)
        })
    }

    /// Local-to-world matrix of an entity, composing the parent chain
    ///
    /// Returns the identity for unknown keys.
    pub fn world_matrix(&self, key: EntityKey) -> Mat4 {
        let mut matrix = mat4::IDENTITY;
        for ancestor in self.ancestors(key) {
            if let Some(entity) = self.entities.get(ancestor) {
                matrix = mat4::mul(entity.transform.to_matrix(), matrix);
            }
        }
        matrix
    }

    /// Whether `key` or any of its ancestors is in `roots`
    pub fn is_under_any(&self, key: EntityKey, roots: &HashSet<EntityKey>) -> bool {
        self.ancestors(key).any(|k| roots.contains(&k))
    }

    /// Whether `key` or any ancestor has a dirty transform
    pub fn has_dirty_transform(&self, key: EntityKey) -> bool {
        self.ancestors(key).any(|k| {
            self.entities
                .get(k)
                .is_some_and(|e| e.dirty_flags().contains(DirtyFlags::TRANSFORM))
        })
    }

    /// Whether any entity has dirty flags set
    pub fn has_dirty_entities(&self) -> bool {
        self.entities.values().any(|e| e.is_dirty())
    }

    /// Clear the dirty flags of every entity
    pub fn clear_all_dirty(&mut self) {
        for entity in self.entities.values_mut() {
            entity.clear_dirty();
        }
    }

    // --- Particle systems ---

    /// Add a particle system, returning its key
    pub fn add_particles(&mut self, system: ParticleSystem) -> ParticleKey {
        self.particles.insert(system)
    }

    /// Get a particle system by key
    pub fn get_particles(&self, key: ParticleKey) -> Option<&ParticleSystem> {
        self.particles.get(key)
    }

    /// Get a mutable particle system by key
    pub fn get_particles_mut(&mut self, key: ParticleKey) -> Option<&mut ParticleSystem> {
        self.particles.get_mut(key)
    }

    /// Iterate over keys and particle systems
    pub fn particle_systems(&self) -> impl Iterator<Item = (ParticleKey, &ParticleSystem)> {
        self.particles.iter()
    }

    /// Number of particle systems
    #[inline]
    pub fn particle_system_count(&self) -> usize {
        self.particles.len()
    }

    // --- Lights ---

    /// Add a point light
    pub fn add_point_light(&mut self, light: PointLight) {
        self.lights.push(light);
    }

    /// All point lights
    pub fn point_lights(&self) -> &[PointLight] {
        &self.lights
    }
}
