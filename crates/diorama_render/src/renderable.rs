//! Renderable geometry - bridges World/Entity to GPU buffers
//!
//! Entity shapes are tessellated in local space and baked into world space
//! on the CPU. The scene is split in two: static geometry that is uploaded
//! once, and the geometry under animated entities, which is re-baked only
//! when one of their transforms changed.

use std::collections::HashSet;

use diorama_core::{Entity, EntityKey, MeshData, World};
use diorama_math::{mat4, Mat4};

use crate::pipeline::MeshVertex;

/// GPU-ready triangle geometry in world space
#[derive(Clone, Debug, Default)]
pub struct RenderableGeometry {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl RenderableGeometry {
    /// Create an empty renderable geometry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create renderable geometry with pre-allocated capacity
    pub fn with_capacity(vertex_capacity: usize, index_capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_capacity),
            indices: Vec::with_capacity(index_capacity),
        }
    }

    /// Collect geometry from every entity in a world
    pub fn from_world(world: &World) -> Self {
        Self::from_world_filtered(world, |_| true)
    }

    /// Collect geometry from the entities `include` accepts
    pub fn from_world_filtered(world: &World, mut include: impl FnMut(EntityKey) -> bool) -> Self {
        let mut result = Self::new();
        for (key, entity) in world.iter() {
            if !include(key) {
                continue;
            }
            if let Some(shape) = &entity.shape {
                result.add_mesh(&shape.mesh(), world.world_matrix(key), entity);
            }
        }
        result
    }

    /// Add a local-space mesh, transformed by `matrix` and colored by the entity's material
    pub fn add_mesh(&mut self, mesh: &MeshData, matrix: Mat4, entity: &Entity) {
        let offset = self.vertices.len() as u32;
        let color = entity.material.base_color;

        self.vertices.extend(mesh.positions.iter().zip(&mesh.normals).map(|(p, n)| {
            MeshVertex::new(
                mat4::transform_point(matrix, *p).to_array(),
                mat4::transform_normal(matrix, *n).to_array(),
                color,
            )
        }));
        self.indices.extend(mesh.indices.iter().map(|i| i + offset));
    }

    /// Clear all geometry
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Scene geometry split into a static part and an animated part
pub struct SceneGeometry {
    pub static_geometry: RenderableGeometry,
    pub dynamic_geometry: RenderableGeometry,
    /// Local meshes of the animated entities, tessellated once
    dynamic_meshes: Vec<(EntityKey, MeshData)>,
}

impl SceneGeometry {
    /// Split the world by whether an entity sits under one of `animated_roots`
    pub fn build(world: &World, animated_roots: &HashSet<EntityKey>) -> Self {
        let static_geometry =
            RenderableGeometry::from_world_filtered(world, |key| !world.is_under_any(key, animated_roots));

        let dynamic_meshes: Vec<(EntityKey, MeshData)> = world
            .iter()
            .filter(|(key, _)| world.is_under_any(*key, animated_roots))
            .filter_map(|(key, entity)| entity.shape.as_ref().map(|shape| (key, shape.mesh())))
            .collect();

        let mut geometry = Self {
            static_geometry,
            dynamic_geometry: RenderableGeometry::new(),
            dynamic_meshes,
        };
        geometry.rebuild_dynamic(world);

        log::debug!(
            "Scene geometry: {} static vertices, {} animated vertices",
            geometry.static_geometry.vertex_count(),
            geometry.dynamic_geometry.vertex_count()
        );
        geometry
    }

    /// Re-bake the animated geometry from the current transforms
    pub fn rebuild_dynamic(&mut self, world: &World) {
        self.dynamic_geometry.clear();
        for (key, mesh) in &self.dynamic_meshes {
            if let Some(entity) = world.get_entity(*key) {
                self.dynamic_geometry.add_mesh(mesh, world.world_matrix(*key), entity);
            }
        }
    }

    /// Re-bake the animated geometry if any animated transform is dirty
    ///
    /// Returns whether the geometry changed.
    pub fn refresh(&mut self, world: &World) -> bool {
        let dirty = self.dynamic_meshes.iter().any(|(key, _)| world.has_dirty_transform(*key));
        if dirty {
            self.rebuild_dynamic(world);
        }
        dirty
    }

    /// Number of animated entities with a shape
    pub fn dynamic_entity_count(&self) -> usize {
        self.dynamic_meshes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diorama_core::{Axis, Material, Shape, Vec3};

    fn make_test_entity() -> Entity {
        Entity::with_material(Shape::cuboid(2.0, 2.0, 2.0), Material::new(1.0, 0.5, 0.25, 1.0))
    }

    #[test]
    fn test_renderable_geometry_new() {
        let geom = RenderableGeometry::new();
        assert_eq!(geom.vertex_count(), 0);
        assert!(geom.is_empty());
    }

    #[test]
    fn test_renderable_geometry_from_world() {
        let mut world = World::new();
        world.add_entity(make_test_entity());
        world.add_entity(make_test_entity());
        // Groups contribute nothing
        world.add_entity(Entity::group());

        let geom = RenderableGeometry::from_world(&world);
        let per_box = Shape::cuboid(2.0, 2.0, 2.0).mesh();

        assert_eq!(geom.vertex_count(), 2 * per_box.vertex_count());
        assert_eq!(geom.index_count(), 2 * per_box.indices.len());
        for v in &geom.vertices {
            assert_eq!(v.color, [1.0, 0.5, 0.25, 1.0]);
        }
    }

    #[test]
    fn test_indices_offset_per_entity() {
        let mut world = World::new();
        world.add_entity(make_test_entity());
        world.add_entity(make_test_entity());

        let geom = RenderableGeometry::from_world(&world);
        let max = *geom.indices.iter().max().unwrap();
        assert_eq!(max as usize, geom.vertex_count() - 1);
    }

    #[test]
    fn test_transform_applied() {
        let mut world = World::new();
        let group = world.add_entity(Entity::group().at(Vec3::new(10.0, 0.0, 0.0)));
        world.add_child(group, make_test_entity().at(Vec3::new(0.0, 5.0, 0.0)));

        let geom = RenderableGeometry::from_world(&world);
        for v in &geom.vertices {
            assert!((v.position[0] - 10.0).abs() <= 1.0 + 1e-5);
            assert!((v.position[1] - 5.0).abs() <= 1.0 + 1e-5);
        }
    }

    #[test]
    fn test_split_static_and_dynamic() {
        let mut world = World::new();
        let tank = world.add_entity(Entity::group());
        world.add_child(tank, make_test_entity());
        let turret = world.add_child(tank, make_test_entity());
        world.add_child(turret, make_test_entity());

        let roots: HashSet<_> = [turret].into_iter().collect();
        let scene = SceneGeometry::build(&world, &roots);
        let per_box = Shape::cuboid(2.0, 2.0, 2.0).mesh().vertex_count();

        assert_eq!(scene.static_geometry.vertex_count(), per_box);
        assert_eq!(scene.dynamic_geometry.vertex_count(), 2 * per_box);
        assert_eq!(scene.dynamic_entity_count(), 2);
    }

    #[test]
    fn test_refresh_only_when_dirty() {
        let mut world = World::new();
        let spinner = world.add_entity(make_test_entity().at(Vec3::new(5.0, 0.0, 0.0)));
        let roots: HashSet<_> = [spinner].into_iter().collect();
        let mut scene = SceneGeometry::build(&world, &roots);
        world.clear_all_dirty();

        assert!(!scene.refresh(&world));

        let before = scene.dynamic_geometry.vertices.clone();
        world.get_entity_mut(spinner).unwrap().rotate_about(Axis::Y, 0.5);
        assert!(scene.refresh(&world));
        assert_ne!(scene.dynamic_geometry.vertices, before);
        assert_eq!(scene.dynamic_geometry.vertex_count(), before.len());
    }
}
