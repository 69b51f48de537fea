//! Entity and Material types
//!
//! An Entity is a node in the diorama: a transform with an optional shape and
//! a material. Entities without a shape act as groups for their children.

use std::collections::HashSet;
use bitflags::bitflags;
use diorama_math::{Axis, Vec3};
use serde::{Serialize, Deserialize};
use crate::{EntityKey, Shape, Transform};

bitflags! {
    /// Flags indicating which parts of an entity have changed and need updating
    ///
    /// Used for dirty tracking to avoid rebuilding all geometry when only
    /// some entities have changed.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct DirtyFlags: u8 {
        /// No changes
        const NONE = 0;
        /// Transform (position, rotation, scale) has changed
        const TRANSFORM = 1 << 0;
        /// Mesh/shape has changed
        const MESH = 1 << 1;
        /// Material has changed
        const MATERIAL = 1 << 2;
        /// All flags set - entity needs full rebuild
        const ALL = Self::TRANSFORM.bits() | Self::MESH.bits() | Self::MATERIAL.bits();
    }
}

/// Convert one sRGB-encoded channel to linear light
fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// A Lambert material with a base color
///
/// Colors are stored in linear space; the `from_hex` and `from_hsl`
/// constructors take sRGB input.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Base color as linear RGBA (each component 0.0-1.0)
    pub base_color: [f32; 4],
}

impl Default for Material {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Material {
    /// Create a new material with the given linear RGBA color
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            base_color: [r, g, b, a],
        }
    }

    /// Create a new opaque material with the given linear RGB color
    pub fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Create an opaque material from a packed sRGB hex color (`0xRRGGBB`)
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
        Self::from_rgb(channel(16), channel(8), channel(0))
    }

    /// Create an opaque material from sRGB hue, saturation and lightness (all 0.0-1.0)
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let h = h.rem_euclid(1.0);
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);

        let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let hue = |mut t: f32| {
            t = t.rem_euclid(1.0);
            if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * 6.0 * (2.0 / 3.0 - t)
            } else {
                p
            }
        };

        Self::from_rgb(
            srgb_to_linear(hue(h + 1.0 / 3.0)),
            srgb_to_linear(hue(h)),
            srgb_to_linear(hue(h - 1.0 / 3.0)),
        )
    }

    /// Return a copy with a different alpha
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.base_color[3] = alpha;
        self
    }

    /// White material
    pub const WHITE: Self = Self { base_color: [1.0, 1.0, 1.0, 1.0] };

    /// Red material
    pub const RED: Self = Self { base_color: [1.0, 0.0, 0.0, 1.0] };
}

/// An entity in the diorama
///
/// Each entity has:
/// - An optional name (for lookup by name)
/// - Tags (for categorization and filtering)
/// - A transform relative to its parent
/// - An optional shape (groups have none)
/// - A material
/// - An optional parent entity
/// - Dirty flags (for change tracking)
#[derive(Clone, Debug)]
pub struct Entity {
    /// Optional name for this entity (for lookup)
    pub name: Option<String>,
    /// Tags for categorization (e.g., "vehicle", "building", "animated")
    pub tags: HashSet<String>,
    /// The entity's transform relative to its parent
    pub transform: Transform,
    /// The entity's shape, `None` for pure groups
    pub shape: Option<Shape>,
    /// The entity's material
    pub material: Material,
    /// Parent entity, if any
    pub parent: Option<EntityKey>,
    /// Dirty flags for change tracking (what needs rebuilding)
    dirty: DirtyFlags,
}

impl Entity {
    /// Create a new entity with the given shape
    pub fn new(shape: Shape) -> Self {
        Self {
            name: None,
            tags: HashSet::new(),
            transform: Transform::identity(),
            shape: Some(shape),
            material: Material::default(),
            parent: None,
            dirty: DirtyFlags::ALL, // New entities are dirty
        }
    }

    /// Create a new entity with shape and material
    pub fn with_material(shape: Shape, material: Material) -> Self {
        Self {
            material,
            ..Self::new(shape)
        }
    }

    /// Create an empty group entity (no geometry of its own)
    pub fn group() -> Self {
        Self {
            name: None,
            tags: HashSet::new(),
            transform: Transform::identity(),
            shape: None,
            material: Material::default(),
            parent: None,
            dirty: DirtyFlags::ALL,
        }
    }

    /// Set the name of this entity (for lookup)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a tag to this entity
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Check if this entity has a specific tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Set the position relative to the parent
    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    /// Set the Euler rotation relative to the parent
    pub fn rotated(mut self, rotation: Vec3) -> Self {
        self.transform.rotation = rotation;
        self
    }

    /// Attach this entity to a parent
    pub fn with_parent(mut self, parent: EntityKey) -> Self {
        self.parent = Some(parent);
        self
    }

    // --- Dirty tracking methods ---

    /// Check if this entity has any dirty flags set
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Get the current dirty flags
    #[inline]
    pub fn dirty_flags(&self) -> DirtyFlags {
        self.dirty
    }

    /// Mark this entity as dirty with the given flags
    #[inline]
    pub fn mark_dirty(&mut self, flags: DirtyFlags) {
        self.dirty |= flags;
    }

    /// Clear all dirty flags
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = DirtyFlags::NONE;
    }

    /// Add to the rotation about one axis and mark the transform as dirty
    pub fn rotate_about(&mut self, axis: Axis, delta: f32) {
        self.transform.rotate_about(axis, delta);
        self.mark_dirty(DirtyFlags::TRANSFORM);
    }

    /// Set the transform and mark it as dirty
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.mark_dirty(DirtyFlags::TRANSFORM);
    }

    /// Set the material and mark it as dirty
    pub fn set_material(&mut self, material: Material) {
        self.material = material;
        self.mark_dirty(DirtyFlags::MATERIAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color_approx_eq(a: [f32; 4], b: [f32; 4]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 0.001)
    }

    #[test]
    fn test_material_default() {
        let m = Material::default();
        assert_eq!(m.base_color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_material_from_hex() {
        assert!(color_approx_eq(Material::from_hex(0xff0000).base_color, [1.0, 0.0, 0.0, 1.0]));
        assert!(color_approx_eq(Material::from_hex(0xffffff).base_color, [1.0, 1.0, 1.0, 1.0]));
        // sRGB mid grey is ~0.216 in linear light
        let grey = Material::from_hex(0x808080).base_color;
        assert!((grey[0] - 0.2158).abs() < 0.001, "got {:?}", grey);
    }

    #[test]
    fn test_material_from_hsl() {
        // Pure hues at 50% lightness
        assert!(color_approx_eq(Material::from_hsl(0.0, 1.0, 0.5).base_color, [1.0, 0.0, 0.0, 1.0]));
        assert!(color_approx_eq(Material::from_hsl(1.0 / 3.0, 1.0, 0.5).base_color, [0.0, 1.0, 0.0, 1.0]));
        // Zero saturation is grey
        let grey = Material::from_hsl(0.7, 0.0, 0.5).base_color;
        assert!((grey[0] - grey[1]).abs() < 1e-6 && (grey[1] - grey[2]).abs() < 1e-6);
    }

    #[test]
    fn test_material_with_alpha() {
        let m = Material::from_hex(0x228b22).with_alpha(0.9);
        assert_eq!(m.base_color[3], 0.9);
    }

    #[test]
    fn test_group_has_no_shape() {
        let group = Entity::group().with_name("tank");
        assert!(group.shape.is_none());
        assert_eq!(group.name.as_deref(), Some("tank"));
    }

    #[test]
    fn test_entity_builders() {
        let entity = Entity::with_material(Shape::cuboid(1.0, 1.0, 1.0), Material::RED)
            .with_tag("vehicle")
            .at(Vec3::new(1.0, 2.0, 3.0))
            .rotated(Vec3::new(0.0, 0.5, 0.0));

        assert!(entity.has_tag("vehicle"));
        assert!(!entity.has_tag("building"));
        assert_eq!(entity.transform.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(entity.transform.rotation.y, 0.5);
        assert_eq!(entity.material, Material::RED);
    }

    // --- Dirty tracking tests ---

    #[test]
    fn test_dirty_flags_all() {
        let flags = DirtyFlags::ALL;
        assert!(flags.contains(DirtyFlags::TRANSFORM));
        assert!(flags.contains(DirtyFlags::MESH));
        assert!(flags.contains(DirtyFlags::MATERIAL));
    }

    #[test]
    fn test_new_entity_is_dirty() {
        let entity = Entity::new(Shape::cuboid(1.0, 1.0, 1.0));
        assert!(entity.is_dirty());
        assert_eq!(entity.dirty_flags(), DirtyFlags::ALL);
    }

    #[test]
    fn test_rotate_about_marks_dirty() {
        let mut entity = Entity::new(Shape::cuboid(1.0, 1.0, 1.0));
        entity.clear_dirty();

        entity.rotate_about(Axis::X, 0.15);

        assert!(entity.dirty_flags().contains(DirtyFlags::TRANSFORM));
        assert!(!entity.dirty_flags().contains(DirtyFlags::MATERIAL));
        assert_eq!(entity.transform.rotation.x, 0.15);
    }

    #[test]
    fn test_set_material_marks_dirty() {
        let mut entity = Entity::new(Shape::cuboid(1.0, 1.0, 1.0));
        entity.clear_dirty();

        entity.set_material(Material::RED);

        assert!(entity.dirty_flags().contains(DirtyFlags::MATERIAL));
        assert!(!entity.dirty_flags().contains(DirtyFlags::TRANSFORM));
    }

    #[test]
    fn test_set_transform_marks_dirty() {
        let mut entity = Entity::new(Shape::cuboid(1.0, 1.0, 1.0));
        entity.clear_dirty();

        entity.set_transform(Transform::from_position(Vec3::new(5.0, 6.0, 7.0)));

        assert!(entity.is_dirty());
        assert_eq!(entity.transform.position.x, 5.0);
    }
}
