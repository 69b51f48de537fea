//! 3D Transform (position, rotation, scale)
//!
//! A Transform represents the placement of an entity relative to its parent
//! (or to the world when it has none).

use diorama_math::{mat4, Axis, Mat4, Vec3};
use serde::{Serialize, Deserialize};

/// A 3D transform with position, Euler rotation and per-axis scale
///
/// Rotation angles are radians about X, Y and Z, applied in that intrinsic order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position relative to the parent
    pub position: Vec3,
    /// Euler angles in radians
    pub rotation: Vec3,
    /// Scale factor per axis
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Create an identity transform (no translation, rotation, or scale change)
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    /// Create a transform with just a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Set the Euler rotation
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the per-axis scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Rotation angle about one axis
    #[inline]
    pub fn angle(&self, axis: Axis) -> f32 {
        self.rotation.get(axis)
    }

    /// Add to the rotation angle about one axis
    ///
    /// Angles accumulate without wrapping.
    #[inline]
    pub fn rotate_about(&mut self, axis: Axis, delta: f32) {
        *self.rotation.get_mut(axis) += delta;
    }

    /// Local-to-parent matrix: scale, then rotate, then translate
    pub fn to_matrix(&self) -> Mat4 {
        mat4::from_trs(self.position, self.rotation, self.scale)
    }

    /// Transform a point from local space into parent space
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        mat4::transform_point(self.to_matrix(), point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        a.approx_eq(b, 0.0001)
    }

    #[test]
    fn test_identity() {
        let t = Transform::identity();
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert!(vec_approx_eq(t.transform_point(p), p));
    }

    #[test]
    fn test_translation() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        assert!(vec_approx_eq(t.transform_point(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_transform_order() {
        // X * 2 = (2, 0, 0), rotated 90° about Z = (0, 2, 0), + (10, 0, 0) = (10, 2, 0)
        let t = Transform::from_position(Vec3::new(10.0, 0.0, 0.0))
            .with_rotation(Vec3::new(0.0, 0.0, FRAC_PI_2))
            .with_scale(Vec3::new(2.0, 2.0, 2.0));
        let transformed = t.transform_point(Vec3::X);
        assert!(vec_approx_eq(transformed, Vec3::new(10.0, 2.0, 0.0)),
            "Expected (10, 2, 0), got {:?}", transformed);
    }

    #[test]
    fn test_rotate_about_accumulates() {
        let mut t = Transform::identity();
        t.rotate_about(Axis::Y, 4.0);
        t.rotate_about(Axis::Y, 4.0);
        assert_eq!(t.angle(Axis::Y), 8.0);
        assert_eq!(t.angle(Axis::X), 0.0);
    }

    #[test]
    fn test_default() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.scale, Vec3::ONE);
    }
}
