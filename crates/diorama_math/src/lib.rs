//! Diorama Mathematics Library
//!
//! Small, dependency-light 3D math for the diorama viewer.
//!
//! ## Core Types
//!
//! - [`Vec3`] - 3D vector with x, y, z components
//! - [`Mat4`] - 4x4 column-major matrix for transforms and projection
//! - [`Axis`] - One of the three principal axes

mod vec3;
pub mod mat4;

pub use vec3::{Axis, Vec3};
pub use mat4::Mat4;
