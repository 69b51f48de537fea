//! Core types for the diorama viewer
//!
//! This crate provides the scene model and the per-frame animation:
//!
//! - [`Transform`] - Position, Euler rotation, and scale
//! - [`Material`] - Lambert base color
//! - [`Shape`] / [`MeshData`] - Primitive shapes and their triangle meshes
//! - [`Entity`] - A node with transform, optional shape, and material
//! - [`ParticleSystem`] - Flat point-particle buffers
//! - [`World`] - Container for entities, particle systems and lights
//! - [`AnimationUpdater`] - Advances rotating parts and particle effects each frame

mod transform;
mod entity;
mod world;
mod shapes;
mod particles;
mod animation;

pub use transform::Transform;
pub use entity::{Material, Entity, DirtyFlags};
pub use world::{World, EntityKey, ParticleKey, PointLight};
pub use shapes::{Shape, MeshData};
pub use particles::ParticleSystem;
pub use animation::{AnimatedEntity, AnimationUpdater, FrameUpdate, REFERENCE_FRAME_RATE, SMOKE_CEILING};

// Re-export commonly used types from diorama_math for convenience
pub use diorama_math::{Axis, Vec3};
