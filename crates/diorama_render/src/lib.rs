//! Diorama Rendering Library
//!
//! This crate provides the wgpu-based renderer for the diorama.
//!
//! ## Key Components
//!
//! - [`context::RenderContext`] - WGPU device, queue, and surface management
//! - [`camera::Camera`] - Perspective camera driven by the orbit controller
//! - [`pipeline::MeshPipeline`] - Lit, fogged triangle meshes
//! - [`pipeline::ParticlePipeline`] - Instanced billboard particles
//! - [`renderable::SceneGeometry`] - Converts World/Entity to GPU-ready vertices

pub mod context;
pub mod camera;
pub mod pipeline;
pub mod renderable;

// Re-export core types for convenience
pub use diorama_core::{World, Entity, EntityKey, ParticleKey, Material};

pub use camera::Camera;
pub use renderable::{RenderableGeometry, SceneGeometry};
