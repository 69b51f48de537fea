//! Rendering pipeline components
//!
//! A mesh pass for the solid scene followed by a particle pass for fire and
//! smoke, both sharing one depth buffer.

pub mod types;
pub mod mesh_pipeline;
pub mod particle_pipeline;

// Re-export types
pub use types::{
    MeshVertex, ParticleInstance, GpuPointLight, MeshUniforms, ParticleUniforms, MAX_POINT_LIGHTS,
};

// Re-export pipelines
pub use mesh_pipeline::{MeshPipeline, GpuMesh, DEPTH_FORMAT};
pub use particle_pipeline::{ParticlePipeline, ParticleBatch, particle_instances};
