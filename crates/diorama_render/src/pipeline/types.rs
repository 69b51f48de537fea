//! GPU-compatible data types for the mesh and particle passes
//!
//! These types are designed to match the shader layouts exactly.
//! All types derive Pod and Zeroable for safe GPU buffer operations.

use bytemuck::{Pod, Zeroable};
use diorama_math::mat4;

/// Point lights the mesh shader evaluates
pub const MAX_POINT_LIGHTS: usize = 4;

/// A world-space mesh vertex
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    /// Position in world space
    pub position: [f32; 3],
    /// Unit surface normal in world space
    pub normal: [f32; 3],
    /// Linear RGBA color
    pub color: [f32; 4],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, normal, color }
    }
}

impl Default for MeshVertex {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            normal: [0.0, 1.0, 0.0],
            color: [1.0; 4],
        }
    }
}

/// One particle, expanded to a camera-facing quad in the vertex shader
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    /// Center in world space
    pub position: [f32; 3],
    /// Quad edge length in world units
    pub size: f32,
    /// Linear RGB plus the system opacity
    pub color: [f32; 4],
}

/// Point light as laid out in the uniform buffer (32 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuPointLight {
    pub position: [f32; 3],
    /// Distance at which the light has faded out
    pub range: f32,
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Uniforms for the mesh pass
/// Layout: 272 bytes total (must match mesh.wgsl MeshUniforms)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MeshUniforms {
    /// Projection * view (64 bytes)
    pub view_proj: [[f32; 4]; 4],
    /// Camera position + padding (16 bytes)
    pub camera_position: [f32; 3],
    pub _padding: f32,
    /// Direction towards the sun (normalized) + ambient strength (16 bytes)
    pub light_dir: [f32; 3],
    pub ambient_strength: f32,
    /// Sun color + diffuse strength (16 bytes)
    pub light_color: [f32; 3],
    pub diffuse_strength: f32,
    /// Fog color + fog start distance (16 bytes)
    pub fog_color: [f32; 3],
    pub fog_near: f32,
    /// Fog end distance, active point lights + padding (16 bytes)
    pub fog_far: f32,
    pub point_light_count: u32,
    pub _padding2: [f32; 2],
    /// Point lights (128 bytes)
    pub point_lights: [GpuPointLight; MAX_POINT_LIGHTS],
}

impl Default for MeshUniforms {
    fn default() -> Self {
        Self {
            view_proj: mat4::IDENTITY,
            camera_position: [0.0; 3],
            _padding: 0.0,
            light_dir: [0.5, 1.0, 0.3],
            ambient_strength: 0.3,
            light_color: [1.0; 3],
            diffuse_strength: 0.7,
            fog_color: [0.53, 0.81, 0.92],
            fog_near: 100.0,
            fog_far: 400.0,
            point_light_count: 0,
            _padding2: [0.0; 2],
            point_lights: [GpuPointLight::default(); MAX_POINT_LIGHTS],
        }
    }
}

/// Uniforms for the particle pass
/// Layout: 128 bytes total (must match particles.wgsl ParticleUniforms)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ParticleUniforms {
    /// Projection * view (64 bytes)
    pub view_proj: [[f32; 4]; 4],
    /// Camera right axis + padding (16 bytes)
    pub camera_right: [f32; 3],
    pub _padding0: f32,
    /// Camera up axis + padding (16 bytes)
    pub camera_up: [f32; 3],
    pub _padding1: f32,
    /// Camera position + fog start distance (16 bytes)
    pub camera_position: [f32; 3],
    pub fog_near: f32,
    /// Fog end distance + padding (16 bytes)
    pub fog_far: f32,
    pub _padding2: [f32; 3],
}

impl Default for ParticleUniforms {
    fn default() -> Self {
        Self {
            view_proj: mat4::IDENTITY,
            camera_right: [1.0, 0.0, 0.0],
            _padding0: 0.0,
            camera_up: [0.0, 1.0, 0.0],
            _padding1: 0.0,
            camera_position: [0.0; 3],
            fog_near: 100.0,
            fog_far: 400.0,
            _padding2: [0.0; 3],
        }
    }
}
