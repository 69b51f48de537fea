//! GPU rendering system
//!
//! Manages GPU rendering including:
//! - Render context and surface
//! - Mesh and particle pipelines
//! - Keeping GPU buffers in step with the animated world
//! - Frame rendering

use std::collections::HashSet;
use std::sync::Arc;

use diorama_core::{EntityKey, FrameUpdate, World};
use diorama_math::Vec3;
use diorama_render::{
    context::{RenderContext, RenderContextError},
    pipeline::{
        GpuMesh, GpuPointLight, MeshPipeline, MeshUniforms, ParticleBatch, ParticlePipeline, ParticleUniforms,
        MAX_POINT_LIGHTS,
    },
    Camera, SceneGeometry,
};
use winit::window::Window;

use crate::config::{CameraConfig, RenderingConfig};

/// Render error types
#[derive(Debug)]
pub enum RenderError {
    /// GPU setup failed
    Context(RenderContextError),
    /// Surface was lost (window resized, minimized, etc.)
    SurfaceLost,
    /// GPU out of memory
    OutOfMemory,
    /// Other surface error
    Other(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::Context(e) => write!(f, "GPU initialization failed: {}", e),
            RenderError::SurfaceLost => write!(f, "Surface lost"),
            RenderError::OutOfMemory => write!(f, "Out of memory"),
            RenderError::Other(msg) => write!(f, "Render error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Context(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for RenderError {
    fn from(e: RenderContextError) -> Self {
        RenderError::Context(e)
    }
}

/// Manages GPU rendering
pub struct RenderSystem {
    context: RenderContext,
    mesh_pipeline: MeshPipeline,
    particle_pipeline: ParticlePipeline,
    camera: Camera,
    geometry: Option<SceneGeometry>,
    static_mesh: Option<GpuMesh>,
    dynamic_mesh: Option<GpuMesh>,
    particles: Vec<ParticleBatch>,
    render_config: RenderingConfig,
}

impl RenderSystem {
    /// Create render system from window and config
    pub fn new(
        window: Arc<Window>,
        render_config: RenderingConfig,
        camera_config: &CameraConfig,
        vsync: bool,
    ) -> Result<Self, RenderError> {
        let context = pollster::block_on(RenderContext::with_vsync(window, vsync))?;

        let mut mesh_pipeline = MeshPipeline::new(&context.device, context.format());
        let particle_pipeline = ParticlePipeline::new(&context.device, context.format());

        // Ensure depth texture exists
        mesh_pipeline.ensure_depth_texture(&context.device, context.size.width, context.size.height);

        let mut camera = Camera::new().with_projection(camera_config.fov, camera_config.near, camera_config.far);
        camera.set_viewport(context.size.width, context.size.height);

        Ok(Self {
            context,
            mesh_pipeline,
            particle_pipeline,
            camera,
            geometry: None,
            static_mesh: None,
            dynamic_mesh: None,
            particles: Vec::new(),
            render_config,
        })
    }

    /// The camera the controller drives
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Handle window resize
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.context.resize(winit::dpi::PhysicalSize::new(width, height));
        self.camera.set_viewport(width, height);
        self.mesh_pipeline.ensure_depth_texture(&self.context.device, width, height);
        log::info!("Resized to {}x{}", width, height);
    }

    /// Reconfigure the surface at its current size
    pub fn recover_surface(&mut self) {
        let size = self.context.size;
        self.context.resize(size);
    }

    /// Upload the whole scene
    ///
    /// Entities under `animated_roots` go into a separate buffer that is
    /// rewritten when their transforms change.
    pub fn upload_scene(&mut self, world: &mut World, animated_roots: &HashSet<EntityKey>) {
        let device = &self.context.device;
        let geometry = SceneGeometry::build(world, animated_roots);

        self.static_mesh = GpuMesh::upload(device, "Static", &geometry.static_geometry);
        self.dynamic_mesh = GpuMesh::upload(device, "Animated", &geometry.dynamic_geometry);

        let size_scale = self.render_config.particle_size_scale;
        self.particles = world
            .particle_systems()
            .filter_map(|(key, system)| ParticleBatch::upload(device, key, system, size_scale))
            .collect();

        log::info!(
            "Uploaded {} static vertices, {} animated vertices, {} particle systems",
            geometry.static_geometry.vertex_count(),
            geometry.dynamic_geometry.vertex_count(),
            self.particles.len()
        );

        self.geometry = Some(geometry);
        clear_dirty(world);
    }

    /// Push the changes reported by an animation tick to the GPU
    pub fn sync(&mut self, world: &mut World, update: &FrameUpdate) {
        if update.transforms_changed {
            if let Some(geometry) = &mut self.geometry {
                if geometry.refresh(world) {
                    let written = self
                        .dynamic_mesh
                        .as_ref()
                        .is_some_and(|mesh| mesh.write_vertices(&self.context.queue, &geometry.dynamic_geometry));
                    if !written {
                        self.dynamic_mesh =
                            GpuMesh::upload(&self.context.device, "Animated", &geometry.dynamic_geometry);
                    }
                }
            }
        }

        let size_scale = self.render_config.particle_size_scale;
        for key in &update.particles {
            let batch = self.particles.iter().find(|b| b.key() == *key);
            if let (Some(batch), Some(system)) = (batch, world.get_particles(*key)) {
                batch.write(&self.context.queue, system, size_scale);
            }
        }

        clear_dirty(world);
    }

    fn mesh_uniforms(&self, world: &World) -> MeshUniforms {
        let light_dir = Vec3::from_array(self.render_config.light_dir).normalized();
        let mut point_lights = [GpuPointLight::default(); MAX_POINT_LIGHTS];
        let lights = world.point_lights();
        for (slot, light) in point_lights.iter_mut().zip(lights) {
            *slot = GpuPointLight {
                position: light.position.to_array(),
                range: light.range,
                color: light.color,
                intensity: light.intensity * self.render_config.point_light_scale,
            };
        }

        MeshUniforms {
            view_proj: self.camera.view_proj(),
            camera_position: self.camera.eye.to_array(),
            light_dir: light_dir.to_array(),
            ambient_strength: self.render_config.ambient_strength,
            light_color: [1.0; 3],
            diffuse_strength: self.render_config.diffuse_strength,
            fog_color: self.render_config.sky_linear(),
            fog_near: self.render_config.fog_near,
            fog_far: self.render_config.fog_far,
            point_light_count: lights.len().min(MAX_POINT_LIGHTS) as u32,
            ..MeshUniforms::default()
        }
    }

    fn particle_uniforms(&self) -> ParticleUniforms {
        let (right, up) = self.camera.billboard_axes();
        ParticleUniforms {
            view_proj: self.camera.view_proj(),
            camera_right: right.to_array(),
            camera_up: up.to_array(),
            camera_position: self.camera.eye.to_array(),
            fog_near: self.render_config.fog_near,
            fog_far: self.render_config.fog_far,
            ..ParticleUniforms::default()
        }
    }

    /// Render a single frame
    pub fn render_frame(&mut self, world: &World) -> Result<(), RenderError> {
        self.mesh_pipeline
            .update_uniforms(&self.context.queue, &self.mesh_uniforms(world));
        self.particle_pipeline
            .update_uniforms(&self.context.queue, &self.particle_uniforms());

        // Get surface texture
        let output = match self.context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => return Err(RenderError::SurfaceLost),
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(e) => return Err(RenderError::Other(format!("{:?}", e))),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = self
            .mesh_pipeline
            .depth_view()
            .ok_or_else(|| RenderError::Other("depth texture not created".to_string()))?;

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let [r, g, b] = self.render_config.sky_linear();
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.mesh_pipeline
                .draw(&mut pass, self.static_mesh.iter().chain(self.dynamic_mesh.iter()));
            self.particle_pipeline.draw(&mut pass, &self.particles);
        }

        // Submit
        self.context.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Get current surface size
    pub fn size(&self) -> (u32, u32) {
        (self.context.size.width, self.context.size.height)
    }
}

/// Mark everything as uploaded
fn clear_dirty(world: &mut World) {
    world.clear_all_dirty();
    let keys: Vec<_> = world.particle_systems().map(|(key, _)| key).collect();
    for key in keys {
        if let Some(system) = world.get_particles_mut(key) {
            system.clear_dirty();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diorama_core::{Entity, ParticleSystem, Shape};

    #[test]
    fn test_render_error_display() {
        assert_eq!(format!("{}", RenderError::SurfaceLost), "Surface lost");
        assert_eq!(format!("{}", RenderError::OutOfMemory), "Out of memory");
        assert_eq!(
            format!("{}", RenderError::Other("test".to_string())),
            "Render error: test"
        );
        assert_eq!(
            format!("{}", RenderError::from(RenderContextError::NoAdapter)),
            "GPU initialization failed: no compatible GPU adapter found"
        );
    }

    #[test]
    fn test_clear_dirty_resets_entities_and_particles() {
        let mut world = World::new();
        world.add_entity(Entity::new(Shape::cuboid(1.0, 1.0, 1.0)));
        let smoke = world.add_particles(ParticleSystem::new(vec![0.0; 3], vec![0.5; 3]));
        assert!(world.has_dirty_entities());
        assert!(world.get_particles(smoke).unwrap().is_dirty());

        clear_dirty(&mut world);

        assert!(!world.has_dirty_entities());
        assert!(!world.get_particles(smoke).unwrap().is_dirty());
    }
}
