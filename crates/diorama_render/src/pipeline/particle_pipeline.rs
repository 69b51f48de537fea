//! Particle pipeline for fire and smoke
//!
//! Each particle is an instance; the vertex shader expands it into a
//! camera-facing quad. Particles are depth-tested against the meshes but do
//! not write depth, so overlapping sprites blend instead of occluding.

use diorama_core::{ParticleKey, ParticleSystem};
use wgpu::util::DeviceExt;

use super::mesh_pipeline::DEPTH_FORMAT;
use super::types::{ParticleInstance, ParticleUniforms};

/// Build the instance data for a particle system
///
/// `size_scale` converts the system's point size into world units.
pub fn particle_instances(system: &ParticleSystem, size_scale: f32) -> Vec<ParticleInstance> {
    let size = system.size * size_scale;
    system
        .positions()
        .chunks_exact(3)
        .zip(system.colors().chunks_exact(3))
        .map(|(p, c)| ParticleInstance {
            position: [p[0], p[1], p[2]],
            size,
            color: [c[0], c[1], c[2], system.opacity],
        })
        .collect()
}

/// Instance buffer for one particle system
pub struct ParticleBatch {
    key: ParticleKey,
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
    additive: bool,
}

impl ParticleBatch {
    /// Upload a particle system, returning `None` when it has no particles
    pub fn upload(
        device: &wgpu::Device,
        key: ParticleKey,
        system: &ParticleSystem,
        size_scale: f32,
    ) -> Option<Self> {
        let instances = particle_instances(system, size_scale);
        if instances.is_empty() {
            return None;
        }

        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(system.name.as_deref().unwrap_or("Particle Instance Buffer")),
            contents: bytemuck::cast_slice(&instances),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Some(Self {
            key,
            instance_buffer,
            instance_count: instances.len() as u32,
            additive: system.additive,
        })
    }

    /// Re-write the instance buffer from the system's current positions
    pub fn write(&self, queue: &wgpu::Queue, system: &ParticleSystem, size_scale: f32) {
        let instances = particle_instances(system, size_scale);
        let count = instances.len().min(self.instance_count as usize);
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances[..count]));
    }

    #[inline]
    pub fn key(&self) -> ParticleKey {
        self.key
    }

    #[inline]
    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }
}

/// Render pipelines for billboarded particles
///
/// Holds an additive and an alpha-blended variant sharing one layout.
#[allow(dead_code)] // bind_group_layout needed for potential future bind group recreation
pub struct ParticlePipeline {
    additive: wgpu::RenderPipeline,
    alpha: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl ParticlePipeline {
    /// Create the particle pipelines
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/particles.wgsl").into()),
        });

        let additive_blend = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::Zero,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        };

        let create = |label: &str, blend: wgpu::BlendState| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Self::instance_buffer_layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(blend),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: false,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            })
        };

        let additive = create("Particle Pipeline (additive)", additive_blend);
        let alpha = create("Particle Pipeline (alpha)", wgpu::BlendState::ALPHA_BLENDING);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Uniform Buffer"),
            contents: bytemuck::bytes_of(&ParticleUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            additive,
            alpha,
            bind_group_layout,
            uniform_buffer,
            bind_group,
        }
    }

    /// Get the per-instance buffer layout for ParticleInstance
    fn instance_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ParticleInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                // position: vec3<f32>
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                // size: f32
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32,
                    offset: 12,
                    shader_location: 1,
                },
                // color: vec4<f32>
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: 16,
                    shader_location: 2,
                },
            ],
        }
    }

    /// Update uniforms
    pub fn update_uniforms(&self, queue: &wgpu::Queue, uniforms: &ParticleUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Record one instanced draw per batch into an open render pass
    pub fn draw<'a>(&self, pass: &mut wgpu::RenderPass<'_>, batches: impl IntoIterator<Item = &'a ParticleBatch>) {
        pass.set_bind_group(0, &self.bind_group, &[]);
        for batch in batches {
            let pipeline = if batch.additive { &self.additive } else { &self.alpha };
            pass.set_pipeline(pipeline);
            pass.set_vertex_buffer(0, batch.instance_buffer.slice(..));
            pass.draw(0..6, 0..batch.instance_count);
        }
    }
}
