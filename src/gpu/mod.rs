//! GPU renderer: instanced particle spheres with bloom.
//!
//! Each frame the host uploads the kernel's packed positions with
//! [`GpuState::upload_positions`] and calls [`GpuState::render`]. The sphere
//! mesh is drawn once per particle into an HDR scene target, then the bloom
//! chain composites the result onto the window surface.

pub mod camera;
#[cfg(feature = "egui")]
pub mod egui_integration;
mod post_process;
pub mod sphere;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::config::VisualizerConfig;
use crate::error::GpuError;
use crate::params::Params;
pub use camera::Camera;
pub use post_process::HDR_FORMAT;
use post_process::PostProcessState;
use sphere::SphereMesh;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Particle sphere shader.
pub const PARTICLE_SHADER: &str = include_str!("shaders/particles.wgsl");
/// Bright pass and separable blur.
pub const BLOOM_SHADER: &str = include_str!("shaders/bloom.wgsl");
/// Scene + glow composite.
pub const COMPOSITE_SHADER: &str = include_str!("shaders/composite.wgsl");

/// Bytes per particle in the instance buffer.
const INSTANCE_STRIDE: wgpu::BufferAddress =
    (3 * std::mem::size_of::<f32>()) as wgpu::BufferAddress;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    particle_size: f32,
    opacity: f32,
    _padding: [f32; 2],
}

/// Window surface, device and every resource needed to draw a frame.
pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    render_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_buffer: wgpu::Buffer,
    instance_capacity: u32,
    instance_count: u32,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    post_process: PostProcessState,
    pub camera: Camera,
}

impl GpuState {
    /// Create the surface for `window` and every pipeline.
    pub async fn new(window: Arc<Window>, settings: &VisualizerConfig) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(GpuError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let mesh = SphereMesh::default();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_capacity = settings.params.particle_count.max(1);
        let instance_buffer = create_instance_buffer(&device, instance_capacity);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::bytes_of(&Uniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let render_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(PARTICLE_SHADER.into()),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Particle Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                push_constant_ranges: &[],
            });

        let instance_attributes = wgpu::vertex_attr_array![1 => Float32x3];

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &render_shader,
                entry_point: Some("vs_main"),
                buffers: &[
                    SphereMesh::vertex_layout(),
                    wgpu::VertexBufferLayout {
                        array_stride: INSTANCE_STRIDE,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &instance_attributes,
                    },
                ],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &render_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: HDR_FORMAT,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let post_process = PostProcessState::new(
            &device,
            settings.bloom,
            config.width,
            config.height,
            config.format,
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            render_pipeline,
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count(),
            instance_buffer,
            instance_capacity,
            instance_count: 0,
            uniform_buffer,
            uniform_bind_group,
            post_process,
            camera: Camera::from_config(&settings.camera),
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Reconfigure the surface and recreate size-dependent targets.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.post_process.resize(&self.device, new_size.width, new_size.height);
        }
    }

    /// Reconfigure the surface at its current size, after it was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    /// Copy packed `[x, y, z]` positions into the instance buffer.
    ///
    /// The buffer is reallocated when the particle count outgrows it.
    pub fn upload_positions(&mut self, bytes: &[u8]) {
        let (count, grow_to) = instance_growth(self.instance_capacity, bytes.len());
        if let Some(capacity) = grow_to {
            log::debug!(
                "growing instance buffer from {} to {} particles",
                self.instance_capacity,
                capacity
            );
            self.instance_buffer = create_instance_buffer(&self.device, capacity);
            self.instance_capacity = capacity;
        }
        if count > 0 {
            self.queue.write_buffer(&self.instance_buffer, 0, bytes);
        }
        self.instance_count = count;
    }

    fn update_uniforms(&mut self, params: &Params) {
        let uniforms = Uniforms {
            view_proj: self.camera.view_proj(self.aspect()).to_cols_array_2d(),
            particle_size: params.particle_size,
            opacity: params.opacity,
            _padding: [0.0; 2],
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        self.post_process.set_strength(params.brightness);
        self.post_process.write_uniforms(&self.queue);
    }

    /// Draw one frame.
    ///
    /// `overlay` runs after the bloom composite with the surface view as its
    /// target, so UI drawn there is not affected by bloom.
    pub fn render<F>(&mut self, params: &Params, overlay: F) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        self.update_uniforms(params);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Particle Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.post_process.scene_view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.post_process.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if self.instance_count > 0 {
                render_pass.set_pipeline(&self.render_pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                render_pass
                    .set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..self.index_count, 0, 0..self.instance_count);
            }
        }

        self.post_process.encode(&mut encoder, &view);

        overlay(&self.device, &self.queue, &mut encoder, &view);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

/// Instances held by `byte_len` bytes of packed positions, plus the new
/// buffer capacity when `capacity` is too small for them.
fn instance_growth(capacity: u32, byte_len: usize) -> (u32, Option<u32>) {
    let count = (byte_len as wgpu::BufferAddress / INSTANCE_STRIDE) as u32;
    (count, (count > capacity).then_some(count))
}

fn create_instance_buffer(device: &wgpu::Device, capacity: u32) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Instance Buffer"),
        size: capacity.max(1) as wgpu::BufferAddress * INSTANCE_STRIDE,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_size_matches_wgsl() {
        // mat4x4, size, opacity, vec2 padding
        assert_eq!(std::mem::size_of::<Uniforms>(), 80);
    }

    #[test]
    fn test_instance_buffer_grows_only_when_needed() {
        let stride = INSTANCE_STRIDE as usize;
        assert_eq!(instance_growth(1_000, 500 * stride), (500, None));
        assert_eq!(instance_growth(1_000, 1_000 * stride), (1_000, None));
        assert_eq!(instance_growth(1_000, 4_000 * stride), (4_000, Some(4_000)));
        assert_eq!(instance_growth(1, 0), (0, None));
    }

    #[test]
    fn test_instance_stride_matches_position() {
        assert_eq!(INSTANCE_STRIDE as usize, std::mem::size_of::<glam::Vec3>());
    }
}
