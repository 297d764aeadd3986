//! Bloom post-processing.
//!
//! The scene is rendered into an offscreen HDR texture. From there:
//!
//! 1. a bright pass keeps pixels above the luminance threshold, at half size,
//! 2. a separable Gaussian blur ping-pongs between two half-size textures,
//! 3. a composite pass adds the blurred glow, scaled by strength, on top of
//!    the scene and writes the result to the surface.

use super::{BLOOM_SHADER, COMPOSITE_SHADER, DEPTH_FORMAT};
use crate::config::BloomConfig;
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// Format of the offscreen scene and bloom targets.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct BloomUniforms {
    threshold: f32,
    radius: f32,
    strength: f32,
    _padding0: f32,
    texel_size: [f32; 2],
    _padding1: [f32; 2],
}

/// A texture with its default view.
struct Target {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl Target {
    fn new(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    fn color(device: &wgpu::Device, label: &str, width: u32, height: u32) -> Self {
        Self::new(
            device,
            label,
            width,
            height,
            HDR_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        )
    }
}

/// Size-dependent textures and the bind groups that reference them.
struct Targets {
    scene: Target,
    depth: Target,
    ping: Target,
    pong: Target,
    scene_bind_group: wgpu::BindGroup,
    ping_bind_group: wgpu::BindGroup,
    pong_bind_group: wgpu::BindGroup,
    composite_bind_group: wgpu::BindGroup,
    half_size: (u32, u32),
}

/// GPU resources for the bloom chain.
pub struct PostProcessState {
    settings: BloomConfig,
    strength: f32,
    uniform_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
    bloom_layout: wgpu::BindGroupLayout,
    composite_layout: wgpu::BindGroupLayout,
    threshold_pipeline: wgpu::RenderPipeline,
    blur_h_pipeline: wgpu::RenderPipeline,
    blur_v_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    targets: Targets,
}

impl PostProcessState {
    /// Create the bloom chain for a surface of the given size and format.
    pub fn new(
        device: &wgpu::Device,
        settings: BloomConfig,
        width: u32,
        height: u32,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Bloom Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Bloom Uniform Buffer"),
            contents: bytemuck::bytes_of(&BloomUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bloom_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Bind Group Layout"),
            entries: &[texture_entry(0), sampler_entry(1), uniform_entry(2)],
        });

        let composite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Composite Bind Group Layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                sampler_entry(2),
                uniform_entry(3),
            ],
        });

        let bloom_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Bloom Shader"),
            source: wgpu::ShaderSource::Wgsl(BLOOM_SHADER.into()),
        });
        let composite_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Composite Shader"),
            source: wgpu::ShaderSource::Wgsl(COMPOSITE_SHADER.into()),
        });

        let bloom_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Bloom Pipeline Layout"),
            bind_group_layouts: &[&bloom_layout],
            push_constant_ranges: &[],
        });
        let composite_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Composite Pipeline Layout"),
                bind_group_layouts: &[&composite_layout],
                push_constant_ranges: &[],
            });

        let threshold_pipeline = fullscreen_pipeline(
            device,
            "Bloom Threshold Pipeline",
            &bloom_pipeline_layout,
            &bloom_shader,
            "fs_threshold",
            HDR_FORMAT,
        );
        let blur_h_pipeline = fullscreen_pipeline(
            device,
            "Bloom Blur H Pipeline",
            &bloom_pipeline_layout,
            &bloom_shader,
            "fs_blur_h",
            HDR_FORMAT,
        );
        let blur_v_pipeline = fullscreen_pipeline(
            device,
            "Bloom Blur V Pipeline",
            &bloom_pipeline_layout,
            &bloom_shader,
            "fs_blur_v",
            HDR_FORMAT,
        );
        let composite_pipeline = fullscreen_pipeline(
            device,
            "Composite Pipeline",
            &composite_pipeline_layout,
            &composite_shader,
            "fs_main",
            surface_format,
        );

        let targets = create_targets(
            device,
            &bloom_layout,
            &composite_layout,
            &sampler,
            &uniform_buffer,
            width,
            height,
        );

        Self {
            settings,
            strength: 0.0,
            uniform_buffer,
            sampler,
            bloom_layout,
            composite_layout,
            threshold_pipeline,
            blur_h_pipeline,
            blur_v_pipeline,
            composite_pipeline,
            targets,
        }
    }

    /// Recreate size-dependent textures after a window resize.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.targets = create_targets(
            device,
            &self.bloom_layout,
            &self.composite_layout,
            &self.sampler,
            &self.uniform_buffer,
            width,
            height,
        );
    }

    /// View to render the scene into.
    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.targets.scene.view
    }

    /// Depth buffer matching the scene target.
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.targets.depth.view
    }

    /// Glow strength applied in the composite pass.
    pub fn set_strength(&mut self, strength: f32) {
        self.strength = strength.max(0.0);
    }

    /// Upload the current settings. Call once per frame before [`encode`](Self::encode).
    pub fn write_uniforms(&self, queue: &wgpu::Queue) {
        let (w, h) = self.targets.half_size;
        let uniforms = BloomUniforms {
            threshold: self.settings.threshold,
            radius: self.settings.radius.clamp(0.0, 1.0),
            strength: self.strength,
            _padding0: 0.0,
            texel_size: [1.0 / w as f32, 1.0 / h as f32],
            _padding1: [0.0; 2],
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Record the bright pass, blur passes and composite into `output`.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        let t = &self.targets;

        fullscreen_pass(
            encoder,
            "Bloom Threshold Pass",
            &t.ping.view,
            &self.threshold_pipeline,
            &t.scene_bind_group,
        );

        for _ in 0..self.settings.blur_iterations.max(1) {
            fullscreen_pass(
                encoder,
                "Bloom Blur H Pass",
                &t.pong.view,
                &self.blur_h_pipeline,
                &t.ping_bind_group,
            );
            fullscreen_pass(
                encoder,
                "Bloom Blur V Pass",
                &t.ping.view,
                &self.blur_v_pipeline,
                &t.pong_bind_group,
            );
        }

        fullscreen_pass(
            encoder,
            "Composite Pass",
            output,
            &self.composite_pipeline,
            &t.composite_bind_group,
        );
    }
}

fn create_targets(
    device: &wgpu::Device,
    bloom_layout: &wgpu::BindGroupLayout,
    composite_layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    uniform_buffer: &wgpu::Buffer,
    width: u32,
    height: u32,
) -> Targets {
    let half_size = ((width / 2).max(1), (height / 2).max(1));

    let scene = Target::color(device, "Scene Texture", width, height);
    let depth = Target::new(
        device,
        "Scene Depth Texture",
        width,
        height,
        DEPTH_FORMAT,
        wgpu::TextureUsages::RENDER_ATTACHMENT,
    );
    let ping = Target::color(device, "Bloom Ping Texture", half_size.0, half_size.1);
    let pong = Target::color(device, "Bloom Pong Texture", half_size.0, half_size.1);

    let bloom_bind_group = |label: &str, view: &wgpu::TextureView| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: bloom_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
        })
    };

    let scene_bind_group = bloom_bind_group("Bloom Scene Bind Group", &scene.view);
    let ping_bind_group = bloom_bind_group("Bloom Ping Bind Group", &ping.view);
    let pong_bind_group = bloom_bind_group("Bloom Pong Bind Group", &pong.view);

    let composite_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Composite Bind Group"),
        layout: composite_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&scene.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&ping.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: uniform_buffer.as_entire_binding(),
            },
        ],
    });

    Targets {
        scene,
        depth,
        ping,
        pong,
        scene_bind_group,
        ping_bind_group,
        pong_bind_group,
        composite_bind_group,
        half_size,
    }
}

fn fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    fs_entry: &str,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some(fs_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layout_matches_wgsl() {
        // threshold, radius, strength, pad, vec2, vec2
        assert_eq!(std::mem::size_of::<BloomUniforms>(), 32);
    }
}
