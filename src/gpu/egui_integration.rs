//! egui overlay drawn on top of the composited frame.

use std::sync::Arc;
use winit::window::Window;

/// egui context, winit input state and wgpu renderer for one window.
pub struct EguiIntegration {
    pub ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

/// Tessellated output of one UI pass, ready to paint.
pub struct EguiFrameOutput {
    pub paint_jobs: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

impl EguiIntegration {
    pub fn new(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        window: &Arc<Window>,
    ) -> Self {
        let ctx = egui::Context::default();

        // Translucent dark panels over a black background
        let mut style = egui::Style::default();
        style.visuals = egui::Visuals::dark();
        style.visuals.window_shadow = egui::Shadow::NONE;
        style.visuals.popup_shadow = egui::Shadow::NONE;
        style.visuals.window_fill = egui::Color32::from_black_alpha(200);
        ctx.set_style(style);

        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window.as_ref(),
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let renderer = egui_wgpu::Renderer::new(device, output_format, None, 1, false);

        Self { ctx, state, renderer }
    }

    /// Feed a window event to egui.
    ///
    /// Returns true if egui consumed the event, in which case the camera
    /// should ignore it.
    pub fn on_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Run one UI pass and tessellate its output.
    pub fn run(&mut self, window: &Window, ui: impl FnMut(&egui::Context)) -> EguiFrameOutput {
        let raw_input = self.state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, ui);

        self.state.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self.ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        EguiFrameOutput {
            paint_jobs,
            textures_delta: full_output.textures_delta,
            pixels_per_point: full_output.pixels_per_point,
        }
    }

    /// Upload textures and buffers, then paint `output` onto `target`
    /// without clearing it.
    pub fn paint(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
        output: EguiFrameOutput,
    ) {
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: output.pixels_per_point,
        };

        for (id, image_delta) in &output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }

        let user_buffers = self.renderer.update_buffers(
            device,
            queue,
            encoder,
            &output.paint_jobs,
            &screen_descriptor,
        );
        if !user_buffers.is_empty() {
            queue.submit(user_buffers);
        }

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: target,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();

            self.renderer.render(&mut render_pass, &output.paint_jobs, &screen_descriptor);
        }

        for id in &output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}
