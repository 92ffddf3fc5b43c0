//! Main renderer managing wgpu state and the canvas pass.

use crate::{pipeline::create_canvas_pipeline, vertex::CanvasBuilder};
use anyhow::Result;
use engine_core::{Color, Viewport};
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

/// Surface options chosen by the host.
#[derive(Debug, Clone, Copy)]
pub struct RendererOptions {
    pub vsync: bool,
    /// Color behind the backdrop layer.
    pub clear_color: Color,
    /// Opacity of the whole backdrop layer.
    pub layer_opacity: f32,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            vsync: true,
            clear_color: Color::new(0.04, 0.06, 0.1, 1.0),
            layer_opacity: 0.75,
        }
    }
}

/// Main renderer state.
pub struct Renderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    pub window: Arc<Window>,

    canvas_pipeline: wgpu::RenderPipeline,
    /// Geometry recorded for the current frame.
    canvas: CanvasBuilder,
    clear_color: wgpu::Color,
}

impl Renderer {
    /// Create a new renderer for the given window.
    pub async fn new(window: Arc<Window>, options: RendererOptions) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        // Low power is plenty for a 2D background.
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("Failed to find suitable GPU adapter"))?;

        log::info!("Using GPU: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Backdrop Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        // Canvas colors are authored in sRGB already; a non-sRGB target keeps
        // blending in the same space a 2D canvas uses.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("Surface reports no supported formats"))?;

        let present_mode = if options.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let canvas_pipeline = create_canvas_pipeline(&device, config.format);

        let logical = Viewport::from_physical(size.width, size.height, window.scale_factor());
        let mut canvas = CanvasBuilder::new(logical.width, logical.height);
        canvas.set_opacity(options.layer_opacity);

        let c = options.clear_color;
        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            canvas_pipeline,
            canvas,
            clear_color: wgpu::Color {
                r: f64::from(c.r),
                g: f64::from(c.g),
                b: f64::from(c.b),
                a: f64::from(c.a),
            },
        })
    }

    /// Handle window resize.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            let logical = self.viewport();
            self.canvas.set_screen(logical.width, logical.height);
        }
    }

    /// Drawable area in logical pixels.
    pub fn viewport(&self) -> Viewport {
        Viewport::from_physical(self.config.width, self.config.height, self.window.scale_factor())
    }

    /// The surface the simulation draws into this frame.
    pub fn canvas_mut(&mut self) -> &mut CanvasBuilder {
        &mut self.canvas
    }

    /// Begin a new frame. Returns `None` when the swap chain had to be
    /// reconfigured and this frame should be skipped.
    pub fn begin_frame(&mut self) -> Result<Option<(wgpu::SurfaceTexture, wgpu::CommandEncoder)>> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated; reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(None);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timed out; skipping frame");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Canvas Encoder"),
        });
        Ok(Some((output, encoder)))
    }

    /// Clear the target and draw the recorded canvas geometry on top.
    pub fn render_canvas(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let buffers = (!self.canvas.is_empty()).then(|| {
            let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Canvas Vertex Buffer"),
                contents: bytemuck::cast_slice(&self.canvas.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Canvas Index Buffer"),
                contents: bytemuck::cast_slice(&self.canvas.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            (vertex_buffer, index_buffer)
        });

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Canvas Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Some((vertex_buffer, index_buffer)) = &buffers {
            render_pass.set_pipeline(&self.canvas_pipeline);
            render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
            render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.canvas.indices.len() as u32, 0, 0..1);
        }
    }

    /// End frame and present.
    pub fn end_frame(&self, output: wgpu::SurfaceTexture, encoder: wgpu::CommandEncoder) {
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    /// Present whatever the canvas holds.
    pub fn draw_frame(&mut self) -> Result<()> {
        let Some((output, mut encoder)) = self.begin_frame()? else {
            return Ok(());
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.render_canvas(&mut encoder, &view);
        self.end_frame(output, encoder);
        Ok(())
    }
}
