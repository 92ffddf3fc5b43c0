//! Host state: renderer, world controller and frame pacing for one window.

use crate::config::BackdropConfig;
use anyhow::Result;
use atmosphere::{FrameTicket, ModeSelection, WeatherMode, WorldController};
use engine_core::{DrawSurface, Time};
use input::InputRouter;
use renderer::{Renderer, RendererOptions};
use std::sync::Arc;
use std::time::Instant;
use winit::window::Window;

/// Intensity used by the storm preview toggle.
pub const STORM_PREVIEW: ModeSelection = ModeSelection::new(WeatherMode::Storm, 45);

pub struct BackdropState {
    pub renderer: Renderer,
    pub controller: WorldController,
    pub router: InputRouter,
    pub time: Time,
    pub config: BackdropConfig,
    /// Next frame of the live world; `None` while the backdrop is blank.
    pub ticket: Option<FrameTicket>,
    pub storm_preview: bool,
    pub running: bool,
}

impl BackdropState {
    pub async fn new(window: Arc<Window>, config: BackdropConfig) -> Result<Self> {
        let options = RendererOptions {
            vsync: config.vsync,
            clear_color: config.background_color(),
            layer_opacity: config.layer_opacity,
        };
        let renderer = Renderer::new(window.clone(), options).await?;
        let router = InputRouter::new(window.scale_factor());

        let mut controller = match config.seed {
            Some(seed) => WorldController::with_seed(seed),
            None => WorldController::new(),
        };
        controller.attach_surface(renderer.viewport());
        controller.set_override(config.preview());
        let ticket = controller.set_inputs(&config.inputs);

        let mut time = Time::new();
        time.set_frame_limit(config.frame_limit());

        Ok(Self {
            renderer,
            controller,
            router,
            time,
            config,
            ticket,
            storm_preview: false,
            running: true,
        })
    }

    /// Whether the frame loop is active.
    pub fn animating(&self) -> bool {
        self.running && self.ticket.is_some()
    }

    /// When the next frame may run.
    pub fn next_frame_at(&self) -> Instant {
        self.time.next_frame_at()
    }

    /// Run one frame of the world (if any) and present it.
    pub fn redraw(&mut self) -> Result<()> {
        self.time.update();
        let dt = self.time.frame_steps();
        self.ticket = match self.ticket {
            Some(ticket) => self.controller.run_frame(ticket, dt, self.renderer.canvas_mut()),
            None => None,
        };
        if self.ticket.is_none() {
            self.renderer.canvas_mut().clear();
        }
        self.renderer.draw_frame()
    }

    /// Switch to another analysis.
    pub fn apply_inputs(&mut self, label: &str, inputs: &atmosphere::AnalysisInputs) {
        log::info!("Preset: {}", label);
        self.ticket = self.controller.set_inputs(inputs);
        self.renderer.window.request_redraw();
    }

    /// Toggle the storm preview; off restores the configured override.
    pub fn toggle_storm_preview(&mut self) {
        self.storm_preview = !self.storm_preview;
        let preview = if self.storm_preview {
            Some(STORM_PREVIEW)
        } else {
            self.config.preview()
        };
        log::info!("Storm preview {}", if self.storm_preview { "on" } else { "off" });
        self.ticket = self.controller.set_override(preview);
        self.renderer.window.request_redraw();
    }

    pub fn shutdown(&mut self) {
        self.controller.unmount();
        self.ticket = None;
        self.running = false;
    }
}
