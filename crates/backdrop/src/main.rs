//! Ambient weather backdrop: a window that renders the weather world for an
//! analysis result.

mod config;
mod events;
mod presets;
mod state;

use anyhow::Result;
use state::BackdropState;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowId},
};

/// Application handler for winit.
struct App {
    state: Option<BackdropState>,
}

impl App {
    fn new() -> Self {
        Self { state: None }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_none() {
            let config = config::BackdropConfig::load();
            let mut window_attrs = Window::default_attributes()
                .with_title("Ambient Weather")
                .with_inner_size(winit::dpi::LogicalSize::new(config.window_width, config.window_height));
            if config.fullscreen {
                window_attrs = window_attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
            }

            let window = match event_loop.create_window(window_attrs) {
                Ok(w) => Arc::new(w),
                Err(e) => {
                    log::error!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            match pollster::block_on(BackdropState::new(window.clone(), config)) {
                Ok(s) => {
                    self.state = Some(s);
                    window.request_redraw();
                }
                Err(e) => {
                    log::error!("Failed to initialize backdrop: {}", e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(state) = &mut self.state {
            if state.handle_window_event(event) || !state.running {
                event_loop.exit();
            }
        }
    }

    /// Pace the loop: wake at the next frame slot while a world is live,
    /// otherwise sleep until an event arrives.
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = &self.state else {
            return;
        };
        if !state.animating() {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        }
        if state.time.frame_due() {
            state.renderer.window.request_redraw();
            event_loop.set_control_flow(ControlFlow::Wait);
        } else {
            event_loop.set_control_flow(ControlFlow::WaitUntil(state.next_frame_at()));
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("╔══════════════════════════════════════════════════╗");
    println!("║                 Ambient Weather                  ║");
    println!("╠══════════════════════════════════════════════════╣");
    println!("║  CONTROLS:                                       ║");
    println!("║    Mouse      - Push the wind                    ║");
    println!("║    Left Click - Lightning (storm only)           ║");
    println!("║    1-7        - Analysis presets                 ║");
    println!("║      1 winter  2 summer  3 autumn  4 wet spring  ║");
    println!("║      5 dry spring  6 monsoon  7 no data          ║");
    println!("║    S          - Toggle storm preview             ║");
    println!("║    Escape     - Quit                             ║");
    println!("╚══════════════════════════════════════════════════╝");

    log::info!("Starting ambient weather backdrop");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new();
    event_loop.run_app(&mut app)?;

    Ok(())
}
