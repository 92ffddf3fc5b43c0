//! Window event handling for BackdropState.

use crate::presets;
use crate::state::BackdropState;
use winit::event::WindowEvent;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Number row keys, in preset order.
const PRESET_KEYS: [KeyCode; 7] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
];

impl BackdropState {
    /// Handle a window event. Returns true if the app should exit.
    pub(crate) fn handle_window_event(&mut self, event: WindowEvent) -> bool {
        match event {
            WindowEvent::CloseRequested => {
                self.shutdown();
                true
            }
            WindowEvent::Destroyed => {
                self.controller.detach_surface();
                self.ticket = None;
                self.running = false;
                true
            }
            WindowEvent::Resized(size) => {
                self.renderer.resize(size);
                self.router.route_window_event(&event, &mut self.controller);
                // A blank backdrop may have just become buildable.
                if self.ticket.is_none() {
                    self.ticket = self.controller.frame_ticket();
                }
                self.renderer.window.request_redraw();
                false
            }
            WindowEvent::CursorMoved { .. }
            | WindowEvent::MouseInput { .. }
            | WindowEvent::ScaleFactorChanged { .. } => {
                self.router.route_window_event(&event, &mut self.controller);
                false
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if !event.state.is_pressed() || event.repeat {
                    return false;
                }
                let PhysicalKey::Code(key) = event.physical_key else {
                    return false;
                };
                if key == KeyCode::Escape {
                    self.shutdown();
                    return true;
                }
                if key == KeyCode::KeyS {
                    self.toggle_storm_preview();
                    return false;
                }
                if let Some(index) = PRESET_KEYS.iter().take(presets::count()).position(|k| *k == key) {
                    if let Some((label, inputs)) = presets::preset(index) {
                        self.apply_inputs(label, &inputs);
                    }
                }
                false
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    log::error!("Render failed: {}", e);
                    self.shutdown();
                    return true;
                }
                false
            }
            _ => false,
        }
    }
}
