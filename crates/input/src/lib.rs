//! Input handling for the backdrop: pointer, resize and click ports.
//!
//! Simulation code depends only on [`InputPort`]. [`InputRouter`] adapts
//! winit window events to that port, converting physical pixels to logical
//! pixels with the window's scale factor.

use glam::Vec2;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, WindowEvent};

/// Receiver for the three host events the backdrop consumes.
/// Coordinates are logical pixels relative to the viewport's top-left corner.
pub trait InputPort {
    fn on_pointer_move(&mut self, x: f32, y: f32);
    fn on_resize(&mut self, width: f32, height: f32);
    fn on_click(&mut self, x: f32, y: f32);
}

/// Last known pointer position. Empty until the first move event.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    position: Option<Vec2>,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pointer position. Last write wins.
    pub fn set(&mut self, x: f32, y: f32) {
        self.position = Some(Vec2::new(x, y));
    }

    pub fn position(&self) -> Option<Vec2> {
        self.position
    }
}

/// Translates winit window events into [`InputPort`] calls.
#[derive(Debug)]
pub struct InputRouter {
    /// Cursor position in logical pixels.
    cursor: Option<Vec2>,
    scale_factor: f64,
}

impl InputRouter {
    pub fn new(scale_factor: f64) -> Self {
        Self {
            cursor: None,
            scale_factor,
        }
    }

    /// Forward a window event to `port`. Returns true if the event was one the
    /// backdrop consumes.
    pub fn route_window_event(&mut self, event: &WindowEvent, port: &mut impl InputPort) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(*position, port);
                true
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button,
                ..
            } => self.mouse_pressed(*button, port),
            WindowEvent::Resized(size) => {
                self.resized(*size, port);
                true
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                // A Resized event with the new physical size follows.
                self.scale_factor = *scale_factor;
                false
            }
            _ => false,
        }
    }

    /// Handle a cursor move in physical pixels.
    pub fn cursor_moved(&mut self, position: PhysicalPosition<f64>, port: &mut impl InputPort) {
        let logical = position.to_logical::<f32>(self.scale_factor);
        self.cursor = Some(Vec2::new(logical.x, logical.y));
        port.on_pointer_move(logical.x, logical.y);
    }

    /// Handle a mouse button press. Only the primary button clicks.
    pub fn mouse_pressed(&mut self, button: MouseButton, port: &mut impl InputPort) -> bool {
        if button != MouseButton::Left {
            return false;
        }
        match self.cursor {
            Some(at) => {
                port.on_click(at.x, at.y);
                true
            }
            None => {
                log::trace!("Click before any cursor position; ignored");
                false
            }
        }
    }

    /// Handle a resize in physical pixels.
    pub fn resized(&mut self, size: PhysicalSize<u32>, port: &mut impl InputPort) {
        let logical = size.to_logical::<f32>(self.scale_factor);
        port.on_resize(logical.width, logical.height);
    }
}
