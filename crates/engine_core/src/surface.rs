//! Drawing surface abstraction.
//!
//! The simulation draws through [`DrawSurface`] only, so it never depends on
//! a concrete graphics backend. The wgpu canvas in the `renderer` crate is
//! one implementation; [`RecordingSurface`] is another, used by tests and
//! headless runs to inspect what a frame would have drawn.
//!
//! All coordinates are logical pixels with the origin at the top-left corner
//! and y growing downward.

use glam::Vec2;

/// Straight (non-premultiplied) RGBA color, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from 8-bit channels.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba8(r, g, b, 1.0)
    }

    /// Color from 8-bit channels and a float alpha, like CSS `rgba()`.
    pub fn rgba8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// One color stop of a gradient. `offset` runs from 0 (center/start) to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

impl GradientStop {
    pub const fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Path segment for filled outlines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    /// Quadratic Bézier from the current point through `ctrl` to `to`.
    QuadTo { ctrl: Vec2, to: Vec2 },
    Close,
}

/// Soft halo drawn underneath a stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    /// Halo radius in pixels beyond the stroke edge.
    pub blur: f32,
    pub color: Color,
}

/// Minimal 2D drawing API the simulation renders through.
pub trait DrawSurface {
    /// Erase everything drawn since the last clear.
    fn clear(&mut self);

    /// Fill a disk with a radial gradient.
    fn fill_radial(&mut self, center: Vec2, radius: f32, stops: &[GradientStop]);

    /// Stroke a straight segment whose color fades from `start` to `end`.
    fn stroke_gradient_line(&mut self, from: Vec2, to: Vec2, width: f32, start: Color, end: Color);

    /// Fill a closed outline.
    fn fill_path(&mut self, path: &[PathCommand], color: Color);

    /// Stroke a connected polyline, optionally with a glow underneath.
    fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Color, glow: Option<Glow>);
}

/// A single recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Radial {
        center: Vec2,
        radius: f32,
        stops: Vec<GradientStop>,
    },
    GradientLine {
        from: Vec2,
        to: Vec2,
        width: f32,
        start: Color,
        end: Color,
    },
    Path {
        commands: Vec<PathCommand>,
        color: Color,
    },
    Polyline {
        points: Vec<Vec2>,
        width: f32,
        color: Color,
        glow: Option<Glow>,
    },
}

/// Surface that records every call instead of rasterizing it.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the surface empty.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// True when nothing but clears has been recorded.
    pub fn is_blank(&self) -> bool {
        self.commands.iter().all(|c| matches!(c, DrawCommand::Clear))
    }

    pub fn count_matching(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

impl DrawSurface for RecordingSurface {
    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_radial(&mut self, center: Vec2, radius: f32, stops: &[GradientStop]) {
        self.commands.push(DrawCommand::Radial {
            center,
            radius,
            stops: stops.to_vec(),
        });
    }

    fn stroke_gradient_line(&mut self, from: Vec2, to: Vec2, width: f32, start: Color, end: Color) {
        self.commands.push(DrawCommand::GradientLine {
            from,
            to,
            width,
            start,
            end,
        });
    }

    fn fill_path(&mut self, path: &[PathCommand], color: Color) {
        self.commands.push(DrawCommand::Path {
            commands: path.to_vec(),
            color,
        });
    }

    fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Color, glow: Option<Glow>) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            width,
            color,
            glow,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba8_matches_css_channels() {
        let c = Color::rgba8(255, 0, 51, 0.5);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 0.2).abs() < 1e-6);
        assert_eq!(c.a, 0.5);
        assert_eq!(c.with_alpha(0.1).a, 0.1);
    }

    #[test]
    fn recording_surface_blank_until_something_drawn() {
        let mut s = RecordingSurface::new();
        s.clear();
        assert!(s.is_blank());
        s.stroke_gradient_line(Vec2::ZERO, Vec2::ONE, 1.0, Color::WHITE, Color::TRANSPARENT);
        assert!(!s.is_blank());
        assert_eq!(s.count_matching(|c| matches!(c, DrawCommand::GradientLine { .. })), 1);
        assert_eq!(s.take().len(), 2);
        assert!(s.commands().is_empty());
    }
}
