//! Canvas vertex type and the CPU tessellator that turns [`DrawSurface`]
//! calls into triangles.

use bytemuck::{Pod, Zeroable};
use engine_core::{Color, DrawSurface, Glow, GradientStop, PathCommand};
use glam::Vec2;

/// Segments used to approximate a full circle.
pub const CIRCLE_SEGMENTS: u32 = 32;
/// Line segments per quadratic curve.
pub const CURVE_STEPS: u32 = 8;
/// Strokes thinner than this are widened so they stay visible.
const MIN_STROKE_WIDTH: f32 = 1.0;

/// Vertex for the 2D canvas pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CanvasVertex {
    /// NDC position (x, y) in -1..1
    pub position: [f32; 2],
    /// Straight RGBA color
    pub color: [f32; 4],
}

impl CanvasVertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CanvasVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Builds canvas geometry for one frame.
///
/// Coordinates come in as logical pixels and are converted to NDC against
/// the logical screen size. Every color's alpha is scaled by the layer
/// opacity, which stands in for the CSS opacity of the backdrop layer.
#[derive(Debug)]
pub struct CanvasBuilder {
    pub vertices: Vec<CanvasVertex>,
    pub indices: Vec<u32>,
    screen_w: f32,
    screen_h: f32,
    opacity: f32,
}

impl CanvasBuilder {
    pub fn new(screen_w: f32, screen_h: f32) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            screen_w: screen_w.max(1.0),
            screen_h: screen_h.max(1.0),
            opacity: 1.0,
        }
    }

    /// Update the logical screen size used for NDC conversion.
    pub fn set_screen(&mut self, screen_w: f32, screen_h: f32) {
        self.screen_w = screen_w.max(1.0);
        self.screen_h = screen_h.max(1.0);
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Convert pixel coords to NDC.
    fn px_to_ndc(&self, p: Vec2) -> [f32; 2] {
        [
            (p.x / self.screen_w) * 2.0 - 1.0,
            1.0 - (p.y / self.screen_h) * 2.0,
        ]
    }

    fn push(&mut self, p: Vec2, color: Color) -> u32 {
        let index = self.vertices.len() as u32;
        let mut rgba = color.to_array();
        rgba[3] *= self.opacity;
        self.vertices.push(CanvasVertex {
            position: self.px_to_ndc(p),
            color: rgba,
        });
        index
    }

    /// Quad covering the segment `from..to`, `width` pixels wide.
    fn push_segment(&mut self, from: Vec2, to: Vec2, width: f32, start: Color, end: Color) {
        let dir = (to - from).normalize_or_zero();
        if dir == Vec2::ZERO {
            return;
        }
        let offset = dir.perp() * (width.max(MIN_STROKE_WIDTH) * 0.5);
        let a = self.push(from + offset, start);
        let b = self.push(from - offset, start);
        let c = self.push(to - offset, end);
        let d = self.push(to + offset, end);
        self.indices.extend_from_slice(&[a, b, c, a, c, d]);
    }

    fn push_ring(&mut self, center: Vec2, radius: f32, color: Color) -> u32 {
        let first = self.vertices.len() as u32;
        for i in 0..CIRCLE_SEGMENTS {
            let angle = i as f32 / CIRCLE_SEGMENTS as f32 * std::f32::consts::TAU;
            self.push(center + Vec2::from_angle(angle) * radius, color);
        }
        first
    }
}

/// Flatten a path into closed polygons, one per subpath.
pub fn flatten_path(path: &[PathCommand]) -> Vec<Vec<Vec2>> {
    let mut polygons = Vec::new();
    let mut current: Vec<Vec2> = Vec::new();
    for command in path {
        match *command {
            PathCommand::MoveTo(p) => {
                if current.len() >= 3 {
                    polygons.push(std::mem::take(&mut current));
                }
                current.clear();
                current.push(p);
            }
            PathCommand::LineTo(p) => current.push(p),
            PathCommand::QuadTo { ctrl, to } => {
                let Some(&from) = current.last() else {
                    current.push(to);
                    continue;
                };
                for step in 1..=CURVE_STEPS {
                    let t = step as f32 / CURVE_STEPS as f32;
                    let u = 1.0 - t;
                    current.push(from * (u * u) + ctrl * (2.0 * u * t) + to * (t * t));
                }
            }
            PathCommand::Close => {
                if current.len() >= 3 {
                    polygons.push(std::mem::take(&mut current));
                }
                current.clear();
            }
        }
    }
    if current.len() >= 3 {
        polygons.push(current);
    }
    polygons
}

impl DrawSurface for CanvasBuilder {
    fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    fn fill_radial(&mut self, center: Vec2, radius: f32, stops: &[GradientStop]) {
        let Some(first) = stops.first() else {
            return;
        };
        if radius <= 0.0 {
            return;
        }
        // Inner disk up to the first stop, then one band per pair of stops.
        let hub = self.push(center, first.color);
        let mut inner = self.push_ring(center, radius * first.offset.max(0.0), first.color);
        for i in 0..CIRCLE_SEGMENTS {
            let j = (i + 1) % CIRCLE_SEGMENTS;
            self.indices.extend_from_slice(&[hub, inner + i, inner + j]);
        }
        for stop in &stops[1..] {
            let outer = self.push_ring(center, radius * stop.offset.clamp(0.0, 1.0), stop.color);
            for i in 0..CIRCLE_SEGMENTS {
                let j = (i + 1) % CIRCLE_SEGMENTS;
                self.indices
                    .extend_from_slice(&[inner + i, outer + i, outer + j, inner + i, outer + j, inner + j]);
            }
            inner = outer;
        }
    }

    fn stroke_gradient_line(&mut self, from: Vec2, to: Vec2, width: f32, start: Color, end: Color) {
        self.push_segment(from, to, width, start, end);
    }

    fn fill_path(&mut self, path: &[PathCommand], color: Color) {
        for polygon in flatten_path(path) {
            let hub = self.push(polygon[0], color);
            let rim = self.vertices.len() as u32;
            for p in &polygon[1..] {
                self.push(*p, color);
            }
            let count = polygon.len() as u32 - 1;
            for i in 0..count.saturating_sub(1) {
                self.indices.extend_from_slice(&[hub, rim + i, rim + i + 1]);
            }
        }
    }

    fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Color, glow: Option<Glow>) {
        if let Some(glow) = glow.filter(|g| g.blur > 0.0) {
            // Two widening halos approximate a blur falloff.
            let outer = glow.color.with_alpha(glow.color.a * 0.35);
            for pair in points.windows(2) {
                self.push_segment(pair[0], pair[1], width + glow.blur * 2.0, outer, outer);
            }
            for pair in points.windows(2) {
                self.push_segment(pair[0], pair[1], width + glow.blur, glow.color, glow.color);
            }
        }
        for pair in points.windows(2) {
            self.push_segment(pair[0], pair[1], width, color, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> CanvasBuilder {
        CanvasBuilder::new(800.0, 600.0)
    }

    #[test]
    fn corners_map_to_ndc() {
        let b = builder();
        assert_eq!(b.px_to_ndc(Vec2::ZERO), [-1.0, 1.0]);
        assert_eq!(b.px_to_ndc(Vec2::new(800.0, 600.0)), [1.0, -1.0]);
        assert_eq!(b.px_to_ndc(Vec2::new(400.0, 300.0)), [0.0, 0.0]);
    }

    #[test]
    fn gradient_line_is_one_quad_with_end_colors() {
        let mut b = builder();
        let start = Color::new(1.0, 0.0, 0.0, 0.5);
        let end = Color::new(0.0, 0.0, 1.0, 0.0);
        b.stroke_gradient_line(Vec2::new(10.0, 10.0), Vec2::new(110.0, 10.0), 2.0, start, end);
        assert_eq!(b.vertices.len(), 4);
        assert_eq!(b.indices.len(), 6);
        assert_eq!(b.vertices[0].color, start.to_array());
        assert_eq!(b.vertices[3].color, end.to_array());
    }

    #[test]
    fn degenerate_line_draws_nothing() {
        let mut b = builder();
        b.stroke_gradient_line(Vec2::ONE, Vec2::ONE, 2.0, Color::WHITE, Color::WHITE);
        assert!(b.is_empty());
    }

    #[test]
    fn radial_builds_hub_and_bands() {
        let mut b = builder();
        let stops = [
            GradientStop::new(0.0, Color::WHITE),
            GradientStop::new(0.5, Color::WHITE.with_alpha(0.5)),
            GradientStop::new(1.0, Color::TRANSPARENT),
        ];
        b.fill_radial(Vec2::new(100.0, 100.0), 50.0, &stops);
        let n = CIRCLE_SEGMENTS as usize;
        assert_eq!(b.vertices.len(), 1 + 3 * n);
        assert_eq!(b.indices.len(), 3 * n + 2 * 6 * n);
        assert!(b.indices.iter().all(|&i| (i as usize) < b.vertices.len()));
    }

    #[test]
    fn layer_opacity_scales_alpha() {
        let mut b = builder();
        b.set_opacity(0.75);
        b.stroke_gradient_line(Vec2::ZERO, Vec2::X * 10.0, 1.0, Color::WHITE, Color::WHITE);
        assert!(b.vertices.iter().all(|v| v.color[3] == 0.75));
    }

    #[test]
    fn quadratic_path_is_flattened_and_fanned() {
        let path = [
            PathCommand::MoveTo(Vec2::new(0.0, -5.0)),
            PathCommand::QuadTo { ctrl: Vec2::new(5.0, 0.0), to: Vec2::new(0.0, 5.0) },
            PathCommand::QuadTo { ctrl: Vec2::new(-5.0, 0.0), to: Vec2::new(0.0, -5.0) },
            PathCommand::Close,
        ];
        let polygons = flatten_path(&path);
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].len(), 1 + 2 * CURVE_STEPS as usize);
        assert_eq!(polygons[0][CURVE_STEPS as usize], Vec2::new(0.0, 5.0));

        let mut b = builder();
        b.fill_path(&path, Color::WHITE);
        assert_eq!(b.indices.len(), 3 * (2 * CURVE_STEPS as usize - 1));
    }

    #[test]
    fn glow_draws_halos_under_the_stroke() {
        let points = [Vec2::ZERO, Vec2::new(0.0, 50.0), Vec2::new(10.0, 100.0)];
        let mut plain = builder();
        plain.stroke_polyline(&points, 2.0, Color::WHITE, None);
        let mut glowing = builder();
        let glow = Glow { blur: 10.0, color: Color::WHITE.with_alpha(0.6) };
        glowing.stroke_polyline(&points, 2.0, Color::WHITE, Some(glow));
        assert_eq!(glowing.indices.len(), plain.indices.len() * 3);
        // The core stroke is drawn last, on top.
        let last = glowing.vertices.last().map(|v| v.color);
        assert_eq!(last, Some(Color::WHITE.to_array()));
    }

    #[test]
    fn clear_drops_geometry() {
        let mut b = builder();
        b.fill_radial(Vec2::ZERO, 10.0, &[GradientStop::new(0.0, Color::WHITE)]);
        assert!(!b.is_empty());
        b.clear();
        assert!(b.is_empty());
        assert!(b.vertices.is_empty());
    }
}
