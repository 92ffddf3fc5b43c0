//! Ambient layers shared by several modes: wind streaks, fog banks and sun rays.

use super::{ranges, uniform, FrameContext};
use engine_core::{Color, DrawSurface, GradientStop, Viewport};
use glam::Vec2;
use rand::Rng;

/// Pointer influence radius for wind streaks, in pixels.
pub const POINTER_RADIUS: f32 = 300.0;
/// Fraction of the vertical gap to the pointer closed per frame at full force.
const POINTER_PULL: f32 = 0.02;
/// Sun rotation in radians per frame.
const SUN_SPIN: f32 = 0.001;

/// Pointer influence at `distance`: 1 at the pointer, 0 from 300 px out.
pub fn pointer_force(distance: f32) -> f32 {
    (1.0 - distance / POINTER_RADIUS).max(0.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindStreak {
    /// Trailing (left) end of the streak.
    pub position: Vec2,
    pub length: f32,
    pub speed_x: f32,
    pub speed_y: f32,
    pub opacity: f32,
}

impl WindStreak {
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, viewport: Viewport) -> Self {
        let mut streak = Self {
            position: Vec2::new(
                uniform(rng, 0.0..viewport.width),
                uniform(rng, 0.0..viewport.height),
            ),
            length: 0.0,
            speed_x: 0.0,
            speed_y: 0.0,
            opacity: 0.0,
        };
        streak.redraw(rng);
        streak
    }

    fn redraw<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.length = uniform(rng, ranges::WIND_LENGTH);
        self.speed_x = uniform(rng, ranges::WIND_SPEED_X);
        self.speed_y = uniform(rng, ranges::WIND_SPEED_Y);
        self.opacity = uniform(rng, ranges::WIND_OPACITY);
    }

    pub fn update<R: Rng + ?Sized>(&mut self, ctx: &FrameContext, rng: &mut R) {
        let (force, pull) = match ctx.pointer {
            Some(pointer) => {
                let force = pointer_force(self.position.distance(pointer));
                (force, (pointer.y - self.position.y) * POINTER_PULL * force)
            }
            None => (0.0, 0.0),
        };
        self.position.x += self.speed_x * (1.0 + 3.0 * force) * ctx.dt;
        self.position.y += (self.speed_y + pull) * ctx.dt;

        if self.position.x > ctx.viewport.width {
            self.redraw(rng);
            self.position = Vec2::new(-self.length, uniform(rng, 0.0..ctx.viewport.height));
        }
    }

    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        let head = self.position + Vec2::new(self.length, self.speed_y * self.length / self.speed_x.max(1.0));
        surface.stroke_gradient_line(
            self.position,
            head,
            1.0,
            Color::WHITE.with_alpha(0.0),
            Color::WHITE.with_alpha(self.opacity),
        );
    }
}

/// Which range table a fog blob draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FogKind {
    /// Large slow banks of the ambient fog layer.
    Bank,
    /// Smaller, quicker wisps of fog mode.
    Mist,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FogBlob {
    pub kind: FogKind,
    pub position: Vec2,
    pub radius: f32,
    pub drift: Vec2,
    pub opacity: f32,
}

impl FogBlob {
    pub fn spawn<R: Rng + ?Sized>(kind: FogKind, rng: &mut R, viewport: Viewport) -> Self {
        let (radius, dx, dy) = match kind {
            FogKind::Bank => (ranges::FOG_RADIUS, ranges::FOG_DRIFT_X, ranges::FOG_DRIFT_Y),
            FogKind::Mist => (ranges::MIST_RADIUS, ranges::MIST_DRIFT_X, ranges::MIST_DRIFT_Y),
        };
        let mut blob = Self {
            kind,
            position: Vec2::new(
                uniform(rng, 0.0..viewport.width),
                uniform(rng, 0.0..viewport.height),
            ),
            radius: uniform(rng, radius),
            drift: Vec2::new(uniform(rng, dx), uniform(rng, dy)),
            opacity: 0.0,
        };
        blob.redraw_opacity(rng);
        blob
    }

    fn redraw_opacity<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.opacity = match self.kind {
            FogKind::Bank => uniform(rng, ranges::FOG_OPACITY),
            FogKind::Mist => uniform(rng, ranges::MIST_OPACITY),
        };
    }

    pub fn update<R: Rng + ?Sized>(&mut self, ctx: &FrameContext, rng: &mut R) {
        let wander = Vec2::new(ctx.phase(0.001).sin() * 0.1, ctx.phase(0.001).cos() * 0.05);
        self.position += (self.drift + wander) * ctx.dt;

        let (w, h, r) = (ctx.viewport.width, ctx.viewport.height, self.radius);
        let before = self.position;
        if self.position.x < -r {
            self.position.x = w + r;
        } else if self.position.x > w + r {
            self.position.x = -r;
        }
        if self.position.y < -r {
            self.position.y = h + r;
        } else if self.position.y > h + r {
            self.position.y = -r;
        }
        if self.position != before {
            self.redraw_opacity(rng);
        }
    }

    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        let o = self.opacity;
        surface.fill_radial(
            self.position,
            self.radius,
            &[
                GradientStop::new(0.0, Color::rgba8(200, 200, 200, o)),
                GradientStop::new(0.5, Color::rgba8(180, 180, 180, o * 0.5)),
                GradientStop::new(1.0, Color::rgba8(180, 180, 180, 0.0)),
            ],
        );
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SunRay {
    pub angle: f32,
    pub length: f32,
    pub opacity: f32,
}

impl SunRay {
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            angle: uniform(rng, ranges::SUN_RAY_ANGLE),
            length: uniform(rng, ranges::SUN_RAY_LENGTH),
            opacity: uniform(rng, ranges::SUN_RAY_OPACITY),
        }
    }

    /// Sun center, upper right of the viewport.
    pub fn origin(viewport: Viewport) -> Vec2 {
        Vec2::new(viewport.width * 0.85, viewport.height * 0.12)
    }

    pub fn update(&mut self, ctx: &FrameContext) {
        self.angle = (self.angle + SUN_SPIN * ctx.dt).rem_euclid(std::f32::consts::TAU);
    }

    /// Ray length at the current clock. Rays pulse out of phase by index.
    pub fn pulsed_length(&self, index: usize, ctx: &FrameContext) -> f32 {
        self.length * (1.0 + (ctx.phase(0.02) + index as f32).sin() * 0.1)
    }

    pub fn draw(&self, index: usize, ctx: &FrameContext, surface: &mut dyn DrawSurface) {
        let origin = Self::origin(ctx.viewport);
        let tip = origin + Vec2::from_angle(self.angle) * self.pulsed_length(index, ctx);
        surface.stroke_gradient_line(
            origin,
            tip,
            2.0,
            Color::rgba8(255, 220, 150, self.opacity),
            Color::rgba8(255, 220, 150, 0.0),
        );
    }

    /// Soft disk behind the rays; radius breathes with the clock.
    pub fn draw_glow(ctx: &FrameContext, surface: &mut dyn DrawSurface) {
        let radius = 120.0 * (1.0 + ctx.phase(0.02).sin() * 0.05);
        surface.fill_radial(
            Self::origin(ctx.viewport),
            radius,
            &[
                GradientStop::new(0.0, Color::rgba8(255, 230, 170, 0.35)),
                GradientStop::new(0.4, Color::rgba8(255, 210, 140, 0.15)),
                GradientStop::new(1.0, Color::rgba8(255, 210, 140, 0.0)),
            ],
        );
    }
}
