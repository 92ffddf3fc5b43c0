//! Particles that fall through the viewport: snow, leaves and rain.

use super::{ranges, uniform, FrameContext};
use engine_core::{Color, DrawSurface, GradientStop, PathCommand, Viewport};
use glam::{Mat2, Vec2};
use rand::Rng;

/// Autumn leaf palette, 8-bit RGB.
pub const LEAF_COLORS: [[u8; 3]; 5] = [
    [210, 105, 30],
    [205, 133, 63],
    [178, 34, 34],
    [218, 165, 32],
    [139, 69, 19],
];

const RAIN_RGB: [u8; 3] = [174, 194, 224];

fn random_point<R: Rng + ?Sized>(rng: &mut R, viewport: Viewport) -> Vec2 {
    Vec2::new(
        uniform(rng, 0.0..viewport.width),
        uniform(rng, 0.0..viewport.height),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snowflake {
    pub position: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub drift: f32,
    pub opacity: f32,
}

impl Snowflake {
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, viewport: Viewport) -> Self {
        let mut flake = Self {
            position: random_point(rng, viewport),
            radius: 0.0,
            speed: 0.0,
            drift: 0.0,
            opacity: 0.0,
        };
        flake.redraw(rng);
        flake
    }

    fn redraw<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.radius = uniform(rng, ranges::SNOW_RADIUS);
        self.speed = uniform(rng, ranges::SNOW_SPEED);
        self.drift = uniform(rng, ranges::SNOW_DRIFT);
        self.opacity = uniform(rng, ranges::SNOW_OPACITY);
    }

    pub fn update<R: Rng + ?Sized>(&mut self, ctx: &FrameContext, rng: &mut R) {
        let sway = (ctx.phase(0.01) + self.radius).sin() * 0.3;
        self.position.x += (self.drift + sway) * ctx.dt;
        self.position.y += self.speed * ctx.dt;

        if self.position.y > ctx.viewport.height {
            self.redraw(rng);
            self.position = Vec2::new(uniform(rng, 0.0..ctx.viewport.width), -self.radius);
        }
    }

    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        surface.fill_radial(
            self.position,
            self.radius,
            &[
                GradientStop::new(0.0, Color::WHITE.with_alpha(self.opacity)),
                GradientStop::new(1.0, Color::WHITE.with_alpha(0.0)),
            ],
        );
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub position: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub drift: f32,
    pub rotation: f32,
    pub spin: f32,
    pub opacity: f32,
    pub color: Color,
}

impl Leaf {
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, viewport: Viewport) -> Self {
        let mut leaf = Self {
            position: random_point(rng, viewport),
            radius: 0.0,
            speed: 0.0,
            drift: 0.0,
            rotation: 0.0,
            spin: 0.0,
            opacity: 0.0,
            color: Color::TRANSPARENT,
        };
        leaf.redraw(rng);
        leaf
    }

    fn redraw<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.radius = uniform(rng, ranges::LEAF_RADIUS);
        self.speed = uniform(rng, ranges::LEAF_SPEED);
        self.drift = uniform(rng, ranges::LEAF_DRIFT);
        self.rotation = uniform(rng, ranges::LEAF_ROTATION);
        self.spin = uniform(rng, ranges::LEAF_SPIN);
        self.opacity = uniform(rng, ranges::LEAF_OPACITY);
        let [r, g, b] = LEAF_COLORS[rng.gen_range(0..LEAF_COLORS.len())];
        self.color = Color::rgb8(r, g, b);
    }

    pub fn update<R: Rng + ?Sized>(&mut self, ctx: &FrameContext, rng: &mut R) {
        let sway = (ctx.phase(0.02) + self.rotation).sin() * 0.6;
        self.position.x += (self.drift + sway) * ctx.dt;
        self.position.y += self.speed * ctx.dt;
        self.rotation += self.spin * ctx.dt;

        if self.position.y > ctx.viewport.height {
            self.redraw(rng);
            self.position = Vec2::new(uniform(rng, 0.0..ctx.viewport.width), -self.radius);
        }
    }

    /// Leaf outline: two quadratic arcs meeting at the tips, rotated about
    /// the leaf center.
    pub fn outline(&self) -> [PathCommand; 4] {
        let r = self.radius;
        let rot = Mat2::from_angle(self.rotation);
        let at = |x: f32, y: f32| self.position + rot * Vec2::new(x, y);
        [
            PathCommand::MoveTo(at(0.0, -r)),
            PathCommand::QuadTo {
                ctrl: at(r, 0.0),
                to: at(0.0, r),
            },
            PathCommand::QuadTo {
                ctrl: at(-r, 0.0),
                to: at(0.0, -r),
            },
            PathCommand::Close,
        ]
    }

    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        surface.fill_path(&self.outline(), self.color.with_alpha(self.opacity));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RainStreak {
    /// Top end of the streak.
    pub position: Vec2,
    pub length: f32,
    pub speed: f32,
    pub opacity: f32,
}

impl RainStreak {
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, viewport: Viewport) -> Self {
        let mut streak = Self {
            position: random_point(rng, viewport),
            length: 0.0,
            speed: 0.0,
            opacity: 0.0,
        };
        streak.redraw(rng);
        streak
    }

    fn redraw<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.length = uniform(rng, ranges::RAIN_LENGTH);
        self.speed = uniform(rng, ranges::RAIN_SPEED);
        self.opacity = uniform(rng, ranges::RAIN_OPACITY);
    }

    pub fn update<R: Rng + ?Sized>(&mut self, ctx: &FrameContext, rng: &mut R) {
        let gust = ctx.phase(0.005).sin() * 0.4;
        self.position.x += gust * ctx.dt;
        self.position.y += self.speed * ctx.dt;

        if self.position.y > ctx.viewport.height {
            self.redraw(rng);
            self.position = Vec2::new(uniform(rng, 0.0..ctx.viewport.width), -self.length);
        }
    }

    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        let [r, g, b] = RAIN_RGB;
        let tail = self.position + Vec2::new(0.0, self.length);
        surface.stroke_gradient_line(
            self.position,
            tail,
            1.0,
            Color::rgba8(r, g, b, 0.0),
            Color::rgba8(r, g, b, self.opacity),
        );
    }
}
