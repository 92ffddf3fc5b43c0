//! Particle pools: allocation, per-frame motion, recycling and drawing.
//!
//! Every pool is sized once when a world is built and then recycled in
//! place. A particle that leaves its boundary is moved back to the opposite
//! edge with its secondary attributes redrawn from the same ranges it was
//! created with; nothing is ever pushed or popped after build.

mod ambient;
mod falling;

pub use ambient::{pointer_force, FogBlob, FogKind, SunRay, WindStreak, POINTER_RADIUS};
pub use falling::{Leaf, RainStreak, Snowflake, LEAF_COLORS};

use crate::mode::{ModeSelection, WeatherMode};
use engine_core::{DrawSurface, Viewport};
use glam::Vec2;
use rand::Rng;
use std::ops::Range;

/// Wind streaks built for every world.
pub const WIND_STREAKS: usize = 30;
/// Fog banks built for every world.
pub const FOG_BLOBS: usize = 40;
/// Sun rays built for every world.
pub const SUN_RAYS: usize = 12;

/// Uniform ranges every random particle attribute is drawn from.
/// Distances are logical pixels, speeds are pixels per nominal frame.
pub mod ranges {
    use std::f32::consts::TAU;
    use std::ops::Range;

    pub const SNOW_RADIUS: Range<f32> = 2.0..5.0;
    pub const SNOW_SPEED: Range<f32> = 0.5..1.5;
    pub const SNOW_DRIFT: Range<f32> = -0.5..0.5;
    pub const SNOW_OPACITY: Range<f32> = 0.4..0.9;

    pub const LEAF_RADIUS: Range<f32> = 3.0..7.0;
    pub const LEAF_SPEED: Range<f32> = 0.6..1.6;
    pub const LEAF_DRIFT: Range<f32> = -0.8..0.8;
    pub const LEAF_ROTATION: Range<f32> = 0.0..TAU;
    pub const LEAF_SPIN: Range<f32> = -0.05..0.05;
    pub const LEAF_OPACITY: Range<f32> = 0.6..1.0;

    pub const RAIN_LENGTH: Range<f32> = 15.0..40.0;
    pub const RAIN_SPEED: Range<f32> = 6.0..10.0;
    pub const RAIN_OPACITY: Range<f32> = 0.15..0.5;

    pub const WIND_LENGTH: Range<f32> = 60.0..160.0;
    pub const WIND_SPEED_X: Range<f32> = 2.0..5.0;
    pub const WIND_SPEED_Y: Range<f32> = -0.3..0.3;
    pub const WIND_OPACITY: Range<f32> = 0.04..0.16;

    pub const FOG_RADIUS: Range<f32> = 100.0..250.0;
    pub const FOG_DRIFT_X: Range<f32> = -0.1..0.1;
    pub const FOG_DRIFT_Y: Range<f32> = -0.05..0.05;
    pub const FOG_OPACITY: Range<f32> = 0.04..0.16;

    pub const MIST_RADIUS: Range<f32> = 30.0..80.0;
    pub const MIST_DRIFT_X: Range<f32> = -0.3..0.3;
    pub const MIST_DRIFT_Y: Range<f32> = -0.1..0.1;
    pub const MIST_OPACITY: Range<f32> = 0.03..0.10;

    pub const SUN_RAY_ANGLE: Range<f32> = 0.0..TAU;
    pub const SUN_RAY_LENGTH: Range<f32> = 180.0..420.0;
    pub const SUN_RAY_OPACITY: Range<f32> = 0.04..0.12;
}

/// Draw from `range`, tolerating an empty range (zero-sized viewport).
pub(crate) fn uniform<R: Rng + ?Sized>(rng: &mut R, range: Range<f32>) -> f32 {
    if range.start < range.end {
        rng.gen_range(range)
    } else {
        range.start
    }
}

/// Per-frame values every particle update reads.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    /// Current world clock frame.
    pub time: u64,
    /// Frame step in nominal frames (1.0 at 60 fps).
    pub dt: f32,
    pub viewport: Viewport,
    pub pointer: Option<Vec2>,
}

impl FrameContext {
    /// Clock value scaled by `rate`, the argument of every sway term.
    pub fn phase(&self, rate: f32) -> f32 {
        self.time as f32 * rate
    }
}

/// The pool that belongs to the active mode.
#[derive(Debug, Clone)]
pub enum ModeParticles {
    None,
    Snow(Vec<Snowflake>),
    Leaves(Vec<Leaf>),
    Rain(Vec<RainStreak>),
    Mist(Vec<FogBlob>),
}

impl ModeParticles {
    /// Allocate `selection.particle_count()` particles for the mode. Clear and
    /// windy carry no mode-specific particles.
    pub fn build<R: Rng + ?Sized>(selection: ModeSelection, viewport: Viewport, rng: &mut R) -> Self {
        let count = selection.particle_count();
        match selection.mode {
            WeatherMode::Clear | WeatherMode::Windy => ModeParticles::None,
            WeatherMode::Snow => {
                ModeParticles::Snow((0..count).map(|_| Snowflake::spawn(rng, viewport)).collect())
            }
            WeatherMode::Leaves => {
                ModeParticles::Leaves((0..count).map(|_| Leaf::spawn(rng, viewport)).collect())
            }
            WeatherMode::Rain | WeatherMode::Storm => {
                ModeParticles::Rain((0..count).map(|_| RainStreak::spawn(rng, viewport)).collect())
            }
            WeatherMode::Fog => ModeParticles::Mist(
                (0..count).map(|_| FogBlob::spawn(FogKind::Mist, rng, viewport)).collect(),
            ),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ModeParticles::None => 0,
            ModeParticles::Snow(p) => p.len(),
            ModeParticles::Leaves(p) => p.len(),
            ModeParticles::Rain(p) => p.len(),
            ModeParticles::Mist(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Positions of every particle in the pool, in pool order.
    pub fn positions(&self) -> Vec<Vec2> {
        match self {
            ModeParticles::None => Vec::new(),
            ModeParticles::Snow(p) => p.iter().map(|s| s.position).collect(),
            ModeParticles::Leaves(p) => p.iter().map(|l| l.position).collect(),
            ModeParticles::Rain(p) => p.iter().map(|r| r.position).collect(),
            ModeParticles::Mist(p) => p.iter().map(|m| m.position).collect(),
        }
    }

    pub fn update<R: Rng + ?Sized>(&mut self, ctx: &FrameContext, rng: &mut R) {
        match self {
            ModeParticles::None => {}
            ModeParticles::Snow(p) => p.iter_mut().for_each(|s| s.update(ctx, rng)),
            ModeParticles::Leaves(p) => p.iter_mut().for_each(|l| l.update(ctx, rng)),
            ModeParticles::Rain(p) => p.iter_mut().for_each(|r| r.update(ctx, rng)),
            ModeParticles::Mist(p) => p.iter_mut().for_each(|m| m.update(ctx, rng)),
        }
    }

    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        match self {
            ModeParticles::None => {}
            ModeParticles::Snow(p) => p.iter().for_each(|s| s.draw(surface)),
            ModeParticles::Leaves(p) => p.iter().for_each(|l| l.draw(surface)),
            ModeParticles::Rain(p) => p.iter().for_each(|r| r.draw(surface)),
            ModeParticles::Mist(p) => p.iter().for_each(|m| m.draw(surface)),
        }
    }
}

/// All particle pools of one world.
#[derive(Debug, Clone)]
pub struct ParticlePools {
    pub mode: ModeParticles,
    pub wind: Vec<WindStreak>,
    pub fog: Vec<FogBlob>,
    pub sun_rays: Vec<SunRay>,
}

impl ParticlePools {
    /// Build the mode pool plus the shared wind, fog and sun-ray pools. The
    /// shared pools exist for every mode and are only drawn when the mode
    /// asks for that layer.
    pub fn build<R: Rng + ?Sized>(selection: ModeSelection, viewport: Viewport, rng: &mut R) -> Self {
        let mode = ModeParticles::build(selection, viewport, rng);
        let wind = (0..WIND_STREAKS).map(|_| WindStreak::spawn(rng, viewport)).collect();
        let fog = (0..FOG_BLOBS)
            .map(|_| FogBlob::spawn(FogKind::Bank, rng, viewport))
            .collect();
        let sun_rays = (0..SUN_RAYS).map(|_| SunRay::spawn(rng)).collect();
        Self {
            mode,
            wind,
            fog,
            sun_rays,
        }
    }

    /// Advance the layers `mode` shows. Hidden layers stay frozen.
    pub fn update<R: Rng + ?Sized>(&mut self, mode: WeatherMode, ctx: &FrameContext, rng: &mut R) {
        if mode.draws_sun_rays() {
            self.sun_rays.iter_mut().for_each(|r| r.update(ctx));
        }
        if mode.draws_fog() {
            self.fog.iter_mut().for_each(|f| f.update(ctx, rng));
        }
        if mode.draws_wind() {
            self.wind.iter_mut().for_each(|w| w.update(ctx, rng));
        }
        self.mode.update(ctx, rng);
    }

    /// Draw the layers `mode` shows, back to front: sun, fog, wind, then the
    /// mode's own particles.
    pub fn draw(&self, mode: WeatherMode, ctx: &FrameContext, surface: &mut dyn DrawSurface) {
        if mode.draws_sun_rays() {
            SunRay::draw_glow(ctx, surface);
            self.sun_rays
                .iter()
                .enumerate()
                .for_each(|(i, r)| r.draw(i, ctx, surface));
        }
        if mode.draws_fog() {
            self.fog.iter().for_each(|f| f.draw(surface));
        }
        if mode.draws_wind() {
            self.wind.iter().for_each(|w| w.draw(surface));
        }
        self.mode.draw(surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{DrawCommand, RecordingSurface};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn build(mode: WeatherMode, intensity: u32) -> ParticlePools {
        let mut rng = StdRng::seed_from_u64(7);
        ParticlePools::build(ModeSelection::new(mode, intensity), Viewport::new(800.0, 600.0), &mut rng)
    }

    fn ctx(time: u64) -> FrameContext {
        FrameContext {
            time,
            dt: 1.0,
            viewport: Viewport::new(800.0, 600.0),
            pointer: None,
        }
    }

    #[test]
    fn mode_pool_is_four_per_intensity_point() {
        assert_eq!(build(WeatherMode::Snow, 45).mode.len(), 180);
        assert_eq!(build(WeatherMode::Leaves, 40).mode.len(), 160);
        assert_eq!(build(WeatherMode::Rain, 40).mode.len(), 160);
        assert_eq!(build(WeatherMode::Storm, 45).mode.len(), 180);
        assert_eq!(build(WeatherMode::Fog, 35).mode.len(), 140);
    }

    #[test]
    fn clear_and_windy_have_no_mode_particles() {
        assert!(build(WeatherMode::Clear, 25).mode.is_empty());
        assert!(build(WeatherMode::Windy, 30).mode.is_empty());
    }

    #[test]
    fn shared_pools_are_always_built() {
        for mode in WeatherMode::ALL {
            let pools = build(mode, 30);
            assert_eq!(pools.wind.len(), WIND_STREAKS);
            assert_eq!(pools.fog.len(), FOG_BLOBS);
            assert_eq!(pools.sun_rays.len(), SUN_RAYS);
        }
    }

    #[test]
    fn initial_attributes_stay_in_range() {
        let pools = build(WeatherMode::Snow, 45);
        let ModeParticles::Snow(flakes) = &pools.mode else {
            panic!("snow mode builds snowflakes");
        };
        for f in flakes {
            assert!(ranges::SNOW_RADIUS.contains(&f.radius));
            assert!(ranges::SNOW_SPEED.contains(&f.speed));
            assert!(ranges::SNOW_DRIFT.contains(&f.drift));
            assert!((0.0..800.0).contains(&f.position.x));
            assert!((0.0..600.0).contains(&f.position.y));
        }
        for w in &pools.wind {
            assert!(ranges::WIND_LENGTH.contains(&w.length));
            assert!(ranges::WIND_SPEED_X.contains(&w.speed_x));
        }
    }

    #[test]
    fn pool_sizes_never_change_while_running() {
        let mut pools = build(WeatherMode::Rain, 40);
        let mut rng = StdRng::seed_from_u64(11);
        for t in 1..=600 {
            pools.update(WeatherMode::Rain, &ctx(t), &mut rng);
        }
        assert_eq!(pools.mode.len(), 160);
        assert_eq!(pools.fog.len(), FOG_BLOBS);
        assert_eq!(pools.wind.len(), WIND_STREAKS);
    }

    #[test]
    fn hidden_layers_do_not_move() {
        let mut pools = build(WeatherMode::Snow, 45);
        let wind_before: Vec<_> = pools.wind.iter().map(|w| w.position).collect();
        let fog_before: Vec<_> = pools.fog.iter().map(|f| f.position).collect();
        let mut rng = StdRng::seed_from_u64(3);
        pools.update(WeatherMode::Snow, &ctx(1), &mut rng);
        assert_eq!(wind_before, pools.wind.iter().map(|w| w.position).collect::<Vec<_>>());
        assert_eq!(fog_before, pools.fog.iter().map(|f| f.position).collect::<Vec<_>>());
    }

    #[test]
    fn draw_order_is_sun_fog_wind_mode() {
        let pools = build(WeatherMode::Clear, 25);
        let mut surface = RecordingSurface::new();
        pools.draw(WeatherMode::Clear, &ctx(1), &mut surface);
        let cmds = surface.commands();
        // Sun glow, 12 rays, 30 wind streaks, nothing else.
        assert_eq!(cmds.len(), 1 + SUN_RAYS + WIND_STREAKS);
        assert!(matches!(cmds[0], DrawCommand::Radial { .. }));
        assert!(cmds[1..].iter().all(|c| matches!(c, DrawCommand::GradientLine { .. })));

        let pools = build(WeatherMode::Rain, 40);
        let mut surface = RecordingSurface::new();
        pools.draw(WeatherMode::Rain, &ctx(1), &mut surface);
        let cmds = surface.commands();
        assert_eq!(cmds.len(), FOG_BLOBS + 160);
        assert!(cmds[..FOG_BLOBS].iter().all(|c| matches!(c, DrawCommand::Radial { .. })));
        assert!(cmds[FOG_BLOBS..].iter().all(|c| matches!(c, DrawCommand::GradientLine { .. })));
    }
}
