//! Procedural lightning: branching polylines that fade over a fixed number of
//! frames.

use crate::particles::uniform;
use engine_core::{Color, DrawSurface, Glow, Viewport};
use glam::Vec2;
use rand::Rng;
use std::ops::Range;

/// Frames a bolt takes to fade from full opacity to nothing.
pub const BOLT_LIFETIME: u64 = 20;
/// Per-frame chance of a spontaneous strike in storm mode.
pub const SPONTANEOUS_CHANCE: f64 = 0.005;
/// Chance that an interior point of the main branch forks.
pub const FORK_CHANCE: f64 = 0.4;
/// Segments per side branch.
pub const FORK_SEGMENTS: usize = 3;

/// Upper bound on main branch steps; enough for an 8K-tall viewport.
pub const MAX_MAIN_STEPS: usize = 128;

const MAIN_STEP_Y: Range<f32> = 40.0..80.0;
const MAIN_JITTER_X: Range<f32> = -80.0..80.0;
const FORK_STEP_Y: Range<f32> = 20.0..40.0;
const FORK_STEP_X: Range<f32> = 30.0..60.0;
/// Spontaneous strikes end between these fractions of the viewport height.
const SPONTANEOUS_DEPTH: Range<f32> = 0.4..0.9;

const MAIN_WIDTH: f32 = 2.5;
const FORK_WIDTH: f32 = 1.2;

/// A single lightning strike. `branches[0]` is the main branch.
#[derive(Debug, Clone, PartialEq)]
pub struct LightningBolt {
    pub branches: Vec<Vec<Vec2>>,
    pub created_at: u64,
}

impl LightningBolt {
    /// Build a bolt descending from the top edge at `x` down to at least
    /// `target_y`, or until [`MAX_MAIN_STEPS`] steps have been taken.
    pub fn strike<R: Rng + ?Sized>(x: f32, target_y: f32, created_at: u64, rng: &mut R) -> Self {
        let mut point = Vec2::new(x, 0.0);
        let mut main = vec![point];
        for _ in 0..MAX_MAIN_STEPS {
            point.y += uniform(rng, MAIN_STEP_Y);
            point.x += uniform(rng, MAIN_JITTER_X);
            main.push(point);
            if point.y >= target_y || target_y.is_nan() {
                break;
            }
        }

        let mut branches = Vec::with_capacity(1 + main.len() / 2);
        let interior = main.len().saturating_sub(1);
        for &start in main.iter().take(interior).skip(1) {
            if !rng.gen_bool(FORK_CHANCE) {
                continue;
            }
            let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            let mut at = start;
            let mut fork = vec![at];
            for _ in 0..FORK_SEGMENTS {
                at.y += uniform(rng, FORK_STEP_Y);
                at.x += direction * uniform(rng, FORK_STEP_X);
                fork.push(at);
            }
            branches.push(fork);
        }
        branches.insert(0, main);

        Self { branches, created_at }
    }

    pub fn main_branch(&self) -> &[Vec2] {
        &self.branches[0]
    }

    pub fn side_branches(&self) -> &[Vec<Vec2>] {
        &self.branches[1..]
    }

    pub fn age(&self, now: u64) -> u64 {
        now.saturating_sub(self.created_at)
    }

    /// Linear fade: 1 at creation, 0 after [`BOLT_LIFETIME`] frames.
    pub fn opacity(&self, now: u64) -> f32 {
        (1.0 - self.age(now) as f32 / BOLT_LIFETIME as f32).max(0.0)
    }

    pub fn is_spent(&self, now: u64) -> bool {
        self.age(now) >= BOLT_LIFETIME
    }

    pub fn draw(&self, now: u64, surface: &mut dyn DrawSurface) {
        let opacity = self.opacity(now);
        if opacity <= 0.0 {
            return;
        }
        let color = Color::rgba8(220, 230, 255, opacity);
        let glow = Glow {
            blur: 15.0 * opacity,
            color: Color::rgba8(180, 200, 255, opacity * 0.6),
        };
        for (i, branch) in self.branches.iter().enumerate() {
            let width = if i == 0 { MAIN_WIDTH } else { FORK_WIDTH };
            surface.stroke_polyline(branch, width, color, Some(glow));
        }
    }
}

/// Live bolts of one world.
#[derive(Debug, Clone, Default)]
pub struct LightningField {
    bolts: Vec<LightningBolt>,
    strikes: u64,
}

impl LightningField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strike at a point: the bolt starts above `at.x` and reaches `at.y`.
    pub fn strike<R: Rng + ?Sized>(&mut self, at: Vec2, now: u64, rng: &mut R) {
        self.bolts.push(LightningBolt::strike(at.x, at.y, now, rng));
        self.strikes += 1;
        log::debug!("Lightning strike at ({:.0}, {:.0}), frame {}", at.x, at.y, now);
    }

    /// Roll for a spontaneous strike somewhere in `viewport`.
    pub fn maybe_spawn<R: Rng + ?Sized>(&mut self, viewport: Viewport, now: u64, rng: &mut R) -> bool {
        if !rng.gen_bool(SPONTANEOUS_CHANCE) {
            return false;
        }
        let x = uniform(rng, 0.0..viewport.width);
        let y = uniform(rng, SPONTANEOUS_DEPTH) * viewport.height;
        self.strike(Vec2::new(x, y), now, rng);
        true
    }

    /// Drop fully faded bolts.
    pub fn purge(&mut self, now: u64) {
        self.bolts.retain(|b| !b.is_spent(now));
    }

    pub fn draw(&self, now: u64, surface: &mut dyn DrawSurface) {
        for bolt in &self.bolts {
            bolt.draw(now, surface);
        }
    }

    pub fn bolts(&self) -> &[LightningBolt] {
        &self.bolts
    }

    pub fn len(&self) -> usize {
        self.bolts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bolts.is_empty()
    }

    /// Strikes generated since the field was created, including purged ones.
    pub fn total_strikes(&self) -> u64 {
        self.strikes
    }
}
