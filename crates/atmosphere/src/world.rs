//! One running particle world and the per-frame update/draw pass.

use crate::lightning::LightningField;
use crate::mode::{ModeSelection, WeatherMode};
use crate::particles::{FrameContext, ParticlePools};
use engine_core::{DrawSurface, FrameClock, Viewport, MAX_FRAME_STEPS};
use glam::Vec2;
use input::PointerState;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Everything one world owns: pools, bolts, clock, pointer and viewport.
#[derive(Debug, Clone)]
pub struct WorldState {
    selection: ModeSelection,
    pools: ParticlePools,
    lightning: LightningField,
    clock: FrameClock,
    pointer: PointerState,
    viewport: Viewport,
    rng: StdRng,
}

impl WorldState {
    /// Build a world seeded from system entropy.
    pub fn build(selection: ModeSelection, viewport: Viewport) -> Self {
        Self::from_rng(selection, viewport, StdRng::from_entropy())
    }

    /// Build a reproducible world.
    pub fn with_seed(selection: ModeSelection, viewport: Viewport, seed: u64) -> Self {
        Self::from_rng(selection, viewport, StdRng::seed_from_u64(seed))
    }

    fn from_rng(selection: ModeSelection, viewport: Viewport, mut rng: StdRng) -> Self {
        let pools = ParticlePools::build(selection, viewport, &mut rng);
        Self {
            selection,
            pools,
            lightning: LightningField::new(),
            clock: FrameClock::new(),
            pointer: PointerState::new(),
            viewport,
            rng,
        }
    }

    pub fn selection(&self) -> ModeSelection {
        self.selection
    }

    pub fn mode(&self) -> WeatherMode {
        self.selection.mode
    }

    pub fn pools(&self) -> &ParticlePools {
        &self.pools
    }

    pub fn lightning(&self) -> &LightningField {
        &self.lightning
    }

    /// Frames run so far.
    pub fn frame(&self) -> u64 {
        self.clock.frame()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer.position()
    }

    /// New recycle bounds. Particles stay where they are; empty sizes are
    /// ignored.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            return;
        }
        self.viewport = viewport;
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer.set(x, y);
    }

    /// Strike lightning at a point. Only modes with lightning accept it, and
    /// the bolt never reaches below the viewport.
    pub fn strike(&mut self, x: f32, y: f32) -> bool {
        if !self.mode().has_lightning() || !x.is_finite() || !y.is_finite() {
            return false;
        }
        let y = y.clamp(0.0, self.viewport.height.max(0.0));
        let now = self.clock.frame();
        self.lightning.strike(Vec2::new(x, y), now, &mut self.rng);
        true
    }

    fn context(&self, dt: f32) -> FrameContext {
        FrameContext {
            time: self.clock.frame(),
            dt,
            viewport: self.viewport,
            pointer: self.pointer.position(),
        }
    }
}

/// Advance the world one frame. `dt` is in nominal 60 Hz frames.
pub fn update(state: &mut WorldState, dt: f32) {
    let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_STEPS) } else { 1.0 };
    let now = state.clock.advance();
    let ctx = state.context(dt);
    let mode = state.mode();

    state.pools.update(mode, &ctx, &mut state.rng);
    state.lightning.purge(now);
}

/// Draw the world as of its current frame: clear, then sun, fog, wind, the
/// mode's particles and lightning.
pub fn draw(state: &WorldState, surface: &mut dyn DrawSurface) {
    surface.clear();
    let ctx = state.context(0.0);
    state.pools.draw(state.mode(), &ctx, surface);
    state.lightning.draw(ctx.time, surface);
}

/// Roll for a spontaneous strike in modes with lightning. Returns true when a
/// bolt was added.
pub fn roll_lightning(state: &mut WorldState) -> bool {
    if !state.mode().has_lightning() {
        return false;
    }
    let now = state.clock.frame();
    state.lightning.maybe_spawn(state.viewport, now, &mut state.rng)
}

/// One loop iteration. A spontaneous bolt is rolled after drawing, so it is
/// first seen on the following frame.
pub fn tick(state: &mut WorldState, dt: f32, surface: &mut dyn DrawSurface) {
    update(state, dt);
    draw(state, surface);
    roll_lightning(state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::select_mode;
    use engine_core::{DrawCommand, RecordingSurface};

    const VIEW: Viewport = Viewport::new(800.0, 600.0);

    #[test]
    fn deep_winter_snows_without_lightning() {
        let selection = select_mode(Some("Deep Winter"), Some(2.0), Some(70.0));
        let mut world = WorldState::with_seed(selection, VIEW, 1);
        assert_eq!(world.mode(), WeatherMode::Snow);
        assert_eq!(world.pools().mode.len(), 180);

        let mut surface = RecordingSurface::new();
        for _ in 0..2_000 {
            tick(&mut world, 1.0, &mut surface);
            assert!(!world.strike(400.0, 300.0));
        }
        assert_eq!(world.lightning().total_strikes(), 0);
        assert_eq!(surface.count_matching(|c| matches!(c, DrawCommand::Polyline { .. })), 0);
    }

    #[test]
    fn bolt_fades_and_is_removed_after_twenty_frames() {
        let mut world = WorldState::with_seed(ModeSelection::new(WeatherMode::Storm, 45), VIEW, 2);
        for _ in 0..5 {
            update(&mut world, 1.0);
        }
        let created = world.frame();
        assert!(world.strike(200.0, 300.0));
        let bolt = world
            .lightning()
            .bolts()
            .iter()
            .find(|b| b.created_at == created)
            .cloned()
            .expect("click bolt recorded");
        assert_eq!(bolt.opacity(created), 1.0);
        assert_eq!(bolt.opacity(created + 10), 0.5);

        for _ in 0..20 {
            update(&mut world, 1.0);
        }
        assert_eq!(world.frame(), created + 20);
        assert!(!world.lightning().bolts().contains(&bolt));
    }

    #[test]
    fn resize_keeps_positions_and_moves_recycle_bounds() {
        let mut world = WorldState::with_seed(ModeSelection::new(WeatherMode::Snow, 45), VIEW, 3);
        for _ in 0..30 {
            update(&mut world, 1.0);
        }
        let before = world.pools().mode.positions();
        let wind_before: Vec<_> = world.pools().wind.iter().map(|w| w.position).collect();

        world.set_viewport(Viewport::new(1920.0, 1080.0));
        assert_eq!(world.pools().mode.positions(), before);
        assert_eq!(world.pools().mode.len(), 180);
        assert_eq!(world.pools().wind.iter().map(|w| w.position).collect::<Vec<_>>(), wind_before);

        // Flakes now fall past the old 600 px bound without recycling.
        for _ in 0..600 {
            update(&mut world, 1.0);
        }
        let positions = world.pools().mode.positions();
        assert!(positions.iter().any(|p| p.y > 600.0));
        assert!(positions.iter().all(|p| p.y <= 1080.0));
    }

    #[test]
    fn every_mode_keeps_pool_size_through_ticks() {
        for mode in WeatherMode::ALL {
            let selection = ModeSelection::new(mode, 30);
            let mut world = WorldState::with_seed(selection, VIEW, 4);
            let mut surface = RecordingSurface::new();
            for _ in 0..300 {
                tick(&mut world, 1.0, &mut surface);
                surface.take();
            }
            let expected = match mode {
                WeatherMode::Clear | WeatherMode::Windy => 0,
                _ => selection.particle_count(),
            };
            assert_eq!(world.pools().mode.len(), expected);
        }
    }

    #[test]
    fn draw_clears_first_and_is_repeatable() {
        let mut world = WorldState::with_seed(ModeSelection::new(WeatherMode::Fog, 35), VIEW, 5);
        update(&mut world, 1.0);
        let mut a = RecordingSurface::new();
        let mut b = RecordingSurface::new();
        draw(&world, &mut a);
        draw(&world, &mut b);
        assert_eq!(a.commands()[0], DrawCommand::Clear);
        assert_eq!(a.commands(), b.commands());
        // 40 fog banks plus 140 mist wisps.
        assert_eq!(a.count_matching(|c| matches!(c, DrawCommand::Radial { .. })), 180);
    }

    #[test]
    fn clock_advances_once_per_update() {
        let mut world = WorldState::with_seed(ModeSelection::default(), VIEW, 6);
        assert_eq!(world.frame(), 0);
        update(&mut world, 1.0);
        update(&mut world, 3.0);
        assert_eq!(world.frame(), 2);
    }

    #[test]
    fn pointer_is_absent_until_moved() {
        let mut world = WorldState::with_seed(ModeSelection::default(), VIEW, 7);
        assert_eq!(world.pointer(), None);
        world.pointer_moved(10.0, 20.0);
        assert_eq!(world.pointer(), Some(Vec2::new(10.0, 20.0)));
    }

    #[test]
    fn oversized_or_bad_steps_are_clamped() {
        let mut a = WorldState::with_seed(ModeSelection::new(WeatherMode::Rain, 40), VIEW, 8);
        let mut b = a.clone();
        update(&mut a, 50.0);
        update(&mut b, MAX_FRAME_STEPS);
        assert_eq!(a.pools().mode.positions(), b.pools().mode.positions());

        let mut c = WorldState::with_seed(ModeSelection::new(WeatherMode::Rain, 40), VIEW, 8);
        let mut d = c.clone();
        update(&mut c, f32::NAN);
        update(&mut d, 1.0);
        assert_eq!(c.pools().mode.positions(), d.pools().mode.positions());
    }

    #[test]
    fn bad_click_coordinates_are_contained() {
        let mut world = WorldState::with_seed(ModeSelection::new(WeatherMode::Storm, 45), VIEW, 9);
        assert!(!world.strike(f32::NAN, 100.0));
        assert!(!world.strike(100.0, f32::INFINITY));
        assert!(world.lightning().is_empty());

        assert!(world.strike(100.0, 1e30));
        let bottom = world.lightning().bolts()[0].main_branch().last().map(|p| p.y);
        assert!(bottom.map_or(false, |y| (600.0..680.0).contains(&y)), "{bottom:?}");
    }

    #[test]
    fn empty_viewport_is_ignored() {
        let mut world = WorldState::with_seed(ModeSelection::new(WeatherMode::Snow, 45), VIEW, 10);
        world.set_viewport(Viewport::new(0.0, 0.0));
        assert_eq!(world.viewport(), VIEW);
    }

    #[test]
    fn spontaneous_bolt_first_drawn_next_frame() {
        let mut world = WorldState::with_seed(ModeSelection::new(WeatherMode::Storm, 45), VIEW, 11);
        let mut spawned = false;
        for _ in 0..5_000 {
            let was_empty = world.lightning().is_empty();
            let mut surface = RecordingSurface::new();
            tick(&mut world, 1.0, &mut surface);
            if was_empty && !world.lightning().is_empty() {
                assert_eq!(surface.count_matching(|c| matches!(c, DrawCommand::Polyline { .. })), 0);
                let bolt = world.lightning().bolts()[0].clone();
                assert_eq!(bolt.created_at, world.frame());

                let mut next = RecordingSurface::new();
                tick(&mut world, 1.0, &mut next);
                assert!((bolt.opacity(world.frame()) - 0.95).abs() < 1e-6);
                assert!(next.count_matching(|c| matches!(c, DrawCommand::Polyline { .. })) > 0);
                spawned = true;
                break;
            }
        }
        assert!(spawned);
    }
}
