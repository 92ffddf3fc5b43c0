//! World lifecycle: builds, rebuilds and tears down the particle world as
//! inputs change, and routes host events into it.
//!
//! The controller is inert until an analysis with a rain probability arrives
//! and a non-empty surface is attached. Every build gets a fresh generation;
//! frames are run through [`FrameTicket`]s carrying that generation so a
//! frame scheduled by a torn-down world never touches its replacement.

use crate::error::SetupError;
use crate::inputs::{AnalysisInputs, DrivingInputs};
use crate::mode::ModeSelection;
use crate::world::{tick, WorldState};
use engine_core::{DrawSurface, Viewport};
use input::InputPort;

/// Permission to run one frame of a specific world generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTicket {
    generation: u64,
}

impl FrameTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug)]
pub struct WorldController {
    /// Attached surface size; `None` while no surface exists.
    viewport: Option<Viewport>,
    /// Last accepted driving inputs.
    inputs: Option<DrivingInputs>,
    world: Option<WorldState>,
    generation: u64,
    seed: Option<u64>,
    preview: Option<ModeSelection>,
    unmounted: bool,
}

impl Default for WorldController {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldController {
    pub fn new() -> Self {
        Self {
            viewport: None,
            inputs: None,
            world: None,
            generation: 0,
            seed: None,
            preview: None,
            unmounted: false,
        }
    }

    /// Worlds built by this controller draw from a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::new()
        }
    }

    /// Attach a drawing surface of the given size. Builds the world if inputs
    /// are already waiting for one.
    pub fn attach_surface(&mut self, viewport: Viewport) -> Option<FrameTicket> {
        if self.unmounted {
            return None;
        }
        self.viewport = Some(viewport);
        if self.world.is_some() {
            self.on_resize(viewport.width, viewport.height);
            self.frame_ticket()
        } else {
            self.build_current()
        }
    }

    /// Drop the surface and the world drawing into it.
    pub fn detach_surface(&mut self) {
        self.teardown();
        self.viewport = None;
    }

    /// Force a mode for previewing, bypassing mode selection. `None` returns
    /// to the selected mode. Rebuilds when the override changes.
    pub fn set_override(&mut self, preview: Option<ModeSelection>) -> Option<FrameTicket> {
        if self.unmounted {
            return None;
        }
        if self.preview == preview {
            return self.frame_ticket();
        }
        self.preview = preview;
        log::debug!("Preview override set to {:?}", preview);
        self.build_current()
    }

    pub fn preview(&self) -> Option<ModeSelection> {
        self.preview
    }

    /// Accept new inputs. Rebuilds only when season, temperature or rain
    /// probability changed since the last accepted inputs.
    pub fn set_inputs(&mut self, inputs: &AnalysisInputs) -> Option<FrameTicket> {
        if self.unmounted {
            return None;
        }
        let driving = inputs.driving();
        if self.inputs.as_ref() == Some(&driving) {
            log::debug!("Inputs unchanged; keeping world generation {}", self.generation);
            return self.frame_ticket();
        }
        self.rebuild(inputs)
    }

    /// Tear down the current world and build a new one from `inputs`,
    /// unconditionally.
    pub fn rebuild(&mut self, inputs: &AnalysisInputs) -> Option<FrameTicket> {
        if self.unmounted {
            return None;
        }
        self.inputs = Some(inputs.driving());
        self.build_current()
    }

    fn build_current(&mut self) -> Option<FrameTicket> {
        self.teardown();
        let driving = self.inputs.clone()?;
        match self.try_build(&driving) {
            Ok(Some(world)) => {
                self.generation += 1;
                let selection = world.selection();
                log::info!(
                    "World {} built: {} at intensity {} ({} particles)",
                    self.generation,
                    selection.mode,
                    selection.intensity,
                    world.pools().mode.len()
                );
                self.world = Some(world);
                self.frame_ticket()
            }
            Ok(None) => {
                log::debug!("No rain probability yet; backdrop stays blank");
                None
            }
            Err(e) => {
                log::warn!("Backdrop setup skipped: {e}");
                None
            }
        }
    }

    fn try_build(&self, driving: &DrivingInputs) -> Result<Option<WorldState>, SetupError> {
        if !driving.is_active() {
            return Ok(None);
        }
        let viewport = self.viewport.ok_or(SetupError::MissingSurface)?;
        if viewport.is_empty() {
            return Err(SetupError::EmptyViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        let selection = self.preview.unwrap_or_else(|| driving.selection());
        Ok(Some(match self.seed {
            Some(seed) => WorldState::with_seed(selection, viewport, seed),
            None => WorldState::build(selection, viewport),
        }))
    }

    /// Stop the current world. Outstanding tickets become stale.
    pub fn teardown(&mut self) {
        if self.world.take().is_some() {
            log::debug!("World {} torn down", self.generation);
        }
    }

    /// Final shutdown. Every later call is ignored.
    pub fn unmount(&mut self) {
        self.teardown();
        self.unmounted = true;
        log::info!("Backdrop unmounted");
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }

    /// True while a world exists and frames should be scheduled.
    pub fn is_running(&self) -> bool {
        self.world.is_some()
    }

    pub fn world(&self) -> Option<&WorldState> {
        self.world.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Ticket for the next frame of the current world.
    pub fn frame_ticket(&self) -> Option<FrameTicket> {
        self.world.as_ref().map(|_| FrameTicket {
            generation: self.generation,
        })
    }

    /// Run one frame if `ticket` belongs to the live world. Returns the ticket
    /// for the following frame, or `None` when the loop should stop.
    pub fn run_frame(&mut self, ticket: FrameTicket, dt: f32, surface: &mut dyn DrawSurface) -> Option<FrameTicket> {
        if ticket.generation != self.generation {
            log::debug!(
                "Dropping stale frame from world {} (current {})",
                ticket.generation,
                self.generation
            );
            return None;
        }
        let world = self.world.as_mut()?;
        // A minimized surface pauses the world instead of shrinking it.
        if self.viewport.map_or(true, |v| v.is_empty()) {
            return Some(ticket);
        }
        tick(world, dt, surface);
        Some(ticket)
    }
}

impl InputPort for WorldController {
    fn on_pointer_move(&mut self, x: f32, y: f32) {
        if self.unmounted {
            return;
        }
        if let Some(world) = self.world.as_mut() {
            world.pointer_moved(x, y);
        }
    }

    fn on_resize(&mut self, width: f32, height: f32) {
        if self.unmounted || self.viewport.is_none() {
            return;
        }
        let viewport = Viewport::new(width, height);
        self.viewport = Some(viewport);
        if viewport.is_empty() {
            log::debug!("Surface minimized to {}x{}; frames paused", width, height);
            return;
        }
        if let Some(world) = self.world.as_mut() {
            world.set_viewport(viewport);
        } else {
            // A surface that was empty at setup may have grown.
            self.build_current();
        }
    }

    fn on_click(&mut self, x: f32, y: f32) {
        if self.unmounted {
            return;
        }
        if let Some(world) = self.world.as_mut() {
            world.strike(x, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::WeatherMode;
    use engine_core::RecordingSurface;

    const VIEW: Viewport = Viewport::new(800.0, 600.0);

    fn inputs(season: &str, temperature: f64, rain: Option<f64>) -> AnalysisInputs {
        AnalysisInputs {
            rain_probability: rain,
            temperature: Some(temperature),
            season: Some(season.to_string()),
            ..Default::default()
        }
    }

    fn mounted() -> WorldController {
        let mut c = WorldController::with_seed(11);
        c.attach_surface(VIEW);
        c
    }

    #[test]
    fn null_rain_probability_keeps_backdrop_blank() {
        let mut c = mounted();
        assert_eq!(c.set_inputs(&inputs("Summer", 30.0, None)), None);
        assert!(!c.is_running());
        assert_eq!(c.frame_ticket(), None);

        // Events while inert are ignored.
        c.on_pointer_move(10.0, 10.0);
        c.on_click(10.0, 10.0);
        c.on_resize(1024.0, 768.0);
        assert!(c.world().is_none());

        let mut surface = RecordingSurface::new();
        let forged = FrameTicket { generation: c.generation() };
        assert_eq!(c.run_frame(forged, 1.0, &mut surface), None);
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn first_rain_probability_starts_the_loop() {
        let mut c = mounted();
        c.set_inputs(&inputs("Summer", 30.0, None));
        let ticket = c.set_inputs(&inputs("Summer", 30.0, Some(10.0))).expect("world built");
        assert_eq!(c.world().map(|w| w.mode()), Some(WeatherMode::Clear));

        let mut surface = RecordingSurface::new();
        let next = c.run_frame(ticket, 1.0, &mut surface);
        assert_eq!(next, Some(ticket));
        assert!(!surface.is_blank());
    }

    #[test]
    fn unchanged_inputs_do_not_rebuild() {
        let mut c = mounted();
        let first = c.set_inputs(&inputs("Autumn", 12.0, Some(20.0)));
        let generation = c.generation();

        let mut same = inputs("Autumn", 12.0, Some(20.0));
        same.precipitation = Some(3.0);
        assert_eq!(c.set_inputs(&same), first);
        assert_eq!(c.generation(), generation);

        c.set_inputs(&inputs("Autumn", 13.0, Some(20.0)));
        assert_eq!(c.generation(), generation + 1);
    }

    #[test]
    fn explicit_rebuild_always_builds_fresh() {
        let mut c = mounted();
        let a = inputs("Winter", -2.0, Some(50.0));
        c.set_inputs(&a);
        let generation = c.generation();
        c.rebuild(&a);
        assert_eq!(c.generation(), generation + 1);
        assert_eq!(c.world().map(|w| w.frame()), Some(0));
    }

    #[test]
    fn stale_tickets_are_refused() {
        let mut c = mounted();
        let old = c.set_inputs(&inputs("Spring", 10.0, Some(80.0))).expect("rain world");
        let new = c.set_inputs(&inputs("Spring", 10.0, Some(10.0))).expect("windy world");
        assert_ne!(old, new);

        let mut surface = RecordingSurface::new();
        assert_eq!(c.run_frame(old, 1.0, &mut surface), None);
        assert!(surface.commands().is_empty());
        assert_eq!(c.world().map(|w| w.frame()), Some(0));
        assert_eq!(c.run_frame(new, 1.0, &mut surface), Some(new));
        assert_eq!(c.world().map(|w| w.frame()), Some(1));
    }

    #[test]
    fn returning_to_null_tears_down() {
        let mut c = mounted();
        let ticket = c.set_inputs(&inputs("Monsoon", 28.0, Some(90.0))).expect("rain world");
        c.set_inputs(&inputs("Monsoon", 28.0, None));
        assert!(!c.is_running());
        let mut surface = RecordingSurface::new();
        assert_eq!(c.run_frame(ticket, 1.0, &mut surface), None);
    }

    #[test]
    fn unmount_ignores_everything_after() {
        let mut c = mounted();
        let ticket = c.set_inputs(&inputs("Winter", 0.0, Some(40.0))).expect("snow world");
        c.unmount();
        assert!(c.is_unmounted());
        assert_eq!(c.set_inputs(&inputs("Summer", 30.0, Some(5.0))), None);
        assert_eq!(c.attach_surface(VIEW), None);
        let mut surface = RecordingSurface::new();
        assert_eq!(c.run_frame(ticket, 1.0, &mut surface), None);
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn missing_or_empty_surface_aborts_setup() {
        let mut c = WorldController::with_seed(1);
        assert_eq!(c.set_inputs(&inputs("Winter", 0.0, Some(40.0))), None);
        assert!(!c.is_running());

        // Attaching a surface later builds the waiting world.
        assert!(c.attach_surface(Viewport::new(0.0, 0.0)).is_none());
        c.on_resize(640.0, 480.0);
        assert!(c.is_running());
        assert_eq!(c.world().map(|w| w.viewport()), Some(Viewport::new(640.0, 480.0)));
    }

    #[test]
    fn preview_override_reaches_storm() {
        let mut c = mounted();
        c.set_inputs(&inputs("Spring", 15.0, Some(70.0)));
        assert_eq!(c.world().map(|w| w.mode()), Some(WeatherMode::Rain));

        c.set_override(Some(ModeSelection::new(WeatherMode::Storm, 45)));
        assert_eq!(c.world().map(|w| w.mode()), Some(WeatherMode::Storm));
        assert_eq!(c.world().map(|w| w.pools().mode.len()), Some(180));

        c.on_click(300.0, 200.0);
        assert_eq!(c.world().map(|w| w.lightning().total_strikes()), Some(1));

        c.set_override(None);
        assert_eq!(c.world().map(|w| w.mode()), Some(WeatherMode::Rain));
    }

    #[test]
    fn resize_and_pointer_reach_the_world() {
        let mut c = mounted();
        c.set_inputs(&inputs("Dry", 35.0, Some(5.0)));
        let generation = c.generation();
        c.on_pointer_move(120.0, 80.0);
        c.on_resize(1920.0, 1080.0);
        let world = c.world().expect("windy world");
        assert_eq!(world.pointer(), Some(glam::Vec2::new(120.0, 80.0)));
        assert_eq!(world.viewport(), Viewport::new(1920.0, 1080.0));
        assert_eq!(c.generation(), generation);
    }

    #[test]
    fn minimize_and_restore_keeps_particles_in_place() {
        let mut c = mounted();
        let ticket = c.set_inputs(&inputs("Winter", 0.0, Some(40.0))).expect("snow world");
        let mut surface = RecordingSurface::new();
        for _ in 0..10 {
            c.run_frame(ticket, 1.0, &mut surface);
        }
        let before = c.world().map(|w| w.pools().mode.positions()).expect("snow world");
        let frame = c.world().map(|w| w.frame());

        c.on_resize(0.0, 0.0);
        for _ in 0..60 {
            assert_eq!(c.run_frame(ticket, 1.0, &mut surface), Some(ticket));
        }
        let world = c.world().expect("world survives a minimize");
        assert_eq!(world.frame(), frame.unwrap_or_default());
        assert_eq!(world.viewport(), VIEW);
        assert_eq!(world.pools().mode.positions(), before);

        c.on_resize(800.0, 600.0);
        for _ in 0..60 {
            c.run_frame(ticket, 1.0, &mut surface);
        }
        let positions = c.world().map(|w| w.pools().mode.positions()).expect("snow world");
        let cornered = positions.iter().filter(|p| p.x.abs() < 10.0 && p.y < 10.0).count();
        assert!(cornered < 20, "{cornered} of {} flakes at the origin", positions.len());
    }

    #[test]
    fn detached_surface_stops_the_world() {
        let mut c = mounted();
        let ticket = c.set_inputs(&inputs("Autumn", 12.0, Some(20.0))).expect("leaf world");
        c.detach_surface();
        assert!(!c.is_running());
        let mut surface = RecordingSurface::new();
        assert_eq!(c.run_frame(ticket, 1.0, &mut surface), None);
        // No surface: new inputs wait instead of building.
        assert_eq!(c.set_inputs(&inputs("Autumn", 14.0, Some(20.0))), None);
        c.on_resize(800.0, 600.0);
        assert!(!c.is_running());
        assert!(c.attach_surface(VIEW).is_some());
    }

    #[test]
    fn events_after_unmount_are_ignored() {
        let mut c = mounted();
        c.set_override(Some(ModeSelection::new(WeatherMode::Storm, 45)));
        c.set_inputs(&inputs("Spring", 15.0, Some(70.0)));
        c.unmount();
        c.on_pointer_move(5.0, 5.0);
        c.on_click(5.0, 5.0);
        c.on_resize(1024.0, 768.0);
        assert!(c.world().is_none());
        assert!(!c.is_running());
    }
}
