//! Time management for the frame loop.

use std::time::{Duration, Instant};

/// Frame rate the simulation's per-frame velocities are tuned for.
pub const NOMINAL_FRAME_RATE: f32 = 60.0;

/// Upper bound on frame steps applied in a single tick. A window that was
/// hidden or dragged must not teleport particles across the screen.
pub const MAX_FRAME_STEPS: f32 = 3.0;

/// Manages frame timing, delta time and frame pacing for the host loop.
#[derive(Debug)]
pub struct Time {
    /// Time of the last frame.
    last_frame: Instant,
    /// Duration of the last frame.
    delta: Duration,
    /// Frame count since start.
    frame_count: u64,
    /// Minimum spacing between frames, `None` when uncapped.
    frame_interval: Option<Duration>,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(now: Instant) -> Self {
        Self {
            last_frame: now,
            delta: Duration::ZERO,
            frame_count: 0,
            frame_interval: None,
        }
    }

    /// Update timing at the start of a new frame.
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    fn update_at(&mut self, now: Instant) {
        self.delta = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Last frame's delta expressed in nominal 60 Hz frames, clamped to
    /// `[0, MAX_FRAME_STEPS]`. The first frame counts as exactly one step.
    pub fn frame_steps(&self) -> f32 {
        if self.frame_count <= 1 {
            return 1.0;
        }
        (self.delta.as_secs_f32() * NOMINAL_FRAME_RATE).clamp(0.0, MAX_FRAME_STEPS)
    }

    /// Cap the frame rate in Hz. `None` or a non-positive rate removes the cap.
    pub fn set_frame_limit(&mut self, hz: Option<f64>) {
        self.frame_interval = hz
            .filter(|hz| *hz > 0.0)
            .map(|hz| Duration::from_secs_f64(1.0 / hz));
    }

    /// Earliest instant the next frame may run.
    pub fn next_frame_at(&self) -> Instant {
        match self.frame_interval {
            Some(interval) if self.frame_count > 0 => self.last_frame + interval,
            _ => self.last_frame,
        }
    }

    /// Check whether enough time has passed to run another frame.
    pub fn frame_due(&self) -> bool {
        self.frame_due_at(Instant::now())
    }

    fn frame_due_at(&self, now: Instant) -> bool {
        now >= self.next_frame_at()
    }
}

/// Integer frame counter owned by one simulation world.
///
/// Advanced exactly once per loop iteration; every oscillation in the
/// simulation is a function of this value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameClock {
    frame: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one frame and return the new frame number.
    pub fn advance(&mut self) -> u64 {
        self.frame += 1;
        self.frame
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}
