//! Frame clock for driving the simulation.
//!
//! The simulation never reads the wall clock itself; the caller measures
//! how long the last frame took and passes that to
//! [`Simulation::tick`](crate::Simulation::tick). [`Clock`] does the
//! measuring. Time scaling belongs to [`FlockConfig`](crate::FlockConfig),
//! so the clock reports unscaled seconds.
//!
//! # Example
//!
//! ```ignore
//! let mut clock = Clock::new();
//! loop {
//!     if let Some(delta) = clock.advance() {
//!         sim.tick(delta, camera)?;
//!     }
//!     render(sim.agents());
//! }
//! ```

use std::time::{Duration, Instant};

/// Longest frame the clock will report.
///
/// A stall (debugger, window drag) would otherwise hand the integrator
/// one enormous step.
pub const MAX_FRAME: f32 = 0.25;

/// Measures per-frame delta time.
#[derive(Debug)]
pub struct Clock {
    start: Instant,
    last_frame: Instant,
    /// Duration spent paused, excluded from `elapsed`.
    paused_for: Duration,
    delta_secs: f32,
    frame_count: u64,
    paused: bool,
    fixed_delta: Option<f32>,
}

impl Clock {
    /// Start a clock now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            paused_for: Duration::ZERO,
            delta_secs: 0.0,
            frame_count: 0,
            paused: false,
            fixed_delta: None,
        }
    }

    /// Mark a new frame and return the seconds since the previous one.
    ///
    /// Returns `None` while paused or when no measurable time has passed,
    /// since a tick needs a positive delta.
    pub fn advance(&mut self) -> Option<f32> {
        let now = Instant::now();
        if self.paused {
            self.delta_secs = 0.0;
            return None;
        }

        let raw = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.delta_secs = self.fixed_delta.unwrap_or(raw.min(MAX_FRAME));
        self.frame_count += 1;

        (self.delta_secs > 0.0).then_some(self.delta_secs)
    }

    /// Delta reported by the last [`advance`](Self::advance).
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Frames advanced so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Unpaused wall time since the clock started.
    pub fn elapsed(&self) -> Duration {
        let end = if self.paused { self.last_frame } else { Instant::now() };
        end.duration_since(self.start).saturating_sub(self.paused_for)
    }

    /// Whether the clock is paused.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop reporting deltas.
    pub fn pause(&mut self) {
        if !self.paused {
            self.last_frame = Instant::now();
            self.paused = true;
        }
    }

    /// Resume after [`pause`](Self::pause); the paused span is not reported.
    pub fn resume(&mut self) {
        if self.paused {
            let now = Instant::now();
            self.paused_for += now.duration_since(self.last_frame);
            self.last_frame = now;
            self.paused = false;
        }
    }

    /// Report `delta` every frame regardless of wall time, or `None` for real timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
