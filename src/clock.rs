//! Frame clocks supplying the `dt` fed into the world each frame.

use std::sync::LazyLock;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, MutexGuard};

/// A source of per-frame delta time.
pub trait Clock {
    /// Samples the clock, updating the delta and the elapsed total.
    fn tick(&mut self);

    /// Seconds between the last two ticks.
    fn delta_time(&self) -> f32;

    /// Seconds accumulated over all ticks.
    fn elapsed_time(&self) -> f32;
}

/// Monotonic wall-clock time.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    delta: Duration,
    elapsed: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FrameClock {
    fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now.duration_since(self.last);
        self.elapsed += self.delta;
        self.last = now;
    }

    fn delta_time(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    fn elapsed_time(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}

/// A scripted clock: every tick advances by the same fixed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock {
    step: f32,
    delta: f32,
    elapsed: f32,
}

impl FixedClock {
    pub fn new(step: f32) -> Self {
        Self {
            step,
            delta: 0.0,
            elapsed: 0.0,
        }
    }
}

impl Clock for FixedClock {
    fn tick(&mut self) {
        self.delta = self.step;
        self.elapsed += self.step;
    }

    fn delta_time(&self) -> f32 {
        self.delta
    }

    fn elapsed_time(&self) -> f32 {
        self.elapsed
    }
}

static FRAME_CLOCK: LazyLock<Mutex<FrameClock>> = LazyLock::new(|| Mutex::new(FrameClock::new()));

/// Locks the process-wide wall clock.
pub fn frame_clock() -> MutexGuard<'static, FrameClock> {
    FRAME_CLOCK.lock()
}
