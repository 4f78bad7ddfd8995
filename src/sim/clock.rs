//! Fixed-timestep scheduling
//!
//! Frame deltas from the host's animation loop are accumulated and turned
//! into whole simulation ticks, so physics never depends on frame rate.

/// Something that consumes one fixed tick at a time
pub trait Scheduler {
    /// Number of fixed ticks to run for a frame of `frame_dt` seconds
    fn ticks_for_frame(&mut self, frame_dt: f32) -> u32;
}

/// Accumulator-driven clock with a substep cap
#[derive(Debug, Clone)]
pub struct FixedClock {
    step: f32,
    max_substeps: u32,
    accumulator: f32,
}

impl FixedClock {
    pub fn new(step: f32, max_substeps: u32) -> Self {
        Self {
            step,
            max_substeps: max_substeps.max(1),
            accumulator: 0.0,
        }
    }

    /// Leftover time not yet turned into a tick
    pub fn pending(&self) -> f32 {
        self.accumulator
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

impl Scheduler for FixedClock {
    fn ticks_for_frame(&mut self, frame_dt: f32) -> u32 {
        // Long stalls (tab hidden, debugger) are not replayed
        let frame_dt = frame_dt.clamp(0.0, 0.1);
        self.accumulator += frame_dt;

        let mut ticks = 0;
        while self.accumulator >= self.step && ticks < self.max_substeps {
            self.accumulator -= self.step;
            ticks += 1;
        }
        // Anything beyond the cap is dropped rather than carried forward
        if ticks == self.max_substeps {
            self.accumulator = self.accumulator.min(self.step);
        }
        ticks
    }
}

/// Headless scheduler: a fixed number of ticks per frame regardless of time
#[derive(Debug, Clone, Copy)]
pub struct Unthrottled(pub u32);

impl Scheduler for Unthrottled {
    fn ticks_for_frame(&mut self, _frame_dt: f32) -> u32 {
        self.0
    }
}
