//! Frame throughput measurement for the status readout.

use std::time::Instant;

/// Frames per measurement window.
pub const DEFAULT_WINDOW: u32 = 30;

/// Frames-per-second over fixed windows of frames.
///
/// The reading is refreshed once per window and held in between.
#[derive(Clone, Debug)]
pub struct FpsMeter {
    window: u32,
    count: u32,
    window_start: Instant,
    fps: f64,
    total_frames: u64,
}

impl FpsMeter {
    pub fn new(window: u32) -> Self {
        Self::starting_at(window, Instant::now())
    }

    pub fn starting_at(window: u32, start: Instant) -> Self {
        Self {
            window: window.max(1),
            count: 0,
            window_start: start,
            fps: 0.0,
            total_frames: 0,
        }
    }

    /// Record a frame now and return the current reading.
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> f64 {
        self.count += 1;
        self.total_frames += 1;
        if self.count >= self.window {
            let elapsed = now.saturating_duration_since(self.window_start).as_secs_f64();
            if elapsed > 0.0 {
                self.fps = f64::from(self.count) / elapsed;
                self.count = 0;
                self.window_start = now;
            }
        }
        self.fps
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}
