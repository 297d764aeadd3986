//! Frame clock.
//!
//! The motion kernel is driven by absolute elapsed seconds, not by frame
//! deltas, so the clock's job is to produce a monotonic `elapsed()` that stops
//! while paused. It also keeps a frame counter and a smoothed FPS figure for
//! the overlay.
//!
//! ```
//! use figure8::time::Clock;
//!
//! let mut clock = Clock::new();
//! let (elapsed, _delta) = clock.update();
//! assert!(elapsed >= 0.0);
//! ```

use std::time::{Duration, Instant};

/// How often the FPS figure is recomputed.
const FPS_WINDOW: Duration = Duration::from_millis(500);

/// Monotonic elapsed-time source advanced once per frame.
#[derive(Debug)]
pub struct Clock {
    start: Instant,
    last_tick: Instant,
    elapsed_secs: f64,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frames: u64,
    fps_since: Instant,
    paused: bool,
    /// Total time spent paused, excluded from `elapsed`.
    paused_total: Duration,
}

impl Clock {
    /// Start a clock at zero.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frames: 0,
            fps_since: now,
            paused: false,
            paused_total: Duration::ZERO,
        }
    }

    /// Advance to now. Call once per frame.
    ///
    /// Returns `(elapsed, delta)` in seconds. While paused both stay put and
    /// delta is zero.
    pub fn update(&mut self) -> (f64, f32) {
        self.tick(Instant::now())
    }

    fn tick(&mut self, now: Instant) -> (f64, f32) {
        if self.paused {
            self.delta_secs = 0.0;
            return (self.elapsed_secs, 0.0);
        }

        self.delta_secs = now.saturating_duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;

        let running = now
            .saturating_duration_since(self.start)
            .saturating_sub(self.paused_total);
        // Never step backwards, even if the float conversion rounds down.
        self.elapsed_secs = self.elapsed_secs.max(running.as_secs_f64());

        self.frame_count += 1;

        let window = now.saturating_duration_since(self.fps_since);
        if window >= FPS_WINDOW {
            let frames = self.frame_count - self.fps_frames;
            self.fps = frames as f32 / window.as_secs_f32();
            self.fps_frames = self.frame_count;
            self.fps_since = now;
        }

        (self.elapsed_secs, self.delta_secs)
    }

    /// Seconds since start, excluding paused time.
    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.elapsed_secs
    }

    /// Seconds between the last two updates.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Frames counted since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second over the last measuring window.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Freeze elapsed time.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.last_tick = Instant::now();
        }
    }

    /// Continue from where [`pause`](Self::pause) stopped.
    pub fn resume(&mut self) {
        if self.paused {
            let now = Instant::now();
            self.paused_total += now.saturating_duration_since(self.last_tick);
            self.last_tick = now;
            self.paused = false;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Restart from zero, unpaused.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clock_new() {
        let clock = Clock::new();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.elapsed(), 0.0);
        assert!(!clock.is_paused());
    }

    #[test]
    fn test_clock_update_advances() {
        let mut clock = Clock::new();
        thread::sleep(Duration::from_millis(10));
        let (elapsed, delta) = clock.update();

        assert!(elapsed > 0.0);
        assert!(delta > 0.0);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_elapsed_is_monotonic() {
        let mut clock = Clock::new();
        let mut last = 0.0;
        for _ in 0..50 {
            let (elapsed, _) = clock.update();
            assert!(elapsed >= last);
            last = elapsed;
        }
    }

    #[test]
    fn test_pause_freezes_elapsed() {
        let mut clock = Clock::new();
        clock.update();
        clock.pause();

        let frozen = clock.elapsed();
        thread::sleep(Duration::from_millis(10));
        clock.update();

        assert_eq!(clock.elapsed(), frozen);
        assert_eq!(clock.delta(), 0.0);
    }

    #[test]
    fn test_resume_excludes_paused_time() {
        let mut clock = Clock::new();
        clock.pause();
        thread::sleep(Duration::from_millis(50));
        clock.resume();
        let (elapsed, _) = clock.update();
        assert!(elapsed < 0.04, "paused time leaked into elapsed: {elapsed}");
    }

    #[test]
    fn test_fps_measured_after_window() {
        let mut clock = Clock::new();
        let start = clock.start;
        for i in 1..=30u32 {
            clock.tick(start + Duration::from_millis(20 * i as u64));
        }
        // 30 frames over 600ms, first window closes at 500ms with 25 frames
        assert!((clock.fps() - 50.0).abs() < 0.5, "fps = {}", clock.fps());
    }

    #[test]
    fn test_elapsed_keeps_frame_resolution_after_a_week() {
        let mut clock = Clock::new();
        let week = clock.start + Duration::from_secs(7 * 86_400);
        let (first, _) = clock.tick(week);
        let (second, delta) = clock.tick(week + Duration::from_micros(16_667));
        assert!((second - first - 0.016_667).abs() < 1e-6);
        assert!((delta - 0.016_667).abs() < 1e-4);
    }

    #[test]
    fn test_reset() {
        let mut clock = Clock::new();
        clock.update();
        clock.pause();
        clock.reset();
        assert_eq!(clock.frame(), 0);
        assert!(!clock.is_paused());
    }
}
