//! Fixed-rate frame pacing for interactive loops.

use std::thread;
use std::time::{Duration, Instant};

/// Caps a loop at a target frame rate by sleeping off the unused part of
/// each frame.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    last_tick: Instant,
}

impl FramePacer {
    /// A pacer for `fps` frames per second. Zero disables the cap.
    pub fn new(fps: u32) -> Self {
        let interval = match fps {
            0 => Duration::ZERO,
            fps => Duration::from_secs(1) / fps,
        };
        Self {
            interval,
            last_tick: Instant::now(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// How long to sleep after a frame that took `elapsed`.
    pub fn slack(&self, elapsed: Duration) -> Option<Duration> {
        self.interval.checked_sub(elapsed).filter(|d| !d.is_zero())
    }

    /// Sleeps until the frame interval is used up and returns the time since
    /// the previous tick.
    pub fn tick(&mut self) -> Duration {
        if let Some(slack) = self.slack(self.last_tick.elapsed()) {
            thread::sleep(slack);
        }
        let now = Instant::now();
        let delta = now - self.last_tick;
        self.last_tick = now;
        delta
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_matches_the_rate() {
        assert_eq!(FramePacer::new(50).interval(), Duration::from_millis(20));
        assert_eq!(FramePacer::new(0).interval(), Duration::ZERO);
    }

    #[test]
    fn slack_fills_the_rest_of_the_frame() {
        let pacer = FramePacer::new(50);
        assert_eq!(pacer.slack(Duration::from_millis(5)), Some(Duration::from_millis(15)));
        assert_eq!(pacer.slack(Duration::from_millis(20)), None);
        assert_eq!(pacer.slack(Duration::from_millis(35)), None);
    }

    #[test]
    fn uncapped_pacer_never_sleeps() {
        assert_eq!(FramePacer::new(0).slack(Duration::ZERO), None);
    }

    #[test]
    fn tick_waits_out_the_interval() {
        let mut pacer = FramePacer::new(200);
        let delta = pacer.tick();
        assert!(delta >= Duration::from_millis(5), "tick returned {delta:?}");
    }
}
