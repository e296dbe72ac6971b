//! Host timestamp to frame delta conversion.

/// Turns monotonically increasing host timestamps (ms, as given to
/// `requestAnimationFrame`) into frame deltas in seconds, clamped to `max_dt`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_dt: f32,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last_ms: None,
            max_dt,
        }
    }

    /// Seconds since the previous timestamp. The first call yields 0; timestamps
    /// that go backwards yield 0 and rebase the clock.
    pub fn delta(&mut self, now_ms: f64) -> f32 {
        let prev = self.last_ms.replace(now_ms);
        let Some(prev) = prev else {
            return 0.0;
        };
        let dt = ((now_ms - prev) / 1000.0) as f32;
        if !(dt > 0.0) {
            return 0.0;
        }
        dt.min(self.max_dt)
    }

    /// Forget the previous timestamp, e.g. after the loop was paused.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
