use std::{cmp, time::Duration};

/// Doubling reconnect delay with up to 25% random jitter, capped at `max`.
pub struct Backoff {
    base: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            current: base,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        let next = self.current.checked_mul(2).unwrap_or(self.max);
        self.current = cmp::min(next, self.max);

        let jitter = delay.mul_f64(fastrand::f64() * 0.25);
        cmp::min(delay + jitter, self.max)
    }

    pub fn reset(&mut self) {
        self.current = self.base;
    }
}
