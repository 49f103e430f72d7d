//! The Timestamp Clock: a monotonically advancing 32-bit counter used to
//! populate the TCP Timestamp option and to compute RTT from echoed values.

use std::time::{Duration, Instant};

use crate::config::Config;

/// A 32-bit counter that advances with wall-clock time at a configured tick
/// rate, per RFC 7323's Timestamps option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampClock {
    value: u32,
    last_update: Instant,
}

impl TimestampClock {
    /// Construct a clock reading `value` as of `now`.
    pub fn new(value: u32, now: Instant) -> Self {
        TimestampClock {
            value,
            last_update: now,
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Advance the clock to `now`, incrementing `value` by
    /// `floor((now - last_update) * frequency)`.
    ///
    /// If `now` precedes `last_update` (a caller passing a stale timestamp),
    /// `value` is left unchanged but `last_update` still advances to `now` —
    /// this keeps the clock monotonic in `last_update` without ever running
    /// `value` backwards.
    pub fn update(&mut self, cfg: &Config, now: Instant) {
        if now < self.last_update {
            self.last_update = now;
            return;
        }

        let dt = now.duration_since(self.last_update);
        let ticks = (dt.as_secs_f64() * cfg.tcp_ts_clock_frequency()).floor() as u32;

        self.value = self.value.wrapping_add(ticks);
        self.last_update = now;

        log::trace!("timestamp clock advanced by {ticks} ticks to {}", self.value);
    }

    /// RTT implied by an echoed timestamp value, assuming `echoed <= value`
    /// in the 32-bit modular sense (the caller's responsibility to uphold —
    /// see spec.md §4.2).
    pub fn measure_rtt(&self, cfg: &Config, echoed: u32) -> Duration {
        let delta = self.value.wrapping_sub(echoed);
        Duration::from_secs_f64(delta as f64 / cfg.tcp_ts_clock_frequency())
    }
}
