//! The one knob this core recognizes: the Timestamp Clock's tick frequency.

/// Configuration recognized by the send-window core.
///
/// No other configuration reaches this layer (spec §6) — socket options,
/// buffer sizing, and retransmit thresholds all belong to the enclosing
/// stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Ticks per second for the TCP Timestamp option clock.
    tcp_ts_clock_frequency: f64,
}

impl Config {
    /// Build a `Config`, rejecting a non-positive tick frequency.
    ///
    /// A frequency of zero or less would make [`crate::clock::TimestampClock::measure_rtt`]
    /// divide by zero or run the clock backwards, so it's rejected here
    /// instead of at every call site.
    pub fn new(tcp_ts_clock_frequency: f64) -> Result<Self, ConfigError> {
        if !(tcp_ts_clock_frequency > 0.0) {
            return Err(ConfigError::NonPositiveFrequency(tcp_ts_clock_frequency));
        }

        Ok(Config {
            tcp_ts_clock_frequency,
        })
    }

    pub fn tcp_ts_clock_frequency(&self) -> f64 {
        self.tcp_ts_clock_frequency
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("tcpTSClockFrequency must be positive, got {0}")]
    NonPositiveFrequency(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_positive_frequency() {
        assert!(Config::new(1000.0).is_ok());
    }

    #[test]
    fn rejects_zero_and_negative() {
        assert_eq!(
            Config::new(0.0),
            Err(ConfigError::NonPositiveFrequency(0.0))
        );
        assert!(Config::new(-5.0).is_err());
    }
}
