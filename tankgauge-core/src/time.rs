//! Time handling for the telemetry engine
//!
//! Readings arrive stamped by the field devices, while processing metadata
//! (processed-at, summary windows) needs a clock owned by the engine. The
//! `TimeSource` trait keeps that clock pluggable:
//! - Wall clock (when `std` is available)
//! - Fixed clock (deterministic tests, host simulations)
//!
//! All timestamps are milliseconds since the Unix epoch, UTC.

/// Timestamp in milliseconds since the Unix epoch
pub type Timestamp = u64;

/// Source of time for processing metadata and query windows
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Check if this source provides wall clock time (vs simulated)
    fn is_wall_clock(&self) -> bool;
}

/// Wall clock time source (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Default)]
pub struct WallClock;

#[cfg(feature = "std")]
impl TimeSource for WallClock {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};

        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }
}

/// Fixed time source for deterministic tests
#[derive(Debug, Clone)]
pub struct FixedClock {
    timestamp: Timestamp,
}

impl FixedClock {
    /// Create a fixed clock pinned at the given timestamp
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Pin the clock to a new timestamp
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Advance the clock by the given number of milliseconds
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }
}

impl TimeSource for FixedClock {
    fn now(&self) -> Timestamp {
        self.timestamp
    }

    fn is_wall_clock(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let mut clock = FixedClock::new(1000);
        assert_eq!(clock.now(), 1000);

        clock.advance(500);
        assert_eq!(clock.now(), 1500);

        clock.set(100);
        assert_eq!(clock.now(), 100);
    }

    #[cfg(feature = "std")]
    #[test]
    fn wall_clock_is_wall_clock() {
        let clock = WallClock;
        assert!(clock.is_wall_clock());
        assert!(clock.now() > 0);
    }
}
