//! Clock port
//!
//! Backoff and propagation waits go through this trait so tests can skip them.

use std::time::Duration;

/// Time source and sleeper
pub trait Clock {
    /// Block the current thread for `duration`
    fn sleep(&self, duration: Duration);

    /// Seconds since the Unix epoch
    fn unix_timestamp(&self) -> i64;
}
