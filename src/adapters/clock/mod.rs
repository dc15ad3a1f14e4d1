//! Wall clock

use std::time::Duration;

use crate::core::ports::Clock;

/// Real sleeps and real time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }

    fn unix_timestamp(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}
