/*!
 * Clock
 * Wall-clock time source and sleep primitive used by throttled counters
 */

use super::types::Seconds;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Time source plus sleep, injectable so throttling can be driven deterministically
pub trait Clock: Send + Sync {
    /// Current wall-clock time in fractional seconds since the Unix epoch
    fn now(&self) -> Seconds;

    /// Block the calling thread for `seconds`
    fn sleep(&self, seconds: Seconds);
}

/// Clock backed by `SystemTime` and `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Seconds {
        // A clock set before 1970 reads as the epoch
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }

    fn sleep(&self, seconds: Seconds) {
        if let Some(duration) = to_duration(seconds) {
            std::thread::sleep(duration);
        }
    }
}

/// Convert fractional seconds to a sleepable duration; `None` when there is nothing to wait for
pub(crate) fn to_duration(seconds: Seconds) -> Option<Duration> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(seconds).ok()
}
