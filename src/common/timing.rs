// src/common/timing.rs

use core::time::Duration;

// Nominal processing times from the EZO datasheets. Readings and
// calibration take up to ~900 ms on the slowest circuits, everything
// else answers within 300 ms.

/// Wait after `R` and `Cal` commands before reading the response.
pub const LONG_TIMEOUT: Duration = Duration::from_millis(1500);
/// Wait after any other command before reading the response.
pub const SHORT_TIMEOUT: Duration = Duration::from_millis(300);

/// Interval between re-reads while a circuit reports status 254 (still processing).
pub const PENDING_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Slice used for interruptible sleeps in the poll loop.
pub const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Per-device wait times, configurable so slow or fast circuits can be tuned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandTimeouts {
    pub long: Duration,
    pub short: Duration,
}

impl Default for CommandTimeouts {
    fn default() -> Self {
        Self {
            long: LONG_TIMEOUT,
            short: SHORT_TIMEOUT,
        }
    }
}
