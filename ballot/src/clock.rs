//! The clock collaborator.

use ballot_types::Timestamp;

/// Source of the current time.
///
/// Every phase decision the engine makes reads the time from here, never
/// from the system clock directly.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time from the operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_system_time()
    }
}
