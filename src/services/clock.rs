//! Clock source

use chrono::{DateTime, Local};

use crate::state::ClockReading;

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    /// Read the clock and format it for display
    fn reading(&self) -> ClockReading {
        ClockReading::from_instant(&self.now())
    }
}

/// Local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
