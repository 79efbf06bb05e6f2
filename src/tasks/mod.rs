//! Background tasks module
//!
//! This module contains the two independent one-second schedules: the
//! countdown schedule and the clock ticker.

pub mod clock_ticker;
pub mod countdown_timer;

// Re-export main functions
pub use clock_ticker::clock_ticker_task;
pub use countdown_timer::spawn_countdown_schedule;
