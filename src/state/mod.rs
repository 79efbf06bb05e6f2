//! State management module
//!
//! This module contains the countdown state machine, the clock reading and
//! the shared application state that wires them to their schedules.

pub mod app_state;
pub mod clock_state;
pub mod countdown_state;

// Re-export main types
pub use app_state::AppState;
pub use clock_state::{ClockReading, DayPeriod};
pub use countdown_state::{
    CountdownEvent, CountdownSnapshot, CountdownState, Phase, StopOutcome, TickOutcome,
};
