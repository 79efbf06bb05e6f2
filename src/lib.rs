//! Countdown Alarm - A single-timer countdown service with a live clock
//!
//! This library provides the countdown/alarm state machine, the clock
//! reporter, their one-second schedules and an HTTP API for a front-end.

pub mod api;
pub mod config;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::AppState;
pub use utils::signals::shutdown_signal;
