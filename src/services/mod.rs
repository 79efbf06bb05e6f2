//! External collaborators module
//!
//! This module contains the clock source and the alarm sound player.

pub mod alarm;
pub mod clock;

// Re-export main types
pub use alarm::{check_player_available, AlarmConfig, AlarmPlayer, AlarmSink};
pub use clock::{Clock, SystemClock};
