//! API request structures

use serde::{Deserialize, Serialize};

/// Largest value each picker wheel offers
pub const MAX_HOURS: u64 = 23;
pub const MAX_MINUTES: u64 = 59;
pub const MAX_SECONDS: u64 = 59;

/// Duration chosen on the picker wheels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationPick {
    #[serde(default)]
    pub hours: u64,
    #[serde(default)]
    pub minutes: u64,
    #[serde(default)]
    pub seconds: u64,
}

impl DurationPick {
    /// Total seconds, rejecting values the picker cannot produce
    pub fn to_seconds(&self) -> Result<u64, String> {
        if self.hours > MAX_HOURS {
            return Err(format!("hours must be at most {}, got {}", MAX_HOURS, self.hours));
        }
        if self.minutes > MAX_MINUTES {
            return Err(format!("minutes must be at most {}, got {}", MAX_MINUTES, self.minutes));
        }
        if self.seconds > MAX_SECONDS {
            return Err(format!("seconds must be at most {}, got {}", MAX_SECONDS, self.seconds));
        }
        Ok(self.hours * 3600 + self.minutes * 60 + self.seconds)
    }
}
