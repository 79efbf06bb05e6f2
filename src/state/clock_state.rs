//! Wall-clock reading and day/night indicator

use chrono::{DateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

/// Clock display pattern, e.g. `Sat, 17 Oct 2026 14:03:09`
pub const CLOCK_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";

/// Morning or afternoon/evening, used to pick the background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPeriod {
    Am,
    Pm,
}

impl DayPeriod {
    pub fn from_hour(hour: u32) -> Self {
        if hour >= 12 {
            DayPeriod::Pm
        } else {
            DayPeriod::Am
        }
    }

    /// Name of the background asset for this period
    pub fn background_asset(self) -> &'static str {
        match self {
            DayPeriod::Am => "am_background",
            DayPeriod::Pm => "pm_background",
        }
    }
}

/// One clock report, produced once per second
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockReading {
    pub formatted: String,
    pub hour: u32,
    pub day_period: DayPeriod,
    pub background: String,
}

impl ClockReading {
    pub fn from_instant<Tz>(now: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let hour = now.hour();
        let day_period = DayPeriod::from_hour(hour);
        Self {
            formatted: now.format(CLOCK_FORMAT).to_string(),
            hour,
            day_period,
            background: day_period.background_asset().to_string(),
        }
    }
}
