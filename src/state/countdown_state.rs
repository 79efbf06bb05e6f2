//! Countdown/alarm state machine

use serde::{Deserialize, Serialize};

use crate::utils::format_hms;

/// Phase of the single countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Alarming,
}

impl Phase {
    /// Label for the single start/stop button
    pub fn button_label(self) -> &'static str {
        match self {
            Phase::Alarming => "Stop Music",
            Phase::Idle | Phase::Running => "Start Timer",
        }
    }
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still running, with the new remaining time
    Remaining(u64),
    /// Reached zero; the schedule must be deactivated and the alarm raised
    AlarmTriggered,
    /// Not running, or the tick came from a replaced schedule
    Ignored,
}

/// Result of a stop request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Left `Alarming`; playback must be halted
    AlarmHalted,
    /// Left `Running`; the schedule must be cancelled
    CountdownCancelled,
    /// Already idle
    AlreadyIdle,
}

/// The countdown state. Only one exists per application.
#[derive(Debug, Clone)]
pub struct CountdownState {
    remaining_seconds: u64,
    phase: Phase,
    /// Bumped on every start/stop; identifies the live schedule
    generation: u64,
}

impl CountdownState {
    /// Create a new idle countdown
    pub fn new() -> Self {
        Self {
            remaining_seconds: 0,
            phase: Phase::Idle,
            generation: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_alarming(&self) -> bool {
        self.phase == Phase::Alarming
    }

    /// Begin counting down from `duration_seconds`.
    ///
    /// Returns the generation the new schedule must tick with. Any schedule
    /// holding an older generation is ignored from now on.
    pub fn start(&mut self, duration_seconds: u64) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.remaining_seconds = duration_seconds;
        self.phase = Phase::Running;
        self.generation
    }

    /// Advance the countdown by one second on behalf of schedule `generation`
    pub fn tick(&mut self, generation: u64) -> TickOutcome {
        if self.phase != Phase::Running || generation != self.generation {
            return TickOutcome::Ignored;
        }

        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
            TickOutcome::Remaining(self.remaining_seconds)
        } else {
            self.phase = Phase::Alarming;
            TickOutcome::AlarmTriggered
        }
    }

    /// Return to idle from any phase
    pub fn stop(&mut self) -> StopOutcome {
        let outcome = match self.phase {
            Phase::Alarming => StopOutcome::AlarmHalted,
            Phase::Running => StopOutcome::CountdownCancelled,
            Phase::Idle => StopOutcome::AlreadyIdle,
        };

        if outcome != StopOutcome::AlreadyIdle {
            self.generation = self.generation.wrapping_add(1);
        }
        self.remaining_seconds = 0;
        self.phase = Phase::Idle;
        outcome
    }

    /// Serializable view of the current state
    pub fn snapshot(&self) -> CountdownSnapshot {
        CountdownSnapshot {
            phase: self.phase,
            remaining_seconds: self.remaining_seconds,
            remaining: format_hms(self.remaining_seconds),
            alarm_active: self.is_alarming(),
            button_label: self.phase.button_label().to_string(),
        }
    }
}

impl Default for CountdownState {
    fn default() -> Self {
        Self::new()
    }
}

/// Read model rendered by the UI layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownSnapshot {
    pub phase: Phase,
    pub remaining_seconds: u64,
    /// `HH:MM:SS`
    pub remaining: String,
    pub alarm_active: bool,
    pub button_label: String,
}

impl Default for CountdownSnapshot {
    fn default() -> Self {
        CountdownState::new().snapshot()
    }
}

/// Notifications published by the controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CountdownEvent {
    Started { remaining_seconds: u64 },
    Remaining { remaining_seconds: u64, display: String },
    AlarmTriggered,
    Stopped,
}
