//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use super::{
    ClockReading, CountdownEvent, CountdownSnapshot, CountdownState, Phase, StopOutcome,
    TickOutcome,
};
use crate::{
    services::{AlarmSink, Clock},
    tasks::spawn_countdown_schedule,
    utils::format_hms,
};

/// Shared application state: the single countdown, its schedule, the alarm
/// collaborator and the channels the UI layer renders from.
pub struct AppState {
    /// The one and only countdown
    pub countdown: Arc<Mutex<CountdownState>>,
    /// Handle of the live countdown schedule, if any
    countdown_schedule: Mutex<Option<JoinHandle<()>>>,
    /// Alarm sound collaborator
    pub alarm: Arc<dyn AlarmSink>,
    /// Clock source for the clock ticker
    pub clock: Arc<dyn Clock>,
    /// Non-fatal problems reported to the UI (alarm playback failures)
    pub warnings: Arc<Mutex<Vec<String>>>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Countdown notifications (remaining time, alarm trigger)
    pub countdown_event_tx: broadcast::Sender<CountdownEvent>,
    /// Latest countdown snapshot
    pub countdown_update_tx: watch::Sender<CountdownSnapshot>,
    /// Latest clock reading
    pub clock_update_tx: watch::Sender<ClockReading>,
    /// Keep the receivers alive to prevent channel closure
    _countdown_update_rx: watch::Receiver<CountdownSnapshot>,
    _clock_update_rx: watch::Receiver<ClockReading>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("countdown", &self.countdown)
            .field("port", &self.port)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create a new AppState with an idle countdown
    pub fn new(
        port: u16,
        host: String,
        alarm: Arc<dyn AlarmSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (countdown_event_tx, _) = broadcast::channel(100);
        let (countdown_update_tx, countdown_update_rx) =
            watch::channel(CountdownSnapshot::default());
        let (clock_update_tx, clock_update_rx) = watch::channel(clock.reading());

        Self {
            countdown: Arc::new(Mutex::new(CountdownState::new())),
            countdown_schedule: Mutex::new(None),
            alarm,
            clock,
            warnings: Arc::new(Mutex::new(Vec::new())),
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            countdown_event_tx,
            countdown_update_tx,
            clock_update_tx,
            _countdown_update_rx: countdown_update_rx,
            _clock_update_rx: clock_update_rx,
        }
    }

    /// Start (or restart) the countdown from `duration_seconds`.
    ///
    /// The previous schedule, if any, is aborted and replaced while the
    /// schedule lock is held, so two schedules are never live together.
    pub fn start_countdown(self: &Arc<Self>, duration_seconds: u64) -> Result<CountdownSnapshot, String> {
        let mut schedule = self.countdown_schedule.lock()
            .map_err(|e| format!("Failed to lock countdown schedule: {}", e))?;

        let (generation, was_alarming, snapshot) = {
            let mut countdown = self.countdown.lock()
                .map_err(|e| format!("Failed to lock countdown state: {}", e))?;
            let was_alarming = countdown.is_alarming();
            let generation = countdown.start(duration_seconds);
            (generation, was_alarming, countdown.snapshot())
        };

        if was_alarming {
            self.alarm.halt();
        }

        if let Some(previous) = schedule.take() {
            previous.abort();
            debug!("Replaced previous countdown schedule");
        }
        *schedule = Some(spawn_countdown_schedule(Arc::clone(self), generation));

        info!("Countdown started: {} ({}s)", format_hms(duration_seconds), duration_seconds);
        self.record_action("start");
        self.publish(snapshot.clone(), CountdownEvent::Started {
            remaining_seconds: duration_seconds,
        });
        drop(schedule);

        Ok(snapshot)
    }

    /// Apply one tick from the schedule tagged `generation`.
    ///
    /// Runs under the schedule lock, so a concurrent `stop` or restart either
    /// sees the finished tick (and halts the alarm it raised) or turns it into
    /// a stale no-op.
    pub fn handle_tick(&self, generation: u64) -> TickOutcome {
        let schedule = match self.countdown_schedule.lock() {
            Ok(schedule) => schedule,
            Err(e) => {
                warn!("Failed to lock countdown schedule: {}", e);
                return TickOutcome::Ignored;
            }
        };

        let (outcome, snapshot) = match self.countdown.lock() {
            Ok(mut countdown) => {
                let outcome = countdown.tick(generation);
                (outcome, countdown.snapshot())
            }
            Err(e) => {
                warn!("Failed to lock countdown state: {}", e);
                return TickOutcome::Ignored;
            }
        };

        match outcome {
            TickOutcome::Remaining(remaining_seconds) => {
                debug!("Countdown remaining: {}", snapshot.remaining);
                let display = snapshot.remaining.clone();
                self.publish(snapshot, CountdownEvent::Remaining {
                    remaining_seconds,
                    display,
                });
            }
            TickOutcome::AlarmTriggered => {
                info!("Countdown finished, raising alarm");
                self.publish(snapshot, CountdownEvent::AlarmTriggered);

                // Playback failure never rolls back the transition
                if let Err(e) = self.alarm.play() {
                    warn!("Alarm playback failed: {}", e);
                    self.add_warning(e);
                }
            }
            TickOutcome::Ignored => {
                debug!("Ignoring tick from schedule generation {}", generation);
            }
        }
        drop(schedule);

        outcome
    }

    /// Return to idle from any phase, halting the alarm if it is sounding
    pub fn stop(&self) -> Result<CountdownSnapshot, String> {
        let mut schedule = self.countdown_schedule.lock()
            .map_err(|e| format!("Failed to lock countdown schedule: {}", e))?;

        let (outcome, snapshot) = {
            let mut countdown = self.countdown.lock()
                .map_err(|e| format!("Failed to lock countdown state: {}", e))?;
            let outcome = countdown.stop();
            (outcome, countdown.snapshot())
        };

        if let Some(task) = schedule.take() {
            task.abort();
        }

        match outcome {
            StopOutcome::AlarmHalted => {
                self.alarm.halt();
                info!("Alarm stopped");
            }
            StopOutcome::CountdownCancelled => info!("Countdown cancelled"),
            StopOutcome::AlreadyIdle => debug!("Stop requested while idle"),
        }

        self.record_action("stop");
        if outcome != StopOutcome::AlreadyIdle {
            self.publish(snapshot.clone(), CountdownEvent::Stopped);
        }
        drop(schedule);

        Ok(snapshot)
    }

    /// The single button: stop the alarm if it is sounding, otherwise start
    pub fn toggle(self: &Arc<Self>, duration_seconds: u64) -> Result<CountdownSnapshot, String> {
        match self.get_countdown_snapshot()?.phase {
            Phase::Alarming => self.stop(),
            Phase::Idle | Phase::Running => self.start_countdown(duration_seconds),
        }
    }

    /// Get the current countdown snapshot
    pub fn get_countdown_snapshot(&self) -> Result<CountdownSnapshot, String> {
        self.countdown.lock()
            .map(|countdown| countdown.snapshot())
            .map_err(|e| format!("Failed to lock countdown state: {}", e))
    }

    /// Subscribe to countdown events
    pub fn subscribe_events(&self) -> broadcast::Receiver<CountdownEvent> {
        self.countdown_event_tx.subscribe()
    }

    /// Subscribe to the latest countdown snapshot
    pub fn subscribe_countdown(&self) -> watch::Receiver<CountdownSnapshot> {
        self.countdown_update_tx.subscribe()
    }

    /// Publish a new clock reading
    pub fn update_clock(&self, reading: ClockReading) {
        if let Err(e) = self.clock_update_tx.send(reading) {
            warn!("Failed to send clock update: {}", e);
        }
    }

    /// Get the latest clock reading
    pub fn get_clock_reading(&self) -> ClockReading {
        self.clock_update_tx.borrow().clone()
    }

    /// Record a non-fatal warning for the UI
    pub fn add_warning(&self, warning: String) {
        match self.warnings.lock() {
            Ok(mut warnings) => warnings.push(warning),
            Err(e) => warn!("Failed to lock warnings: {}", e),
        }
    }

    /// Get recorded warnings
    pub fn get_warnings(&self) -> Vec<String> {
        self.warnings.lock()
            .map(|warnings| warnings.clone())
            .unwrap_or_default()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Cancel the schedule and silence the alarm before exit
    pub fn shutdown(&self) {
        if let Err(e) = self.stop() {
            warn!("Failed to stop countdown during shutdown: {}", e);
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    fn publish(&self, snapshot: CountdownSnapshot, event: CountdownEvent) {
        if let Err(e) = self.countdown_update_tx.send(snapshot) {
            warn!("Failed to send countdown update: {}", e);
        }
        // No subscribers is normal when no UI is attached
        let _ = self.countdown_event_tx.send(event);
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{test_state, RecordingAlarm};
    use super::*;
    use std::{sync::Barrier, time::Duration};
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn five_second_countdown_emits_each_second_then_alarms_once() {
        let alarm = Arc::new(RecordingAlarm::default());
        let state = test_state(Arc::clone(&alarm));
        let mut events = state.subscribe_events();

        state.start_countdown(5).unwrap();
        assert_eq!(
            events.recv().await.unwrap(),
            CountdownEvent::Started { remaining_seconds: 5 }
        );

        let mut displays = Vec::new();
        for _ in 0..5 {
            match events.recv().await.unwrap() {
                CountdownEvent::Remaining { display, .. } => displays.push(display),
                other => panic!("unexpected event: {:?}", other),
            }
        }
        assert_eq!(displays, ["00:00:04", "00:00:03", "00:00:02", "00:00:01", "00:00:00"]);

        assert_eq!(events.recv().await.unwrap(), CountdownEvent::AlarmTriggered);
        sleep(Duration::from_secs(5)).await;
        assert!(events.try_recv().is_err());
        assert_eq!(alarm.plays(), 1);

        let snapshot = state.get_countdown_snapshot().unwrap();
        assert_eq!(snapshot.phase, Phase::Alarming);
        assert_eq!(snapshot.remaining_seconds, 0);
        assert!(snapshot.alarm_active);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_alarms_after_one_second() {
        let alarm = Arc::new(RecordingAlarm::default());
        let state = test_state(Arc::clone(&alarm));

        state.start_countdown(0).unwrap();
        assert_eq!(alarm.plays(), 0);

        sleep(Duration::from_millis(1500)).await;
        assert_eq!(state.get_countdown_snapshot().unwrap().phase, Phase::Alarming);
        assert_eq!(alarm.plays(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_schedule() {
        let alarm = Arc::new(RecordingAlarm::default());
        let state = test_state(Arc::clone(&alarm));

        state.start_countdown(10).unwrap();
        sleep(Duration::from_millis(2500)).await;
        assert_eq!(state.get_countdown_snapshot().unwrap().remaining_seconds, 8);

        state.start_countdown(3).unwrap();
        assert_eq!(state.get_countdown_snapshot().unwrap().remaining_seconds, 3);

        sleep(Duration::from_millis(1500)).await;
        let snapshot = state.get_countdown_snapshot().unwrap();
        assert_eq!(snapshot.phase, Phase::Running);
        assert_eq!(snapshot.remaining_seconds, 2);

        sleep(Duration::from_secs(3)).await;
        assert_eq!(state.get_countdown_snapshot().unwrap().phase, Phase::Alarming);
        assert_eq!(alarm.plays(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_stop_halts_playback_once() {
        let alarm = Arc::new(RecordingAlarm::default());
        let state = test_state(Arc::clone(&alarm));

        state.start_countdown(1).unwrap();
        sleep(Duration::from_millis(2500)).await;
        assert_eq!(state.get_countdown_snapshot().unwrap().phase, Phase::Alarming);

        for _ in 0..3 {
            let snapshot = state.stop().unwrap();
            assert_eq!(snapshot.phase, Phase::Idle);
            assert_eq!(snapshot.remaining_seconds, 0);
        }
        assert_eq!(alarm.halts(), 1);
        assert_eq!(state.get_last_action().0.as_deref(), Some("stop"));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_while_running_cancels_without_touching_playback() {
        let alarm = Arc::new(RecordingAlarm::default());
        let state = test_state(Arc::clone(&alarm));

        state.start_countdown(2).unwrap();
        sleep(Duration::from_millis(500)).await;
        state.stop().unwrap();

        sleep(Duration::from_secs(5)).await;
        let snapshot = state.get_countdown_snapshot().unwrap();
        assert_eq!(snapshot.phase, Phase::Idle);
        assert_eq!(alarm.plays(), 0);
        assert_eq!(alarm.halts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn playback_failure_still_alarms() {
        let alarm = Arc::new(RecordingAlarm::failing());
        let state = test_state(Arc::clone(&alarm));

        state.start_countdown(0).unwrap();
        sleep(Duration::from_millis(1500)).await;

        let snapshot = state.get_countdown_snapshot().unwrap();
        assert_eq!(snapshot.phase, Phase::Alarming);
        assert_eq!(state.get_warnings(), ["alarm sound not found: alarm_sound.mp3"]);

        state.stop().unwrap();
        assert_eq!(state.get_countdown_snapshot().unwrap().phase, Phase::Idle);
    }

    #[test]
    fn tick_racing_stop_never_leaves_alarm_playing() {
        for _ in 0..2_000 {
            let alarm = Arc::new(RecordingAlarm::default());
            let state = test_state(Arc::clone(&alarm));
            let updates = state.subscribe_countdown();
            let generation = state.countdown.lock().unwrap().start(0);
            let barrier = Barrier::new(2);

            std::thread::scope(|scope| {
                scope.spawn(|| {
                    barrier.wait();
                    state.handle_tick(generation);
                });
                scope.spawn(|| {
                    barrier.wait();
                    state.stop().unwrap();
                });
            });

            assert_eq!(state.get_countdown_snapshot().unwrap().phase, Phase::Idle);
            assert_eq!(alarm.plays(), alarm.halts());
            assert_eq!(updates.borrow().phase, Phase::Idle);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_follows_phase() {
        let alarm = Arc::new(RecordingAlarm::default());
        let state = test_state(Arc::clone(&alarm));

        assert_eq!(state.toggle(0).unwrap().phase, Phase::Running);
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(state.get_countdown_snapshot().unwrap().button_label, "Stop Music");

        assert_eq!(state.toggle(0).unwrap().phase, Phase::Idle);
        assert_eq!(alarm.halts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn starting_while_alarming_silences_previous_alarm() {
        let alarm = Arc::new(RecordingAlarm::default());
        let state = test_state(Arc::clone(&alarm));

        state.start_countdown(0).unwrap();
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(alarm.plays(), 1);

        state.start_countdown(60).unwrap();
        assert_eq!(alarm.halts(), 1);
        assert_eq!(state.get_countdown_snapshot().unwrap().phase, Phase::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn watch_channel_tracks_latest_snapshot() {
        let alarm = Arc::new(RecordingAlarm::default());
        let state = test_state(alarm);
        let updates = state.subscribe_countdown();

        state.start_countdown(3661).unwrap();
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(updates.borrow().remaining, "01:01:00");
    }
}
