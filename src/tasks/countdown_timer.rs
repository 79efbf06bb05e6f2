//! Countdown schedule background task

use std::{sync::Arc, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant},
};
use tracing::debug;

use crate::state::{AppState, TickOutcome};

/// Interval between countdown ticks
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Spawn the one-second schedule that drives the countdown.
///
/// The first tick fires one interval after the call. The task ends on its own
/// once the alarm is raised or its generation has been replaced.
pub fn spawn_countdown_schedule(state: Arc<AppState>, generation: u64) -> JoinHandle<()> {
    tokio::spawn(countdown_timer_task(state, generation))
}

async fn countdown_timer_task(state: Arc<AppState>, generation: u64) {
    debug!("Countdown schedule {} started", generation);

    let mut interval = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);

    loop {
        interval.tick().await;

        match state.handle_tick(generation) {
            TickOutcome::Remaining(_) => continue,
            TickOutcome::AlarmTriggered => {
                debug!("Countdown schedule {} deactivated after alarm", generation);
                break;
            }
            TickOutcome::Ignored => {
                debug!("Countdown schedule {} is stale, exiting", generation);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        app_state::test_support::{test_state, RecordingAlarm},
        Phase,
    };
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_one_interval() {
        let state = test_state(Arc::new(RecordingAlarm::default()));
        state.start_countdown(10).unwrap();

        sleep(Duration::from_millis(999)).await;
        assert_eq!(state.get_countdown_snapshot().unwrap().remaining_seconds, 10);

        sleep(Duration::from_millis(2)).await;
        assert_eq!(state.get_countdown_snapshot().unwrap().remaining_seconds, 9);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_schedule_exits_without_ticking() {
        let state = test_state(Arc::new(RecordingAlarm::default()));
        state.start_countdown(10).unwrap();
        let stale = state.countdown.lock().unwrap().generation();
        state.start_countdown(10).unwrap();

        // A leftover schedule from the first start must not touch the countdown
        let handle = spawn_countdown_schedule(Arc::clone(&state), stale);
        sleep(Duration::from_millis(1500)).await;
        assert!(handle.is_finished());

        let snapshot = state.get_countdown_snapshot().unwrap();
        assert_eq!(snapshot.phase, Phase::Running);
        assert_eq!(snapshot.remaining_seconds, 9);
    }

    #[tokio::test(start_paused = true)]
    async fn schedule_finishes_after_alarm() {
        let state = test_state(Arc::new(RecordingAlarm::default()));
        let generation = state.countdown.lock().unwrap().start(0);

        let handle = spawn_countdown_schedule(Arc::clone(&state), generation);
        sleep(Duration::from_millis(1500)).await;

        assert!(handle.is_finished());
        assert_eq!(state.get_countdown_snapshot().unwrap().phase, Phase::Alarming);
    }
}
