//! Clock ticker background task

use std::{sync::Arc, time::Duration};
use tokio::time::interval;
use tracing::{debug, info};

use crate::state::AppState;

/// Background task that publishes a clock reading once per second.
///
/// Independent of the countdown schedule: it keeps running whether or not a
/// countdown is active.
pub async fn clock_ticker_task(state: Arc<AppState>) {
    info!("Starting clock ticker task");

    let mut interval = interval(Duration::from_secs(1));
    let mut last_period = None;

    loop {
        interval.tick().await;

        let reading = state.clock.reading();
        if last_period != Some(reading.day_period) {
            debug!("Background switched to {}", reading.background);
            last_period = Some(reading.day_period);
        }
        state.update_clock(reading);
    }
}
