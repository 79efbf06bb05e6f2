//! Countdown Alarm - A single-timer countdown service with a live clock
//!
//! This is the main entry point for the countdown-alarm application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use countdown_alarm::{
    api::create_router,
    config::Config,
    services::{check_player_available, AlarmPlayer, SystemClock},
    state::AppState,
    tasks::clock_ticker_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_alarm={},tower_http=info", config.log_level()))
        .init();

    info!("Starting countdown-alarm server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, sound={}, player={}, loop={}",
          config.host, config.port, config.sound.display(), config.player, config.loop_alarm);

    // A missing player or sound only costs the alarm sound, not the timer
    if let Err(e) = check_player_available(&config.player).await {
        warn!("{}", e);
    }
    if !config.sound.is_file() {
        warn!("Alarm sound {} not found, alarms will be silent", config.sound.display());
    }

    let alarm = Arc::new(AlarmPlayer::new(config.alarm_config()));
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        alarm,
        Arc::new(SystemClock),
    ));

    // Start the clock ticker, independent of any countdown
    let clock_state = Arc::clone(&state);
    let clock_task = tokio::spawn(async move {
        clock_ticker_task(clock_state).await;
    });

    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start  - Start the countdown ({{hours, minutes, seconds}})");
    info!("  POST /stop   - Stop the alarm or cancel the countdown");
    info!("  POST /toggle - Start, or stop a sounding alarm");
    info!("  GET  /status - Countdown, clock and warnings");
    info!("  GET  /health - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    state.shutdown();
    clock_task.abort();

    info!("Server shutdown complete");
    Ok(())
}
