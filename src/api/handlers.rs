//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::state::{AppState, Phase};
use super::{
    requests::DurationPick,
    responses::{ApiResponse, ErrorResponse, HealthResponse, StatusResponse},
};

type HandlerResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn internal_error(message: String) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(message)))
}

fn picked_seconds(pick: &DurationPick) -> Result<u64, (StatusCode, Json<ErrorResponse>)> {
    pick.to_seconds().map_err(|e| {
        warn!("Rejected duration {:?}: {}", pick, e);
        (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e)))
    })
}

/// Handle POST /start - Start or restart the countdown
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Json(pick): Json<DurationPick>,
) -> HandlerResult<ApiResponse> {
    let seconds = picked_seconds(&pick)?;

    match state.start_countdown(seconds) {
        Ok(countdown) => {
            info!("Start endpoint called - countdown running from {}", countdown.remaining);
            Ok(Json(ApiResponse::running(
                format!("Countdown started from {}", countdown.remaining),
                countdown,
            )))
        }
        Err(e) => {
            error!("Failed to start countdown: {}", e);
            Err(internal_error(e))
        }
    }
}

/// Handle POST /stop - Stop the alarm or cancel the countdown
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> HandlerResult<ApiResponse> {
    match state.stop() {
        Ok(countdown) => {
            info!("Stop endpoint called - countdown idle");
            Ok(Json(ApiResponse::idle("Countdown stopped".to_string(), countdown)))
        }
        Err(e) => {
            error!("Failed to stop countdown: {}", e);
            Err(internal_error(e))
        }
    }
}

/// Handle POST /toggle - The single start/stop button
///
/// An empty body means "no pick" and starts from zero. Any other body must
/// be a valid duration, as for /start.
pub async fn toggle_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> HandlerResult<ApiResponse> {
    let pick = if body.is_empty() {
        DurationPick::default()
    } else {
        let Json(pick) = Json::<DurationPick>::from_bytes(&body).map_err(|rejection| {
            warn!("Rejected toggle body: {}", rejection.body_text());
            (rejection.status(), Json(ErrorResponse::new(rejection.body_text())))
        })?;
        pick
    };
    let seconds = picked_seconds(&pick)?;

    match state.toggle(seconds) {
        Ok(countdown) if countdown.phase == Phase::Running => {
            info!("Toggle endpoint called - countdown started");
            Ok(Json(ApiResponse::running(
                format!("Countdown started from {}", countdown.remaining),
                countdown,
            )))
        }
        Ok(countdown) => {
            info!("Toggle endpoint called - alarm stopped");
            Ok(Json(ApiResponse::idle("Alarm stopped".to_string(), countdown)))
        }
        Err(e) => {
            error!("Failed to toggle countdown: {}", e);
            Err(internal_error(e))
        }
    }
}

/// Handle GET /status - Return countdown, clock and warnings
pub async fn status_handler(State(state): State<Arc<AppState>>) -> HandlerResult<StatusResponse> {
    let countdown = state.get_countdown_snapshot().map_err(|e| {
        error!("Failed to get countdown state: {}", e);
        internal_error(e)
    })?;

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        countdown,
        clock: state.get_clock_reading(),
        warnings: state.get_warnings(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
