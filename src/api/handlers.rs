//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{extract::State, response::Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::state::{countdown::coerce_field, AppState, ClockReading, CountdownPhase, DurationFields};
use super::responses::{
    ApiError, ApiResponse, CountdownView, HealthResponse, Indicator, StatusResponse, StopwatchView,
};

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Countdown input fields. Each may be a number, a string or absent.
#[derive(Debug, Default, Deserialize)]
pub struct CountdownInput {
    #[serde(default)]
    pub hours: Option<Value>,
    #[serde(default)]
    pub minutes: Option<Value>,
    #[serde(default)]
    pub seconds: Option<Value>,
}

impl CountdownInput {
    /// A missing or unreadable body counts as all fields absent
    pub fn from_body(body: Option<Json<CountdownInput>>) -> Self {
        body.map(|Json(input)| input).unwrap_or_default()
    }

    /// Coerce to whole non-negative fields; anything unreadable is zero
    pub fn fields(&self) -> DurationFields {
        DurationFields::new(
            field_value(self.hours.as_ref()),
            field_value(self.minutes.as_ref()),
            field_value(self.seconds.as_ref()),
        )
    }
}

fn field_value(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f.trunc() as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => coerce_field(s),
        _ => 0,
    }
}

/// Handle GET /stopwatch
pub async fn stopwatch_handler(State(state): State<Arc<AppState>>) -> Result<Json<StopwatchView>, ApiError> {
    let view = state.with_stopwatch(None, |sw| StopwatchView::from(&*sw))?;
    Ok(Json(view))
}

/// Handle POST /stopwatch/start
pub async fn stopwatch_start_handler(State(state): State<Arc<AppState>>) -> ApiResult<StopwatchView> {
    let view = state.with_stopwatch(Some("stopwatch-start"), |sw| {
        sw.start();
        StopwatchView::from(&*sw)
    })?;
    Ok(Json(ApiResponse::ok("Stopwatch running", view)))
}

/// Handle POST /stopwatch/stop
pub async fn stopwatch_stop_handler(State(state): State<Arc<AppState>>) -> ApiResult<StopwatchView> {
    let view = state.with_stopwatch(Some("stopwatch-stop"), |sw| {
        sw.stop();
        StopwatchView::from(&*sw)
    })?;
    Ok(Json(ApiResponse::ok("Stopwatch stopped", view)))
}

/// Handle POST /stopwatch/toggle - start when stopped, stop when running
pub async fn stopwatch_toggle_handler(State(state): State<Arc<AppState>>) -> ApiResult<StopwatchView> {
    let view = state.with_stopwatch(Some("stopwatch-toggle"), |sw| {
        sw.toggle();
        StopwatchView::from(&*sw)
    })?;
    let message = if view.indicator == Indicator::Running {
        "Stopwatch running"
    } else {
        "Stopwatch stopped"
    };
    Ok(Json(ApiResponse::ok(message, view)))
}

/// Handle POST /stopwatch/lap
pub async fn stopwatch_lap_handler(State(state): State<Arc<AppState>>) -> ApiResult<StopwatchView> {
    let (lap, view) = state.with_stopwatch(Some("stopwatch-lap"), |sw| {
        let lap = sw.lap();
        (lap, StopwatchView::from(&*sw))
    })?;

    match lap {
        Some(_) => Ok(Json(ApiResponse::ok(format!("Lap {} recorded", view.laps.len()), view))),
        None => Ok(Json(ApiResponse::ignored("Stopwatch is not running", view))),
    }
}

/// Handle POST /stopwatch/reset
pub async fn stopwatch_reset_handler(State(state): State<Arc<AppState>>) -> ApiResult<StopwatchView> {
    let view = state.with_stopwatch(Some("stopwatch-reset"), |sw| {
        sw.reset();
        StopwatchView::from(&*sw)
    })?;
    Ok(Json(ApiResponse::ok("Stopwatch reset", view)))
}

/// Handle GET /countdown
pub async fn countdown_handler(State(state): State<Arc<AppState>>) -> Result<Json<CountdownView>, ApiError> {
    let view = state.with_countdown(None, |cd| CountdownView::from(&*cd))?;
    Ok(Json(view))
}

/// Handle POST /countdown/start - start from the given fields, or resume
pub async fn countdown_start_handler(
    State(state): State<Arc<AppState>>,
    body: Option<Json<CountdownInput>>,
) -> ApiResult<CountdownView> {
    let fields = CountdownInput::from_body(body).fields();
    let (before, result) = state.with_countdown(Some("countdown-start"), |cd| {
        let before = cd.phase();
        let result = cd.start(fields).map(|_| CountdownView::from(&*cd));
        (before, result)
    })?;
    let view = result?;

    let message = match (before, view.phase) {
        (CountdownPhase::Idle, CountdownPhase::Running) => {
            info!("Countdown started from {:?}", fields);
            "Countdown started"
        }
        (CountdownPhase::Paused, CountdownPhase::Running) => "Countdown resumed",
        _ => return Ok(Json(ApiResponse::ignored("Countdown already running or finished", view))),
    };
    Ok(Json(ApiResponse::ok(message, view)))
}

/// Handle POST /countdown/pause
pub async fn countdown_pause_handler(State(state): State<Arc<AppState>>) -> ApiResult<CountdownView> {
    let (paused, view) = state.with_countdown(Some("countdown-pause"), |cd| {
        let paused = cd.phase() == CountdownPhase::Running;
        cd.pause();
        (paused, CountdownView::from(&*cd))
    })?;

    if paused {
        Ok(Json(ApiResponse::ok("Countdown paused", view)))
    } else {
        Ok(Json(ApiResponse::ignored("Countdown is not running", view)))
    }
}

/// Handle POST /countdown/reset
pub async fn countdown_reset_handler(State(state): State<Arc<AppState>>) -> ApiResult<CountdownView> {
    let view = state.with_countdown(Some("countdown-reset"), |cd| {
        cd.reset();
        CountdownView::from(&*cd)
    })?;
    Ok(Json(ApiResponse::ok("Countdown reset", view)))
}

/// Handle POST /countdown/preview - show the entered duration while idle
pub async fn countdown_preview_handler(
    State(state): State<Arc<AppState>>,
    body: Option<Json<CountdownInput>>,
) -> ApiResult<CountdownView> {
    let fields = CountdownInput::from_body(body).fields();
    let (applied, view) = state.with_countdown(None, |cd| {
        let applied = cd.set_preview(fields);
        (applied, CountdownView::from(&*cd))
    })?;

    if applied {
        Ok(Json(ApiResponse::ok("Preview updated", view)))
    } else {
        Ok(Json(ApiResponse::ignored("Inputs are locked while the countdown runs or is paused", view)))
    }
}

/// Handle GET /clock
pub async fn clock_handler(State(state): State<Arc<AppState>>) -> Result<Json<ClockReading>, ApiError> {
    Ok(Json(state.refresh_clock(Utc::now())?))
}

/// Handle POST /clock/format - switch 12/24 hour display
pub async fn clock_format_handler(State(state): State<Arc<AppState>>) -> ApiResult<ClockReading> {
    state.with_clock_face(Some("clock-format"), |face| face.toggle_format())?;
    Ok(Json(ApiResponse::ok("Clock format switched", state.clock_reading())))
}

/// Handle POST /clock/timezone - switch local/UTC
pub async fn clock_timezone_handler(State(state): State<Arc<AppState>>) -> ApiResult<ClockReading> {
    state.with_clock_face(Some("clock-timezone"), |face| face.toggle_timezone())?;
    Ok(Json(ApiResponse::ok("Clock timezone switched", state.clock_reading())))
}

/// Handle GET /status - Return every widget plus server metadata
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ApiError> {
    let stopwatch = state.with_stopwatch(None, |sw| StopwatchView::from(&*sw))?;
    let countdown = state.with_countdown(None, |cd| CountdownView::from(&*cd))?;
    let clock = state.refresh_clock(Utc::now())?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        stopwatch,
        countdown,
        clock,
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
