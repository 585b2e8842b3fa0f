//! API response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;

use crate::{
    error::TimerError,
    state::{ClockReading, Countdown, CountdownPhase, DurationFields, Stopwatch, StopwatchPhase},
    timing::format::{format_countdown, format_stopwatch, progress_fraction},
};

/// Styling hint for the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    Running,
    Finished,
    Neutral,
}

/// API response structure for state change endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub view: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, view: T) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            view,
        }
    }

    /// The request was valid but did not change anything
    pub fn ignored(message: impl Into<String>, view: T) -> Self {
        Self {
            status: "ignored".to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            view,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LapView {
    pub number: usize,
    pub display: String,
    pub elapsed_ms: u64,
}

/// Stopwatch as the display adapter renders it
#[derive(Debug, Clone, Serialize)]
pub struct StopwatchView {
    pub phase: StopwatchPhase,
    pub indicator: Indicator,
    /// `HH:MM:SS.cc`
    pub display: String,
    pub elapsed_ms: u64,
    /// Most recent lap first
    pub laps: Vec<LapView>,
}

impl From<&Stopwatch> for StopwatchView {
    fn from(sw: &Stopwatch) -> Self {
        let elapsed_ms = sw.displayed_ms();
        let laps = sw
            .laps()
            .iter()
            .enumerate()
            .rev()
            .map(|(i, lap)| {
                let ms = lap.as_millis() as u64;
                LapView {
                    number: i + 1,
                    display: format_stopwatch(ms),
                    elapsed_ms: ms,
                }
            })
            .collect();

        Self {
            phase: sw.phase(),
            indicator: if sw.is_running() { Indicator::Running } else { Indicator::Neutral },
            display: format_stopwatch(elapsed_ms),
            elapsed_ms,
            laps,
        }
    }
}

/// Countdown as the display adapter renders it
#[derive(Debug, Clone, Serialize)]
pub struct CountdownView {
    pub phase: CountdownPhase,
    pub indicator: Indicator,
    /// `HH:MM:SS`, rounded up to the whole second
    pub display: String,
    pub remaining_ms: u64,
    pub total_ms: u64,
    pub progress_percent: f64,
    pub inputs_locked: bool,
    pub preview: DurationFields,
}

impl From<&Countdown> for CountdownView {
    fn from(cd: &Countdown) -> Self {
        let indicator = if cd.alert_active() {
            Indicator::Finished
        } else if cd.phase() == CountdownPhase::Running {
            Indicator::Running
        } else {
            Indicator::Neutral
        };

        Self {
            phase: cd.phase(),
            indicator,
            display: format_countdown(cd.display_ms()),
            remaining_ms: cd.remaining_ms(),
            total_ms: cd.total_ms(),
            progress_percent: progress_fraction(cd.total_ms(), cd.remaining_ms()) * 100.0,
            inputs_locked: cd.inputs_locked(),
            preview: cd.preview(),
        }
    }
}

/// Everything at once, with server metadata
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub stopwatch: StopwatchView,
    pub countdown: CountdownView,
    pub clock: ClockReading,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
}

/// Errors returned by handlers
#[derive(Debug)]
pub enum ApiError {
    /// Rejected user input
    Timer(TimerError),
    /// Lock poisoning or similar
    Internal(String),
}

impl From<TimerError> for ApiError {
    fn from(e: TimerError) -> Self {
        Self::Timer(e)
    }
}

impl From<String> for ApiError {
    fn from(e: String) -> Self {
        Self::Internal(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            ApiError::Timer(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ApiError::Internal(e) => {
                error!("Request failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };
        let body = ErrorResponse {
            status: "error".to_string(),
            message,
        };
        (code, Json(body)).into_response()
    }
}
