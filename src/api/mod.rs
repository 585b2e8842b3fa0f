//! HTTP API module
//!
//! The display adapter: handlers that render timer state as JSON and the
//! response structures they return.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/stopwatch", get(stopwatch_handler))
        .route("/stopwatch/start", post(stopwatch_start_handler))
        .route("/stopwatch/stop", post(stopwatch_stop_handler))
        .route("/stopwatch/toggle", post(stopwatch_toggle_handler))
        .route("/stopwatch/lap", post(stopwatch_lap_handler))
        .route("/stopwatch/reset", post(stopwatch_reset_handler))
        .route("/countdown", get(countdown_handler))
        .route("/countdown/start", post(countdown_start_handler))
        .route("/countdown/pause", post(countdown_pause_handler))
        .route("/countdown/reset", post(countdown_reset_handler))
        .route("/countdown/preview", post(countdown_preview_handler))
        .route("/clock", get(clock_handler))
        .route("/clock/format", post(clock_format_handler))
        .route("/clock/timezone", post(clock_timezone_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    use crate::state::app_state::test_support::harness;

    async fn call(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_zero_countdown_is_rejected() {
        let h = harness();
        let router = create_router(h.state.clone());

        let (status, body) = call(
            router.clone(),
            "POST",
            "/countdown/start",
            Some(json!({"hours": 0, "minutes": "0", "seconds": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Please set a valid time!");

        let (_, view) = call(router, "GET", "/countdown", None).await;
        assert_eq!(view["phase"], "idle");
        assert_eq!(view["inputs_locked"], false);
    }

    #[tokio::test]
    async fn test_countdown_lifecycle() {
        let h = harness();
        let router = create_router(h.state.clone());

        let (status, body) =
            call(router.clone(), "POST", "/countdown/start", Some(json!({"minutes": 1, "seconds": 1}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Countdown started");
        assert_eq!(body["view"]["display"], "00:01:01");
        assert_eq!(body["view"]["indicator"], "running");
        assert_eq!(body["view"]["inputs_locked"], true);

        let handle = h.countdown_ticks.active().unwrap();
        for _ in 0..305 {
            h.state.with_countdown(None, |cd| cd.on_tick(handle)).unwrap();
        }

        let (_, body) = call(router.clone(), "POST", "/countdown/pause", None).await;
        assert_eq!(body["view"]["phase"], "paused");
        assert_eq!(body["view"]["remaining_ms"], 30_500);
        assert_eq!(body["view"]["display"], "00:00:31");
        assert_eq!(body["view"]["progress_percent"], 50.0);

        let (_, body) = call(router.clone(), "POST", "/countdown/start", Some(json!({}))).await;
        assert_eq!(body["message"], "Countdown resumed");
        assert_eq!(body["view"]["remaining_ms"], 30_500);

        let (_, body) = call(router, "POST", "/countdown/reset", None).await;
        assert_eq!(body["view"]["phase"], "idle");
        assert_eq!(body["view"]["total_ms"], 0);
        assert_eq!(body["view"]["inputs_locked"], false);
    }

    #[tokio::test]
    async fn test_finished_countdown_shows_alert() {
        let h = harness();
        let router = create_router(h.state.clone());

        call(router.clone(), "POST", "/countdown/start", Some(json!({"seconds": "1"}))).await;
        let handle = h.countdown_ticks.active().unwrap();
        for _ in 0..10 {
            h.state.with_countdown(None, |cd| cd.on_tick(handle)).unwrap();
        }

        let (_, view) = call(router.clone(), "GET", "/countdown", None).await;
        assert_eq!(view["phase"], "finished");
        assert_eq!(view["indicator"], "finished");
        assert_eq!(view["display"], "00:00:00");
        assert_eq!(view["progress_percent"], 100.0);

        let (_, body) = call(router, "POST", "/countdown/start", Some(json!({"seconds": 5}))).await;
        assert_eq!(body["status"], "ignored");
    }

    #[tokio::test]
    async fn test_stopwatch_laps_most_recent_first() {
        let h = harness();
        let router = create_router(h.state.clone());

        let (_, body) = call(router.clone(), "POST", "/stopwatch/lap", None).await;
        assert_eq!(body["status"], "ignored");

        call(router.clone(), "POST", "/stopwatch/start", None).await;
        h.clock.advance(Duration::from_millis(1_230));
        call(router.clone(), "POST", "/stopwatch/lap", None).await;
        h.clock.advance(Duration::from_millis(2_000));
        let (_, body) = call(router.clone(), "POST", "/stopwatch/lap", None).await;
        assert_eq!(body["message"], "Lap 2 recorded");

        let laps = body["view"]["laps"].as_array().unwrap();
        assert_eq!(laps[0]["number"], 2);
        assert_eq!(laps[0]["display"], "00:00:03.23");
        assert_eq!(laps[1]["number"], 1);
        assert_eq!(laps[1]["display"], "00:00:01.23");

        let (_, body) = call(router.clone(), "POST", "/stopwatch/toggle", None).await;
        assert_eq!(body["view"]["phase"], "stopped");
        assert_eq!(body["view"]["display"], "00:00:03.23");

        let (_, body) = call(router, "POST", "/stopwatch/reset", None).await;
        assert_eq!(body["view"]["elapsed_ms"], 0);
        assert!(body["view"]["laps"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clock_toggles_and_status() {
        let h = harness();
        let router = create_router(h.state.clone());

        let (_, body) = call(router.clone(), "POST", "/clock/format", None).await;
        assert_eq!(body["view"]["settings"]["hour24"], true);
        assert!(body["view"]["period"].is_null());

        let (_, body) = call(router.clone(), "POST", "/clock/timezone", None).await;
        assert_eq!(body["view"]["zone"], "UTC Time");

        let (status, body) = call(router.clone(), "GET", "/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["last_action"], "clock-timezone");
        assert_eq!(body["countdown"]["phase"], "idle");
        assert_eq!(body["stopwatch"]["phase"], "stopped");

        let (_, body) = call(router, "GET", "/health", None).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_preview_locked_while_running() {
        let h = harness();
        let router = create_router(h.state.clone());

        let (_, body) =
            call(router.clone(), "POST", "/countdown/preview", Some(json!({"hours": "1"}))).await;
        assert_eq!(body["view"]["display"], "01:00:00");

        call(router.clone(), "POST", "/countdown/start", Some(json!({"seconds": 10}))).await;
        let (_, body) =
            call(router, "POST", "/countdown/preview", Some(json!({"hours": "2"}))).await;
        assert_eq!(body["status"], "ignored");
        assert_eq!(body["view"]["display"], "00:00:10");
    }

    #[tokio::test]
    async fn test_resume_without_body() {
        let h = harness();
        let router = create_router(h.state.clone());

        call(router.clone(), "POST", "/countdown/start", Some(json!({"seconds": 10}))).await;
        let (_, body) = call(router.clone(), "POST", "/countdown/pause", None).await;
        assert_eq!(body["view"]["phase"], "paused");

        let (status, body) = call(router.clone(), "POST", "/countdown/start", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Countdown resumed");
        assert_eq!(body["view"]["phase"], "running");
        assert_eq!(body["view"]["remaining_ms"], 10_000);
    }

    #[tokio::test]
    async fn test_bodyless_start_when_idle_is_rejected() {
        let h = harness();
        let router = create_router(h.state.clone());

        let (status, body) = call(router, "POST", "/countdown/start", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "Please set a valid time!");
    }

    #[tokio::test]
    async fn test_preview_accepted_after_finish() {
        let h = harness();
        let router = create_router(h.state.clone());

        call(router.clone(), "POST", "/countdown/start", Some(json!({"seconds": 1}))).await;
        let handle = h.countdown_ticks.active().unwrap();
        for _ in 0..10 {
            h.state.with_countdown(None, |cd| cd.on_tick(handle)).unwrap();
        }

        let (_, body) =
            call(router.clone(), "POST", "/countdown/preview", Some(json!({"minutes": 2}))).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["view"]["inputs_locked"], false);
        assert_eq!(body["view"]["preview"]["minutes"], 2);
        assert_eq!(body["view"]["display"], "00:00:00");

        let generation = h
            .state
            .with_countdown(None, |cd| cd.alert_generation())
            .unwrap()
            .unwrap();
        h.state.with_countdown(None, |cd| cd.dismiss_alert(generation)).unwrap();

        let (_, view) = call(router, "GET", "/countdown", None).await;
        assert_eq!(view["phase"], "finished");
        assert_eq!(view["indicator"], "neutral");
        assert_eq!(view["display"], "00:02:00");
    }
}
