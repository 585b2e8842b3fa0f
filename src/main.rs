//! Clock Suite - stopwatch, countdown timer and digital clock
//!
//! This is the main entry point for the clock-suite server.

use std::sync::Arc;
use tokio::{net::TcpListener, sync::mpsc};
use tracing::info;

use clock_suite::{
    api::create_router,
    config::Config,
    services::{default_cue, KeyValueStore, LogNotifier},
    state::{AppState, TimerParts},
    tasks::{clock_refresh_task, finish_alert_task, persistence_task, restore, tick_dispatch_task},
    timing::{SystemClock, TickTarget, TokioTickSource},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("clock_suite={},tower_http=info", config.log_level()))
        .init();

    info!("Starting clock-suite server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, notifications={}, mute={}",
          config.host, config.port, config.notifications, config.mute);

    // Restore persisted settings before building the widgets
    let store = KeyValueStore::open(config.store_path());
    let restored = restore(&store);
    info!("Settings store: {}", config.store_path().display());

    let (tick_tx, tick_rx) = mpsc::unbounded_channel();
    let parts = TimerParts {
        clock: Arc::new(SystemClock::new()),
        stopwatch_ticks: Box::new(TokioTickSource::new(TickTarget::Stopwatch, tick_tx.clone())),
        countdown_ticks: Box::new(TokioTickSource::new(TickTarget::Countdown, tick_tx)),
        clock_settings: restored.clock,
        countdown_preview: restored.countdown_preview,
        alert_revert: config.alert_revert(),
    };
    let state = Arc::new(AppState::new(config.port, config.host.clone(), parts));

    // Observers subscribe before anything can change state
    tokio::spawn(persistence_task(state.subscribe(), store));
    tokio::spawn(finish_alert_task(
        Arc::clone(&state),
        state.subscribe(),
        Arc::from(default_cue(config.mute)),
        Arc::new(LogNotifier::new(config.notifications)),
    ));
    tokio::spawn(tick_dispatch_task(Arc::clone(&state), tick_rx));
    tokio::spawn(clock_refresh_task(Arc::clone(&state)));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /stopwatch            POST /stopwatch/start|stop|toggle|lap|reset");
    info!("  GET  /countdown            POST /countdown/start|pause|reset|preview");
    info!("  GET  /clock                POST /clock/format|timezone");
    info!("  GET  /status               GET  /health");

    // Setup graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
