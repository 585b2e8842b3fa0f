//! Delivers scheduled ticks to the timers

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::{state::AppState, timing::Tick};

/// Background task that feeds ticks from the tick sources to their state
/// machines, one at a time
pub async fn tick_dispatch_task(state: Arc<AppState>, mut ticks: mpsc::UnboundedReceiver<Tick>) {
    info!("Starting tick dispatch task");

    while let Some(tick) = ticks.recv().await {
        match state.dispatch_tick(tick) {
            Ok(true) => debug!("Countdown reached zero"),
            Ok(false) => {}
            Err(e) => error!("Failed to apply {:?} tick: {}", tick.target, e),
        }
    }

    info!("Tick channel closed, dispatch task exiting");
}
