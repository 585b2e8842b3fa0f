//! Keeps the published clock face reading current

use std::{sync::Arc, time::Duration};
use chrono::Utc;
use tokio::time::interval;
use tracing::{info, warn};

use crate::state::AppState;

/// Background task that republishes the clock face every second
pub async fn clock_refresh_task(state: Arc<AppState>) {
    info!("Starting clock refresh task");

    let mut interval = interval(Duration::from_secs(1));

    loop {
        interval.tick().await;

        if let Err(e) = state.refresh_clock(Utc::now()) {
            warn!("Failed to refresh clock face: {}", e);
        }
    }
}
