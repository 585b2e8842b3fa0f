//! Side effects of a finished countdown

use std::sync::Arc;
use tokio::{
    sync::broadcast::{self, error::RecvError},
    time::sleep,
};
use tracing::{debug, error, info, warn};

use crate::{
    services::{notify_finished, play_quietly, AudioCue, Notifier},
    state::{AppState, TimerEvent},
};

/// Background task that plays the finish cue, sends the completion
/// notification and clears the alert after `AppState::alert_revert`
pub async fn finish_alert_task(
    state: Arc<AppState>,
    mut events: broadcast::Receiver<TimerEvent>,
    audio: Arc<dyn AudioCue>,
    notifier: Arc<dyn Notifier>,
) {
    info!("Starting finish alert task");

    loop {
        let generation = match events.recv().await {
            Ok(TimerEvent::CountdownFinished { total_ms, generation }) => {
                info!("Countdown of {} ms finished, raising alert", total_ms);
                generation
            }
            Ok(_) => continue,
            Err(RecvError::Lagged(skipped)) => {
                warn!("Finish alert task lagged, {} events skipped", skipped);
                // A skipped finish would leave its alert up until reset
                match state.with_countdown(None, |cd| cd.alert_generation()) {
                    Ok(Some(generation)) => {
                        warn!("Scheduling revert for alert raised while lagging");
                        schedule_revert(Arc::clone(&state), generation);
                    }
                    Ok(None) => {}
                    Err(e) => error!("Failed to check finish alert after lag: {}", e),
                }
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        // Sound playback blocks for the length of the cue
        let cue = Arc::clone(&audio);
        tokio::task::spawn_blocking(move || play_quietly(cue.as_ref()));

        notify_finished(notifier.as_ref());

        schedule_revert(Arc::clone(&state), generation);
    }

    info!("Event channel closed, finish alert task exiting");
}

/// Clear the alert raised by `generation` once the revert delay has passed
fn schedule_revert(state: Arc<AppState>, generation: u64) {
    tokio::spawn(async move {
        sleep(state.alert_revert).await;
        match state.with_countdown(None, |cd| cd.dismiss_alert(generation)) {
            Ok(true) => debug!("Finish alert reverted"),
            Ok(false) => debug!("Finish alert already cleared"),
            Err(e) => error!("Failed to clear finish alert: {}", e),
        }
    });
}
