//! State change notifications published by the timers

use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

use super::{ClockFaceSettings, DurationFields};

/// Event emitted after a state transition has been applied
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimerEvent {
    StopwatchStarted { accumulated_ms: u64 },
    StopwatchStopped { elapsed_ms: u64 },
    LapRecorded { number: usize, lap: Duration },
    StopwatchReset,
    CountdownStarted { total_ms: u64, input: DurationFields },
    CountdownPaused { remaining_ms: u64 },
    CountdownResumed { remaining_ms: u64 },
    /// `generation` identifies this finish for the alert revert
    CountdownFinished { total_ms: u64, generation: u64 },
    CountdownAlertCleared,
    CountdownReset,
    /// Countdown inputs must be disabled (`true`) or enabled (`false`)
    InputsLocked { locked: bool },
    ClockSettingsChanged(ClockFaceSettings),
}

/// Publish an event. Having no subscribers is normal, not an error.
pub fn publish(tx: &broadcast::Sender<TimerEvent>, event: TimerEvent) {
    if let Err(e) = tx.send(event) {
        trace!("No subscribers for timer event: {:?}", e.0);
    }
}
