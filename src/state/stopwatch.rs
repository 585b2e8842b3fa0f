//! Stopwatch state machine

use std::{sync::Arc, time::Duration};

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::events::{publish, TimerEvent};
use crate::timing::{Clock, TickHandle, TickSource};

/// Display refresh cadence while running
pub const STOPWATCH_TICK: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopwatchPhase {
    Stopped,
    Running,
}

/// Stopwatch with lap log.
///
/// `accumulated_ms` is the source of truth while stopped. While running the
/// elapsed time is `now - start_epoch`, where `start_epoch` was placed
/// `accumulated_ms` before the start so a resume continues where it left off.
pub struct Stopwatch {
    clock: Arc<dyn Clock>,
    ticks: Box<dyn TickSource>,
    tick: Option<TickHandle>,
    start_epoch: Option<u64>,
    accumulated_ms: u64,
    laps: Vec<Duration>,
    displayed_ms: u64,
    events: broadcast::Sender<TimerEvent>,
}

impl Stopwatch {
    pub fn new(
        clock: Arc<dyn Clock>,
        ticks: Box<dyn TickSource>,
        events: broadcast::Sender<TimerEvent>,
    ) -> Self {
        Self {
            clock,
            ticks,
            tick: None,
            start_epoch: None,
            accumulated_ms: 0,
            laps: Vec::new(),
            displayed_ms: 0,
            events,
        }
    }

    pub fn phase(&self) -> StopwatchPhase {
        if self.start_epoch.is_some() {
            StopwatchPhase::Running
        } else {
            StopwatchPhase::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.start_epoch.is_some()
    }

    /// Start or resume. Does nothing while already running.
    pub fn start(&mut self) -> StopwatchPhase {
        if self.is_running() {
            debug!("Stopwatch already running, start ignored");
            return self.phase();
        }

        let now = self.clock.now_ms();
        self.start_epoch = Some(now.saturating_sub(self.accumulated_ms));
        self.tick = Some(self.ticks.schedule(STOPWATCH_TICK));
        self.displayed_ms = self.accumulated_ms;

        info!("Stopwatch started at {} ms accumulated", self.accumulated_ms);
        publish(
            &self.events,
            TimerEvent::StopwatchStarted {
                accumulated_ms: self.accumulated_ms,
            },
        );
        self.phase()
    }

    /// Stop and fold the running interval into the accumulated time
    pub fn stop(&mut self) -> StopwatchPhase {
        let Some(start_epoch) = self.start_epoch.take() else {
            return self.phase();
        };

        if let Some(handle) = self.tick.take() {
            self.ticks.cancel(handle);
        }
        self.accumulated_ms = self.clock.now_ms().saturating_sub(start_epoch);
        self.displayed_ms = self.accumulated_ms;

        info!("Stopwatch stopped at {} ms", self.accumulated_ms);
        publish(
            &self.events,
            TimerEvent::StopwatchStopped {
                elapsed_ms: self.accumulated_ms,
            },
        );
        self.phase()
    }

    /// Start when stopped, stop when running, for a single start/stop button
    pub fn toggle(&mut self) -> StopwatchPhase {
        if self.is_running() {
            self.stop()
        } else {
            self.start()
        }
    }

    /// Record a lap. Returns `None` while stopped, leaving the log untouched.
    pub fn lap(&mut self) -> Option<Duration> {
        let start_epoch = self.start_epoch?;
        let lap = Duration::from_millis(self.clock.now_ms().saturating_sub(start_epoch));
        self.laps.push(lap);

        debug!("Lap {} recorded: {:?}", self.laps.len(), lap);
        publish(
            &self.events,
            TimerEvent::LapRecorded {
                number: self.laps.len(),
                lap,
            },
        );
        Some(lap)
    }

    /// Stop, zero the accumulated time and clear the lap log
    pub fn reset(&mut self) {
        self.stop();
        self.accumulated_ms = 0;
        self.displayed_ms = 0;
        self.laps.clear();

        info!("Stopwatch reset");
        publish(&self.events, TimerEvent::StopwatchReset);
    }

    /// Refresh the displayed time. Ticks from a cancelled subscription are
    /// dropped and `false` is returned.
    pub fn on_tick(&mut self, handle: TickHandle) -> bool {
        if self.tick != Some(handle) {
            return false;
        }
        self.displayed_ms = self.elapsed_ms();
        true
    }

    /// Live elapsed time
    pub fn elapsed_ms(&self) -> u64 {
        match self.start_epoch {
            Some(start_epoch) => self.clock.now_ms().saturating_sub(start_epoch),
            None => self.accumulated_ms,
        }
    }

    /// Elapsed time as of the last tick or transition
    pub fn displayed_ms(&self) -> u64 {
        self.displayed_ms
    }

    pub fn accumulated_ms(&self) -> u64 {
        self.accumulated_ms
    }

    /// Laps in recorded order
    pub fn laps(&self) -> &[Duration] {
        &self.laps
    }
}
