//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::debug;

use super::{
    ClockFace, ClockFaceSettings, ClockReading, Countdown, DurationFields, Stopwatch, TimerEvent,
};
use crate::timing::{Clock, Tick, TickSource, TickTarget};

/// Delay before a finished countdown's alert reverts to neutral, in milliseconds
pub const DEFAULT_ALERT_REVERT_MS: u64 = 5000;

/// Everything needed to build the timers
pub struct TimerParts {
    pub clock: Arc<dyn Clock>,
    pub stopwatch_ticks: Box<dyn TickSource>,
    pub countdown_ticks: Box<dyn TickSource>,
    pub clock_settings: ClockFaceSettings,
    /// Duration shown on the idle countdown at launch
    pub countdown_preview: DurationFields,
    pub alert_revert: Duration,
}

/// Owns every widget's state. Built once in `main` and shared through `Arc`.
pub struct AppState {
    /// Timing state machines, each with its own lock and tick subscription
    pub stopwatch: Arc<Mutex<Stopwatch>>,
    pub countdown: Arc<Mutex<Countdown>>,
    pub clock_face: Arc<Mutex<ClockFace>>,
    pub alert_revert: Duration,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Channel for state change notifications
    pub event_tx: broadcast::Sender<TimerEvent>,
    /// Latest clock face reading
    pub clock_reading_tx: watch::Sender<ClockReading>,
    /// Keep the receiver alive to prevent channel closure
    pub _clock_reading_rx: watch::Receiver<ClockReading>,
}

impl AppState {
    /// Create a new AppState from prepared timer parts
    pub fn new(port: u16, host: String, parts: TimerParts) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        let (clock_reading_tx, clock_reading_rx) = watch::channel(ClockReading::default());

        let mut countdown = Countdown::new(parts.countdown_ticks, event_tx.clone());
        countdown.set_preview(parts.countdown_preview);

        Self {
            stopwatch: Arc::new(Mutex::new(Stopwatch::new(
                parts.clock,
                parts.stopwatch_ticks,
                event_tx.clone(),
            ))),
            countdown: Arc::new(Mutex::new(countdown)),
            clock_face: Arc::new(Mutex::new(ClockFace::new(
                parts.clock_settings,
                event_tx.clone(),
            ))),
            alert_revert: parts.alert_revert,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            event_tx,
            clock_reading_tx,
            _clock_reading_rx: clock_reading_rx,
        }
    }

    /// Subscribe to state change events
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_tx.subscribe()
    }

    /// Run an operation on the stopwatch, recording `action` if given
    pub fn with_stopwatch<T, F>(&self, action: Option<&str>, op: F) -> Result<T, String>
    where
        F: FnOnce(&mut Stopwatch) -> T,
    {
        let mut stopwatch = self.stopwatch.lock()
            .map_err(|e| format!("Failed to lock stopwatch: {}", e))?;
        let result = op(&mut stopwatch);
        drop(stopwatch);

        if let Some(action) = action {
            self.record_action(action);
        }
        Ok(result)
    }

    /// Run an operation on the countdown, recording `action` if given
    pub fn with_countdown<T, F>(&self, action: Option<&str>, op: F) -> Result<T, String>
    where
        F: FnOnce(&mut Countdown) -> T,
    {
        let mut countdown = self.countdown.lock()
            .map_err(|e| format!("Failed to lock countdown: {}", e))?;
        let result = op(&mut countdown);
        drop(countdown);

        if let Some(action) = action {
            self.record_action(action);
        }
        Ok(result)
    }

    /// Run an operation on the clock face and republish its reading
    pub fn with_clock_face<T, F>(&self, action: Option<&str>, op: F) -> Result<T, String>
    where
        F: FnOnce(&mut ClockFace) -> T,
    {
        let mut face = self.clock_face.lock()
            .map_err(|e| format!("Failed to lock clock face: {}", e))?;
        let result = op(&mut face);
        drop(face);

        if let Some(action) = action {
            self.record_action(action);
        }
        self.refresh_clock(Utc::now())?;
        Ok(result)
    }

    /// Route a tick to the machine it belongs to. Returns `true` if the
    /// countdown finished on this tick.
    pub fn dispatch_tick(&self, tick: Tick) -> Result<bool, String> {
        match tick.target {
            TickTarget::Stopwatch => {
                self.with_stopwatch(None, |sw| sw.on_tick(tick.handle))?;
                Ok(false)
            }
            TickTarget::Countdown => self.with_countdown(None, |cd| cd.on_tick(tick.handle)),
        }
    }

    /// Recompute the clock face reading and publish it to watchers
    pub fn refresh_clock(&self, now: DateTime<Utc>) -> Result<ClockReading, String> {
        let reading = self.clock_face.lock()
            .map(|face| face.reading(now))
            .map_err(|e| format!("Failed to lock clock face: {}", e))?;

        self.clock_reading_tx.send_replace(reading.clone());
        Ok(reading)
    }

    /// Latest published clock face reading
    pub fn clock_reading(&self) -> ClockReading {
        self.clock_reading_tx.borrow().clone()
    }

    fn record_action(&self, action: &str) {
        debug!("Action: {}", action);
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::timing::{ManualClock, ManualTickSource};

    /// State wired to hand-driven clock and ticks
    pub struct Harness {
        pub state: Arc<AppState>,
        pub clock: ManualClock,
        pub stopwatch_ticks: ManualTickSource,
        pub countdown_ticks: ManualTickSource,
    }

    pub fn harness() -> Harness {
        let clock = ManualClock::new(1_000_000);
        let stopwatch_ticks = ManualTickSource::new();
        let countdown_ticks = ManualTickSource::new();
        let parts = TimerParts {
            clock: Arc::new(clock.clone()),
            stopwatch_ticks: Box::new(stopwatch_ticks.clone()),
            countdown_ticks: Box::new(countdown_ticks.clone()),
            clock_settings: ClockFaceSettings::default(),
            countdown_preview: DurationFields::default(),
            alert_revert: Duration::from_millis(DEFAULT_ALERT_REVERT_MS),
        };

        Harness {
            state: Arc::new(AppState::new(0, "127.0.0.1".to_string(), parts)),
            clock,
            stopwatch_ticks,
            countdown_ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::harness;
    use super::*;
    use crate::state::CountdownPhase;

    #[test]
    fn test_dispatch_routes_by_target() {
        let h = harness();
        h.state.with_stopwatch(Some("stopwatch-start"), |sw| sw.start()).unwrap();
        h.state
            .with_countdown(Some("countdown-start"), |cd| cd.start(DurationFields::new(0, 0, 1)))
            .unwrap()
            .unwrap();

        h.clock.advance(Duration::from_millis(40));
        let sw_tick = Tick {
            target: TickTarget::Stopwatch,
            handle: h.stopwatch_ticks.active().unwrap(),
        };
        assert_eq!(h.state.dispatch_tick(sw_tick), Ok(false));
        let shown = h.state.with_stopwatch(None, |sw| sw.displayed_ms()).unwrap();
        assert_eq!(shown, 40);

        let cd_handle = h.countdown_ticks.active().unwrap();
        let cd_tick = Tick {
            target: TickTarget::Countdown,
            handle: cd_handle,
        };
        let finished: Vec<bool> = (0..10).map(|_| h.state.dispatch_tick(cd_tick).unwrap()).collect();
        assert_eq!(finished.iter().filter(|f| **f).count(), 1);
        assert!(finished[9]);
        let phase = h.state.with_countdown(None, |cd| cd.phase()).unwrap();
        assert_eq!(phase, CountdownPhase::Finished);
    }

    #[test]
    fn test_actions_are_recorded() {
        let h = harness();
        assert_eq!(h.state.get_last_action(), (None, None));

        h.state.with_stopwatch(Some("stopwatch-lap"), |sw| sw.lap()).unwrap();
        let (action, at) = h.state.get_last_action();
        assert_eq!(action.as_deref(), Some("stopwatch-lap"));
        assert!(at.is_some());
    }

    #[test]
    fn test_clock_face_changes_republish_reading() {
        let h = harness();
        h.state.with_clock_face(Some("clock-timezone"), |face| face.toggle_timezone()).unwrap();
        assert_eq!(h.state.clock_reading().zone, "UTC Time");
        assert!(h.state.clock_reading().settings.utc);
    }
}
