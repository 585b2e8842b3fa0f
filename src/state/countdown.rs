//! Countdown timer state machine

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::events::{publish, TimerEvent};
use crate::{
    error::TimerError,
    timing::{TickHandle, TickSource},
};

/// Countdown tick cadence. Every tick removes exactly this much time.
pub const COUNTDOWN_TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownPhase {
    Idle,
    Running,
    Paused,
    Finished,
}

/// Hours, minutes and seconds as entered by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationFields {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl DurationFields {
    pub fn new(hours: u64, minutes: u64, seconds: u64) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    /// Build from raw text fields. Missing, non-numeric and negative values
    /// count as zero.
    pub fn from_text(hours: Option<&str>, minutes: Option<&str>, seconds: Option<&str>) -> Self {
        Self {
            hours: hours.map(coerce_field).unwrap_or(0),
            minutes: minutes.map(coerce_field).unwrap_or(0),
            seconds: seconds.map(coerce_field).unwrap_or(0),
        }
    }

    pub fn total_ms(&self) -> u64 {
        self.hours
            .saturating_mul(3600)
            .saturating_add(self.minutes.saturating_mul(60))
            .saturating_add(self.seconds)
            .saturating_mul(1000)
    }

    /// Compact `h:m:s` form used for persistence
    pub fn to_compact(&self) -> String {
        format!("{}:{}:{}", self.hours, self.minutes, self.seconds)
    }

    pub fn from_compact(value: &str) -> Option<Self> {
        let mut parts = value.split(':').map(|p| p.trim().parse::<u64>().ok());
        let fields = Self::new(parts.next()??, parts.next()??, parts.next()??);
        if parts.next().is_some() {
            return None;
        }
        Some(fields)
    }
}

/// Read the leading integer of a field the way a lenient number input does:
/// `"12abc"` is 12, `"abc"` and `"-3"` are 0.
pub fn coerce_field(raw: &str) -> u64 {
    let trimmed = raw.trim_start();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return 0;
    }
    digits[..end].parse::<u64>().unwrap_or(u64::MAX)
}

/// Countdown with pause/resume and a transient finish alert
pub struct Countdown {
    ticks: Box<dyn TickSource>,
    tick: Option<TickHandle>,
    phase: CountdownPhase,
    total_ms: u64,
    remaining_ms: u64,
    alert: bool,
    generation: u64,
    preview: DurationFields,
    /// Set when the preview was edited after the last start
    preview_edited: bool,
    events: broadcast::Sender<TimerEvent>,
}

impl Countdown {
    pub fn new(ticks: Box<dyn TickSource>, events: broadcast::Sender<TimerEvent>) -> Self {
        Self {
            ticks,
            tick: None,
            phase: CountdownPhase::Idle,
            total_ms: 0,
            remaining_ms: 0,
            alert: false,
            generation: 0,
            preview: DurationFields::default(),
            preview_edited: false,
            events,
        }
    }

    pub fn phase(&self) -> CountdownPhase {
        self.phase
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    /// Whether the finish alert is still showing
    pub fn alert_active(&self) -> bool {
        self.alert
    }

    /// Inputs are disabled while a run is in progress or paused
    pub fn inputs_locked(&self) -> bool {
        matches!(self.phase, CountdownPhase::Running | CountdownPhase::Paused)
    }

    pub fn preview(&self) -> DurationFields {
        self.preview
    }

    /// Show `fields` on the display without starting. Ignored while the
    /// inputs are locked.
    pub fn set_preview(&mut self, fields: DurationFields) -> bool {
        if self.inputs_locked() {
            return false;
        }
        self.preview = fields;
        self.preview_edited = true;
        true
    }

    /// Start from `fields` when idle, or resume when paused. No-op when
    /// running or finished.
    pub fn start(&mut self, fields: DurationFields) -> Result<CountdownPhase, TimerError> {
        match self.phase {
            CountdownPhase::Idle => {
                let total_ms = fields.total_ms();
                if total_ms == 0 {
                    debug!("Rejected countdown start with zero duration");
                    return Err(TimerError::InvalidDuration);
                }

                self.total_ms = total_ms;
                self.remaining_ms = total_ms;
                self.preview = fields;
                self.preview_edited = false;
                self.phase = CountdownPhase::Running;
                self.tick = Some(self.ticks.schedule(COUNTDOWN_TICK));

                info!("Countdown started for {} ms", total_ms);
                publish(
                    &self.events,
                    TimerEvent::CountdownStarted {
                        total_ms,
                        input: fields,
                    },
                );
                publish(&self.events, TimerEvent::InputsLocked { locked: true });
            }
            CountdownPhase::Paused => {
                self.phase = CountdownPhase::Running;
                self.tick = Some(self.ticks.schedule(COUNTDOWN_TICK));

                info!("Countdown resumed with {} ms remaining", self.remaining_ms);
                publish(
                    &self.events,
                    TimerEvent::CountdownResumed {
                        remaining_ms: self.remaining_ms,
                    },
                );
            }
            CountdownPhase::Running | CountdownPhase::Finished => {
                debug!("Countdown start ignored in {:?}", self.phase);
            }
        }
        Ok(self.phase)
    }

    /// Suspend a running countdown. No time passes while paused.
    pub fn pause(&mut self) -> CountdownPhase {
        if self.phase != CountdownPhase::Running {
            return self.phase;
        }

        self.cancel_ticks();
        self.phase = CountdownPhase::Paused;

        info!("Countdown paused with {} ms remaining", self.remaining_ms);
        publish(
            &self.events,
            TimerEvent::CountdownPaused {
                remaining_ms: self.remaining_ms,
            },
        );
        self.phase
    }

    /// Return to idle from any phase
    pub fn reset(&mut self) {
        let was_locked = self.inputs_locked();

        self.cancel_ticks();
        self.phase = CountdownPhase::Idle;
        self.total_ms = 0;
        self.remaining_ms = 0;
        self.alert = false;

        info!("Countdown reset");
        publish(&self.events, TimerEvent::CountdownReset);
        if was_locked {
            publish(&self.events, TimerEvent::InputsLocked { locked: false });
        }
    }

    /// Remove one tick's worth of time. Returns `true` when this tick
    /// finished the countdown. Stale ticks are ignored.
    pub fn on_tick(&mut self, handle: TickHandle) -> bool {
        if self.phase != CountdownPhase::Running || self.tick != Some(handle) {
            return false;
        }

        self.remaining_ms = self
            .remaining_ms
            .saturating_sub(COUNTDOWN_TICK.as_millis() as u64);
        if self.remaining_ms > 0 {
            return false;
        }

        self.finish();
        true
    }

    fn finish(&mut self) {
        self.cancel_ticks();
        self.phase = CountdownPhase::Finished;
        self.alert = true;
        self.generation += 1;

        info!("Countdown finished after {} ms", self.total_ms);
        publish(&self.events, TimerEvent::InputsLocked { locked: false });
        publish(
            &self.events,
            TimerEvent::CountdownFinished {
                total_ms: self.total_ms,
                generation: self.generation,
            },
        );
    }

    /// Clear the finish alert raised by `generation`. A later finish or a
    /// reset makes older generations stale. Remaining time is not touched.
    pub fn dismiss_alert(&mut self, generation: u64) -> bool {
        if !self.alert || generation != self.generation {
            return false;
        }
        self.alert = false;

        debug!("Countdown finish alert cleared");
        publish(&self.events, TimerEvent::CountdownAlertCleared);
        true
    }

    /// Duration shown when nothing is running
    pub fn display_ms(&self) -> u64 {
        match self.phase {
            CountdownPhase::Idle => self.preview.total_ms(),
            CountdownPhase::Finished if self.preview_edited && !self.alert => self.preview.total_ms(),
            _ => self.remaining_ms,
        }
    }

    /// Generation of the finish alert still showing, if any
    pub fn alert_generation(&self) -> Option<u64> {
        self.alert.then_some(self.generation)
    }

    fn cancel_ticks(&mut self) {
        if let Some(handle) = self.tick.take() {
            self.ticks.cancel(handle);
        }
    }
}
