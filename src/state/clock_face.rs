//! Digital clock face settings and rendering

use chrono::{DateTime, Local, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::info;

use super::events::{publish, TimerEvent};

/// Display preferences. Defaults to 12-hour local time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockFaceSettings {
    pub hour24: bool,
    pub utc: bool,
}

/// What the clock face shows at one instant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClockReading {
    pub time: String,
    /// `AM`/`PM` in 12-hour mode
    pub period: Option<String>,
    pub date: String,
    pub zone: String,
    pub settings: ClockFaceSettings,
}

#[derive(Debug)]
pub struct ClockFace {
    settings: ClockFaceSettings,
    events: broadcast::Sender<TimerEvent>,
}

impl ClockFace {
    pub fn new(settings: ClockFaceSettings, events: broadcast::Sender<TimerEvent>) -> Self {
        Self { settings, events }
    }

    /// Switch between 12 and 24 hour display
    pub fn toggle_format(&mut self) -> ClockFaceSettings {
        self.settings.hour24 = !self.settings.hour24;
        info!("Clock format set to {}", if self.settings.hour24 { "24h" } else { "12h" });
        publish(&self.events, TimerEvent::ClockSettingsChanged(self.settings));
        self.settings
    }

    /// Switch between local time and UTC
    pub fn toggle_timezone(&mut self) -> ClockFaceSettings {
        self.settings.utc = !self.settings.utc;
        info!("Clock zone set to {}", if self.settings.utc { "UTC" } else { "local" });
        publish(&self.events, TimerEvent::ClockSettingsChanged(self.settings));
        self.settings
    }

    pub fn reading(&self, now: DateTime<Utc>) -> ClockReading {
        if self.settings.utc {
            render(&now, self.settings, "UTC Time")
        } else {
            render(&now.with_timezone(&Local), self.settings, "Local Time")
        }
    }
}

fn render<Tz: TimeZone>(at: &DateTime<Tz>, settings: ClockFaceSettings, zone: &str) -> ClockReading
where
    Tz::Offset: std::fmt::Display,
{
    let (hours, period) = if settings.hour24 {
        (at.hour(), None)
    } else {
        let period = if at.hour() >= 12 { "PM" } else { "AM" };
        let hours = match at.hour() % 12 {
            0 => 12,
            h => h,
        };
        (hours, Some(period.to_string()))
    };

    ClockReading {
        time: format!("{:02}:{:02}:{:02}", hours, at.minute(), at.second()),
        period,
        date: at.format("%A, %B %-d, %Y").to_string(),
        zone: zone.to_string(),
        settings,
    }
}
