//! Persists widget settings by observing state change events

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, info, warn};

use crate::{
    services::KeyValueStore,
    state::{ClockFaceSettings, DurationFields, TimerEvent},
};

pub const HOUR24_KEY: &str = "clock.hour24";
pub const UTC_KEY: &str = "clock.utc";
pub const LAST_INPUT_KEY: &str = "countdown.last_input";

/// Settings restored from the store at launch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoredSettings {
    pub clock: ClockFaceSettings,
    pub countdown_preview: DurationFields,
}

/// Read persisted settings, using defaults for anything absent or malformed
pub fn restore(store: &KeyValueStore) -> RestoredSettings {
    let countdown_preview = match store.get(LAST_INPUT_KEY) {
        Some(raw) => DurationFields::from_compact(raw).unwrap_or_else(|| {
            warn!("Ignoring malformed {} value: {:?}", LAST_INPUT_KEY, raw);
            DurationFields::default()
        }),
        None => DurationFields::default(),
    };

    RestoredSettings {
        clock: ClockFaceSettings {
            hour24: store.get_bool(HOUR24_KEY, false),
            utc: store.get_bool(UTC_KEY, false),
        },
        countdown_preview,
    }
}

/// Record the part of `event` worth persisting. Returns `true` if the store
/// changed.
pub fn apply_event(store: &mut KeyValueStore, event: &TimerEvent) -> bool {
    match event {
        TimerEvent::ClockSettingsChanged(settings) => {
            let a = store.set(HOUR24_KEY, settings.hour24.to_string());
            let b = store.set(UTC_KEY, settings.utc.to_string());
            a || b
        }
        TimerEvent::CountdownStarted { input, .. } => store.set(LAST_INPUT_KEY, input.to_compact()),
        _ => false,
    }
}

/// Background task that writes settings changes to the store
pub async fn persistence_task(mut events: broadcast::Receiver<TimerEvent>, mut store: KeyValueStore) {
    info!("Starting persistence task");

    loop {
        match events.recv().await {
            Ok(event) => {
                if !apply_event(&mut store, &event) {
                    continue;
                }
                match store.flush() {
                    Ok(()) => debug!("Persisted settings after {:?}", event),
                    Err(e) => error!("Failed to persist settings: {}", e),
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Persistence task lagged, {} events skipped", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }

    info!("Event channel closed, persistence task exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_defaults_from_empty_store() {
        let restored = restore(&KeyValueStore::in_memory());
        assert_eq!(restored, RestoredSettings::default());
    }

    #[test]
    fn test_restore_ignores_malformed_values() {
        let mut store = KeyValueStore::in_memory();
        store.set(HOUR24_KEY, "true");
        store.set(UTC_KEY, "maybe");
        store.set(LAST_INPUT_KEY, "five minutes");

        let restored = restore(&store);
        assert!(restored.clock.hour24);
        assert!(!restored.clock.utc);
        assert_eq!(restored.countdown_preview, DurationFields::default());
    }

    #[test]
    fn test_only_settings_events_touch_the_store() {
        let mut store = KeyValueStore::in_memory();

        assert!(!apply_event(&mut store, &TimerEvent::StopwatchReset));
        assert!(!apply_event(&mut store, &TimerEvent::CountdownPaused { remaining_ms: 5 }));

        let input = DurationFields::new(0, 5, 30);
        assert!(apply_event(
            &mut store,
            &TimerEvent::CountdownStarted { total_ms: input.total_ms(), input }
        ));
        assert_eq!(restore(&store).countdown_preview, input);

        let settings = ClockFaceSettings { hour24: true, utc: true };
        assert!(apply_event(&mut store, &TimerEvent::ClockSettingsChanged(settings)));
        assert!(!apply_event(&mut store, &TimerEvent::ClockSettingsChanged(settings)));
        assert_eq!(restore(&store).clock, settings);
    }

    #[tokio::test]
    async fn test_task_writes_through_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let (tx, rx) = broadcast::channel(16);

        tx.send(TimerEvent::ClockSettingsChanged(ClockFaceSettings { hour24: true, utc: false }))
            .unwrap();
        drop(tx);
        persistence_task(rx, KeyValueStore::open(&path)).await;

        let reloaded = KeyValueStore::open(&path);
        assert_eq!(reloaded.get(HOUR24_KEY), Some("true"));
        assert_eq!(reloaded.get(UTC_KEY), Some("false"));
    }
}
