//! Collaborators the timers call out to
//!
//! Audio cues, user notifications and the key-value settings store. None of
//! these may fail a state transition: errors are logged and dropped.

pub mod audio;
pub mod notify;
pub mod store;

pub use audio::{default_cue, play_quietly, AudioCue, SilentCue};
pub use notify::{notify_finished, LogNotifier, Notifier};
pub use store::KeyValueStore;
