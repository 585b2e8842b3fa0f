//! State management module
//!
//! The stopwatch, countdown and clock face state machines, the events they
//! publish, and the application state that owns them.

pub mod app_state;
pub mod clock_face;
pub mod countdown;
pub mod events;
pub mod stopwatch;

// Re-export main types
pub use app_state::{AppState, TimerParts, DEFAULT_ALERT_REVERT_MS};
pub use clock_face::{ClockFace, ClockFaceSettings, ClockReading};
pub use countdown::{Countdown, CountdownPhase, DurationFields, COUNTDOWN_TICK};
pub use events::TimerEvent;
pub use stopwatch::{Stopwatch, StopwatchPhase, STOPWATCH_TICK};
