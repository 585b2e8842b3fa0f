//! Time sources, tick scheduling and display formatting shared by the timers

pub mod clock;
pub mod format;
pub mod tick;

pub use clock::{Clock, ManualClock, SystemClock};
pub use tick::{ManualTickSource, Tick, TickHandle, TickSource, TickTarget, TokioTickSource};
