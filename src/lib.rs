//! Clock Suite - stopwatch, countdown timer and digital clock
//!
//! The timing widgets of a digital clock page, run as small state machines
//! behind a local JSON display API. Ticks come from an owned scheduler so the
//! machines can be driven synthetically in tests.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod timing;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{StoreError, TimerError};
pub use state::{AppState, Countdown, Stopwatch};
pub use utils::signals::shutdown_signal;
