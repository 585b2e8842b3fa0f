//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod clock_refresh;
pub mod finish_alert;
pub mod persistence;
pub mod tick_dispatch;

// Re-export main functions
pub use clock_refresh::clock_refresh_task;
pub use finish_alert::finish_alert_task;
pub use persistence::{persistence_task, restore, RestoredSettings};
pub use tick_dispatch::tick_dispatch_task;
