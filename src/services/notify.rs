//! User-facing completion notifications

use tracing::info;

pub const FINISHED_TITLE: &str = "Timer Finished!";
pub const FINISHED_BODY: &str = "Your countdown timer has reached zero.";

/// Delivers a notification to the user
pub trait Notifier: Send + Sync {
    /// Whether the user allowed notifications
    fn permission_granted(&self) -> bool;

    fn notify(&self, title: &str, body: &str) -> Result<(), String>;
}

/// Notifier that writes to the log
#[derive(Debug, Clone, Copy)]
pub struct LogNotifier {
    granted: bool,
}

impl LogNotifier {
    pub fn new(granted: bool) -> Self {
        Self { granted }
    }
}

impl Notifier for LogNotifier {
    fn permission_granted(&self) -> bool {
        self.granted
    }

    fn notify(&self, title: &str, body: &str) -> Result<(), String> {
        if !self.granted {
            return Err("notification permission not granted".to_string());
        }
        info!("[NOTIFICATION] {}: {}", title, body);
        Ok(())
    }
}

/// Send the countdown completion notice if permitted. Never fails.
pub fn notify_finished(notifier: &dyn Notifier) -> bool {
    if !notifier.permission_granted() {
        tracing::debug!("Notification permission not granted, skipping");
        return false;
    }
    match notifier.notify(FINISHED_TITLE, FINISHED_BODY) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Failed to deliver completion notification: {}", e);
            false
        }
    }
}
