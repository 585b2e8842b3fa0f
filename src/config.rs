//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::state::DEFAULT_ALERT_REVERT_MS;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "clock-suite")]
#[command(about = "Stopwatch, countdown timer and digital clock behind a local display API")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding the settings store
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Allow completion notifications when a countdown finishes
    #[arg(short, long)]
    pub notifications: bool,

    /// Never play the finish cue
    #[arg(short, long)]
    pub mute: bool,

    /// How long the finished alert stays up, in milliseconds
    #[arg(long, default_value_t = DEFAULT_ALERT_REVERT_MS)]
    pub alert_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn alert_revert(&self) -> Duration {
        Duration::from_millis(self.alert_ms)
    }

    /// Location of the settings store, under the platform data directory
    /// unless overridden
    pub fn store_path(&self) -> PathBuf {
        let dir = self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("clock-suite")
        });
        dir.join("store.json")
    }
}
