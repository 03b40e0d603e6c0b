//! Configuration for workspace watching.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`crate::WorkspaceWatcher`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Quiet window in milliseconds. The flush fires this long after the
    /// *last* event; any new event resets the timer.
    pub quiet_window_ms: u64,

    /// Whether to watch subdirectories recursively.
    pub recursive: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            quiet_window_ms: 15_000,
            recursive: true,
        }
    }
}

impl WatchConfig {
    /// Override the quiet window.
    pub fn with_quiet_window(mut self, window: Duration) -> Self {
        self.quiet_window_ms = window.as_millis() as u64;
        self
    }

    /// Quiet window as a [`Duration`].
    pub fn quiet_window(&self) -> Duration {
        Duration::from_millis(self.quiet_window_ms)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.quiet_window_ms == 0 {
            return Err(Error::Config(
                "quiet_window_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
