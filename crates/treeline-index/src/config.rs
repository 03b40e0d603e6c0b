//! Configuration for a workspace index.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use treeline_watch::WatchConfig;

/// Configuration for a [`crate::WorkspaceIndex`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Files whose content exceeds this many characters bypass the oracle
    /// and receive a fixed placeholder summary, bounding worst-case cost
    /// per file.
    pub max_summary_input_chars: usize,

    /// Watcher settings for steady-state operation.
    pub watch: WatchConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_summary_input_chars: 50_000,
            watch: WatchConfig::default(),
        }
    }
}

impl IndexConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_summary_input_chars == 0 {
            return Err(Error::Config(
                "max_summary_input_chars must be greater than zero".to_string(),
            ));
        }
        self.watch.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = IndexConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_summary_input_chars, 50_000);
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let config = IndexConfig {
            max_summary_input_chars: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
