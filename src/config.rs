//! Manager configuration
//!
//! Defaults match the AR try-on client: 5 minute idle threshold, sweep every
//! minute, stats every 5 seconds, model load markers kept for a day.

use crate::error::{ResourceError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for [`ResourceManager`](crate::resources::ResourceManager)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Entries idle longer than this are released by the sweep
    pub idle_threshold_secs: u64,
    /// Cadence of the idle sweep
    pub sweep_interval_secs: u64,
    /// Cadence of the stats recompute
    pub stats_interval_secs: u64,
    /// TTL of the "model was requested" marker in the load cache
    pub model_cache_ttl_secs: u64,
    /// Initial value of the rendering flag
    pub start_rendering: bool,
}

impl ManagerConfig {
    /// Parse a JSON document, filling missing fields with defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ManagerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject zero intervals, which would fire the timers on every tick
    pub fn validate(&self) -> Result<()> {
        if self.sweep_interval_secs == 0 {
            return Err(ResourceError::Config(
                "sweep_interval_secs must be non-zero".to_string(),
            ));
        }
        if self.stats_interval_secs == 0 {
            return Err(ResourceError::Config(
                "stats_interval_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn idle_threshold(&self) -> Duration {
        Duration::from_secs(self.idle_threshold_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }

    pub fn model_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.model_cache_ttl_secs)
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            idle_threshold_secs: 5 * 60,
            sweep_interval_secs: 60,
            stats_interval_secs: 5,
            model_cache_ttl_secs: 24 * 60 * 60,
            start_rendering: true,
        }
    }
}
