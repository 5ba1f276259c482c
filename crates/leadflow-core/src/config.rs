use crate::error::Result;
use crate::io::atomic_write;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Workspace-level settings, stored at `.leadflow/config.yaml`. Every field
/// is serde-defaulted so a partial or missing file still loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Trailing window for the status trend, in days.
    #[serde(default = "default_trend_days")]
    pub trend_days: u32,

    /// Number of top UTM sources reported by the dashboard.
    #[serde(default = "default_utm_limit")]
    pub utm_limit: usize,

    /// Number of entries in the recent-activity feed.
    #[serde(default = "default_activity_limit")]
    pub activity_limit: usize,

    /// Currency code used when rendering pipeline values.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_trend_days() -> u32 {
    30
}

fn default_utm_limit() -> usize {
    5
}

fn default_activity_limit() -> usize {
    5
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trend_days: default_trend_days(),
            utm_limit: default_utm_limit(),
            activity_limit: default_activity_limit(),
            currency: default_currency(),
        }
    }
}

impl Config {
    /// Load config from the workspace, falling back to defaults when the
    /// file is absent (older workspaces never wrote one).
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        atomic_write(&paths::config_path(root), data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
