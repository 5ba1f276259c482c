use crate::config::Config;
use crate::error::{LeadflowError, Result};
use crate::io::{atomic_write, ensure_dir, write_if_missing};
use crate::paths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Workspace
// ---------------------------------------------------------------------------

/// Marker manifest written by `leadflow init`. Its presence is what makes a
/// directory a leadflow workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(default = "default_version")]
    pub version: u32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

fn default_version() -> u32 {
    1
}

impl Workspace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: 1,
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::workspace_path(root);
        if !path.exists() {
            return Err(LeadflowError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let workspace: Workspace = serde_yaml::from_str(&data)?;
        Ok(workspace)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        atomic_write(&paths::workspace_path(root), data.as_bytes())
    }
}

/// Initialize a workspace: directory tree, default config, workspace
/// manifest. Idempotent — re-running leaves existing files untouched.
pub fn init(root: &Path, name: &str) -> Result<Workspace> {
    ensure_dir(&paths::leads_dir(root))?;
    ensure_dir(&root.join(paths::PLAYBOOKS_DIR))?;

    let config_yaml = serde_yaml::to_string(&Config::default())?;
    write_if_missing(&paths::config_path(root), config_yaml.as_bytes())?;

    if paths::workspace_path(root).exists() {
        return Workspace::load(root);
    }
    let workspace = Workspace::new(name);
    workspace.save(root)?;
    Ok(workspace)
}

/// Error with `NotInitialized` unless `init` has run in this root.
pub fn ensure_initialized(root: &Path) -> Result<()> {
    if !paths::workspace_path(root).exists() {
        return Err(LeadflowError::NotInitialized);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
