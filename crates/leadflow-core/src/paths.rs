use crate::error::{LeadflowError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const LEADFLOW_DIR: &str = ".leadflow";
pub const LEADS_DIR: &str = ".leadflow/leads";
pub const PLAYBOOKS_DIR: &str = ".leadflow/playbooks";

pub const CONFIG_FILE: &str = ".leadflow/config.yaml";
pub const WORKSPACE_FILE: &str = ".leadflow/workspace.yaml";

pub const MANIFEST_FILE: &str = "manifest.yaml";
pub const CONTENT_FILE: &str = "content.md";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn leadflow_dir(root: &Path) -> PathBuf {
    root.join(LEADFLOW_DIR)
}

pub fn leads_dir(root: &Path) -> PathBuf {
    root.join(LEADS_DIR)
}

pub fn lead_dir(root: &Path, id: Uuid) -> PathBuf {
    leads_dir(root).join(id.to_string())
}

pub fn lead_manifest(root: &Path, id: Uuid) -> PathBuf {
    lead_dir(root, id).join(MANIFEST_FILE)
}

pub fn playbook_dir(root: &Path, slug: &str) -> PathBuf {
    root.join(PLAYBOOKS_DIR).join(slug)
}

pub fn playbook_manifest(root: &Path, slug: &str) -> PathBuf {
    playbook_dir(root, slug).join(MANIFEST_FILE)
}

pub fn playbook_content(root: &Path, slug: &str) -> PathBuf {
    playbook_dir(root, slug).join(CONTENT_FILE)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn workspace_path(root: &Path) -> PathBuf {
    root.join(WORKSPACE_FILE)
}

// ---------------------------------------------------------------------------
// Identifier validation
// ---------------------------------------------------------------------------

pub fn parse_lead_id(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|_| LeadflowError::InvalidLeadId(s.to_string()))
}

static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn slug_re() -> &'static Regex {
    SLUG_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() || slug.len() > 64 || !slug_re().is_match(slug) {
        return Err(LeadflowError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
