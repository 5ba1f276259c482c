use crate::error::{LeadflowError, Result};
use crate::io::atomic_write;
use crate::paths;
use crate::workspace;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Playbook
// ---------------------------------------------------------------------------

/// A sales-guidance document: a slug-addressed manifest plus a markdown
/// body stored alongside it (`content.md`). Soft-deleted, never removed
/// from disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playbook {
    pub slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Playbook {
    pub fn new(slug: impl Into<String>, title: impl Into<String>, category: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            slug: slug.into(),
            title: title.into(),
            category,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn create(
        root: &Path,
        slug: &str,
        title: impl Into<String>,
        category: Option<String>,
        content: &str,
    ) -> Result<Self> {
        workspace::ensure_initialized(root)?;
        paths::validate_slug(slug)?;
        if paths::playbook_dir(root, slug).exists() {
            return Err(LeadflowError::PlaybookExists(slug.to_string()));
        }

        let playbook = Self::new(slug, title, category);
        playbook.save(root)?;
        playbook.write_content(root, content)?;
        Ok(playbook)
    }

    pub fn load(root: &Path, slug: &str) -> Result<Self> {
        let manifest = paths::playbook_manifest(root, slug);
        if !manifest.exists() {
            return Err(LeadflowError::PlaybookNotFound(slug.to_string()));
        }
        let data = std::fs::read_to_string(&manifest)?;
        let playbook: Playbook = serde_yaml::from_str(&data)?;
        Ok(playbook)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        atomic_write(&paths::playbook_manifest(root, &self.slug), data.as_bytes())
    }

    /// All playbooks sorted by title. Soft-deleted ones are included only
    /// when `include_deleted` is set.
    pub fn list(root: &Path, include_deleted: bool) -> Result<Vec<Self>> {
        let dir = root.join(paths::PLAYBOOKS_DIR);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut playbooks = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let slug = entry.file_name().to_string_lossy().into_owned();
            match Self::load(root, &slug) {
                Ok(p) if p.deleted_at.is_none() || include_deleted => playbooks.push(p),
                Ok(_) => {}
                Err(LeadflowError::PlaybookNotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        playbooks.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(playbooks)
    }

    // ---------------------------------------------------------------------------
    // Content
    // ---------------------------------------------------------------------------

    pub fn read_content(&self, root: &Path) -> Result<String> {
        let path = paths::playbook_content(root, &self.slug);
        if !path.exists() {
            return Ok(String::new());
        }
        Ok(std::fs::read_to_string(&path)?)
    }

    pub fn write_content(&self, root: &Path, content: &str) -> Result<()> {
        atomic_write(&paths::playbook_content(root, &self.slug), content.as_bytes())
    }

    // ---------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------

    pub fn rename(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.updated_at = Utc::now();
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.category = category;
        self.updated_at = Utc::now();
    }

    pub fn soft_delete(&mut self) -> Result<()> {
        if self.deleted_at.is_some() {
            return Err(LeadflowError::AlreadyDeleted(self.slug.clone()));
        }
        self.deleted_at = Some(Utc::now());
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        if self.deleted_at.is_none() {
            return Err(LeadflowError::NotDeleted(self.slug.clone()));
        }
        self.deleted_at = None;
        self.updated_at = Utc::now();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workspace_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        crate::workspace::init(dir.path(), "test").unwrap();
        dir
    }

    #[test]
    fn create_and_read_back() {
        let dir = workspace_dir();
        Playbook::create(
            dir.path(),
            "cold-outreach",
            "Cold outreach",
            Some("prospecting".to_string()),
            "# Script\n\nOpen with the referral.\n",
        )
        .unwrap();

        let loaded = Playbook::load(dir.path(), "cold-outreach").unwrap();
        assert_eq!(loaded.title, "Cold outreach");
        assert_eq!(loaded.category.as_deref(), Some("prospecting"));
        let content = loaded.read_content(dir.path()).unwrap();
        assert!(content.contains("referral"));
    }

    #[test]
    fn duplicate_slug_fails() {
        let dir = workspace_dir();
        Playbook::create(dir.path(), "demo", "Demo", None, "").unwrap();
        assert!(matches!(
            Playbook::create(dir.path(), "demo", "Demo again", None, ""),
            Err(LeadflowError::PlaybookExists(_))
        ));
    }

    #[test]
    fn invalid_slug_fails() {
        let dir = workspace_dir();
        assert!(matches!(
            Playbook::create(dir.path(), "Bad Slug", "x", None, ""),
            Err(LeadflowError::InvalidSlug(_))
        ));
    }

    #[test]
    fn list_hides_soft_deleted() {
        let dir = workspace_dir();
        Playbook::create(dir.path(), "keep", "Keep", None, "").unwrap();
        let mut gone = Playbook::create(dir.path(), "gone", "Gone", None, "").unwrap();
        gone.soft_delete().unwrap();
        gone.save(dir.path()).unwrap();

        let visible = Playbook::list(dir.path(), false).unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].slug, "keep");

        let all = Playbook::list(dir.path(), true).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn restore_round_trip() {
        let dir = workspace_dir();
        let mut p = Playbook::create(dir.path(), "demo", "Demo", None, "").unwrap();
        p.soft_delete().unwrap();
        assert!(matches!(p.soft_delete(), Err(LeadflowError::AlreadyDeleted(_))));
        p.restore().unwrap();
        assert!(p.deleted_at.is_none());
        assert!(matches!(p.restore(), Err(LeadflowError::NotDeleted(_))));
    }

    #[test]
    fn missing_content_reads_empty() {
        let dir = workspace_dir();
        let p = Playbook::create(dir.path(), "demo", "Demo", None, "").unwrap();
        std::fs::remove_file(dir.path().join(".leadflow/playbooks/demo/content.md")).unwrap();
        assert_eq!(p.read_content(dir.path()).unwrap(), "");
    }
}
