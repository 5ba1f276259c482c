use crate::error::{LeadflowError, Result};
use crate::event::{EventType, LeadEvent};
use crate::flow;
use crate::io::atomic_write;
use crate::paths;
use crate::status::{self, LeadStatus, PipelineStage, StatusConfig};
use crate::workspace;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Note
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// NewLead / LeadUpdate
// ---------------------------------------------------------------------------

/// Input for lead creation. Only `name` is required; everything else is
/// optional contact and attribution detail, matching the webhook payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewLead {
    pub name: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub expected_revenue: Option<f64>,
    #[serde(default)]
    pub probability: Option<f64>,
    #[serde(default)]
    pub utm_source: Option<String>,
    #[serde(default)]
    pub utm_medium: Option<String>,
    #[serde(default)]
    pub utm_campaign: Option<String>,
    #[serde(default)]
    pub utm_content: Option<String>,
    #[serde(default)]
    pub utm_term: Option<String>,
}

/// Partial update: `Some` overwrites, `None` leaves the field alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub expected_revenue: Option<f64>,
    #[serde(default)]
    pub probability: Option<f64>,
}

// ---------------------------------------------------------------------------
// Lead
// ---------------------------------------------------------------------------

/// A prospective customer tracked through the pipeline.
///
/// `status` is kept as a raw string on purpose: rows written under retired
/// taxonomy revisions must survive load/save unchanged, with display and
/// stage classification degrading to the default status (see
/// [`crate::status`]). Writes go through the closed [`LeadStatus`] enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_revenue: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_campaign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_term: Option<String>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub next_note_seq: u32,
    #[serde(default)]
    pub events: Vec<LeadEvent>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Lead {
    /// Build a new lead. Status always starts at the taxonomy's initial
    /// status regardless of input.
    pub fn new(input: NewLead) -> Result<Self> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(LeadflowError::NameRequired);
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            source: input.source,
            status: LeadStatus::DEFAULT.as_str().to_string(),
            expected_revenue: input.expected_revenue,
            probability: input.probability,
            utm_source: input.utm_source,
            utm_medium: input.utm_medium,
            utm_campaign: input.utm_campaign,
            utm_content: input.utm_content,
            utm_term: input.utm_term,
            notes: Vec::new(),
            next_note_seq: 0,
            events: vec![LeadEvent::new(EventType::Created)],
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn create(root: &Path, input: NewLead) -> Result<Self> {
        workspace::ensure_initialized(root)?;
        let lead = Self::new(input)?;
        lead.save(root)?;
        Ok(lead)
    }

    pub fn load(root: &Path, id: Uuid) -> Result<Self> {
        let manifest = paths::lead_manifest(root, id);
        if !manifest.exists() {
            return Err(LeadflowError::LeadNotFound(id.to_string()));
        }
        let data = std::fs::read_to_string(&manifest)?;
        let lead: Lead = serde_yaml::from_str(&data)?;
        Ok(lead)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let manifest = paths::lead_manifest(root, self.id);
        let data = serde_yaml::to_string(self)?;
        atomic_write(&manifest, data.as_bytes())
    }

    /// All leads, newest first. Skips directories without a manifest.
    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let leads_dir = paths::leads_dir(root);
        if !leads_dir.exists() {
            return Ok(Vec::new());
        }

        let mut leads = Vec::new();
        for entry in std::fs::read_dir(&leads_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Ok(id) = Uuid::parse_str(&entry.file_name().to_string_lossy()) else {
                continue;
            };
            match Self::load(root, id) {
                Ok(lead) => leads.push(lead),
                Err(LeadflowError::LeadNotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(leads)
    }

    pub fn list_filtered(root: &Path, filter: &LeadFilter) -> Result<Vec<Self>> {
        Ok(filter.apply(Self::list(root)?))
    }

    // ---------------------------------------------------------------------------
    // Classification
    // ---------------------------------------------------------------------------

    pub fn status_config(&self) -> &'static StatusConfig {
        status::status_config(Some(&self.status))
    }

    pub fn stage(&self) -> PipelineStage {
        status::pipeline_stage(Some(&self.status))
    }

    pub fn quick_actions(&self) -> Vec<LeadStatus> {
        flow::quick_actions(Some(&self.status))
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    // ---------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------

    /// Apply a partial update, recording one `field_changed` event per field
    /// that actually changed. Returns the number of changed fields.
    pub fn update(&mut self, changes: LeadUpdate) -> Result<usize> {
        let mut changed = 0;

        if let Some(name) = changes.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(LeadflowError::NameRequired);
            }
            if name != self.name {
                self.record_field_change("name", Some(self.name.clone()), Some(name.clone()));
                self.name = name;
                changed += 1;
            }
        }

        macro_rules! update_text_field {
            ($field:ident) => {
                if let Some(value) = changes.$field {
                    if self.$field.as_deref() != Some(value.as_str()) {
                        self.record_field_change(
                            stringify!($field),
                            self.$field.clone(),
                            Some(value.clone()),
                        );
                        self.$field = Some(value);
                        changed += 1;
                    }
                }
            };
        }
        update_text_field!(first_name);
        update_text_field!(last_name);
        update_text_field!(email);
        update_text_field!(phone);

        macro_rules! update_number_field {
            ($field:ident) => {
                if let Some(value) = changes.$field {
                    if self.$field != Some(value) {
                        self.record_field_change(
                            stringify!($field),
                            self.$field.map(|v| v.to_string()),
                            Some(value.to_string()),
                        );
                        self.$field = Some(value);
                        changed += 1;
                    }
                }
            };
        }
        update_number_field!(expected_revenue);
        update_number_field!(probability);

        if changed > 0 {
            self.updated_at = Utc::now();
        }
        Ok(changed)
    }

    fn record_field_change(&mut self, field: &str, from: Option<String>, to: Option<String>) {
        self.events.push(LeadEvent::field_changed(field, from, to));
    }

    /// Overwrite the status. The transition graph is advisory only — any
    /// valid status is accepted from any current status, so operators can
    /// fix data-entry mistakes. Setting the current status again is a no-op.
    pub fn set_status(&mut self, target: LeadStatus) {
        if self.status == target.as_str() {
            return;
        }
        self.events
            .push(LeadEvent::status_changed(self.status.clone(), target.as_str()));
        self.status = target.as_str().to_string();
        self.updated_at = Utc::now();
    }

    /// Opt-in strict variant: rejects targets the transition graph does not
    /// suggest from the current (defaulted) status.
    pub fn set_status_strict(&mut self, target: LeadStatus) -> Result<()> {
        let current = status::resolve(Some(&self.status));
        if !flow::suggests(current, target) {
            return Err(LeadflowError::RejectedTransition {
                from: current.as_str().to_string(),
                to: target.as_str().to_string(),
                reason: "not a suggested transition".to_string(),
            });
        }
        self.set_status(target);
        Ok(())
    }

    pub fn soft_delete(&mut self) -> Result<()> {
        if self.deleted_at.is_some() {
            return Err(LeadflowError::AlreadyDeleted(self.id.to_string()));
        }
        self.deleted_at = Some(Utc::now());
        self.events.push(LeadEvent::new(EventType::Deleted));
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        if self.deleted_at.is_none() {
            return Err(LeadflowError::NotDeleted(self.id.to_string()));
        }
        self.deleted_at = None;
        self.events.push(LeadEvent::new(EventType::Restored));
        self.updated_at = Utc::now();
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // Notes
    // ---------------------------------------------------------------------------

    /// Append a note and return its auto-generated id. The id comes from a
    /// monotonic counter so ids never collide after a note is removed.
    pub fn add_note(&mut self, body: impl Into<String>) -> String {
        self.next_note_seq += 1;
        let id = format!("N{}", self.next_note_seq);
        let now = Utc::now();
        self.notes.push(Note {
            id: id.clone(),
            body: body.into(),
            created_at: now,
            updated_at: now,
        });
        self.events.push(LeadEvent::note(EventType::NoteAdded, &id));
        self.updated_at = now;
        id
    }

    pub fn edit_note(&mut self, id: &str, body: impl Into<String>) -> Result<()> {
        let note = self
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| LeadflowError::NoteNotFound(id.to_string()))?;
        note.body = body.into();
        note.updated_at = Utc::now();
        self.events.push(LeadEvent::note(EventType::NoteUpdated, id));
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Remove a note from the list. The audit event remains.
    pub fn remove_note(&mut self, id: &str) -> Result<()> {
        let pos = self
            .notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| LeadflowError::NoteNotFound(id.to_string()))?;
        self.notes.remove(pos);
        self.events.push(LeadEvent::note(EventType::NoteDeleted, id));
        self.updated_at = Utc::now();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LeadFilter
// ---------------------------------------------------------------------------

/// In-memory list filter mirroring the query options the dashboard offers:
/// status set, UTM source, free-text search, creation window, paging.
/// Soft-deleted leads are excluded unless `include_deleted` is set.
#[derive(Debug, Clone, Default)]
pub struct LeadFilter {
    pub statuses: Vec<LeadStatus>,
    pub include_deleted: bool,
    pub utm_source: Option<String>,
    pub search: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl LeadFilter {
    pub fn matches(&self, lead: &Lead) -> bool {
        if !self.include_deleted && lead.is_deleted() {
            return false;
        }
        if !self.statuses.is_empty() {
            let status = status::resolve(Some(&lead.status));
            if !self.statuses.contains(&status) {
                return false;
            }
        }
        if let Some(ref source) = self.utm_source {
            if lead.utm_source.as_deref() != Some(source.as_str()) {
                return false;
            }
        }
        if let Some(ref needle) = self.search {
            let needle = needle.to_lowercase();
            let haystacks = [
                Some(lead.name.as_str()),
                lead.email.as_deref(),
                lead.phone.as_deref(),
            ];
            if !haystacks
                .iter()
                .flatten()
                .any(|h| h.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        if let Some(after) = self.created_after {
            if lead.created_at < after {
                return false;
            }
        }
        if let Some(before) = self.created_before {
            if lead.created_at > before {
                return false;
            }
        }
        true
    }

    /// Filter, then apply offset/limit. Input order is preserved.
    pub fn apply(&self, leads: Vec<Lead>) -> Vec<Lead> {
        let iter = leads.into_iter().filter(|l| self.matches(l)).skip(self.offset);
        match self.limit {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn named(name: &str) -> NewLead {
        NewLead {
            name: name.to_string(),
            ..NewLead::default()
        }
    }

    fn workspace_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        crate::workspace::init(dir.path(), "test").unwrap();
        dir
    }

    #[test]
    fn new_lead_starts_at_initial_status() {
        let lead = Lead::new(named("Acme Corp")).unwrap();
        assert_eq!(lead.status, "not_contacted");
        assert_eq!(lead.stage(), PipelineStage::FollowUp);
        assert_eq!(lead.events.len(), 1);
        assert_eq!(lead.events[0].event_type, EventType::Created);
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(matches!(
            Lead::new(named("   ")),
            Err(LeadflowError::NameRequired)
        ));
    }

    #[test]
    fn create_requires_initialized_workspace() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Lead::create(dir.path(), named("Acme")),
            Err(LeadflowError::NotInitialized)
        ));
    }

    #[test]
    fn roundtrip_through_manifest() {
        let dir = workspace_dir();
        let mut lead = Lead::create(dir.path(), named("Acme Corp")).unwrap();
        lead.set_status(LeadStatus::Contacted);
        lead.add_note("spoke to purchasing");
        lead.save(dir.path()).unwrap();

        let loaded = Lead::load(dir.path(), lead.id).unwrap();
        assert_eq!(loaded.name, "Acme Corp");
        assert_eq!(loaded.status, "contacted");
        assert_eq!(loaded.notes.len(), 1);
        assert_eq!(loaded.events.len(), 3); // created, status_changed, note_added
    }

    #[test]
    fn load_unknown_id_fails() {
        let dir = workspace_dir();
        assert!(matches!(
            Lead::load(dir.path(), Uuid::new_v4()),
            Err(LeadflowError::LeadNotFound(_))
        ));
    }

    #[test]
    fn list_is_newest_first() {
        let dir = workspace_dir();
        let a = Lead::create(dir.path(), named("First")).unwrap();
        let mut b = Lead::create(dir.path(), named("Second")).unwrap();
        // Force a strictly later timestamp; creation can share a millisecond.
        b.created_at = a.created_at + chrono::Duration::seconds(1);
        b.save(dir.path()).unwrap();

        let leads = Lead::list(dir.path()).unwrap();
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].name, "Second");
    }

    #[test]
    fn status_overwrite_ignores_transition_graph() {
        let mut lead = Lead::new(named("Acme")).unwrap();
        // completed is nowhere in not_contacted's suggested transitions
        lead.set_status(LeadStatus::Completed);
        assert_eq!(lead.status, "completed");
        let event = lead.events.last().unwrap();
        assert_eq!(event.event_type, EventType::StatusChanged);
        assert_eq!(event.from.as_deref(), Some("not_contacted"));
        assert_eq!(event.to.as_deref(), Some("completed"));
    }

    #[test]
    fn set_status_same_value_is_noop() {
        let mut lead = Lead::new(named("Acme")).unwrap();
        lead.set_status(LeadStatus::NotContacted);
        assert_eq!(lead.events.len(), 1); // only the created event
    }

    #[test]
    fn strict_setter_rejects_off_graph_targets() {
        let mut lead = Lead::new(named("Acme")).unwrap();
        assert!(matches!(
            lead.set_status_strict(LeadStatus::Completed),
            Err(LeadflowError::RejectedTransition { .. })
        ));
        // suggested target goes through
        lead.set_status_strict(LeadStatus::Contacted).unwrap();
        assert_eq!(lead.status, "contacted");
    }

    #[test]
    fn strict_setter_defaults_unknown_current_status() {
        let mut lead = Lead::new(named("Acme")).unwrap();
        lead.status = "retired_status".to_string();
        // resolves to not_contacted, whose graph suggests no_answer
        lead.set_status_strict(LeadStatus::NoAnswer).unwrap();
        assert_eq!(lead.status, "no_answer");
    }

    #[test]
    fn update_records_field_changes() {
        let mut lead = Lead::new(named("Acme")).unwrap();
        let changed = lead
            .update(LeadUpdate {
                email: Some("sales@acme.test".to_string()),
                expected_revenue: Some(12000.0),
                ..LeadUpdate::default()
            })
            .unwrap();
        assert_eq!(changed, 2);

        let fields: Vec<_> = lead
            .events
            .iter()
            .filter(|e| e.event_type == EventType::FieldChanged)
            .filter_map(|e| e.field.as_deref())
            .collect();
        assert_eq!(fields, vec!["email", "expected_revenue"]);

        // same values again: nothing changes, no new events
        let before = lead.events.len();
        let changed = lead
            .update(LeadUpdate {
                email: Some("sales@acme.test".to_string()),
                expected_revenue: Some(12000.0),
                ..LeadUpdate::default()
            })
            .unwrap();
        assert_eq!(changed, 0);
        assert_eq!(lead.events.len(), before);
    }

    #[test]
    fn soft_delete_and_restore() {
        let mut lead = Lead::new(named("Acme")).unwrap();
        lead.soft_delete().unwrap();
        assert!(lead.is_deleted());
        assert!(matches!(
            lead.soft_delete(),
            Err(LeadflowError::AlreadyDeleted(_))
        ));

        lead.restore().unwrap();
        assert!(!lead.is_deleted());
        assert!(matches!(lead.restore(), Err(LeadflowError::NotDeleted(_))));

        let types: Vec<_> = lead.events.iter().map(|e| e.event_type).collect();
        assert_eq!(
            types,
            vec![EventType::Created, EventType::Deleted, EventType::Restored]
        );
    }

    #[test]
    fn note_ids_never_collide_after_removal() {
        let mut lead = Lead::new(named("Acme")).unwrap();
        let n1 = lead.add_note("first");
        let n2 = lead.add_note("second");
        assert_eq!((n1.as_str(), n2.as_str()), ("N1", "N2"));

        lead.remove_note("N1").unwrap();
        let n3 = lead.add_note("third");
        assert_eq!(n3, "N3");
        assert_eq!(lead.notes.len(), 2);

        assert!(matches!(
            lead.edit_note("N1", "gone"),
            Err(LeadflowError::NoteNotFound(_))
        ));
    }

    #[test]
    fn filter_excludes_deleted_by_default() {
        let dir = workspace_dir();
        let mut gone = Lead::create(dir.path(), named("Gone")).unwrap();
        gone.soft_delete().unwrap();
        gone.save(dir.path()).unwrap();
        Lead::create(dir.path(), named("Alive")).unwrap();

        let visible = Lead::list_filtered(dir.path(), &LeadFilter::default()).unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Alive");

        let all = Lead::list_filtered(
            dir.path(),
            &LeadFilter {
                include_deleted: true,
                ..LeadFilter::default()
            },
        )
        .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn filter_by_status_search_and_paging() {
        let mut leads = Vec::new();
        for (name, email, status) in [
            ("Acme Corp", "info@acme.test", LeadStatus::Contacted),
            ("Globex", "hello@globex.test", LeadStatus::Signed),
            ("Initech", "acme-fan@initech.test", LeadStatus::Contacted),
        ] {
            let mut lead = Lead::new(named(name)).unwrap();
            lead.email = Some(email.to_string());
            lead.set_status(status);
            leads.push(lead);
        }

        let contacted = LeadFilter {
            statuses: vec![LeadStatus::Contacted],
            ..LeadFilter::default()
        };
        assert_eq!(contacted.apply(leads.clone()).len(), 2);

        // case-insensitive substring over name and email
        let search = LeadFilter {
            search: Some("ACME".to_string()),
            ..LeadFilter::default()
        };
        let found = search.apply(leads.clone());
        assert_eq!(found.len(), 2);

        let paged = LeadFilter {
            offset: 1,
            limit: Some(1),
            ..LeadFilter::default()
        };
        let page = paged.apply(leads);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "Globex");
    }
}
