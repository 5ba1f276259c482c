use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// EventType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Created,
    Updated,
    FieldChanged,
    StatusChanged,
    Deleted,
    Restored,
    NoteAdded,
    NoteUpdated,
    NoteDeleted,
}

impl EventType {
    pub fn all() -> &'static [EventType] {
        &[
            EventType::Created,
            EventType::Updated,
            EventType::FieldChanged,
            EventType::StatusChanged,
            EventType::Deleted,
            EventType::Restored,
            EventType::NoteAdded,
            EventType::NoteUpdated,
            EventType::NoteDeleted,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Created => "created",
            EventType::Updated => "updated",
            EventType::FieldChanged => "field_changed",
            EventType::StatusChanged => "status_changed",
            EventType::Deleted => "deleted",
            EventType::Restored => "restored",
            EventType::NoteAdded => "note_added",
            EventType::NoteUpdated => "note_updated",
            EventType::NoteDeleted => "note_deleted",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EventType::Created => "Lead created",
            EventType::Updated => "Updated",
            EventType::FieldChanged => "Field changed",
            EventType::StatusChanged => "Status changed",
            EventType::Deleted => "Deleted",
            EventType::Restored => "Restored",
            EventType::NoteAdded => "Note added",
            EventType::NoteUpdated => "Note updated",
            EventType::NoteDeleted => "Note deleted",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LeadEvent
// ---------------------------------------------------------------------------

/// Immutable audit record appended whenever a lead changes. Events are only
/// ever pushed onto a lead's event list — never edited or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadEvent {
    pub event_type: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LeadEvent {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            field: None,
            from: None,
            to: None,
            note_id: None,
            actor: None,
            created_at: Utc::now(),
        }
    }

    pub fn field_changed(
        field: impl Into<String>,
        from: Option<String>,
        to: Option<String>,
    ) -> Self {
        Self {
            field: Some(field.into()),
            from,
            to,
            ..Self::new(EventType::FieldChanged)
        }
    }

    pub fn status_changed(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: Some(from.into()),
            to: Some(to.into()),
            ..Self::new(EventType::StatusChanged)
        }
    }

    pub fn note(event_type: EventType, note_id: impl Into<String>) -> Self {
        Self {
            note_id: Some(note_id.into()),
            ..Self::new(event_type)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
