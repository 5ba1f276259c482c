use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// LeadStatus
// ---------------------------------------------------------------------------

/// Fine-grained lifecycle label on a lead. Stored on disk as a plain string
/// so rows written by older schema revisions survive round-trips; anything
/// the current taxonomy doesn't recognize degrades to [`LeadStatus::DEFAULT`]
/// at read time (see [`status_config`] / [`pipeline_stage`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    NotContacted,
    NoAnswer,
    Contacted,
    MessageSent,
    MeetingSet,
    PendingAgreement,
    Signed,
    UnderReview,
    ReportSubmitted,
    MissingDocument,
    Completed,
    NotRelevant,
    ClosedElsewhere,
    FutureInterest,
}

impl LeadStatus {
    /// The taxonomy's initial status. Every fallback site (config lookup,
    /// stage lookup, quick-actions lookup) resolves unknown input to this
    /// one value.
    pub const DEFAULT: LeadStatus = LeadStatus::NotContacted;

    pub fn all() -> &'static [LeadStatus] {
        &[
            LeadStatus::NotContacted,
            LeadStatus::NoAnswer,
            LeadStatus::Contacted,
            LeadStatus::MessageSent,
            LeadStatus::MeetingSet,
            LeadStatus::PendingAgreement,
            LeadStatus::Signed,
            LeadStatus::UnderReview,
            LeadStatus::ReportSubmitted,
            LeadStatus::MissingDocument,
            LeadStatus::Completed,
            LeadStatus::NotRelevant,
            LeadStatus::ClosedElsewhere,
            LeadStatus::FutureInterest,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::NotContacted => "not_contacted",
            LeadStatus::NoAnswer => "no_answer",
            LeadStatus::Contacted => "contacted",
            LeadStatus::MessageSent => "message_sent",
            LeadStatus::MeetingSet => "meeting_set",
            LeadStatus::PendingAgreement => "pending_agreement",
            LeadStatus::Signed => "signed",
            LeadStatus::UnderReview => "under_review",
            LeadStatus::ReportSubmitted => "report_submitted",
            LeadStatus::MissingDocument => "missing_document",
            LeadStatus::Completed => "completed",
            LeadStatus::NotRelevant => "not_relevant",
            LeadStatus::ClosedElsewhere => "closed_elsewhere",
            LeadStatus::FutureInterest => "future_interest",
        }
    }

    pub fn label(self) -> &'static str {
        self.config().label
    }

    pub fn config(self) -> &'static StatusConfig {
        config_of(self)
    }

    /// The pipeline stage this status belongs to (O(1) reverse lookup).
    pub fn stage(self) -> PipelineStage {
        *stage_index().get(&self).unwrap_or(&PipelineStage::FollowUp)
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LeadStatus {
    type Err = crate::error::LeadflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeadStatus::all()
            .iter()
            .find(|status| status.as_str() == s)
            .copied()
            .ok_or_else(|| crate::error::LeadflowError::InvalidStatus(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// PipelineStage
// ---------------------------------------------------------------------------

/// Coarse grouping of statuses. The six stages partition the full status
/// enumeration: every status belongs to exactly one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    FollowUp,
    Warm,
    Hot,
    Signed,
    Lost,
    Future,
}

impl PipelineStage {
    pub fn all() -> &'static [PipelineStage] {
        &[
            PipelineStage::FollowUp,
            PipelineStage::Warm,
            PipelineStage::Hot,
            PipelineStage::Signed,
            PipelineStage::Lost,
            PipelineStage::Future,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStage::FollowUp => "follow_up",
            PipelineStage::Warm => "warm",
            PipelineStage::Hot => "hot",
            PipelineStage::Signed => "signed",
            PipelineStage::Lost => "lost",
            PipelineStage::Future => "future",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PipelineStage::FollowUp => "Follow-up",
            PipelineStage::Warm => "Warm",
            PipelineStage::Hot => "Hot",
            PipelineStage::Signed => "Active customers",
            PipelineStage::Lost => "Lost",
            PipelineStage::Future => "Future",
        }
    }

    /// The statuses belonging to this stage, in display order.
    pub fn statuses(self) -> &'static [LeadStatus] {
        match self {
            PipelineStage::FollowUp => &[LeadStatus::NotContacted, LeadStatus::NoAnswer],
            PipelineStage::Warm => &[LeadStatus::Contacted, LeadStatus::MessageSent],
            PipelineStage::Hot => &[LeadStatus::MeetingSet, LeadStatus::PendingAgreement],
            PipelineStage::Signed => &[
                LeadStatus::Signed,
                LeadStatus::UnderReview,
                LeadStatus::ReportSubmitted,
                LeadStatus::MissingDocument,
                LeadStatus::Completed,
            ],
            PipelineStage::Lost => &[LeadStatus::NotRelevant, LeadStatus::ClosedElsewhere],
            PipelineStage::Future => &[LeadStatus::FutureInterest],
        }
    }

    /// Position within the forward sales funnel (follow_up → signed), used
    /// for progress indicators. Lost and future sit outside the funnel.
    pub fn progress_index(self) -> Option<usize> {
        match self {
            PipelineStage::FollowUp => Some(0),
            PipelineStage::Warm => Some(1),
            PipelineStage::Hot => Some(2),
            PipelineStage::Signed => Some(3),
            PipelineStage::Lost | PipelineStage::Future => None,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PipelineStage {
    type Err = crate::error::LeadflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PipelineStage::all()
            .iter()
            .find(|stage| stage.as_str() == s)
            .copied()
            .ok_or_else(|| crate::error::LeadflowError::InvalidStage(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// StatusConfig
// ---------------------------------------------------------------------------

/// Per-status display metadata. Static data, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusConfig {
    pub label: &'static str,
    pub color: &'static str,
    pub css_class: &'static str,
    pub stage: PipelineStage,
}

fn config_of(status: LeadStatus) -> &'static StatusConfig {
    match status {
        LeadStatus::NotContacted => &StatusConfig {
            label: "Not contacted",
            color: "#0073EA",
            css_class: "status-not-contacted",
            stage: PipelineStage::FollowUp,
        },
        LeadStatus::NoAnswer => &StatusConfig {
            label: "No answer",
            color: "#676879",
            css_class: "status-no-answer",
            stage: PipelineStage::FollowUp,
        },
        LeadStatus::Contacted => &StatusConfig {
            label: "Contacted",
            color: "#D17A00",
            css_class: "status-contacted",
            stage: PipelineStage::Warm,
        },
        LeadStatus::MessageSent => &StatusConfig {
            label: "Message sent",
            color: "#D17A00",
            css_class: "status-message-sent",
            stage: PipelineStage::Warm,
        },
        LeadStatus::MeetingSet => &StatusConfig {
            label: "Meeting scheduled",
            color: "#D93D42",
            css_class: "status-meeting-set",
            stage: PipelineStage::Hot,
        },
        LeadStatus::PendingAgreement => &StatusConfig {
            label: "Pending agreement",
            color: "#D17A00",
            css_class: "status-pending-agreement",
            stage: PipelineStage::Hot,
        },
        LeadStatus::Signed => &StatusConfig {
            label: "Signed",
            color: "#00854D",
            css_class: "status-signed",
            stage: PipelineStage::Signed,
        },
        LeadStatus::UnderReview => &StatusConfig {
            label: "Under review",
            color: "#00854D",
            css_class: "status-under-review",
            stage: PipelineStage::Signed,
        },
        LeadStatus::ReportSubmitted => &StatusConfig {
            label: "Report submitted",
            color: "#00854D",
            css_class: "status-report-submitted",
            stage: PipelineStage::Signed,
        },
        LeadStatus::MissingDocument => &StatusConfig {
            label: "Missing document",
            color: "#00854D",
            css_class: "status-missing-document",
            stage: PipelineStage::Signed,
        },
        LeadStatus::Completed => &StatusConfig {
            label: "Completed",
            color: "#00854D",
            css_class: "status-completed",
            stage: PipelineStage::Signed,
        },
        LeadStatus::NotRelevant => &StatusConfig {
            label: "Not relevant",
            color: "#D83A52",
            css_class: "status-not-relevant",
            stage: PipelineStage::Lost,
        },
        LeadStatus::ClosedElsewhere => &StatusConfig {
            label: "Closed elsewhere",
            color: "#D83A52",
            css_class: "status-closed-elsewhere",
            stage: PipelineStage::Lost,
        },
        LeadStatus::FutureInterest => &StatusConfig {
            label: "Future interest",
            color: "#00A0B0",
            css_class: "status-future-interest",
            stage: PipelineStage::Future,
        },
    }
}

// ---------------------------------------------------------------------------
// Reverse stage index
// ---------------------------------------------------------------------------

/// status → stage map built once from the stage partition. Read-only after
/// construction. A status missing from the partition would silently fall
/// back to `follow_up` on lookup rather than error; the test suite asserts
/// the partition is total so that can't happen in practice.
fn stage_index() -> &'static HashMap<LeadStatus, PipelineStage> {
    static INDEX: OnceLock<HashMap<LeadStatus, PipelineStage>> = OnceLock::new();
    INDEX.get_or_init(|| {
        let mut map = HashMap::new();
        for &stage in PipelineStage::all() {
            for &status in stage.statuses() {
                map.insert(status, stage);
            }
        }
        map
    })
}

// ---------------------------------------------------------------------------
// Fallback classifier
// ---------------------------------------------------------------------------

/// Resolve a raw status string to a taxonomy member. None, empty, and
/// unrecognized input all degrade to [`LeadStatus::DEFAULT`] — old rows may
/// carry retired status strings and must never fail to render.
pub fn resolve(status: Option<&str>) -> LeadStatus {
    match status {
        Some(s) if !s.is_empty() => s.parse().unwrap_or(LeadStatus::DEFAULT),
        _ => LeadStatus::DEFAULT,
    }
}

/// Display configuration for a raw status string. Never fails.
pub fn status_config(status: Option<&str>) -> &'static StatusConfig {
    resolve(status).config()
}

/// Pipeline stage for a raw status string. Never fails.
pub fn pipeline_stage(status: Option<&str>) -> PipelineStage {
    resolve(status).stage()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
