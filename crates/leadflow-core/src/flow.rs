use crate::status::{resolve, LeadStatus, PipelineStage};

// ---------------------------------------------------------------------------
// Hidden statuses
// ---------------------------------------------------------------------------

/// Statuses excluded from new-selection pickers (quick actions, dropdowns).
/// A lead that already carries one of these still renders normally, and
/// hidden-ness does not affect stage membership or graph edges.
pub const HIDDEN_STATUSES: &[LeadStatus] = &[
    LeadStatus::NotContacted,     // initial state, never offered as an action
    LeadStatus::Contacted,        // intermediate, prefer something more specific
    LeadStatus::PendingAgreement, // intermediate
    LeadStatus::FutureInterest,   // rarely selected manually
];

pub fn is_hidden(status: LeadStatus) -> bool {
    HIDDEN_STATUSES.contains(&status)
}

// ---------------------------------------------------------------------------
// Transition graph
// ---------------------------------------------------------------------------

/// Suggested next statuses for each status, in display order.
///
/// The graph is advisory: it drives which quick-action buttons a UI offers
/// and nothing else. [`crate::lead::Lead::set_status`] accepts any status
/// regardless of these edges so operators can correct data-entry mistakes.
pub fn transitions(status: LeadStatus) -> &'static [LeadStatus] {
    match status {
        // follow-up
        LeadStatus::NotContacted => &[
            LeadStatus::Contacted,
            LeadStatus::NoAnswer,
            LeadStatus::NotRelevant,
        ],
        LeadStatus::NoAnswer => &[
            LeadStatus::Contacted,
            LeadStatus::MessageSent,
            LeadStatus::NotRelevant,
            LeadStatus::FutureInterest,
        ],
        // warm
        LeadStatus::Contacted => &[
            LeadStatus::MeetingSet,
            LeadStatus::MessageSent,
            LeadStatus::PendingAgreement,
            LeadStatus::NotRelevant,
        ],
        LeadStatus::MessageSent => &[
            LeadStatus::Contacted,
            LeadStatus::MeetingSet,
            LeadStatus::NoAnswer,
            LeadStatus::FutureInterest,
        ],
        // hot
        LeadStatus::MeetingSet => &[
            LeadStatus::PendingAgreement,
            LeadStatus::Signed,
            LeadStatus::NotRelevant,
            LeadStatus::ClosedElsewhere,
        ],
        LeadStatus::PendingAgreement => &[
            LeadStatus::Signed,
            LeadStatus::NotRelevant,
            LeadStatus::ClosedElsewhere,
        ],
        // signed (active customers)
        LeadStatus::Signed => &[
            LeadStatus::UnderReview,
            LeadStatus::ReportSubmitted,
            LeadStatus::MissingDocument,
            LeadStatus::Completed,
        ],
        LeadStatus::UnderReview => &[
            LeadStatus::ReportSubmitted,
            LeadStatus::MissingDocument,
            LeadStatus::Completed,
        ],
        LeadStatus::ReportSubmitted => &[LeadStatus::Completed, LeadStatus::MissingDocument],
        LeadStatus::MissingDocument => &[
            LeadStatus::UnderReview,
            LeadStatus::ReportSubmitted,
            LeadStatus::Completed,
        ],
        LeadStatus::Completed => &[LeadStatus::Signed],
        // lost
        LeadStatus::NotRelevant => &[LeadStatus::NotContacted, LeadStatus::FutureInterest],
        LeadStatus::ClosedElsewhere => &[LeadStatus::NotContacted, LeadStatus::FutureInterest],
        // future
        LeadStatus::FutureInterest => &[LeadStatus::Contacted, LeadStatus::NotContacted],
    }
}

/// Whether the graph suggests `to` as a next status from `from`. Used only
/// by the opt-in strict setter; the default write path ignores the graph.
pub fn suggests(from: LeadStatus, to: LeadStatus) -> bool {
    transitions(from).contains(&to)
}

// ---------------------------------------------------------------------------
// Picker helpers
// ---------------------------------------------------------------------------

/// Quick actions for a raw status string: the (defaulted) status's graph
/// entry with hidden statuses filtered out, relative order preserved.
pub fn quick_actions(status: Option<&str>) -> Vec<LeadStatus> {
    transitions(resolve(status))
        .iter()
        .copied()
        .filter(|s| !is_hidden(*s))
        .collect()
}

/// A stage's statuses with hidden ones filtered out, order preserved.
/// Used to populate status pickers.
pub fn visible_statuses(stage: PipelineStage) -> Vec<LeadStatus> {
    stage
        .statuses()
        .iter()
        .copied()
        .filter(|s| !is_hidden(*s))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
