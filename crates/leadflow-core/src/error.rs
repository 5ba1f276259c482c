use thiserror::Error;

#[derive(Debug, Error)]
pub enum LeadflowError {
    #[error("not initialized: run 'leadflow init'")]
    NotInitialized,

    #[error("lead not found: {0}")]
    LeadNotFound(String),

    #[error("invalid lead id: {0}")]
    InvalidLeadId(String),

    #[error("lead name must not be empty")]
    NameRequired,

    #[error("lead already deleted: {0}")]
    AlreadyDeleted(String),

    #[error("lead is not deleted: {0}")]
    NotDeleted(String),

    #[error("note not found: {0}")]
    NoteNotFound(String),

    #[error("playbook not found: {0}")]
    PlaybookNotFound(String),

    #[error("playbook already exists: {0}")]
    PlaybookExists(String),

    #[error("invalid slug '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidSlug(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("invalid stage: {0}")]
    InvalidStage(String),

    #[error("transition from {from} to {to} rejected: {reason}")]
    RejectedTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LeadflowError>;
