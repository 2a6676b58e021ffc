use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid goal: {reason}")]
    InvalidGoal { reason: String },

    #[error("Search failed: {0}")]
    SearchFailed(String),

    #[error("Planner worker unavailable: {0}")]
    WorkerUnavailable(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Planning request rejected: {0}")]
    Rejected(String),

    #[error("Planning failed: {0}")]
    PlanningFailed(String),

    #[error("Planning timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
