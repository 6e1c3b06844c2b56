use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Unverified claim rejected: {0}")]
    UnverifiedClaimRejected(String),

    #[error("Checker failure: {0}")]
    Collaborator(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
