use thiserror::Error;

/// Failures surfaced by the session core and its remote collaborators.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Bad credentials, expired or invalid token, or a rejected auth call.
    #[error("authentication failed: {0}")]
    Auth(String),
    /// Input refused, either locally or by the server.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Service unreachable or temporarily failing.
    #[error("service unavailable: {0}")]
    Transient(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Durable key-value backend failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session encoding error: {0}")]
    Json(#[from] serde_json::Error),
}
