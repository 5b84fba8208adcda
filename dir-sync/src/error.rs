use thiserror::Error;

pub type DirSyncResult<T> = Result<T, DirSyncError>;

#[derive(Debug, Error)]
pub enum DirSyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("not logged in or no organization set")]
    NotAuthenticated,

    #[error("no configuration for directory server")]
    MissingServerConfig,

    #[error("no configuration for sync")]
    MissingSyncConfig,

    #[error("invalid service account credential: {reason}")]
    InvalidCredential { reason: String },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("directory API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited: retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error)
}

impl DirSyncError {
    /// Whether the caller's own retry policy may reasonably re-issue the
    /// call. This core never retries internally.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::RateLimited { .. })
    }

    pub fn retry_after(&self) -> Option<u64> {
        if let Self::RateLimited {
            retry_after_seconds
        } = self
        {
            Some(*retry_after_seconds)
        } else {
            None
        }
    }
}
