use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failures reported by the snippet host or the way to reach it.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The host rejected the call with a status we have no finer mapping for.
    #[error("API error: {message}")]
    Api { message: String },

    /// Primary quota exhausted or a secondary limit hit; retry after `reset_at`.
    #[error("Rate limit exceeded. Resets at {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    #[error("Authentication required")]
    AuthRequired,

    /// A gist, repository or organization the call named does not exist.
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// Creation lost a race: something with the same name appeared between
    /// the existence check and the create call.
    #[error("Already exists: {resource}")]
    AlreadyExists { resource: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PlatformError {
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn already_exists(resource: impl Into<String>) -> Self {
        Self::AlreadyExists {
            resource: resource.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Only rate limits are worth retrying; everything else fails the migration.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// A missing target is the normal "create it" signal, not a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

/// First line of an error's message. Git failures carry the whole stderr.
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
