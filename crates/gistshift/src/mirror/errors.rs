use thiserror::Error;

use crate::platform::PlatformError;
use crate::transfer::TransferError;

/// Errors that abandon a single snippet's migration.
///
/// None of these stop the batch; the orchestrator records them and moves on
/// to the next snippet.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// A remote API call failed.
    #[error(transparent)]
    Remote(#[from] PlatformError),

    /// Cloning or pushing content failed.
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// The snippet cannot be migrated as-is (no files, unusable name).
    #[error("precondition failed: {0}")]
    Precondition(String),
}

impl MirrorError {
    #[inline]
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }
}
