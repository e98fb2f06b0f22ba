//! Failures surfaced by the sync's external boundaries

use thiserror::Error;

/// Errors that abort a sync run. None of them are retried.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The profile page could not be fetched or its layout was not recognised.
    #[error("snapshot source unavailable: {0:#}")]
    SourceUnavailable(anyhow::Error),
    #[error("state store unavailable: {0:#}")]
    StoreUnavailable(anyhow::Error),
    #[error("event sink unavailable: {0:#}")]
    SinkUnavailable(anyhow::Error),
}

pub type SyncResult<T> = Result<T, SyncError>;
