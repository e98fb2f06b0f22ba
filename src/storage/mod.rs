// Traits for the sync's collaborators; notion and sqlite implementations below

pub mod notion;
pub mod sqlite;

#[cfg(test)]
pub mod memory;

use crate::domain::models::{BookRecord, ProgressEvent, SnapshotEntry};
use crate::error::SyncResult;

/// Produces the books currently being read, in the source's display order.
#[async_trait::async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self) -> SyncResult<Vec<SnapshotEntry>>;
}

/// "Currently reading" records, one per book, addressed by a store-assigned id.
///
/// Every method fails with `SyncError::StoreUnavailable`.
#[async_trait::async_trait]
pub trait StateStore: Send + Sync {
    /// Every record in the store, following pagination until exhausted.
    async fn list_all(&self) -> SyncResult<Vec<BookRecord>>;
    /// Returns the id of the new record.
    async fn create(&self, title: &str, current_page: i64, total_pages: i64)
    -> SyncResult<String>;
    async fn update(&self, id: &str, current_page: i64, total_pages: i64) -> SyncResult<()>;
    async fn delete(&self, id: &str) -> SyncResult<()>;
}

/// Append-only progress log. Fails with `SyncError::SinkUnavailable`.
#[async_trait::async_trait]
pub trait EventSink: Send + Sync {
    async fn append(&self, event: &ProgressEvent) -> SyncResult<()>;
}
