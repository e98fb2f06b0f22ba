use crate::domain::mapping::{
    event_properties, map_page_to_book, new_book_properties, progress_properties,
};
use crate::domain::models::{BookRecord, ProgressEvent};
use crate::error::{SyncError, SyncResult};
use crate::notion_client::NotionClient;
use crate::storage::{EventSink, StateStore};

/// Current books kept in a Notion database.
pub struct NotionStateStore {
    client: NotionClient,
    database_id: String,
}

impl NotionStateStore {
    pub fn new(client: NotionClient, database_id: impl Into<String>) -> Self {
        Self {
            client,
            database_id: database_id.into(),
        }
    }
}

#[async_trait::async_trait]
impl StateStore for NotionStateStore {
    #[tracing::instrument(level = "debug", skip(self), fields(database_id = %self.database_id))]
    async fn list_all(&self) -> SyncResult<Vec<BookRecord>> {
        let pages = self
            .client
            .database_pages(&self.database_id)
            .collect_all()
            .await
            .map_err(SyncError::StoreUnavailable)?;
        tracing::debug!(count = pages.len(), "listed current books");
        Ok(pages.iter().map(map_page_to_book).collect())
    }

    async fn create(
        &self,
        title: &str,
        current_page: i64,
        total_pages: i64,
    ) -> SyncResult<String> {
        let page = self
            .client
            .create_page(
                &self.database_id,
                new_book_properties(title, current_page, total_pages),
            )
            .await
            .map_err(SyncError::StoreUnavailable)?;
        Ok(page.id)
    }

    async fn update(&self, id: &str, current_page: i64, total_pages: i64) -> SyncResult<()> {
        self.client
            .update_page(id, progress_properties(current_page, total_pages))
            .await
            .map_err(SyncError::StoreUnavailable)?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> SyncResult<()> {
        self.client
            .delete_page(id)
            .await
            .map_err(SyncError::StoreUnavailable)
    }
}

/// Progress events appended as pages of a second Notion database.
pub struct NotionEventSink {
    client: NotionClient,
    database_id: String,
}

impl NotionEventSink {
    pub fn new(client: NotionClient, database_id: impl Into<String>) -> Self {
        Self {
            client,
            database_id: database_id.into(),
        }
    }
}

#[async_trait::async_trait]
impl EventSink for NotionEventSink {
    async fn append(&self, event: &ProgressEvent) -> SyncResult<()> {
        self.client
            .create_page(&self.database_id, event_properties(event))
            .await
            .map_err(SyncError::SinkUnavailable)?;
        Ok(())
    }
}
