// Local sqlite backend for both stores

use anyhow::Context;
use chrono::Utc;
use entities::prelude::CurrentBook;
use entities::{current_book, reading_event};
use migration::MigratorTrait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryOrder,
};
use uuid::Uuid;

use crate::domain::models::{BookRecord, ProgressEvent};
use crate::error::{SyncError, SyncResult};
use crate::storage::{EventSink, StateStore};

const DEFAULT_PAGE_SIZE: u64 = 100;

/// Connect and bring the schema up to date.
pub async fn connect(options: impl Into<ConnectOptions>) -> anyhow::Result<DatabaseConnection> {
    let db = Database::connect(options)
        .await
        .with_context(|| "Failed to connect to database")?;
    migration::Migrator::up(&db, None)
        .await
        .with_context(|| "Failed to run database migrations")?;
    Ok(db)
}

pub struct SqliteStateStore {
    db: DatabaseConnection,
    page_size: u64,
}

impl SqliteStateStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    #[cfg(test)]
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    async fn list_rows(&self) -> anyhow::Result<Vec<BookRecord>> {
        // v7 ids sort in insertion order
        let mut pages = CurrentBook::find()
            .order_by_asc(current_book::Column::Id)
            .paginate(&self.db, self.page_size);
        let mut records = Vec::new();
        while let Some(batch) = pages
            .fetch_and_next()
            .await
            .context("fetch current books page")?
        {
            records.extend(batch.into_iter().map(BookRecord::from));
        }
        Ok(records)
    }

    async fn update_row(&self, id: &str, current_page: i64, total_pages: i64) -> anyhow::Result<()> {
        let id = parse_id(id)?;
        current_book::ActiveModel {
            id: Set(id),
            current_page: Set(current_page),
            total_pages: Set(total_pages),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .with_context(|| format!("update current book {id}"))?;
        Ok(())
    }

    async fn delete_row(&self, id: &str) -> anyhow::Result<()> {
        let id = parse_id(id)?;
        let result = CurrentBook::delete_by_id(id)
            .exec(&self.db)
            .await
            .with_context(|| format!("delete current book {id}"))?;
        if result.rows_affected == 0 {
            anyhow::bail!("no current book with id {id}");
        }
        Ok(())
    }
}

fn parse_id(id: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(id).with_context(|| format!("Invalid book id: {}", id))
}

#[async_trait::async_trait]
impl StateStore for SqliteStateStore {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn list_all(&self) -> SyncResult<Vec<BookRecord>> {
        self.list_rows().await.map_err(SyncError::StoreUnavailable)
    }

    async fn create(
        &self,
        title: &str,
        current_page: i64,
        total_pages: i64,
    ) -> SyncResult<String> {
        let row = current_book::ActiveModel {
            id: Set(Uuid::now_v7()),
            title: Set(title.to_owned()),
            current_page: Set(current_page),
            total_pages: Set(total_pages),
        }
        .insert(&self.db)
        .await
        .context("insert current book")
        .map_err(SyncError::StoreUnavailable)?;
        Ok(row.id.to_string())
    }

    async fn update(&self, id: &str, current_page: i64, total_pages: i64) -> SyncResult<()> {
        self.update_row(id, current_page, total_pages)
            .await
            .map_err(SyncError::StoreUnavailable)
    }

    async fn delete(&self, id: &str) -> SyncResult<()> {
        self.delete_row(id).await.map_err(SyncError::StoreUnavailable)
    }
}

pub struct SqliteEventSink {
    db: DatabaseConnection,
}

impl SqliteEventSink {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl EventSink for SqliteEventSink {
    async fn append(&self, event: &ProgressEvent) -> SyncResult<()> {
        reading_event::ActiveModel {
            title: Set(event.title.clone()),
            pages_read: Set(event.pages_read),
            finished: Set(event.finished),
            recorded_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("insert reading event")
        .map_err(SyncError::SinkUnavailable)?;
        Ok(())
    }
}
