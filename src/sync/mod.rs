//! Diffs a snapshot of currently-read books against the state store and
//! records progress events for every change.

use std::collections::{HashMap, HashSet};

use crate::domain::models::{BookRecord, ProgressEvent, SnapshotEntry};
use crate::error::SyncResult;
use crate::storage::{EventSink, SnapshotSource, StateStore};

/// Counts of what one reconciliation pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub created: usize,
    pub updated: usize,
    /// Matched entries whose page did not advance.
    pub unchanged: usize,
    /// Entries without page data.
    pub skipped: usize,
    pub finished: usize,
}

pub struct Reconciler<S, E> {
    store: S,
    sink: E,
}

impl<S: StateStore, E: EventSink> Reconciler<S, E> {
    pub fn new(store: S, sink: E) -> Self {
        Self { store, sink }
    }

    /// Apply `snapshot` to the store, appending one event per change.
    ///
    /// The store is listed once, before any mutation. A title repeated within the
    /// snapshot is therefore compared against the record as it was at the start of
    /// the pass each time.
    ///
    /// The first failure aborts the pass. Mutations already made stay in place and
    /// the next pass recomputes the diff from whatever was persisted.
    #[tracing::instrument(level = "debug", skip_all, fields(entries = snapshot.len()))]
    pub async fn reconcile(&self, snapshot: &[SnapshotEntry]) -> SyncResult<ReconcileSummary> {
        let current = self.store.list_all().await?;
        tracing::debug!(records = current.len(), "loaded current state");

        // last one wins on duplicate titles
        let by_title: HashMap<&str, &BookRecord> =
            current.iter().map(|b| (b.title.as_str(), b)).collect();

        let mut summary = ReconcileSummary::default();

        for entry in snapshot {
            let Some((current_page, total_pages)) = entry.pages() else {
                tracing::debug!(title = %entry.title, "no page data; skipping");
                summary.skipped += 1;
                continue;
            };

            match by_title.get(entry.title.as_str()) {
                None => {
                    self.start_book(&entry.title, current_page, total_pages)
                        .await?;
                    summary.created += 1;
                }
                Some(existing) => {
                    let delta = current_page.saturating_sub(existing.current_page);
                    if delta > 0 {
                        self.advance_book(existing, current_page, total_pages, delta)
                            .await?;
                        summary.updated += 1;
                    } else {
                        tracing::debug!(title = %entry.title, delta, "no progress");
                        summary.unchanged += 1;
                    }
                }
            }
        }

        // Presence, not progress, keeps a book alive.
        let still_reading: HashSet<&str> = snapshot.iter().map(|e| e.title.as_str()).collect();
        for book in current
            .iter()
            .filter(|b| !still_reading.contains(b.title.as_str()))
        {
            self.finish_book(book).await?;
            summary.finished += 1;
        }

        Ok(summary)
    }

    async fn start_book(&self, title: &str, current_page: i64, total_pages: i64) -> SyncResult<()> {
        let id = self.store.create(title, current_page, total_pages).await?;
        tracing::info!(%title, %id, current_page, total_pages, "started book");
        // Tracking may begin mid-book; count from page 0.
        self.sink
            .append(&ProgressEvent::progress(title, current_page))
            .await
    }

    async fn advance_book(
        &self,
        existing: &BookRecord,
        current_page: i64,
        total_pages: i64,
        delta: i64,
    ) -> SyncResult<()> {
        self.store
            .update(&existing.id, current_page, total_pages)
            .await?;
        tracing::info!(
            title = %existing.title,
            from = existing.current_page,
            to = current_page,
            "progress"
        );
        self.sink
            .append(&ProgressEvent::progress(&existing.title, delta))
            .await
    }

    async fn finish_book(&self, book: &BookRecord) -> SyncResult<()> {
        // Not clamped: stale totals can make this zero or negative. Saturates on
        // out-of-range stored values.
        let pages_read = book.total_pages.saturating_sub(book.current_page);
        self.store.delete(&book.id).await?;
        tracing::info!(title = %book.title, pages_read, "finished book");
        self.sink
            .append(&ProgressEvent::finished(&book.title, pages_read))
            .await
    }
}

/// Fetch a fresh snapshot and reconcile it.
pub async fn run_once<Src, S, E>(
    source: &Src,
    reconciler: &Reconciler<S, E>,
) -> SyncResult<ReconcileSummary>
where
    Src: SnapshotSource,
    S: StateStore,
    E: EventSink,
{
    let snapshot = source.fetch().await?;
    tracing::info!(books = snapshot.len(), "fetched reading snapshot");
    let summary = reconciler.reconcile(&snapshot).await?;
    tracing::info!(
        created = summary.created,
        updated = summary.updated,
        unchanged = summary.unchanged,
        skipped = summary.skipped,
        finished = summary.finished,
        "sync complete"
    );
    Ok(summary)
}
