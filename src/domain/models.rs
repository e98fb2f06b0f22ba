// Domain models shared by the snapshot source, the stores and the reconciler

/// A book currently being read, as persisted in the state store.
///
/// `current_page <= total_pages` is expected but not enforced; upstream data may
/// violate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRecord {
    /// Opaque store-assigned identifier.
    pub id: String,
    pub title: String,
    pub current_page: i64,
    pub total_pages: i64,
}

/// One in-progress book as scraped from the profile page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub title: String,
    pub current_page: Option<i64>,
    pub total_pages: Option<i64>,
}

impl SnapshotEntry {
    pub fn new(title: impl Into<String>, current_page: i64, total_pages: i64) -> Self {
        Self {
            title: title.into(),
            current_page: Some(current_page),
            total_pages: Some(total_pages),
        }
    }

    /// An entry whose progress could not be read.
    pub fn without_progress(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            current_page: None,
            total_pages: None,
        }
    }

    /// Returns `(current_page, total_pages)` when both are known.
    pub fn pages(&self) -> Option<(i64, i64)> {
        Some((self.current_page?, self.total_pages?))
    }
}

/// Append-only record of progress made on a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub title: String,
    /// May be zero or negative when upstream data regresses.
    pub pages_read: i64,
    pub finished: bool,
}

impl ProgressEvent {
    pub fn progress(title: impl Into<String>, pages_read: i64) -> Self {
        Self {
            title: title.into(),
            pages_read,
            finished: false,
        }
    }

    pub fn finished(title: impl Into<String>, pages_read: i64) -> Self {
        Self {
            title: title.into(),
            pages_read,
            finished: true,
        }
    }
}
