// In-memory fakes recording every mutation, for reconciler tests

use std::sync::{Arc, Mutex};

use crate::domain::models::{BookRecord, ProgressEvent, SnapshotEntry};
use crate::error::{SyncError, SyncResult};
use crate::storage::{EventSink, SnapshotSource, StateStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create {
        title: String,
        current_page: i64,
        total_pages: i64,
    },
    Update {
        id: String,
        current_page: i64,
        total_pages: i64,
    },
    Delete {
        id: String,
    },
    Append(ProgressEvent),
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

#[derive(Default)]
struct StoreState {
    records: Vec<BookRecord>,
    next_id: usize,
}

pub struct MemoryStateStore {
    state: Mutex<StoreState>,
    log: CallLog,
    fail_title: Option<String>,
}

impl MemoryStateStore {
    pub fn new(log: CallLog) -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            log,
            fail_title: None,
        }
    }

    /// Mutations touching this title fail with `StoreUnavailable`.
    pub fn failing_on(mut self, title: &str) -> Self {
        self.fail_title = Some(title.to_string());
        self
    }

    /// Seed a record without logging a call. Returns its id.
    pub fn seed(&self, title: &str, current_page: i64, total_pages: i64) -> String {
        let mut state = self.state.lock().expect("store state");
        Self::insert(&mut state, title, current_page, total_pages)
    }

    pub fn records(&self) -> Vec<BookRecord> {
        self.state.lock().expect("store state").records.clone()
    }

    fn insert(state: &mut StoreState, title: &str, current_page: i64, total_pages: i64) -> String {
        state.next_id += 1;
        let id = format!("book-{}", state.next_id);
        state.records.push(BookRecord {
            id: id.clone(),
            title: title.to_string(),
            current_page,
            total_pages,
        });
        id
    }

    fn check(&self, title: &str) -> SyncResult<()> {
        match &self.fail_title {
            Some(t) if t == title => Err(SyncError::StoreUnavailable(anyhow::anyhow!(
                "injected store failure for {title}"
            ))),
            _ => Ok(()),
        }
    }

    fn title_of(state: &StoreState, id: &str) -> SyncResult<String> {
        state
            .records
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.title.clone())
            .ok_or_else(|| SyncError::StoreUnavailable(anyhow::anyhow!("no record {id}")))
    }

    fn record(&self, call: Call) {
        self.log.lock().expect("call log").push(call);
    }
}

#[async_trait::async_trait]
impl StateStore for MemoryStateStore {
    async fn list_all(&self) -> SyncResult<Vec<BookRecord>> {
        Ok(self.records())
    }

    async fn create(
        &self,
        title: &str,
        current_page: i64,
        total_pages: i64,
    ) -> SyncResult<String> {
        self.check(title)?;
        let id = {
            let mut state = self.state.lock().expect("store state");
            Self::insert(&mut state, title, current_page, total_pages)
        };
        self.record(Call::Create {
            title: title.to_string(),
            current_page,
            total_pages,
        });
        Ok(id)
    }

    async fn update(&self, id: &str, current_page: i64, total_pages: i64) -> SyncResult<()> {
        {
            let mut state = self.state.lock().expect("store state");
            let title = Self::title_of(&state, id)?;
            self.check(&title)?;
            if let Some(r) = state.records.iter_mut().find(|r| r.id == id) {
                r.current_page = current_page;
                r.total_pages = total_pages;
            }
        }
        self.record(Call::Update {
            id: id.to_string(),
            current_page,
            total_pages,
        });
        Ok(())
    }

    async fn delete(&self, id: &str) -> SyncResult<()> {
        {
            let mut state = self.state.lock().expect("store state");
            let title = Self::title_of(&state, id)?;
            self.check(&title)?;
            state.records.retain(|r| r.id != id);
        }
        self.record(Call::Delete { id: id.to_string() });
        Ok(())
    }
}

pub struct MemoryEventSink {
    log: CallLog,
    fail_title: Option<String>,
}

impl MemoryEventSink {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            fail_title: None,
        }
    }

    /// Appends for this title fail with `SinkUnavailable`.
    pub fn failing_on(mut self, title: &str) -> Self {
        self.fail_title = Some(title.to_string());
        self
    }
}

#[async_trait::async_trait]
impl EventSink for MemoryEventSink {
    async fn append(&self, event: &ProgressEvent) -> SyncResult<()> {
        if self.fail_title.as_deref() == Some(event.title.as_str()) {
            return Err(SyncError::SinkUnavailable(anyhow::anyhow!(
                "injected sink failure for {}",
                event.title
            )));
        }
        self.log
            .lock()
            .expect("call log")
            .push(Call::Append(event.clone()));
        Ok(())
    }
}

/// Source returning a fixed snapshot, or failing.
pub struct StaticSource(pub Option<Vec<SnapshotEntry>>);

#[async_trait::async_trait]
impl SnapshotSource for StaticSource {
    async fn fetch(&self) -> SyncResult<Vec<SnapshotEntry>> {
        self.0
            .clone()
            .ok_or_else(|| SyncError::SourceUnavailable(anyhow::anyhow!("status 503")))
    }
}
