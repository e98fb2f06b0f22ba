use std::str::FromStr;

use crate::{goodreads, notion_client};

/// Where current books and progress events are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Notion,
    Sqlite,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "notion" => Ok(StoreBackend::Notion),
            "sqlite" => Ok(StoreBackend::Sqlite),
            other => Err(format!(
                "Invalid SYNC_BACKEND: {other} (expected notion or sqlite)"
            )),
        }
    }
}

#[derive(Debug)]
pub struct Config {
    pub backend: StoreBackend,
    pub notion_api_key: String,
    pub notion_base_url: String,
    pub notion_books_db_id: String,
    pub notion_events_db_id: String,
    pub goodreads_user_id: String,
    pub goodreads_base_url: String,
    pub db_connection_string: String,
}

const DEFAULT_DB_CONNECTION_STRING: &str = "sqlite://reading.sqlite?mode=rwc";

impl Config {
    pub fn load() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset and empty values are treated alike.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let backend = var("SYNC_BACKEND")
            .map(|b| b.parse::<StoreBackend>())
            .transpose()?
            .unwrap_or(StoreBackend::Notion);

        Ok(Config {
            backend,
            notion_api_key: var("NOTION_API_KEY").unwrap_or_default(),
            notion_base_url: var("NOTION_BASE_URL")
                .unwrap_or(notion_client::DEFAULT_BASE_URL.into()),
            notion_books_db_id: var("NOTION_DB_ID").unwrap_or_default(),
            notion_events_db_id: var("NOTION_DB_EVENT_ID").unwrap_or_default(),
            goodreads_user_id: var("GOODREADS_ID").unwrap_or_default(),
            goodreads_base_url: var("GOODREADS_BASE_URL")
                .unwrap_or(goodreads::DEFAULT_BASE_URL.into()),
            db_connection_string: var("DB_CONNECTION_STRING")
                .unwrap_or(DEFAULT_DB_CONNECTION_STRING.into()),
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.goodreads_user_id.is_empty() {
            return Err("GOODREADS_ID is missing".into());
        }
        if self.backend == StoreBackend::Notion {
            if self.notion_api_key.is_empty() {
                return Err("NOTION_API_KEY is missing".into());
            }
            if self.notion_books_db_id.is_empty() {
                return Err("NOTION_DB_ID is missing".into());
            }
            if self.notion_events_db_id.is_empty() {
                return Err("NOTION_DB_EVENT_ID is missing".into());
            }
        }
        Ok(())
    }
}
