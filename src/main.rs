mod config;
mod domain;
mod error;
mod goodreads;
mod notion_client;
mod storage;
mod sync;
#[cfg(test)]
mod test_support;

use std::path::Path;

use anyhow::Context;
use config::{Config, StoreBackend};
use goodreads::GoodreadsClient;
use notion_client::NotionClient;
use storage::{
    EventSink, StateStore,
    notion::{NotionEventSink, NotionStateStore},
    sqlite::{SqliteEventSink, SqliteStateStore},
};
use sync::Reconciler;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt::SubscriberBuilder, prelude::*};

type SyncAppResult<T> = anyhow::Result<T>;

// One pass, strictly sequential: a single-threaded runtime is all it needs.
#[tokio::main(flavor = "current_thread")]
async fn main() -> SyncAppResult<()> {
    // Initialize tracing (logs). Respect RUST_LOG if set, default to info for our crate and warn for deps.
    let default_filter = format!(
        "{}=info,reqwest=warn,sea_orm=warn,sqlx=warn",
        env!("CARGO_PKG_NAME")
    );
    let env_filter = std::env::var("RUST_LOG").unwrap_or(default_filter);
    SubscriberBuilder::default()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .finish()
        .with(ErrorLayer::default())
        .init();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting Goodreads reading sync"
    );
    // Load environment variables from .env files
    if Path::new(".env.local").exists() {
        dotenvy::from_filename(".env.local")?;
    } else if Path::new(".env").exists() {
        dotenvy::from_filename(".env")?;
    };
    let config = Config::load().map_err(|e| anyhow::anyhow!(e))?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let source = GoodreadsClient::new(&config.goodreads_base_url, &config.goodreads_user_id)?;
    tracing::info!(profile = %source.profile_url(), backend = ?config.backend, "configured sync");

    match config.backend {
        StoreBackend::Notion => {
            let client = NotionClient::new(&config.notion_base_url)?
                .with_api_key(&config.notion_api_key);
            let store = NotionStateStore::new(client.clone(), &config.notion_books_db_id);
            let sink = NotionEventSink::new(client, &config.notion_events_db_id);
            run(&source, Reconciler::new(store, sink)).await
        }
        StoreBackend::Sqlite => {
            let db = storage::sqlite::connect(config.db_connection_string.as_str()).await?;
            let store = SqliteStateStore::new(db.clone());
            let sink = SqliteEventSink::new(db);
            run(&source, Reconciler::new(store, sink)).await
        }
    }
}

async fn run<S: StateStore, E: EventSink>(
    source: &GoodreadsClient,
    reconciler: Reconciler<S, E>,
) -> SyncAppResult<()> {
    sync::run_once(source, &reconciler)
        .await
        .context("reading sync failed")?;
    Ok(())
}
