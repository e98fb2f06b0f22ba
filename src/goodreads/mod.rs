// Snapshot source backed by a public Goodreads profile page

mod parse;

pub use parse::parse_currently_reading;

use anyhow::Context;

use crate::domain::models::SnapshotEntry;
use crate::error::{SyncError, SyncResult};
use crate::storage::SnapshotSource;

pub const DEFAULT_BASE_URL: &str = "https://www.goodreads.com";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/113.0.0.0 Safari/537.36";

#[derive(Clone, Debug)]
pub struct GoodreadsClient {
    base_url: String,
    user_id: String,
    client: reqwest::Client,
}

impl GoodreadsClient {
    pub fn new(base_url: impl Into<String>, user_id: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        let base_url_str = base_url.into();
        tracing::debug!(base_url = %base_url_str, "creating GoodreadsClient");
        Ok(GoodreadsClient {
            base_url: base_url_str.trim_end_matches('/').to_string(),
            user_id: user_id.into(),
            client,
        })
    }

    pub fn profile_url(&self) -> String {
        format!("{}/user/show/{}", self.base_url, self.user_id)
    }

    /// GET /user/show/{user_id}
    #[tracing::instrument(level = "debug", skip(self), fields(user_id = %self.user_id))]
    pub async fn fetch_profile(&self) -> anyhow::Result<String> {
        let url = self.profile_url();
        tracing::debug!(%url, "GET profile");
        let resp = self
            .client
            .get(&url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("GET {url} failed with status {status}");
        }
        Ok(resp.text().await?)
    }
}

#[async_trait::async_trait]
impl SnapshotSource for GoodreadsClient {
    async fn fetch(&self) -> SyncResult<Vec<SnapshotEntry>> {
        let html = self
            .fetch_profile()
            .await
            .map_err(SyncError::SourceUnavailable)?;
        parse_currently_reading(&html).map_err(SyncError::SourceUnavailable)
    }
}
