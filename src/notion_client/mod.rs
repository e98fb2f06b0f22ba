// Thin async client for the subset of the Notion REST API used by the sync

use std::collections::HashMap;

use anyhow::Context;
use reqwest::Method;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value, json};

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";
const QUERY_PAGE_SIZE: u32 = 100;

#[derive(Clone, Debug)]
pub struct NotionClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl NotionClient {
    /// Create a new client with the given base URL (e.g. "https://api.notion.com/v1").
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        let base_url_str = base_url.into();
        tracing::debug!(base_url = %base_url_str, "creating NotionClient");
        Ok(NotionClient {
            base_url: base_url_str.trim_end_matches('/').to_string(),
            api_key: None,
            client,
        })
    }

    /// Return a client with the provided integration token set (Bearer)
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Send a request and return the raw body of a successful response.
    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> anyhow::Result<String> {
        let url = self.url(path);
        tracing::debug!(%method, %url, "notion request");
        let mut req = self
            .client
            .request(method.clone(), &url)
            .header("Notion-Version", NOTION_VERSION);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req
            .send()
            .await
            .with_context(|| format!("{method} {url}"))?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            let snippet: String = text.chars().take(500).collect();
            anyhow::bail!("{method} {url} failed with status {status}: {snippet}");
        }
        Ok(text)
    }

    fn parse<T: DeserializeOwned>(body: &str, what: &str) -> anyhow::Result<T> {
        match serde_json::from_str::<T>(body) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                let snippet: String = body.chars().take(2000).collect();
                tracing::error!(error = %e, body_snippet = %snippet, "failed to parse {what}");
                Err(e).with_context(|| format!("parse {what}"))
            }
        }
    }

    /// POST /databases/{id}/query, returning one page of results.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn query_database(
        &self,
        database_id: &str,
        start_cursor: Option<&str>,
    ) -> anyhow::Result<QueryResponse> {
        let mut payload = json!({ "page_size": QUERY_PAGE_SIZE });
        if let Some(cursor) = start_cursor {
            payload["start_cursor"] = Value::String(cursor.to_string());
        }
        let path = format!("/databases/{}/query", database_id);
        let body = self.send(Method::POST, &path, Some(&payload)).await?;
        Self::parse(&body, "database query response")
    }

    /// Walk every result of a database query, following cursors.
    pub fn database_pages(&self, database_id: impl Into<String>) -> DatabasePages<'_> {
        DatabasePages {
            client: self,
            database_id: database_id.into(),
            cursor: None,
            exhausted: false,
        }
    }

    /// POST /pages with the database as parent
    #[tracing::instrument(level = "debug", skip(self, properties))]
    pub async fn create_page(
        &self,
        database_id: &str,
        properties: Map<String, Value>,
    ) -> anyhow::Result<Page> {
        let payload = json!({
            "parent": { "database_id": database_id },
            "properties": properties,
        });
        let body = self.send(Method::POST, "/pages", Some(&payload)).await?;
        Self::parse(&body, "created page")
    }

    /// PATCH /pages/{id}
    #[tracing::instrument(level = "debug", skip(self, properties))]
    pub async fn update_page(
        &self,
        page_id: &str,
        properties: Map<String, Value>,
    ) -> anyhow::Result<Page> {
        let payload = json!({ "properties": properties });
        let path = format!("/pages/{}", page_id);
        let body = self.send(Method::PATCH, &path, Some(&payload)).await?;
        Self::parse(&body, "updated page")
    }

    /// DELETE /blocks/{id}. Notion archives the page rather than erasing it.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn delete_page(&self, page_id: &str) -> anyhow::Result<()> {
        let path = format!("/blocks/{}", page_id);
        self.send(Method::DELETE, &path, None).await?;
        Ok(())
    }
}

/// Cursor walker over a database query. A fresh walker restarts from the first page.
pub struct DatabasePages<'a> {
    client: &'a NotionClient,
    database_id: String,
    cursor: Option<String>,
    exhausted: bool,
}

impl DatabasePages<'_> {
    /// Fetch the next batch of pages, or `None` once the query is exhausted.
    pub async fn next_page(&mut self) -> anyhow::Result<Option<Vec<Page>>> {
        if self.exhausted {
            return Ok(None);
        }
        let resp = self
            .client
            .query_database(&self.database_id, self.cursor.as_deref())
            .await?;
        match (resp.has_more, resp.next_cursor) {
            (true, Some(next)) => self.cursor = Some(next),
            (true, None) => anyhow::bail!(
                "query of database {} reported more results without a next_cursor",
                self.database_id
            ),
            _ => self.exhausted = true,
        }
        Ok(Some(resp.results))
    }

    pub async fn collect_all(mut self) -> anyhow::Result<Vec<Page>> {
        let mut all = Vec::new();
        while let Some(batch) = self.next_page().await? {
            all.extend(batch);
        }
        Ok(all)
    }
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct QueryResponse {
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
}

impl Page {
    /// Concatenated plain text of a title property, "" when absent.
    pub fn title(&self, name: &str) -> String {
        self.properties
            .get(name)
            .map(PropertyValue::plain_text)
            .unwrap_or_default()
    }

    /// Integer value of a number property, 0 when absent or null.
    pub fn number(&self, name: &str) -> i64 {
        self.properties
            .get(name)
            .and_then(|p| p.number)
            .unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct PropertyValue {
    #[serde(default)]
    pub title: Option<Vec<RichText>>,
    #[serde(deserialize_with = "de::opt_i64_from_num", default)]
    pub number: Option<i64>,
    #[serde(default)]
    pub checkbox: Option<bool>,
    // allow extra fields
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl PropertyValue {
    pub fn plain_text(&self) -> String {
        self.title
            .iter()
            .flatten()
            .map(|t| t.plain_text.as_str())
            .collect()
    }
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

/// Builders for property values in create/update payloads
pub mod properties {
    use serde_json::{Value, json};

    pub fn title(text: &str) -> Value {
        json!({ "title": [{ "text": { "content": text } }] })
    }

    pub fn number(n: i64) -> Value {
        json!({ "number": n })
    }

    pub fn checkbox(checked: bool) -> Value {
        json!({ "checkbox": checked })
    }
}

/// Internal serde helpers
pub mod de {
    use serde::{Deserialize, Deserializer};

    /// Accept Option<i64> from an integer or a float (truncated); null -> None.
    pub fn opt_i64_from_num<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum IntOrFloat {
            Int(i64),
            Float(f64),
        }

        let val: Option<IntOrFloat> = Option::deserialize(deserializer)?;
        Ok(match val {
            None => None,
            Some(IntOrFloat::Int(n)) => Some(n),
            Some(IntOrFloat::Float(f)) => Some(f.trunc() as i64),
        })
    }
}
