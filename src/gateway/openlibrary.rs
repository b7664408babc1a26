use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use crate::core::library::{LibraryError, LibraryResult};
use crate::gateway::lookup::{BookLookup, BookMetadata};

pub const USER_AGENT: &str = concat!("bookshelf/", env!("CARGO_PKG_VERSION"));

// OpenLibraryClient reads edition and author records from an Open Library
// compatible service. Cloning is cheap since reqwest::Client is shared.
#[derive(Debug, Clone)]
pub struct OpenLibraryClient {
    client: Client,
    base_url: String,
    last_failure: Arc<Mutex<Option<String>>>,
}

impl OpenLibraryClient {
    pub fn new(base_url: &str, timeout: Duration) -> LibraryResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            last_failure: Arc::new(Mutex::new(None)),
        })
    }

    // Fetches `<base><path>` as JSON; a 404 is Ok(None).
    pub async fn get_json(&self, path: &str) -> LibraryResult<Option<Value>> {
        let url = format!("{}{}", self.base_url, path);
        let res = self.client.get(url.as_str()).send().await?;
        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LibraryError::unavailable(
                format!("{} returned {}", url, status).as_str(),
                Some(status.as_u16().to_string())));
        }
        let body = res.text().await?;
        serde_json::from_str(body.as_str()).map(Some).map_err(LibraryError::from)
    }
}

fn author_path(reference: &str) -> String {
    if reference.starts_with('/') {
        format!("{}.json", reference)
    } else {
        format!("/{}.json", reference)
    }
}

#[async_trait]
impl BookLookup for OpenLibraryClient {
    async fn lookup_by_isbn(&self, isbn: &str) -> Option<BookMetadata> {
        let (meta, failure) = match self.get_json(format!("/isbn/{}.json", isbn).as_str()).await {
            Ok(Some(json)) => match BookMetadata::from_json(&json) {
                Some(meta) => (Some(meta), None),
                None => {
                    let reason = format!("edition record for {} is not an object", isbn);
                    warn!("{}", reason);
                    (None, Some(reason))
                }
            },
            Ok(None) => {
                debug!("no edition found for {}", isbn);
                (None, None)
            }
            Err(err) => {
                warn!("edition lookup for {} failed: {}", isbn, err);
                (None, Some(err.to_string()))
            }
        };
        *self.last_failure.lock().await = failure;
        meta
    }

    async fn resolve_author_name(&self, reference: &str) -> Option<String> {
        match self.get_json(author_path(reference).as_str()).await {
            Ok(Some(json)) => json.get("name")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            Ok(None) => {
                debug!("no author found for {}", reference);
                None
            }
            Err(err) => {
                warn!("author lookup for {} failed: {}", reference, err);
                None
            }
        }
    }

    async fn last_failure(&self) -> Option<String> {
        self.last_failure.lock().await.clone()
    }
}
