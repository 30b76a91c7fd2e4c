use async_trait::async_trait;
use reqwest::Client;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::BookSearch;
use crate::error::SearchFailure;
use crate::models::BookRecord;

fn default_uri() -> String {
    "https://www.googleapis.com/books/v1".to_string()
}

/// Config for the Google Books volumes API.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct GoogleBooksConfig {
    #[serde(default = "default_uri")]
    pub uri: String,
    /// Optional API key; anonymous requests work at a lower quota.
    pub api_key: Option<String>,
    /// Passed through as `maxResults`. The API default applies when unset.
    pub max_results: Option<u32>,
}

impl Default for GoogleBooksConfig {
    fn default() -> Self {
        GoogleBooksConfig {
            uri: default_uri(),
            api_key: None,
            max_results: None,
        }
    }
}

/// A volumes response. `items` is omitted when nothing matches.
#[derive(Deserialize, Debug)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<BookRecord>,
}

/// Keyword search against the public catalog.
pub struct GoogleBooksClient {
    config: GoogleBooksConfig,
    client: Client,
}

impl GoogleBooksClient {
    pub fn new(config: &GoogleBooksConfig) -> Self {
        info!("Creating Google Books client at '{}'", config.uri);
        Self {
            config: config.clone(),
            client: Client::new(),
        }
    }

    /// One GET per call, no retries.
    pub async fn try_search(&self, query: &str) -> Result<Vec<BookRecord>, SearchFailure> {
        let url = format!("{}/volumes", self.config.uri);
        let mut params: Vec<(&str, String)> = vec![("q", query.to_string())];
        if let Some(max) = self.config.max_results {
            params.push(("maxResults", max.to_string()));
        }
        if let Some(key) = &self.config.api_key {
            params.push(("key", key.clone()));
        }

        debug!("Searching catalog for '{}'", query);
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| SearchFailure::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SearchFailure::Status(response.status().as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SearchFailure::Transport(e.to_string()))?;
        let volumes: VolumesResponse =
            serde_json::from_str(&body).map_err(|e| SearchFailure::Parse(e.to_string()))?;
        Ok(volumes.items)
    }
}

#[async_trait]
impl BookSearch for GoogleBooksClient {
    /// Blank queries return immediately. Failures are logged and read as zero
    /// results; callers cannot tell the two apart.
    async fn search(&self, query: &str) -> Vec<BookRecord> {
        let query = query.trim();
        if query.is_empty() {
            debug!("Ignoring blank search query");
            return Vec::new();
        }

        match self.try_search(query).await {
            Ok(books) => {
                info!(
                    event_name = "search.completed",
                    result_count = books.len(),
                    "Search for '{}' returned {} result(s)",
                    query,
                    books.len()
                );
                books
            }
            Err(e) => {
                warn!(event_name = "search.failed", "Error fetching books: {}", e);
                Vec::new()
            }
        }
    }
}
