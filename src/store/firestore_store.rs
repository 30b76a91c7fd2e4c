use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::firestore_value::{from_firestore_value, quote_field_path, to_firestore_value};
use crate::error::StoreError;
use crate::models::{BookRecord, FavoritesDocument, Session};
use crate::store::FavoritesStore;

fn default_uri() -> String {
    "https://firestore.googleapis.com".to_string()
}

fn default_database() -> String {
    "(default)".to_string()
}

fn default_collection() -> String {
    "favorites".to_string()
}

/// The config struct for the Firestore REST backend.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    #[serde(default = "default_database")]
    pub database: String,
    /// One document per user id lives in this collection.
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_uri")]
    pub uri: String,
}

/// Shape of a fetched document. `fields` is absent on an empty document.
#[derive(Deserialize, Debug)]
struct FirestoreDocument {
    #[serde(default)]
    fields: Map<String, Value>,
}

/// A `FavoritesStore` that keeps one Firestore document per user, mapping
/// book id to the full book record.
pub struct FirestoreStore {
    config: FirestoreConfig,
    client: Client,
}

impl FirestoreStore {
    pub fn new(config: &FirestoreConfig) -> Self {
        info!(
            "Using Firestore project '{}', collection '{}'",
            config.project_id, config.collection
        );
        Self {
            config: config.clone(),
            client: Client::new(),
        }
    }

    fn document_url(&self, user_id: &str) -> String {
        format!(
            "{}/v1/projects/{}/databases/{}/documents/{}/{}",
            self.config.uri,
            self.config.project_id,
            self.config.database,
            self.config.collection,
            user_id
        )
    }

    /// Convert a fetched document into favorites. Entries that are not book
    /// records are skipped so one bad entry does not hide the rest.
    fn doc_to_favorites(doc: FirestoreDocument) -> FavoritesDocument {
        let mut favorites = FavoritesDocument::new();
        for (book_id, value) in &doc.fields {
            let decoded = from_firestore_value(value).and_then(|plain| {
                serde_json::from_value::<BookRecord>(plain).map_err(|e| e.to_string())
            });
            match decoded {
                Ok(book) => favorites.merge(book),
                Err(e) => warn!("Skipping unreadable favorite '{}': {}", book_id, e),
            }
        }
        favorites
    }
}

/// Build a `StoreError` from a non-success response, preferring the
/// `{"error": {"message": ...}}` text Firestore sends.
async fn status_error(response: Response) -> StoreError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(body);
    StoreError::Status { status, message }
}

#[async_trait]
impl FavoritesStore for FirestoreStore {
    /// PATCH with an update mask naming only this book id: other keys are
    /// left alone and the document is created if missing.
    async fn add_favorite(&self, session: &Session, book: &BookRecord) -> Result<(), StoreError> {
        let record =
            serde_json::to_value(book).map_err(|e| StoreError::Decode(e.to_string()))?;
        let mut fields = Map::new();
        fields.insert(book.id.clone(), to_firestore_value(&record));
        let body = serde_json::json!({ "fields": fields });

        let url = self.document_url(&session.user_id);
        let mask = quote_field_path(&book.id);
        debug!("Merging favorite '{}' into {}", book.id, url);

        let response = self
            .client
            .patch(&url)
            .bearer_auth(&session.id_token)
            .query(&[("updateMask.fieldPaths", mask.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(status_error(response).await)
        }
    }

    async fn get_favorites(&self, session: &Session) -> Result<FavoritesDocument, StoreError> {
        let url = self.document_url(&session.user_id);
        debug!("Fetching favorites from {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&session.id_token)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("No favorites document yet for user_id='{}'", session.user_id);
            return Ok(FavoritesDocument::new());
        }
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let doc: FirestoreDocument = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(Self::doc_to_favorites(doc))
    }

    fn get_name(&self) -> &str {
        "firestore"
    }
}
