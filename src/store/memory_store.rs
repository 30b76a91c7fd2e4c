use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use super::FavoritesStore;
use crate::error::StoreError;
use crate::models::{BookRecord, FavoritesDocument, Session};

/// Favorites documents held in process memory, keyed by user id.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, FavoritesDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FavoritesStore for MemoryStore {
    async fn add_favorite(&self, session: &Session, book: &BookRecord) -> Result<(), StoreError> {
        let mut documents = self.documents.write().unwrap_or_else(PoisonError::into_inner);
        documents
            .entry(session.user_id.clone())
            .or_default()
            .merge(book.clone());
        Ok(())
    }

    async fn get_favorites(&self, session: &Session) -> Result<FavoritesDocument, StoreError> {
        let documents = self.documents.read().unwrap_or_else(PoisonError::into_inner);
        Ok(documents
            .get(&session.user_id)
            .cloned()
            .unwrap_or_default())
    }

    fn get_name(&self) -> &str {
        "memory"
    }
}
