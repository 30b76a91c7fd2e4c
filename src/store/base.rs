use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::{firestore_store::FirestoreStore, memory_store::MemoryStore};
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::models::{BookRecord, FavoritesDocument, Session};

/// The FavoritesStore trait abstracts the per-user favorites document.
///
/// The store trusts its caller to hold a valid session; screens check for one
/// before calling.
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    /// Merge `{ book.id: book }` into the user's document. Other ids are untouched.
    async fn add_favorite(&self, session: &Session, book: &BookRecord) -> Result<(), StoreError>;
    /// The user's favorites; empty when the document does not exist yet.
    async fn get_favorites(&self, session: &Session) -> Result<FavoritesDocument, StoreError>;
    fn get_name(&self) -> &str;
}

/// Creates a concrete store implementation based on the StoreConfig.
pub fn create_store(config: &StoreConfig) -> Arc<dyn FavoritesStore> {
    match config {
        StoreConfig::Firestore(firestore_config) => Arc::new(FirestoreStore::new(firestore_config)),
        StoreConfig::Memory => {
            info!("Favorites store is in-memory only.");
            Arc::new(MemoryStore::new())
        }
    }
}
