use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::PersistenceBackend;

/// The key-value storage the auth client keeps its session in between runs.
///
/// Values are opaque strings; only the auth client knows how a session is
/// serialized.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, String>;
    async fn set_item(&self, key: &str, value: String) -> Result<(), String>;
    async fn remove_item(&self, key: &str) -> Result<(), String>;
}

/// Creates the storage adapter named by the config.
pub fn create_storage(backend: &PersistenceBackend) -> Arc<dyn KeyValueStorage> {
    match backend {
        PersistenceBackend::File { path } => {
            info!("Persisting sessions to '{}'", path.display());
            Arc::new(FileStorage::new(path.clone()))
        }
        PersistenceBackend::Memory => {
            info!("Session persistence is in-memory only.");
            Arc::new(MemoryStorage::new())
        }
    }
}

/// Keeps items for the lifetime of the process.
#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, String> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), String> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), String> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
        Ok(())
    }
}

/// Stores all items as one JSON object in a single file.
///
/// A missing file reads as empty. Writes rewrite the whole file.
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: tokio::sync::Mutex<()>,
}

impl FileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>, String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| format!("Failed to parse '{}': {}", self.path.display(), e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(format!("Failed to read '{}': {}", self.path.display(), e)),
        }
    }

    async fn write_all(&self, items: &BTreeMap<String, String>) -> Result<(), String> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
        }
        let raw = serde_json::to_string_pretty(items)
            .map_err(|e| format!("Failed to serialize storage: {}", e))?;
        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|e| format!("Failed to write '{}': {}", self.path.display(), e))
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), String> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read_all().await?;
        items.insert(key.to_string(), value);
        self.write_all(&items).await
    }

    async fn remove_item(&self, key: &str) -> Result<(), String> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read_all().await?;
        if items.remove(key).is_none() {
            debug!("Nothing stored under '{}'", key);
            return Ok(());
        }
        self.write_all(&items).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("k").await.unwrap(), None);
        storage.set_item("k", "v".to_string()).await.unwrap();
        assert_eq!(storage.get_item("k").await.unwrap().as_deref(), Some("v"));
        storage.remove_item("k").await.unwrap();
        assert_eq!(storage.get_item("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_storage_survives_new_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let first = FileStorage::new(path.clone());
        assert_eq!(first.get_item("auth").await.unwrap(), None);
        first.set_item("auth", "payload".to_string()).await.unwrap();
        first.set_item("other", "kept".to_string()).await.unwrap();

        let second = FileStorage::new(path);
        assert_eq!(second.get_item("auth").await.unwrap().as_deref(), Some("payload"));
        second.remove_item("auth").await.unwrap();
        assert_eq!(second.get_item("auth").await.unwrap(), None);
        assert_eq!(second.get_item("other").await.unwrap().as_deref(), Some("kept"));
    }

    #[tokio::test]
    async fn test_file_storage_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let storage = FileStorage::new(path);
        assert!(storage.get_item("auth").await.is_err());
    }
}
