use async_trait::async_trait;
use chatrelay_core::KeyValueStore;
use chatrelay_core::error::{ChatRelayError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::atomic_json::AtomicJsonFile;

type Entries = BTreeMap<String, String>;

/// Key-value store persisted as a single JSON object on disk.
///
/// Reads are served from memory. Every write rewrites the file atomically
/// while holding the entry lock, so writes reach disk in the order they
/// were issued. A failed write rolls the in-memory value back.
pub struct FileKeyValueStore {
    file: Arc<AtomicJsonFile<Entries>>,
    entries: Mutex<Entries>,
}

impl FileKeyValueStore {
    /// Opens the store at `path`, loading existing entries.
    ///
    /// A missing or empty file starts an empty store; an unparsable one is
    /// an error rather than being silently overwritten.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let file = Arc::new(AtomicJsonFile::<Entries>::new(path.into()));

        let loader = Arc::clone(&file);
        let entries = tokio::task::spawn_blocking(move || loader.load())
            .await
            .map_err(|e| ChatRelayError::internal(format!("store load task failed: {}", e)))??
            .unwrap_or_default();

        tracing::info!(
            "[FileKeyValueStore] opened {} ({} keys)",
            file.path().display(),
            entries.len()
        );

        Ok(Self {
            file,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    async fn persist(&self, snapshot: Entries) -> Result<()> {
        let file = Arc::clone(&self.file);
        tokio::task::spawn_blocking(move || file.save(&snapshot))
            .await
            .map_err(|e| ChatRelayError::internal(format!("store save task failed: {}", e)))??;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        let previous = entries.insert(key.to_string(), value.to_string());

        if let Err(e) = self.persist(entries.clone()).await {
            match previous {
                Some(previous) => entries.insert(key.to_string(), previous),
                None => entries.remove(key),
            };
            return Err(e);
        }

        Ok(())
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>> {
        let entries = self.entries.lock().await;
        Ok(keys
            .iter()
            .map(|key| (key.clone(), entries.get(key).cloned()))
            .collect())
    }
}
