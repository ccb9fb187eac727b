use async_trait::async_trait;
use chatrelay_core::KeyValueStore;
use chatrelay_core::error::Result;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local key-value store.
///
/// Used by tests and by hosts that supply persistence some other way.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>> {
        let entries = self.entries.read().await;
        Ok(keys
            .iter()
            .map(|key| (key.clone(), entries.get(key).cloned()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryKeyValueStore::new();
        assert_eq!(store.get_item("k").await.unwrap(), None);

        store.set_item("k", "v1").await.unwrap();
        store.set_item("k", "v2").await.unwrap();

        assert_eq!(store.get_item("k").await.unwrap().as_deref(), Some("v2"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_multi_get_keeps_request_order() {
        let store = MemoryKeyValueStore::new();
        store.set_item("a", "1").await.unwrap();
        store.set_item("c", "3").await.unwrap();

        let keys = vec!["c".to_string(), "b".to_string(), "a".to_string()];
        let values = store.multi_get(&keys).await.unwrap();

        assert_eq!(
            values,
            vec![
                ("c".to_string(), Some("3".to_string())),
                ("b".to_string(), None),
                ("a".to_string(), Some("1".to_string())),
            ]
        );
    }
}
