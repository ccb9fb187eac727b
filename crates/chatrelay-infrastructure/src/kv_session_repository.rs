//! KeyValueStore-based SessionRepository implementation.

use async_trait::async_trait;
use chatrelay_core::error::{ChatRelayError, Result};
use chatrelay_core::session::{SessionItem, SessionRepository};
use chatrelay_core::{ConversationKey, KeyValueStore};
use std::sync::Arc;

use crate::keyspace::{self, LIST_SEPARATOR, SESSION_KEY_LIST};

/// Session index persisted as a key list plus one snapshot per key.
pub struct KvSessionRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KvSessionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn load_one(&self, key: &ConversationKey) -> Result<Option<SessionItem>> {
        let Some(raw) = self.store.get_item(&keyspace::session_key(key)).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }
}

#[async_trait]
impl SessionRepository for KvSessionRepository {
    async fn save_all(&self, items: &[SessionItem]) -> Result<()> {
        let key_list = items
            .iter()
            .map(|item| item.key.as_str())
            .collect::<Vec<_>>()
            .join(&LIST_SEPARATOR.to_string());

        let mut failures = Vec::new();

        if let Err(e) = self.store.set_item(SESSION_KEY_LIST, &key_list).await {
            tracing::error!("[KvSessionRepository] failed to write key list: {}", e);
            failures.push(SESSION_KEY_LIST.to_string());
        }

        // Every snapshot is attempted even after a failure.
        for item in items {
            let result = match serde_json::to_string(item) {
                Ok(json) => self.store.set_item(&keyspace::session_key(&item.key), &json).await,
                Err(e) => Err(e.into()),
            };
            if let Err(e) = result {
                tracing::error!(
                    "[KvSessionRepository] failed to write session {}: {}",
                    item.key,
                    e
                );
                failures.push(item.key.to_string());
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ChatRelayError::storage(format!(
                "failed to persist {} of {} session entries: {}",
                failures.len(),
                items.len() + 1,
                failures.join(", ")
            )))
        }
    }

    async fn load_all(&self) -> Result<Vec<SessionItem>> {
        let Some(key_list) = self.store.get_item(SESSION_KEY_LIST).await? else {
            return Ok(Vec::new());
        };

        let mut items = Vec::new();
        // Sequential on purpose: one snapshot read per key, in list order.
        for key in keyspace::split_list(&key_list) {
            let key = ConversationKey::new(key);
            match self.load_one(&key).await {
                Ok(Some(item)) => items.push(item),
                Ok(None) => {
                    tracing::warn!("[KvSessionRepository] key {} listed but has no snapshot", key);
                }
                Err(e) => {
                    tracing::warn!("[KvSessionRepository] skipping session {}: {}", key, e);
                }
            }
        }

        Ok(items)
    }
}
