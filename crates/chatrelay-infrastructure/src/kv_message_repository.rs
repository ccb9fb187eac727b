//! KeyValueStore-based MessageRepository implementation.
//!
//! Each conversation owns an id list under `message:history:<key>`; each
//! record lives under `message:item:<uuid>`. An append touches both keys and
//! is not atomic. The record is written first, so an interrupted append
//! leaves an unreferenced record rather than an id with nothing behind it.
//! Readers still tolerate dangling ids written by other clients.

use async_trait::async_trait;
use chatrelay_core::error::Result;
use chatrelay_core::message::{MessageRecord, MessageRepository};
use chatrelay_core::{ConversationKey, KeyValueStore};
use std::sync::Arc;

use crate::keyspace::{self, LIST_SEPARATOR};

/// Message history persisted incrementally in a key-value store.
///
/// Appends for one store must be issued by a single writer: the id list is
/// updated with a read-modify-write.
pub struct KvMessageRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KvMessageRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MessageRepository for KvMessageRepository {
    async fn append(&self, key: &ConversationKey, record: &MessageRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        self.store
            .set_item(&keyspace::message_key(&record.uuid), &json)
            .await?;

        let history_key = keyspace::history_key(key);
        let ids = match self.store.get_item(&history_key).await? {
            Some(existing) if !existing.is_empty() => {
                format!("{}{}{}", existing, LIST_SEPARATOR, record.uuid)
            }
            _ => record.uuid.clone(),
        };
        self.store.set_item(&history_key, &ids).await?;

        tracing::debug!("[KvMessageRepository] appended {} to {}", record.uuid, key);
        Ok(())
    }

    async fn load_recent(
        &self,
        key: &ConversationKey,
        limit: usize,
    ) -> Result<Option<Vec<MessageRecord>>> {
        let Some(ids) = self.store.get_item(&keyspace::history_key(key)).await? else {
            return Ok(None);
        };

        let ids = keyspace::split_list(&ids);
        if ids.is_empty() {
            return Ok(None);
        }

        let page = &ids[ids.len().saturating_sub(limit)..];
        let item_keys: Vec<String> = page.iter().map(|uuid| keyspace::message_key(uuid)).collect();
        let values = self.store.multi_get(&item_keys).await?;

        let mut records = Vec::with_capacity(values.len());
        for (item_key, value) in values {
            let Some(raw) = value else {
                tracing::warn!("[KvMessageRepository] {} is listed but missing", item_key);
                continue;
            };
            match serde_json::from_str::<MessageRecord>(&raw) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("[KvMessageRepository] skipping corrupt {}: {}", item_key, e);
                }
            }
        }

        Ok(Some(records))
    }
}
