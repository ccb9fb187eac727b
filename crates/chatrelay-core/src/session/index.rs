use std::collections::HashMap;

use super::model::{SessionItem, SessionView};
use crate::error::Result;
use crate::key::ConversationKey;
use crate::payload::Payload;
use crate::relative_time::{RelativeTimeLocale, relative_label};

/// In-memory index of conversations keyed by [`ConversationKey`].
///
/// Insertion order carries no meaning; display order comes from
/// [`SessionIndex::sorted_sessions`], which is recomputed on every read.
#[derive(Debug, Clone, Default)]
pub struct SessionIndex {
    entries: HashMap<ConversationKey, SessionItem>,
}

impl SessionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entry for the payload's conversation.
    ///
    /// Inbound payloads bump the unread counter of the previous entry;
    /// locally originated ones reset it to zero and are stamped with `now_ms`.
    pub fn upsert_from_payload(&mut self, payload: &Payload, now_ms: i64) -> Result<&SessionItem> {
        let key = ConversationKey::derive(payload);
        let item = SessionItem::from_payload(payload, self.entries.get(&key), now_ms)?;

        tracing::debug!(
            "[SessionIndex] upsert key={} unread={} local={}",
            key,
            item.un_read_message_count,
            payload.is_local()
        );

        self.entries.insert(key.clone(), item);
        Ok(&self.entries[&key])
    }

    /// Resets the unread counter of `key`.
    ///
    /// Returns `false` (and creates nothing) when the key is unknown.
    pub fn clear_unread(&mut self, key: &ConversationKey) -> bool {
        match self.entries.get(key) {
            Some(existing) => {
                let cleared = SessionItem {
                    un_read_message_count: 0,
                    ..existing.clone()
                };
                self.entries.insert(key.clone(), cleared);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: &ConversationKey) -> Option<&SessionItem> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &ConversationKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries ordered by descending timestamp, each labelled with its
    /// relative time as of `now_ms`. Ties have no guaranteed order.
    pub fn sorted_sessions(&self, now_ms: i64, locale: RelativeTimeLocale) -> Vec<SessionView> {
        let mut items: Vec<&SessionItem> = self.entries.values().collect();
        items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        items
            .into_iter()
            .map(|item| SessionView {
                latest_time: relative_label(item.timestamp, now_ms, locale),
                item: item.clone(),
            })
            .collect()
    }

    /// Sum of the unread counters of every entry.
    pub fn total_unread(&self) -> u64 {
        self.entries
            .values()
            .map(|item| u64::from(item.un_read_message_count))
            .sum()
    }

    /// Copies every entry for a bulk persist.
    pub fn snapshot(&self) -> Vec<SessionItem> {
        self.entries.values().cloned().collect()
    }

    /// Bulk-loads restored snapshots.
    ///
    /// Keys already present in memory are kept: a live entry was produced by
    /// a payload received after the snapshot was written. Returns the number
    /// of entries inserted.
    pub fn restore(&mut self, items: Vec<SessionItem>) -> usize {
        let mut inserted = 0;
        for item in items {
            if self.entries.contains_key(&item.key) {
                tracing::debug!("[SessionIndex] keep live entry over snapshot: {}", item.key);
                continue;
            }
            self.entries.insert(item.key.clone(), item);
            inserted += 1;
        }
        inserted
    }
}
