use std::collections::{HashMap, HashSet};

use super::model::MessageRecord;
use crate::key::ConversationKey;

/// Result of opening a conversation's history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryLookup {
    /// The in-memory sequence at the time of the call (possibly empty).
    pub records: Vec<MessageRecord>,
    /// True exactly once per key: the caller must start a restore.
    pub needs_hydration: bool,
}

/// Per-conversation message sequences in arrival order.
///
/// Each key is hydrated from persistence at most once per process. The key
/// is marked as soon as the restore is requested, not when it lands, so a
/// second lookup while the first restore is in flight does not issue another.
#[derive(Debug, Clone, Default)]
pub struct MessageHistoryCache {
    histories: HashMap<ConversationKey, Vec<MessageRecord>>,
    hydrated: HashSet<ConversationKey>,
}

impl MessageHistoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to the end of `key`'s sequence, creating it if absent.
    pub fn append(&mut self, key: &ConversationKey, record: MessageRecord) {
        self.histories.entry(key.clone()).or_default().push(record);
    }

    pub fn get(&self, key: &ConversationKey) -> Option<&[MessageRecord]> {
        self.histories.get(key).map(Vec::as_slice)
    }

    pub fn is_hydrated(&self, key: &ConversationKey) -> bool {
        self.hydrated.contains(key)
    }

    /// Returns the sequence for the current conversation, initializing it.
    ///
    /// With no conversation selected the result is empty and nothing is
    /// recorded.
    pub fn get_or_init(&mut self, current: Option<&ConversationKey>) -> HistoryLookup {
        let Some(key) = current else {
            return HistoryLookup {
                records: Vec::new(),
                needs_hydration: false,
            };
        };

        let needs_hydration = self.hydrated.insert(key.clone());
        let records = self.histories.entry(key.clone()).or_default().clone();

        HistoryLookup {
            records,
            needs_hydration,
        }
    }

    /// Folds a restored page into `key`'s sequence.
    ///
    /// The restored records come first in stored order; records already in
    /// memory whose uuid is not part of the page follow in arrival order, so
    /// messages appended while the restore was in flight are never dropped.
    /// Returns the resulting length.
    pub fn merge_restored(&mut self, key: &ConversationKey, restored: Vec<MessageRecord>) -> usize {
        let restored_ids: HashSet<String> = restored.iter().map(|r| r.uuid.clone()).collect();
        let live = self.histories.remove(key).unwrap_or_default();

        let mut merged = restored;
        merged.extend(
            live.into_iter()
                .filter(|record| !restored_ids.contains(&record.uuid)),
        );

        let len = merged.len();
        self.histories.insert(key.clone(), merged);
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(uuid: &str) -> MessageRecord {
        MessageRecord {
            uuid: uuid.to_string(),
            from: "A".to_string(),
            to: "B".to_string(),
            msg: Default::default(),
            ext: None,
            extra: Default::default(),
        }
    }

    fn uuids(records: &[MessageRecord]) -> Vec<&str> {
        records.iter().map(|r| r.uuid.as_str()).collect()
    }

    #[test]
    fn test_append_preserves_arrival_order() {
        let mut cache = MessageHistoryCache::new();
        let key = ConversationKey::new("B-A");
        cache.append(&key, record("u1"));
        cache.append(&key, record("u2"));

        assert_eq!(uuids(cache.get(&key).unwrap()), vec!["u1", "u2"]);
    }

    #[test]
    fn test_get_or_init_without_current_key() {
        let mut cache = MessageHistoryCache::new();
        let lookup = cache.get_or_init(None);

        assert!(lookup.records.is_empty());
        assert!(!lookup.needs_hydration);
    }

    #[test]
    fn test_get_or_init_requests_hydration_once() {
        let mut cache = MessageHistoryCache::new();
        let key = ConversationKey::new("B-A");

        let first = cache.get_or_init(Some(&key));
        assert!(first.needs_hydration);
        assert!(first.records.is_empty());
        assert!(cache.is_hydrated(&key));
        assert_eq!(cache.get(&key), Some(&[][..]));

        let second = cache.get_or_init(Some(&key));
        assert!(!second.needs_hydration);
    }

    #[test]
    fn test_get_or_init_returns_live_records() {
        let mut cache = MessageHistoryCache::new();
        let key = ConversationKey::new("B-A");
        cache.append(&key, record("u1"));

        let lookup = cache.get_or_init(Some(&key));
        assert_eq!(uuids(&lookup.records), vec!["u1"]);
    }

    #[test]
    fn test_merge_keeps_messages_appended_during_restore() {
        let mut cache = MessageHistoryCache::new();
        let key = ConversationKey::new("B-A");
        cache.get_or_init(Some(&key));
        // u3 was persisted before the restore read the store; u4 was not.
        cache.append(&key, record("u3"));
        cache.append(&key, record("u4"));

        let len = cache.merge_restored(&key, vec![record("u1"), record("u2"), record("u3")]);

        assert_eq!(len, 4);
        assert_eq!(uuids(cache.get(&key).unwrap()), vec!["u1", "u2", "u3", "u4"]);
    }

    #[test]
    fn test_merge_into_empty_sequence() {
        let mut cache = MessageHistoryCache::new();
        let key = ConversationKey::new("B-A");

        cache.merge_restored(&key, vec![record("u1")]);
        assert_eq!(uuids(cache.get(&key).unwrap()), vec!["u1"]);
    }
}
