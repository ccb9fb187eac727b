//! The chat relay: session index, message histories and their persistence.

use chatrelay_core::error::{ChatRelayError, Result};
use chatrelay_core::message::{MessageHistoryCache, MessageRecord, MessageRepository};
use chatrelay_core::relative_time::now_millis;
use chatrelay_core::session::{SessionIndex, SessionRepository, SessionView};
use chatrelay_core::{AppLifecycleState, ConversationKey, KeyValueStore, Payload, RelayConfig};
use chatrelay_infrastructure::{KvMessageRepository, KvSessionRepository};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, broadcast, watch};
use tokio::task::JoinHandle;

use crate::events::RelayEvent;
use crate::sync::PersistenceSynchronizer;

#[derive(Default)]
struct RelayState {
    sessions: SessionIndex,
    histories: MessageHistoryCache,
    current_key: Option<ConversationKey>,
    socket_id: Option<String>,
}

struct RelayInner {
    config: RelayConfig,
    state: RwLock<RelayState>,
    sync: PersistenceSynchronizer,
    events: broadcast::Sender<RelayEvent>,
    restores: Mutex<Vec<JoinHandle<()>>>,
}

/// Client-side relay and cache for one-to-one conversations.
///
/// Cheap to clone; clones share the same state. Every payload, inbound or
/// locally sent, updates the session index and the conversation's history
/// under one lock, and its incremental persist is queued before the lock is
/// released. Per-key memory order and store write order are therefore the
/// same.
#[derive(Clone)]
pub struct ChatRelay {
    inner: Arc<RelayInner>,
}

impl ChatRelay {
    /// Creates a relay over explicit repositories.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        config: RelayConfig,
        sessions: Arc<dyn SessionRepository>,
        messages: Arc<dyn MessageRepository>,
    ) -> Self {
        let sync = PersistenceSynchronizer::new(sessions, messages, config.history_page_size);
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        Self {
            inner: Arc::new(RelayInner {
                config,
                state: RwLock::new(RelayState::default()),
                sync,
                events,
                restores: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Creates a relay persisting to `store` with the standard key layout.
    pub fn with_store(config: RelayConfig, store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(
            config,
            Arc::new(KvSessionRepository::new(Arc::clone(&store))),
            Arc::new(KvMessageRepository::new(store)),
        )
    }

    pub fn config(&self) -> &RelayConfig {
        &self.inner.config
    }

    /// Subscribes to change events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<RelayEvent> {
        self.inner.events.subscribe()
    }

    /// Applies a payload received from the channel.
    ///
    /// Returns the conversation key. A payload the index rejects (an inbound
    /// one without `ext`) leaves every structure untouched.
    pub async fn receive_payload(&self, payload: Payload) -> Result<ConversationKey> {
        let key = ConversationKey::derive(&payload);
        let now_ms = now_millis();

        let (item, uuid) = {
            let mut state = self.inner.state.write().await;
            let item = state.sessions.upsert_from_payload(&payload, now_ms)?.clone();

            let record = MessageRecord::from(payload);
            let uuid = record.uuid.clone();
            state.histories.append(&key, record.clone());
            self.inner.sync.enqueue_append(key.clone(), record);
            (item, uuid)
        };

        tracing::debug!("[ChatRelay] appended {} to {}", uuid, key);
        self.publish(RelayEvent::SessionUpdated(item));
        self.publish(RelayEvent::MessageAppended {
            key: key.clone(),
            uuid,
        });
        Ok(key)
    }

    /// Applies a payload sent from this client.
    ///
    /// Goes through the same path as inbound payloads; the payload must carry
    /// `localeExt`.
    pub async fn push_locale_payload(&self, payload: Payload) -> Result<ConversationKey> {
        if !payload.is_local() {
            return Err(ChatRelayError::malformed(format!(
                "payload '{}' is not locally originated",
                payload.uuid
            )));
        }
        self.receive_payload(payload).await
    }

    /// Resets the unread counter of `key`. Unknown keys are a no-op.
    pub async fn clear_unread_message_count(&self, key: &ConversationKey) -> bool {
        let cleared = self.inner.state.write().await.sessions.clear_unread(key);
        if cleared {
            self.publish(RelayEvent::UnreadCleared(key.clone()));
        }
        cleared
    }

    /// Sessions by descending timestamp, labelled in the configured locale.
    pub async fn sorted_sessions(&self) -> Vec<SessionView> {
        self.inner
            .state
            .read()
            .await
            .sessions
            .sorted_sessions(now_millis(), self.inner.config.locale)
    }

    pub async fn total_unread(&self) -> u64 {
        self.inner.state.read().await.sessions.total_unread()
    }

    /// Selects the conversation `current_history` reads.
    pub async fn set_current_key(&self, key: Option<ConversationKey>) {
        self.inner.state.write().await.current_key = key;
    }

    pub async fn current_key(&self) -> Option<ConversationKey> {
        self.inner.state.read().await.current_key.clone()
    }

    /// History of the current conversation as it is in memory right now.
    ///
    /// The first call for a key starts a background restore of its newest
    /// page; the restore merges into memory when it lands and publishes
    /// `HistoryHydrated`. Without a current conversation the result is empty.
    pub async fn current_history(&self) -> Vec<MessageRecord> {
        let lookup = {
            let mut guard = self.inner.state.write().await;
            let state = &mut *guard;
            let lookup = state.histories.get_or_init(state.current_key.as_ref());
            if lookup.needs_hydration {
                if let Some(key) = state.current_key.clone() {
                    self.spawn_restore(key).await;
                }
            }
            lookup
        };
        lookup.records
    }

    /// Selects `key` and returns its history.
    pub async fn open_conversation(&self, key: ConversationKey) -> Vec<MessageRecord> {
        self.set_current_key(Some(key)).await;
        self.current_history().await
    }

    /// Whether a restore has been requested for `key`.
    pub async fn is_hydrated(&self, key: &ConversationKey) -> bool {
        self.inner.state.read().await.histories.is_hydrated(key)
    }

    /// Loads persisted session snapshots into the index.
    ///
    /// Keys already present in memory keep their live entry. Returns the
    /// number of entries inserted.
    pub async fn restore_sessions(&self) -> Result<usize> {
        let items = self.inner.sync.load_sessions().await?;
        let loaded = items.len();
        let inserted = self.inner.state.write().await.sessions.restore(items);

        tracing::info!(
            "[ChatRelay] restored {} sessions ({} loaded)",
            inserted,
            loaded
        );
        self.publish(RelayEvent::SessionsRestored { count: inserted });
        Ok(inserted)
    }

    /// Writes the whole session index to the store.
    pub async fn persist_sessions(&self) -> Result<()> {
        let snapshot = self.inner.state.read().await.sessions.snapshot();
        let count = snapshot.len();
        self.inner.sync.save_sessions(snapshot).await?;

        tracing::info!("[ChatRelay] persisted {} sessions", count);
        self.publish(RelayEvent::SessionsPersisted { count });
        Ok(())
    }

    /// Reacts to a host lifecycle change.
    ///
    /// Persists the session index when the configured platform treats
    /// `state` as leaving the foreground. Returns whether a persist ran.
    pub async fn handle_lifecycle_change(&self, state: AppLifecycleState) -> Result<bool> {
        if !self.inner.config.platform.is_leaving_foreground(state) {
            return Ok(false);
        }
        tracing::debug!("[ChatRelay] leaving foreground ({:?})", state);
        self.persist_sessions().await?;
        Ok(true)
    }

    /// Follows a lifecycle signal until its sender is dropped.
    pub fn spawn_lifecycle_listener(
        &self,
        mut lifecycle: watch::Receiver<AppLifecycleState>,
    ) -> JoinHandle<()> {
        let relay = self.clone();
        tokio::spawn(async move {
            while lifecycle.changed().await.is_ok() {
                let state = *lifecycle.borrow_and_update();
                if let Err(e) = relay.handle_lifecycle_change(state).await {
                    tracing::error!("[ChatRelay] background persist failed: {}", e);
                }
            }
            tracing::debug!("[ChatRelay] lifecycle signal closed");
        })
    }

    /// Records the socket id assigned by the channel.
    pub async fn set_socket_id(&self, socket_id: Option<String>) {
        self.inner.state.write().await.socket_id = socket_id;
    }

    pub async fn socket_id(&self) -> Option<String> {
        self.inner.state.read().await.socket_id.clone()
    }

    /// Waits for in-flight restores and every write issued so far.
    pub async fn flush(&self) {
        let pending = std::mem::take(&mut *self.inner.restores.lock().await);
        for handle in pending {
            if let Err(e) = handle.await {
                tracing::warn!("[ChatRelay] restore task failed: {}", e);
            }
        }
        self.inner.sync.flush().await;
    }

    async fn spawn_restore(&self, key: ConversationKey) {
        let relay = self.clone();
        let handle = tokio::spawn(async move { relay.restore_history(key).await });

        let mut restores = self.inner.restores.lock().await;
        restores.retain(|pending| !pending.is_finished());
        restores.push(handle);
    }

    async fn restore_history(&self, key: ConversationKey) {
        match self.inner.sync.load_recent(&key).await {
            Ok(Some(records)) => {
                let restored = records.len();
                let count = self
                    .inner
                    .state
                    .write()
                    .await
                    .histories
                    .merge_restored(&key, records);
                tracing::info!(
                    "[ChatRelay] hydrated {} with {} stored records ({} total)",
                    key,
                    restored,
                    count
                );
                self.publish(RelayEvent::HistoryHydrated { key, count });
            }
            Ok(None) => {
                tracing::debug!("[ChatRelay] nothing stored for {}", key);
            }
            Err(e) => {
                tracing::warn!("[ChatRelay] failed to restore {}: {}", key, e);
            }
        }
    }

    fn publish(&self, event: RelayEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatrelay_core::{PayloadExt, PeerInfo};
    use chatrelay_infrastructure::MemoryKeyValueStore;

    fn relay() -> ChatRelay {
        ChatRelay::with_store(RelayConfig::default(), Arc::new(MemoryKeyValueStore::new()))
    }

    fn inbound(uuid: &str, timestamp: i64) -> Payload {
        Payload {
            uuid: uuid.to_string(),
            from: "A".to_string(),
            to: "B".to_string(),
            msg: chatrelay_core::MessageBody {
                content: format!("hi {}", uuid),
                extra: Default::default(),
            },
            ext: Some(PayloadExt {
                timestamp,
                ..Default::default()
            }),
            locale_ext: None,
            extra: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_rejected_payload_leaves_state_untouched() {
        let relay = relay();
        let mut payload = inbound("u1", 100);
        payload.ext = None;

        let err = relay.receive_payload(payload).await.unwrap_err();
        assert!(err.is_malformed());
        assert!(relay.sorted_sessions().await.is_empty());

        let history = relay.open_conversation(ConversationKey::new("B-A")).await;
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_push_locale_payload_requires_local_marker() {
        let relay = relay();
        let err = relay.push_locale_payload(inbound("u1", 100)).await.unwrap_err();
        assert!(err.is_malformed());
    }

    #[tokio::test]
    async fn test_events_follow_mutations() {
        let relay = relay();
        let mut events = relay.subscribe();

        let to_info = PeerInfo {
            user_id: "A".to_string(),
            ..Default::default()
        };
        let key = relay
            .push_locale_payload(Payload::local("u1", "B", to_info, "hello"))
            .await
            .unwrap();
        relay.clear_unread_message_count(&key).await;

        assert!(matches!(
            events.recv().await.unwrap(),
            RelayEvent::SessionUpdated(item) if item.key == key
        ));
        assert_eq!(
            events.recv().await.unwrap(),
            RelayEvent::MessageAppended {
                key: key.clone(),
                uuid: "u1".to_string()
            }
        );
        assert_eq!(events.recv().await.unwrap(), RelayEvent::UnreadCleared(key));
    }

    #[tokio::test]
    async fn test_socket_id_round_trip() {
        let relay = relay();
        assert_eq!(relay.socket_id().await, None);
        relay.set_socket_id(Some("sock-1".to_string())).await;
        assert_eq!(relay.socket_id().await.as_deref(), Some("sock-1"));
    }
}
