//! Channel adapter.
//!
//! Turns events from the message channel (a socket or anything shaped like
//! one) into relay calls, and acknowledges connects back over the channel.

use async_trait::async_trait;
use chatrelay_core::error::{ChatRelayError, Result};
use chatrelay_core::{ConversationKey, Payload};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::relay::ChatRelay;

/// Event name acknowledging a channel connect.
pub const CONNECT_SUCCESS: &str = "connect:success";

/// Inbound channel event.
///
/// Serialized as `{"event": "connect", "socketId": ...}`,
/// `{"event": "message", "payload": {...}}` or `{"event": "disconnect"}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum ChannelEvent {
    Connect {
        #[serde(rename = "socketId")]
        socket_id: String,
    },
    Message {
        payload: Value,
    },
    Disconnect {
        #[serde(default)]
        reason: Option<String>,
    },
}

/// Outbound side of the message channel.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    async fn emit(&self, event: &str, body: &Value) -> Result<()>;
}

pub struct ChannelAdapter {
    relay: ChatRelay,
    channel: Arc<dyn MessageChannel>,
}

impl ChannelAdapter {
    pub fn new(relay: ChatRelay, channel: Arc<dyn MessageChannel>) -> Self {
        Self { relay, channel }
    }

    pub fn relay(&self) -> &ChatRelay {
        &self.relay
    }

    /// Handles one event.
    ///
    /// Returns the conversation key for message events.
    pub async fn handle_event(&self, event: ChannelEvent) -> Result<Option<ConversationKey>> {
        match event {
            ChannelEvent::Connect { socket_id } => {
                tracing::info!("[ChannelAdapter] connected as {}", socket_id);
                self.relay.set_socket_id(Some(socket_id)).await;
                self.channel
                    .emit(CONNECT_SUCCESS, &Value::Object(Default::default()))
                    .await
                    .map_err(|e| {
                        ChatRelayError::channel(format!("{} not delivered: {}", CONNECT_SUCCESS, e))
                    })?;
                Ok(None)
            }
            ChannelEvent::Message { payload } => {
                let payload = Payload::from_value(payload)?;
                let key = self.relay.receive_payload(payload).await?;
                Ok(Some(key))
            }
            ChannelEvent::Disconnect { reason } => {
                tracing::info!(
                    "[ChannelAdapter] disconnected: {}",
                    reason.as_deref().unwrap_or("no reason")
                );
                self.relay.set_socket_id(None).await;
                Ok(None)
            }
        }
    }

    /// Consumes events until the sender side closes.
    ///
    /// A bad event is logged and skipped; it never stops the loop. Returns
    /// the number of events handled successfully.
    pub async fn run(&self, mut events: mpsc::Receiver<ChannelEvent>) -> usize {
        let mut handled = 0;
        while let Some(event) = events.recv().await {
            match self.handle_event(event).await {
                Ok(_) => handled += 1,
                Err(e) => tracing::warn!("[ChannelAdapter] dropping event: {}", e),
            }
        }
        tracing::debug!("[ChannelAdapter] channel closed after {} events", handled);
        handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatrelay_core::RelayConfig;
    use chatrelay_infrastructure::MemoryKeyValueStore;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingChannel {
        emitted: Mutex<Vec<(String, Value)>>,
    }

    #[async_trait]
    impl MessageChannel for RecordingChannel {
        async fn emit(&self, event: &str, body: &Value) -> Result<()> {
            self.emitted
                .lock()
                .unwrap()
                .push((event.to_string(), body.clone()));
            Ok(())
        }
    }

    fn adapter() -> (ChannelAdapter, Arc<RecordingChannel>) {
        let relay =
            ChatRelay::with_store(RelayConfig::default(), Arc::new(MemoryKeyValueStore::new()));
        let channel = Arc::new(RecordingChannel::default());
        (ChannelAdapter::new(relay, channel.clone()), channel)
    }

    #[test]
    fn test_event_wire_format() {
        let connect: ChannelEvent =
            serde_json::from_value(json!({"event": "connect", "socketId": "s1"})).unwrap();
        assert_eq!(
            connect,
            ChannelEvent::Connect {
                socket_id: "s1".to_string()
            }
        );

        let disconnect: ChannelEvent =
            serde_json::from_value(json!({"event": "disconnect"})).unwrap();
        assert_eq!(disconnect, ChannelEvent::Disconnect { reason: None });
    }

    #[tokio::test]
    async fn test_connect_acknowledges_and_records_socket() {
        let (adapter, channel) = adapter();

        adapter
            .handle_event(ChannelEvent::Connect {
                socket_id: "s1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(
            *channel.emitted.lock().unwrap(),
            vec![("connect:success".to_string(), json!({}))]
        );
        assert_eq!(adapter.relay().socket_id().await.as_deref(), Some("s1"));
    }

    struct ClosedChannel;

    #[async_trait]
    impl MessageChannel for ClosedChannel {
        async fn emit(&self, _event: &str, _body: &Value) -> Result<()> {
            Err(ChatRelayError::storage("socket closed"))
        }
    }

    #[tokio::test]
    async fn test_failed_acknowledgement_is_channel_error() {
        let relay =
            ChatRelay::with_store(RelayConfig::default(), Arc::new(MemoryKeyValueStore::new()));
        let adapter = ChannelAdapter::new(relay, Arc::new(ClosedChannel));

        let err = adapter
            .handle_event(ChannelEvent::Connect {
                socket_id: "s1".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ChatRelayError::Channel(_)));
        assert!(err.to_string().contains("connect:success"));
    }

    #[tokio::test]
    async fn test_run_skips_malformed_messages() {
        let (adapter, _channel) = adapter();
        let (tx, rx) = mpsc::channel(8);

        tx.send(ChannelEvent::Message {
            payload: json!({"uuid": "u0", "msg": "not an object"}),
        })
        .await
        .unwrap();
        tx.send(ChannelEvent::Message {
            payload: json!({
                "uuid": "u1", "from": "A", "to": "B",
                "msg": {"content": "hi"},
                "ext": {"timestamp": 100}
            }),
        })
        .await
        .unwrap();
        drop(tx);

        assert_eq!(adapter.run(rx).await, 1);
        assert_eq!(adapter.relay().total_unread().await, 1);
    }
}
