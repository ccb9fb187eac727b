//! Channel payload types.
//!
//! A payload is the JSON object the message channel delivers (or that the
//! local UI produces when the user sends a message). The field names follow
//! the wire format, so serde renames are used instead of Rust naming.
//! Fields this crate does not interpret are kept in `extra` maps and
//! survive a store round-trip.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ChatRelayError, Result};

/// Descriptor of the other participant of a conversation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PeerInfo {
    #[serde(rename = "userId", default)]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Message body. Only `content` is interpreted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Metadata attached by the peer to an inbound payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PayloadExt {
    /// Send time in epoch milliseconds.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Transient metadata present only on locally originated payloads.
///
/// Its presence is the "locally originated" marker; it is stripped before a
/// payload is stored as a [`MessageRecord`](crate::message::MessageRecord).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocaleExt {
    #[serde(rename = "toInfo")]
    pub to_info: PeerInfo,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A message payload as delivered by the channel or built locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub uuid: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub msg: MessageBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<PayloadExt>,
    #[serde(rename = "localeExt", default, skip_serializing_if = "Option::is_none")]
    pub locale_ext: Option<LocaleExt>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Payload {
    /// Parses a payload from a raw channel value.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ChatRelayError::malformed(e.to_string()))
    }

    /// Builds a locally originated payload addressed to `to_info`.
    pub fn local(
        uuid: impl Into<String>,
        from: impl Into<String>,
        to_info: PeerInfo,
        content: impl Into<String>,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            from: from.into(),
            to: to_info.user_id.clone(),
            msg: MessageBody {
                content: content.into(),
                extra: Map::new(),
            },
            ext: None,
            locale_ext: Some(LocaleExt {
                to_info,
                extra: Map::new(),
            }),
            extra: Map::new(),
        }
    }

    /// Whether the payload was initiated from this client.
    pub fn is_local(&self) -> bool {
        self.locale_ext.is_some()
    }

    /// Peer metadata of an inbound payload.
    ///
    /// Inbound payloads must carry `ext`; a payload with neither marker is
    /// rejected rather than guessed at.
    pub fn inbound_ext(&self) -> Result<&PayloadExt> {
        self.ext.as_ref().ok_or_else(|| {
            ChatRelayError::malformed(format!(
                "inbound payload '{}' has neither localeExt nor ext",
                self.uuid
            ))
        })
    }
}
