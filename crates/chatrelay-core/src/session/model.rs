//! Session domain model.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::key::ConversationKey;
use crate::payload::{Payload, PeerInfo};

/// Summary record of a conversation's latest state.
///
/// Serialized in camelCase because the snapshot stored under
/// `session:list:<key>` keeps the field names other clients of the same
/// store expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionItem {
    pub key: ConversationKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub latest_message: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    #[serde(default)]
    pub un_read_message_count: u32,
    pub to_info: PeerInfo,
}

impl SessionItem {
    /// Builds the replacement entry for `payload`.
    ///
    /// `previous` is the entry currently indexed under the same key and only
    /// feeds the unread counter of inbound payloads. `now_ms` stamps locally
    /// originated payloads, which carry no timestamp of their own.
    pub fn from_payload(
        payload: &Payload,
        previous: Option<&SessionItem>,
        now_ms: i64,
    ) -> Result<Self> {
        let key = ConversationKey::derive(payload);

        if let Some(locale_ext) = &payload.locale_ext {
            let to_info = locale_ext.to_info.clone();
            return Ok(Self {
                key,
                avatar: to_info.avatar.clone(),
                name: to_info.name.clone(),
                latest_message: payload.msg.content.clone(),
                timestamp: now_ms,
                un_read_message_count: 0,
                to_info,
            });
        }

        let ext = payload.inbound_ext()?;
        Ok(Self {
            key,
            avatar: ext.avatar.clone(),
            name: ext.name.clone(),
            latest_message: payload.msg.content.clone(),
            timestamp: ext.timestamp,
            un_read_message_count: previous
                .map_or(1, |p| p.un_read_message_count.saturating_add(1)),
            to_info: PeerInfo {
                user_id: payload.from.clone(),
                avatar: ext.avatar.clone(),
                name: ext.name.clone(),
                extra: Default::default(),
            },
        })
    }
}

/// A session as presented by the sorted list, with its relative-time label.
///
/// The label is computed at read time and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    #[serde(flatten)]
    pub item: SessionItem,
    pub latest_time: String,
}
