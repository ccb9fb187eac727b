//! Conversation key derivation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::payload::Payload;

/// Canonical, direction-independent identifier of a two-party conversation.
///
/// The local user's id is always the first segment: a locally sent payload
/// has the local user in `from`, an inbound one has the local user in `to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationKey(String);

impl ConversationKey {
    /// Wraps an already-canonical key (e.g. one read back from the store).
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Derives the key of the conversation a payload belongs to.
    pub fn derive(payload: &Payload) -> Self {
        if payload.is_local() {
            Self(format!("{}-{}", payload.from, payload.to))
        } else {
            Self(format!("{}-{}", payload.to, payload.from))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ConversationKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl AsRef<str> for ConversationKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{PayloadExt, PeerInfo};

    fn inbound(from: &str, to: &str) -> Payload {
        Payload {
            uuid: "u".to_string(),
            from: from.to_string(),
            to: to.to_string(),
            msg: Default::default(),
            ext: Some(PayloadExt::default()),
            locale_ext: None,
            extra: Default::default(),
        }
    }

    fn local(from: &str, to: &str) -> Payload {
        let peer = PeerInfo {
            user_id: to.to_string(),
            ..Default::default()
        };
        Payload::local("u", from, peer, "")
    }

    #[test]
    fn test_inbound_key_puts_local_user_first() {
        assert_eq!(ConversationKey::derive(&inbound("A", "B")).as_str(), "B-A");
    }

    #[test]
    fn test_local_key_puts_local_user_first() {
        assert_eq!(ConversationKey::derive(&local("B", "A")).as_str(), "B-A");
    }

    #[test]
    fn test_direction_swap_yields_same_key() {
        for (me, peer) in [("B", "A"), ("alice", "bob"), ("10", "2")] {
            let sent = local(me, peer);
            let received = inbound(peer, me);
            assert_eq!(
                ConversationKey::derive(&sent),
                ConversationKey::derive(&received)
            );
        }
    }

    #[test]
    fn test_self_chat_forms_coincide() {
        assert_eq!(
            ConversationKey::derive(&local("A", "A")),
            ConversationKey::derive(&inbound("A", "A"))
        );
    }
}
