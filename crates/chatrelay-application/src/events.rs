//! Change notifications published by the relay.

use chatrelay_core::ConversationKey;
use chatrelay_core::session::SessionItem;

/// A mutation of the relay's in-memory state or a completed persistence step.
///
/// Derived views (`sorted_sessions`, `total_unread`, `current_history`) are
/// never pushed; subscribers re-read them when an event arrives.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    /// A session entry was created or replaced by a payload.
    SessionUpdated(SessionItem),
    /// The unread counter of an existing session was reset.
    UnreadCleared(ConversationKey),
    /// A record was appended to a conversation's history.
    MessageAppended { key: ConversationKey, uuid: String },
    /// A lazy restore landed and was merged into the history.
    HistoryHydrated { key: ConversationKey, count: usize },
    /// The session index was written to the store.
    SessionsPersisted { count: usize },
    /// Session snapshots were loaded at startup.
    SessionsRestored { count: usize },
}
