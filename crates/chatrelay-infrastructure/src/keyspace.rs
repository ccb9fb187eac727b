//! Key namespace shared with every other reader of the persistent store.
//!
//! ```text
//! session:list:map:keys     comma-joined conversation keys
//! session:list:<key>        JSON SessionItem snapshot
//! message:history:<key>     comma-joined message uuids, oldest first
//! message:item:<uuid>       JSON MessageRecord
//! ```
//!
//! Lists are joined with `,`, so neither conversation keys nor uuids may
//! contain a comma.

use chatrelay_core::ConversationKey;

pub const SESSION_KEY_LIST: &str = "session:list:map:keys";

pub const LIST_SEPARATOR: char = ',';

pub fn session_key(key: &ConversationKey) -> String {
    format!("session:list:{}", key)
}

pub fn history_key(key: &ConversationKey) -> String {
    format!("message:history:{}", key)
}

pub fn message_key(uuid: &str) -> String {
    format!("message:item:{}", uuid)
}

/// Splits a stored list, ignoring empty segments (an empty list is stored
/// as the empty string).
pub fn split_list(value: &str) -> Vec<&str> {
    value
        .split(LIST_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect()
}
