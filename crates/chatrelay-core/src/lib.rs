//! Domain layer of the chat relay.
//!
//! Pure models and in-memory structures: payloads, conversation keys, the
//! session index, the message history cache, plus the traits the
//! infrastructure layer implements. Nothing here performs I/O.

pub mod config;
pub mod error;
pub mod key;
pub mod lifecycle;
pub mod message;
pub mod payload;
pub mod relative_time;
pub mod session;
pub mod store;

pub use config::RelayConfig;
pub use error::ChatRelayError;
pub use key::ConversationKey;
pub use lifecycle::{AppLifecycleState, Platform};
pub use payload::{LocaleExt, MessageBody, Payload, PayloadExt, PeerInfo};
pub use relative_time::RelativeTimeLocale;
pub use store::KeyValueStore;
