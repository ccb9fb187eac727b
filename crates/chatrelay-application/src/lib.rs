//! Application layer of the chat relay.
//!
//! Coordinates the domain structures from `chatrelay-core` with the
//! repositories from `chatrelay-infrastructure`: the relay itself, its
//! persistence synchronizer and the channel adapter.

pub mod channel;
pub mod events;
pub mod relay;
pub mod sync;

pub use channel::{CONNECT_SUCCESS, ChannelAdapter, ChannelEvent, MessageChannel};
pub use events::RelayEvent;
pub use relay::ChatRelay;
pub use sync::PersistenceSynchronizer;
