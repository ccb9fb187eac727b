//! Message history domain module.
//!
//! - `model`: Stored message record (`MessageRecord`)
//! - `history`: Lazily hydrated per-conversation cache (`MessageHistoryCache`)
//! - `repository`: Repository trait for incremental persistence

mod history;
mod model;
mod repository;

pub use history::{HistoryLookup, MessageHistoryCache};
pub use model::MessageRecord;
pub use repository::MessageRepository;
