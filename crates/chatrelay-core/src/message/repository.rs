//! Message repository trait.

use super::model::MessageRecord;
use crate::error::Result;
use crate::key::ConversationKey;
use async_trait::async_trait;

/// An abstract repository for per-conversation message history.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persists one new record at the end of `key`'s history.
    ///
    /// The write is incremental: only this record and the id list change.
    async fn append(&self, key: &ConversationKey, record: &MessageRecord) -> Result<()>;

    /// Loads the newest `limit` records of `key`, oldest first.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(records))`: History exists (records may be fewer than its
    ///   id list when individual records are missing or corrupt)
    /// - `Ok(None)`: Nothing was ever persisted for this conversation
    /// - `Err(_)`: The id list or the batch read failed
    async fn load_recent(
        &self,
        key: &ConversationKey,
        limit: usize,
    ) -> Result<Option<Vec<MessageRecord>>>;
}
