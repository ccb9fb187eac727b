//! Session repository trait.
//!
//! Defines the interface for persisting the session index.

use super::model::SessionItem;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for the session index snapshot.
///
/// The index is written in bulk (on backgrounding) and read back once at
/// startup, so the contract is whole-index rather than per-entry.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Writes a snapshot of every session.
    ///
    /// # Arguments
    ///
    /// * `items` - The current entries of the session index
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Every write was issued and acknowledged by the store
    /// - `Err(_)`: The first write that failed
    async fn save_all(&self, items: &[SessionItem]) -> Result<()>;

    /// Reads back the last snapshot.
    ///
    /// A missing key list means nothing was ever persisted and yields an
    /// empty vector. Implementations skip (and log) individual entries that
    /// are missing or cannot be parsed instead of failing the whole restore.
    async fn load_all(&self) -> Result<Vec<SessionItem>>;
}
