//! Key-value store abstraction.
//!
//! The persistent store is an external, shared resource with string keys and
//! string values. Repositories reach it only through this trait so that the
//! physical backend (in-memory, file, platform storage) stays swappable.

use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads one value. `Ok(None)` means the key was never set.
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Writes one value, replacing any previous one.
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Reads several values in one batch.
    ///
    /// The result has one `(key, value)` pair per requested key, in request
    /// order; missing keys pair with `None`.
    async fn multi_get(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>>;
}
