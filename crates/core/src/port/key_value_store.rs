// Local Key-Value Store Port (device-local storage)

use crate::error::Result;
use async_trait::async_trait;

/// Plain string key-value storage
///
/// Every write stamps the entry with the current time so stale entries can
/// be garbage collected.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Returns whether the key existed
    async fn remove(&self, key: &str) -> Result<bool>;
}
