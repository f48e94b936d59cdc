//! Key-value backend abstraction

use std::future::Future;

use crate::error::Result;

/// String key-value storage backend
///
/// Implementations:
/// - `MemoryStore`: in-process DashMap, for tests and ephemeral runs
/// - `SqliteStore`: persistent SQLite table
pub trait KvStore: Send + Sync + 'static {
    /// Get value by key
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Set value for key, replacing any previous value
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<()>> + Send;

    /// Delete key, returns whether it existed
    fn delete(&self, key: &str) -> impl Future<Output = Result<bool>> + Send;
}
