//! Runtime-selected backend

use crate::error::Result;
use crate::memory_impl::MemoryStore;
use crate::sqlite_impl::SqliteStore;
use crate::traits::KvStore;

/// Either backend, chosen from configuration at startup
#[derive(Clone)]
pub enum Backend {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Memory(_) => "memory",
            Backend::Sqlite(_) => "sqlite",
        }
    }
}

impl From<MemoryStore> for Backend {
    fn from(store: MemoryStore) -> Self {
        Backend::Memory(store)
    }
}

impl From<SqliteStore> for Backend {
    fn from(store: SqliteStore) -> Self {
        Backend::Sqlite(store)
    }
}

impl KvStore for Backend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self {
            Backend::Memory(store) => store.get(key).await,
            Backend::Sqlite(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        match self {
            Backend::Memory(store) => store.set(key, value).await,
            Backend::Sqlite(store) => store.set(key, value).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        match self {
            Backend::Memory(store) => store.delete(key).await,
            Backend::Sqlite(store) => store.delete(key).await,
        }
    }
}
