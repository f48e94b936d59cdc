//! MasterCalc Persistence Store
//!
//! Typed storage of favorites, history, templates, the draft, launch
//! statistics and the theme over a string key-value backend.
//!
//! # Key Components
//!
//! - **KvStore trait**: get/set/delete of strings under fixed keys
//! - **MemoryStore / SqliteStore**: the two backends, `Backend` picks one at runtime
//! - **PersistenceStore**: typed operations, versioned envelopes, corruption recovery
//! - **DraftAutosave**: background task re-persisting the draft

pub mod traits;

pub mod memory_impl;

pub mod sqlite_impl;

pub mod backend;

pub mod error;

pub mod clock;

pub mod keyspace;

pub mod schema;

pub mod store;

pub mod autosave;

// Re-exports
pub use traits::KvStore;

pub use backend::Backend;
pub use memory_impl::MemoryStore;
pub use sqlite_impl::SqliteStore;

pub use error::{Result, StoreError};

pub use clock::{Clock, FixedClock, SystemClock};

pub use keyspace::{StoreKey, KEY_PREFIX};

pub use schema::{
    FavoriteEntry, HistoryEntry, TemplateEntry, Theme, UsageStats, DEFAULT_TEMPLATE_DATA,
    DEFAULT_TEMPLATE_DESCRIPTION, HISTORY_LIMIT, SCHEMA_VERSION,
};

pub use store::{favorite_for, PersistenceStore, SlotStatus};

pub use autosave::{DraftAutosave, DEFAULT_AUTOSAVE_INTERVAL};
