//! Application context and navigation state
//!
//! The calculators and the store are stateless; everything a session needs to
//! remember (open store, output mode, current screen) lives here.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use common::{AppConfig, StorageBackend};
use mastercalc_calc::Screen;
use mastercalc_store::{Backend, MemoryStore, PersistenceStore, SqliteStore};
use tracing::debug;

use crate::output::Output;

pub const APP_NAME: &str = "MasterCalc PRO";

/// Store type used by the CLI
pub type Store = PersistenceStore<Backend>;

/// Which screen the session is on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    current: Screen,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            current: Screen::Menu,
        }
    }
}

impl AppState {
    pub fn current(&self) -> Screen {
        self.current
    }

    pub fn open(&mut self, screen: Screen) {
        if self.current != screen {
            debug!("Open screen: {}", screen.id());
            self.current = screen;
        }
    }

    /// Escape: back to the menu from anywhere
    pub fn escape(&mut self) {
        self.open(Screen::Menu);
    }

    pub fn title(&self) -> String {
        format!("{} - {}", APP_NAME, self.current.title())
    }
}

/// Everything a command handler needs
pub struct AppContext {
    pub config: AppConfig,
    pub store: Arc<Store>,
    pub output: Output,
    pub state: AppState,
}

impl AppContext {
    /// Open the configured backend
    pub async fn open(config: AppConfig, output: Output) -> Result<Self> {
        let backend = match config.storage.backend {
            StorageBackend::Memory => Backend::from(MemoryStore::new()),
            StorageBackend::Sqlite => {
                let store = SqliteStore::open(&config.storage.db_path)
                    .await
                    .with_context(|| {
                        format!(
                            "Failed to open database {}",
                            config.storage.db_path.display()
                        )
                    })?;
                Backend::from(store)
            },
        };
        debug!("Storage backend: {}", backend.name());

        Ok(Self {
            config,
            store: Arc::new(PersistenceStore::new(backend)),
            output,
            state: AppState::default(),
        })
    }
}
