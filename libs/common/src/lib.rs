//! MasterCalc common library
//!
//! Provides the ambient pieces shared by MasterCalc binaries:
//! - logging bootstrap (`logging`)
//! - layered configuration (`config`)

pub mod config;
pub mod logging;

pub use config::{AppConfig, ConfigLoader, LogSettings, StorageBackend, StorageConfig};
pub use logging::LogConfig;
