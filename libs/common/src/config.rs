//! Layered application configuration
//!
//! Priority (highest to lowest):
//! 1. Environment variables (`MASTERCALC_`, nested keys split on `__`)
//! 2. Explicit config file (`--config`)
//! 3. `mastercalc.toml` / `mastercalc.yaml` / `mastercalc.json` in the base directory
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use errors::{invalid_config, MasterCalcError, MasterCalcResult};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const ENV_PREFIX: &str = "MASTERCALC_";
pub const CONFIG_FILE_STEM: &str = "mastercalc";
pub const DEFAULT_DB_PATH: &str = "data/mastercalc.db";
pub const DEFAULT_AUTOSAVE_SECS: u64 = 30;

/// Storage backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// SQLite database file, ignored by the memory backend
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    /// Daily log files are written here when set
    pub dir: Option<PathBuf>,
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            dir: None,
            json: false,
        }
    }
}

/// MasterCalc configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub log: LogSettings,
    /// Draft autosave period in seconds
    pub autosave_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            log: LogSettings::default(),
            autosave_secs: DEFAULT_AUTOSAVE_SECS,
        }
    }
}

impl AppConfig {
    /// Load from the working directory, an optional explicit file and the environment
    pub fn load(explicit: Option<&Path>) -> MasterCalcResult<Self> {
        ConfigLoader::new(".").file(explicit).load()
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_secs)
    }

    /// Reject values that parse but cannot work
    pub fn validate(&self) -> MasterCalcResult<()> {
        if self.autosave_secs == 0 {
            return Err(invalid_config!("autosave_secs", "must be at least 1 second"));
        }
        if self.storage.backend == StorageBackend::Sqlite
            && self.storage.db_path.as_os_str().is_empty()
        {
            return Err(invalid_config!(
                "storage.db_path",
                "required for the sqlite backend"
            ));
        }
        if self.log.level.trim().is_empty() {
            return Err(invalid_config!("log.level", "must not be empty"));
        }
        Ok(())
    }

    /// Effective configuration as TOML
    pub fn to_toml(&self) -> MasterCalcResult<String> {
        toml::to_string_pretty(self).map_err(|e| MasterCalcError::Serialization(e.to_string()))
    }
}

/// Builder over the figment provider chain
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    base_dir: PathBuf,
    file: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            file: None,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    pub fn file(mut self, path: Option<&Path>) -> Self {
        self.file = path.map(Path::to_path_buf);
        self
    }

    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    fn figment(&self) -> MasterCalcResult<Figment> {
        let base = |ext: &str| self.base_dir.join(format!("{CONFIG_FILE_STEM}.{ext}"));

        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(base("toml")))
            .merge(Yaml::file(base("yaml")))
            .merge(Json::file(base("json")));

        if let Some(path) = &self.file {
            if !path.is_file() {
                return Err(MasterCalcError::MissingConfig(path.display().to_string()));
            }
            let extension = path
                .extension()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_ascii_lowercase();
            figment = match extension.as_str() {
                "toml" => figment.merge(Toml::file(path)),
                "yaml" | "yml" => figment.merge(Yaml::file(path)),
                "json" => figment.merge(Json::file(path)),
                other => {
                    return Err(invalid_config!(
                        "config",
                        format!("unsupported config file format '{other}'")
                    ))
                },
            };
        }

        Ok(figment.merge(Env::prefixed(&self.env_prefix).split("__")))
    }

    pub fn load(&self) -> MasterCalcResult<AppConfig> {
        let config: AppConfig = self
            .figment()?
            .extract()
            .map_err(|e| invalid_config!(field_of(&e), e))?;
        config.validate()?;
        debug!(?config, "Configuration loaded");
        Ok(config)
    }
}

fn field_of(err: &figment::Error) -> String {
    if err.path.is_empty() {
        "config".to_string()
    } else {
        err.path.join(".")
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn loader(dir: &TempDir) -> ConfigLoader {
        // Prefix no test sets, so ambient MASTERCALC_* variables do not leak in
        ConfigLoader::new(dir.path()).env_prefix("MASTERCALC_UNIT_TEST_UNSET_")
    }

    #[test]
    fn test_defaults_without_files() {
        let dir = TempDir::new().unwrap();
        let config = loader(&dir).load().unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.autosave_interval(), Duration::from_secs(30));
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
    }

    #[test]
    fn test_base_dir_toml_is_merged() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("mastercalc.toml"),
            "autosave_secs = 10\n[storage]\nbackend = \"memory\"\n",
        )
        .unwrap();

        let config = loader(&dir).load().unwrap();
        assert_eq!(config.autosave_secs, 10);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.db_path, PathBuf::from(DEFAULT_DB_PATH));
    }

    #[test]
    fn test_explicit_file_overrides_base() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("mastercalc.yaml"), "autosave_secs: 10\n").unwrap();
        let explicit = dir.path().join("custom.yml");
        std::fs::write(
            &explicit,
            "autosave_secs: 45\nlog:\n  level: debug\n  dir: /tmp/mc-logs\n",
        )
        .unwrap();

        let config = loader(&dir).file(Some(&explicit)).load().unwrap();
        assert_eq!(config.autosave_secs, 45);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.dir, Some(PathBuf::from("/tmp/mc-logs")));
    }

    #[test]
    fn test_env_overrides_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("mastercalc.json"), r#"{"autosave_secs": 5}"#).unwrap();
        std::env::set_var("MASTERCALC_CFG_ENV_TEST_AUTOSAVE_SECS", "90");
        std::env::set_var("MASTERCALC_CFG_ENV_TEST_STORAGE__DB_PATH", "/var/lib/mc.db");

        let config = ConfigLoader::new(dir.path())
            .env_prefix("MASTERCALC_CFG_ENV_TEST_")
            .load()
            .unwrap();
        assert_eq!(config.autosave_secs, 90);
        assert_eq!(config.storage.db_path, PathBuf::from("/var/lib/mc.db"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("mastercalc.toml"), "autosave_secs = 0\n").unwrap();
        let err = loader(&dir).load().unwrap_err();
        assert!(matches!(err, MasterCalcError::InvalidConfig { ref field, .. } if field == "autosave_secs"));

        std::fs::write(
            dir.path().join("mastercalc.toml"),
            "[storage]\nbackend = \"redis\"\n",
        )
        .unwrap();
        let err = loader(&dir).load().unwrap_err();
        assert!(matches!(err, MasterCalcError::InvalidConfig { ref field, .. } if field == "storage.backend"));
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = TempDir::new().unwrap();
        let err = loader(&dir)
            .file(Some(&dir.path().join("nope.toml")))
            .load()
            .unwrap_err();
        assert!(matches!(err, MasterCalcError::MissingConfig(_)));

        let ini = dir.path().join("settings.ini");
        std::fs::write(&ini, "x=1").unwrap();
        assert!(loader(&dir).file(Some(&ini)).load().is_err());
    }

    #[test]
    fn test_to_toml_round_trips() {
        let config = AppConfig::default();
        let text = config.to_toml().unwrap();
        assert!(text.contains("autosave_secs = 30"));
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
