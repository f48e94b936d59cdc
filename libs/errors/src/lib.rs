//! Unified error handling for MasterCalc crates
//!
//! Every library keeps its own domain error (`CalcError`, `StoreError`) and
//! gains a common outward-facing interface by implementing
//! [`MasterCalcErrorTrait`]. Failures of the ambient stack (configuration,
//! logging bootstrap, file I/O) use [`MasterCalcError`] directly.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

// ============================================================================
// ErrorInfo - report handed to the presentation layer
// ============================================================================

/// Structured error report rendered inline by the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable error code (e.g. `INVALID_INPUT`)
    pub code: String,
    /// Error category name
    pub category: String,
    /// Localized message shown to the user
    pub message: String,
    /// Technical description for logs and `--json` output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Field-specific errors for input validation
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub field_errors: HashMap<String, Vec<String>>,
}

impl ErrorInfo {
    /// Create a new ErrorInfo with just a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: "UNKNOWN_ERROR".to_string(),
            category: format!("{:?}", ErrorCategory::Unknown),
            message: message.into(),
            details: None,
            field_errors: HashMap::new(),
        }
    }

    /// Set the error code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Set the category
    pub fn with_category(mut self, category: ErrorCategory) -> Self {
        self.category = format!("{:?}", category);
        self
    }

    /// Add details
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Add a field error
    pub fn add_field_error(mut self, field: impl Into<String>, error: impl Into<String>) -> Self {
        self.field_errors
            .entry(field.into())
            .or_default()
            .push(error.into());
        self
    }
}

// ============================================================================
// MasterCalcError - ambient stack error type
// ============================================================================

/// Error type for configuration, logging and I/O failures
#[derive(Debug, Error)]
pub enum MasterCalcError {
    // ======================================
    // Configuration Errors
    // ======================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // ======================================
    // File & I/O Errors
    // ======================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ======================================
    // Runtime Errors
    // ======================================
    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using MasterCalcError
pub type MasterCalcResult<T> = Result<T, MasterCalcError>;

impl From<serde_json::Error> for MasterCalcError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// Helper macros for creating errors
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::MasterCalcError::Configuration($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::MasterCalcError::Configuration(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! invalid_config {
    ($field:expr, $reason:expr) => {
        $crate::MasterCalcError::InvalidConfig {
            field: $field.to_string(),
            reason: $reason.to_string(),
        }
    };
}

impl MasterCalcErrorTrait for MasterCalcError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::InvalidConfig { .. } => "INVALID_CONFIG",
            Self::MissingConfig(_) => "MISSING_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Deserialization(_) => "DESERIALIZATION_ERROR",
            Self::Logging(_) => "LOGGING_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Other(_) => "OTHER_ERROR",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) | Self::InvalidConfig { .. } | Self::MissingConfig(_) => {
                ErrorCategory::Configuration
            },
            Self::Io(_) | Self::Serialization(_) | Self::Deserialization(_) => {
                ErrorCategory::Storage
            },
            Self::Logging(_) | Self::Internal(_) => ErrorCategory::Internal,
            Self::Other(_) => ErrorCategory::Unknown,
        }
    }
}

// ============================================================================
// MasterCalc Error Trait - Architectural layer
// ============================================================================

/// Error category enum - used for classification and user messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    // Calculation layer
    /// Unparseable, missing or out-of-domain input field
    InvalidInput,
    /// Mathematically undefined input (zero denominator, non-positive resistance)
    Degenerate,
    /// Requested unit pair is absent from the unit table
    Conversion,

    // Persistence layer
    Storage,
    DataCorruption,

    // Infrastructure layer
    Configuration,

    // System level
    Internal,
    Unknown,
}

impl ErrorCategory {
    /// Default user-facing message for the category (display locale)
    pub fn default_message(self) -> &'static str {
        match self {
            Self::InvalidInput => "Заполните все поля корректно!",
            Self::Degenerate => "Недопустимые значения для расчета!",
            Self::Conversion => "Невозможно выполнить конвертацию",
            Self::Storage => "Ошибка сохранения данных",
            Self::DataCorruption => "Сохраненные данные повреждены и были сброшены",
            Self::Configuration => "Ошибка конфигурации",
            Self::Internal | Self::Unknown => "Внутренняя ошибка",
        }
    }
}

/// MasterCalc error capability trait
///
/// Each crate keeps its domain-specific error type and gains a common
/// interface by implementing this trait.
///
/// No error is fatal: every failure is caught at the boundary of a single
/// user action and reported inline, leaving the application usable for the
/// next action.
pub trait MasterCalcErrorTrait: std::error::Error + Send + Sync + 'static {
    /// Get error code (for logs and `--json` output)
    fn error_code(&self) -> &'static str;

    /// Get error category
    fn category(&self) -> ErrorCategory;

    /// Localized message shown to the user
    fn user_message(&self) -> String {
        self.category().default_message().to_string()
    }

    /// Process exit code used by the command-line front end
    fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::InvalidInput | ErrorCategory::Degenerate | ErrorCategory::Conversion => {
                2
            },
            ErrorCategory::Configuration => 3,
            ErrorCategory::Storage | ErrorCategory::DataCorruption => 4,
            ErrorCategory::Internal | ErrorCategory::Unknown => 1,
        }
    }

    /// Get log level
    fn log_level(&self) -> tracing::Level {
        use tracing::Level;
        match self.category() {
            ErrorCategory::Internal | ErrorCategory::Storage => Level::ERROR,
            ErrorCategory::DataCorruption | ErrorCategory::Configuration => Level::WARN,
            ErrorCategory::InvalidInput | ErrorCategory::Degenerate | ErrorCategory::Conversion => {
                Level::INFO
            },
            ErrorCategory::Unknown => Level::WARN,
        }
    }

    /// Convert to ErrorInfo for rendering
    fn to_error_info(&self) -> ErrorInfo {
        ErrorInfo::new(self.user_message())
            .with_code(self.error_code())
            .with_category(self.category())
            .with_details(self.to_string())
    }
}

// Tests
#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(
            MasterCalcError::Configuration("bad".into()).category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            MasterCalcError::Serialization("bad".into()).category(),
            ErrorCategory::Storage
        );
        assert_eq!(
            MasterCalcError::Internal("bad".into()).category(),
            ErrorCategory::Internal
        );
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(MasterCalcError::MissingConfig("db".into()).exit_code(), 3);
        assert_eq!(MasterCalcError::Internal("boom".into()).exit_code(), 1);
    }

    #[test]
    fn test_error_info() {
        let error = invalid_config!("storage.backend", "unknown backend 'redis'");
        let info = error.to_error_info().add_field_error("storage.backend", "unknown");
        assert_eq!(info.code, "INVALID_CONFIG");
        assert_eq!(info.category, "Configuration");
        assert_eq!(info.message, "Ошибка конфигурации");
        assert!(info.field_errors.contains_key("storage.backend"));
        assert!(info.details.unwrap().contains("unknown backend"));
    }

    #[test]
    fn test_error_info_serializes_without_empty_fields() {
        let info = ErrorInfo::new("oops");
        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("details").is_none());
        assert!(json.get("field_errors").is_none());
        assert_eq!(json["code"], "UNKNOWN_ERROR");
    }
}
