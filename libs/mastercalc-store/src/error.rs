//! Error types for mastercalc-store

use errors::{ErrorCategory, MasterCalcErrorTrait};
use mastercalc_calc::CalcError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error for '{key}': {reason}")]
    Serialization { key: String, reason: String },

    /// Only surfaced by explicit inspection; regular reads recover to default
    #[error("Stored value under '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("Index {index} out of range for {list} (len {len})")]
    IndexOutOfRange {
        list: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Template name must not be empty")]
    EmptyTemplateName,

    #[error(transparent)]
    Calc(#[from] CalcError),
}

impl StoreError {
    pub fn serialization(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::Serialization {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

impl MasterCalcErrorTrait for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization { .. } => "SERIALIZATION_ERROR",
            Self::Corrupt { .. } => "STORAGE_CORRUPT",
            Self::IndexOutOfRange { .. } => "INDEX_OUT_OF_RANGE",
            Self::EmptyTemplateName => "EMPTY_TEMPLATE_NAME",
            Self::Calc(err) => err.error_code(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Database(_) | Self::Io(_) | Self::Serialization { .. } => ErrorCategory::Storage,
            Self::Corrupt { .. } => ErrorCategory::DataCorruption,
            Self::IndexOutOfRange { .. } | Self::EmptyTemplateName => ErrorCategory::InvalidInput,
            Self::Calc(err) => err.category(),
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::IndexOutOfRange { .. } => "Запись не найдена".to_string(),
            Self::EmptyTemplateName => "Название шаблона не может быть пустым".to_string(),
            Self::Calc(err) => err.user_message(),
            _ => self.category().default_message().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_calc_error_keeps_its_identity() {
        let err: StoreError = CalcError::division_by_zero("current").into();
        assert_eq!(err.error_code(), "DIVISION_BY_ZERO");
        assert_eq!(err.category(), ErrorCategory::Degenerate);
        assert_eq!(err.user_message(), "Ток не может быть равен нулю!");
    }

    #[test]
    fn test_storage_categories() {
        let err = StoreError::serialization("mastercalc_history", "bad");
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.exit_code(), 4);
        assert_eq!(
            err.to_string(),
            "Serialization error for 'mastercalc_history': bad"
        );
    }

    #[test]
    fn test_index_error_message() {
        let err = StoreError::IndexOutOfRange {
            list: "templates",
            index: 3,
            len: 1,
        };
        assert_eq!(err.user_message(), "Запись не найдена");
        assert_eq!(err.to_string(), "Index 3 out of range for templates (len 1)");
    }
}
