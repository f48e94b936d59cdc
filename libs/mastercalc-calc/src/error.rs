//! Error types for mastercalc-calc

use errors::{ErrorCategory, ErrorInfo, MasterCalcErrorTrait};
use thiserror::Error;

use crate::units::{Quantity, Unit};

/// Calculation errors
///
/// Every variant aborts the computation before any state is touched;
/// no history is written for a failed calculation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// Missing, unparseable or out-of-domain input field
    #[error("Invalid input '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    /// A formula denominator is zero
    #[error("Division by zero: '{field}' must not be zero")]
    DivisionByZero { field: String },

    /// Input is numerically valid but makes the formula meaningless
    #[error("Degenerate input '{field}': {reason}")]
    DegenerateInput { field: String, reason: String },

    /// The (kind, from, to) triple is absent from the unit table
    #[error("Unsupported conversion for {kind}: {from} -> {to}")]
    UnsupportedConversion {
        kind: String,
        from: String,
        to: String,
    },
}

impl CalcError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn division_by_zero(field: impl Into<String>) -> Self {
        Self::DivisionByZero {
            field: field.into(),
        }
    }

    pub fn degenerate(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DegenerateInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported(kind: Quantity, from: Unit, to: Unit) -> Self {
        Self::UnsupportedConversion {
            kind: kind.code().to_string(),
            from: from.code().to_string(),
            to: to.code().to_string(),
        }
    }

    /// Input field the error refers to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidInput { field, .. }
            | Self::DivisionByZero { field }
            | Self::DegenerateInput { field, .. } => Some(field),
            Self::UnsupportedConversion { .. } => None,
        }
    }
}

impl MasterCalcErrorTrait for CalcError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::DivisionByZero { .. } => "DIVISION_BY_ZERO",
            Self::DegenerateInput { .. } => "DEGENERATE_INPUT",
            Self::UnsupportedConversion { .. } => "UNSUPPORTED_CONVERSION",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } => ErrorCategory::InvalidInput,
            Self::DivisionByZero { .. } | Self::DegenerateInput { .. } => {
                ErrorCategory::Degenerate
            },
            Self::UnsupportedConversion { .. } => ErrorCategory::Conversion,
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::DivisionByZero { field } if field == "current" => {
                "Ток не может быть равен нулю!".to_string()
            },
            Self::DivisionByZero { field } if field == "resistance" => {
                "Сопротивление не может быть равно нулю!".to_string()
            },
            Self::DivisionByZero { .. } => "Значение не может быть равно нулю!".to_string(),
            Self::DegenerateInput { field, .. } if field == "r1" || field == "r2" => {
                "Сопротивления должны быть больше нуля!".to_string()
            },
            _ => self.category().default_message().to_string(),
        }
    }

    fn to_error_info(&self) -> ErrorInfo {
        let info = ErrorInfo::new(self.user_message())
            .with_code(self.error_code())
            .with_category(self.category())
            .with_details(self.to_string());
        match self.field() {
            Some(field) => info.add_field_error(field, self.to_string()),
            None => info,
        }
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_resistance_message() {
        let err = CalcError::division_by_zero("resistance");
        assert_eq!(err.user_message(), "Сопротивление не может быть равно нулю!");
        assert_eq!(err.category(), ErrorCategory::Degenerate);
    }

    #[test]
    fn test_unsupported_conversion_info() {
        let err = CalcError::unsupported(Quantity::Pressure, Unit::Bar, Unit::Meter);
        let info = err.to_error_info();
        assert_eq!(info.code, "UNSUPPORTED_CONVERSION");
        assert_eq!(info.message, "Невозможно выполнить конвертацию");
        assert!(info.field_errors.is_empty());
    }

    #[test]
    fn test_invalid_input_field_error() {
        let info = CalcError::invalid_input("length", "must be positive").to_error_info();
        assert_eq!(info.field_errors["length"].len(), 1);
        assert_eq!(info.message, "Заполните все поля корректно!");
    }
}
