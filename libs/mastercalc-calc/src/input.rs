//! Raw field parsing and domain checks

use crate::error::{CalcError, Result};

/// Parse a numeric form field
///
/// A comma is accepted as decimal separator. Empty, non-numeric and
/// non-finite text is rejected; trailing garbage is not ignored.
pub fn parse_number(field: &str, raw: &str) -> Result<f64> {
    let text = raw.trim().replace(',', ".");
    if text.is_empty() {
        return Err(CalcError::invalid_input(field, "empty value"));
    }
    let value: f64 = text
        .parse()
        .map_err(|_| CalcError::invalid_input(field, format!("'{}' is not a number", raw)))?;
    require_finite(field, value)
}

/// Parse an optional field, `None` when the text is blank
pub fn parse_optional(field: &str, raw: Option<&str>) -> Result<Option<f64>> {
    match raw {
        Some(text) if !text.trim().is_empty() => parse_number(field, text).map(Some),
        _ => Ok(None),
    }
}

pub fn require_finite(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::invalid_input(field, "not a finite number"))
    }
}

/// Finite and `>= 0`
pub fn require_non_negative(field: &str, value: f64) -> Result<f64> {
    let value = require_finite(field, value)?;
    if value < 0.0 {
        return Err(CalcError::invalid_input(field, "must not be negative"));
    }
    Ok(value)
}

/// Finite and `> 0` (lengths, areas, sections, ratings)
pub fn require_positive(field: &str, value: f64) -> Result<f64> {
    let value = require_finite(field, value)?;
    if value <= 0.0 {
        return Err(CalcError::invalid_input(field, "must be greater than zero"));
    }
    Ok(value)
}

/// Percentage in `(0, 100]`, returned as a fraction
pub fn require_percent(field: &str, value: f64) -> Result<f64> {
    let value = require_positive(field, value)?;
    if value > 100.0 {
        return Err(CalcError::invalid_input(field, "must not exceed 100%"));
    }
    Ok(value / 100.0)
}
