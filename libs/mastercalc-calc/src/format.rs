//! Display formatting for calculation results
//!
//! Numbers are rounded to a fixed number of decimals, printed in their
//! shortest round-trip form (via `ryu`, no trailing zeros) and grouped by
//! thousands with a space, e.g. `12 345.679`.
//!
//! | Function | Example input | Output |
//! |----------|---------------|--------|
//! | [`format_number`] | `1234.56789` | `1 234.568` |
//! | [`format_decimals`] | `(3.14159, 2)` | `3.14` |
//! | [`fixed`] | `(1.0, 2)` | `1.00` |
//! | [`plain`] | `2.5` | `2.5` |

/// Text shown in place of a value that is not a finite number
pub const INVALID_NUMBER_TEXT: &str = "Некорректное число";

/// Digit group separator for the display locale
pub const THOUSANDS_SEPARATOR: char = ' ';

/// Default number of decimals for result values
pub const DEFAULT_DECIMALS: u32 = 3;

/// Round to specified decimal places
pub fn round(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Format with the default three decimals
pub fn format_number(value: f64) -> String {
    format_decimals(value, DEFAULT_DECIMALS)
}

/// Round to `decimals`, drop trailing zeros and group thousands
pub fn format_decimals(value: f64, decimals: u32) -> String {
    if !value.is_finite() {
        return INVALID_NUMBER_TEXT.to_string();
    }
    let rounded = round(value, decimals);
    let text = shortest(rounded).unwrap_or_else(|| trim_fraction(&fixed(rounded, decimals)));
    group_thousands(&text)
}

/// Fixed number of decimals, no grouping (keeps trailing zeros)
pub fn fixed(value: f64, decimals: u32) -> String {
    format!("{:.*}", decimals as usize, value)
}

/// Shortest representation without rounding or grouping
///
/// Used where the entered value is echoed back verbatim (`Ток: 10 А`).
pub fn plain(value: f64) -> String {
    if !value.is_finite() {
        return INVALID_NUMBER_TEXT.to_string();
    }
    shortest(value).unwrap_or_else(|| trim_fraction(&format!("{}", value)))
}

/// Shortest round-trip text, or `None` when ryu picks exponent notation
fn shortest(value: f64) -> Option<String> {
    // -0.0 prints as "0"
    let value = if value == 0.0 { 0.0 } else { value };
    let mut buffer = ryu::Buffer::new();
    let text = buffer.format_finite(value);
    if text.contains('e') {
        return None;
    }
    Some(text.strip_suffix(".0").unwrap_or(text).to_string())
}

fn trim_fraction(text: &str) -> String {
    if !text.contains('.') {
        return text.to_string();
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Insert a separator between every group of three integer digits
fn group_thousands(text: &str) -> String {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(text.len() + integer.len() / 3);
    grouped.push_str(sign);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(THOUSANDS_SEPARATOR);
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

#[cfg(test)]
#[allow(clippy::approx_constant)]
mod tests {
    use super::*;

    #[test]
    fn test_round() {
        assert_eq!(round(3.14159, 2), 3.14);
        assert_eq!(round(3.14159, 0), 3.0);
        assert_eq!(round(2.0004, 3), 2.0);
    }

    #[test]
    fn test_format_number_trims_and_groups() {
        assert_eq!(format_number(220.0), "220");
        assert_eq!(format_number(1234.56789), "1 234.568");
        assert_eq!(format_number(1_000_000.0), "1 000 000");
        assert_eq!(format_number(0.1 + 0.2), "0.3");
        assert_eq!(format_number(-12345.5), "-12 345.5");
        assert_eq!(format_number(999.9999), "1 000");
    }

    #[test]
    fn test_format_negative_zero() {
        assert_eq!(format_number(-0.0001), "0");
    }

    #[test]
    fn test_format_decimals() {
        assert_eq!(format_decimals(3.181818, 2), "3.18");
        assert_eq!(format_decimals(7.0, 2), "7");
        assert_eq!(format_decimals(1234.0, 0), "1 234");
    }

    #[test]
    fn test_non_finite_text() {
        assert_eq!(format_number(f64::NAN), INVALID_NUMBER_TEXT);
        assert_eq!(format_number(f64::INFINITY), INVALID_NUMBER_TEXT);
        assert_eq!(plain(f64::NAN), INVALID_NUMBER_TEXT);
    }

    #[test]
    fn test_fixed_and_plain() {
        assert_eq!(fixed(1.0, 2), "1.00");
        assert_eq!(fixed(950.0, 1), "950.0");
        assert_eq!(plain(10.0), "10");
        assert_eq!(plain(2.5), "2.5");
        assert_eq!(plain(0.0175), "0.0175");
    }

    #[test]
    fn test_large_values_avoid_exponent() {
        assert_eq!(format_number(1e17), "100 000 000 000 000 000");
    }
}
