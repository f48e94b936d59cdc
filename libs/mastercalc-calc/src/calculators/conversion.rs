//! Unit converter front-ends over the unit table

use serde::Serialize;

use crate::error::{CalcError, Result};
use crate::format::format_number;
use crate::record::{Calculation, HistoryRecord};
use crate::units::{self, Quantity, Unit};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConversionOutput {
    pub kind: Quantity,
    pub from: Unit,
    pub to: Unit,
    pub value: f64,
    pub result: f64,
}

/// Convert and describe the conversion for display and history
pub fn convert_units(
    kind: Quantity,
    from: Unit,
    to: Unit,
    value: f64,
) -> Result<Calculation<ConversionOutput>> {
    let result = units::convert(kind, from, to, value)?;
    let (input, output) = (format_number(value), format_number(result));

    Ok(Calculation::new(
        ConversionOutput {
            kind,
            from,
            to,
            value,
            result,
        },
        format!("{} {} = {} {}", input, from.symbol(), output, to.symbol()),
        HistoryRecord::new(
            format!("Конвертация {}", kind.genitive()),
            format!("{} {} → {}", input, from.symbol(), to.symbol()),
            format!("{} {}", output, to.symbol()),
        ),
    ))
}

/// Voltage, current, resistance and power
pub fn convert_electrical(
    kind: Quantity,
    from: Unit,
    to: Unit,
    value: f64,
) -> Result<Calculation<ConversionOutput>> {
    if !kind.is_electrical() {
        return Err(CalcError::unsupported(kind, from, to));
    }
    convert_units(kind, from, to, value)
}

pub fn convert_pressure(from: Unit, to: Unit, value: f64) -> Result<Calculation<ConversionOutput>> {
    convert_units(Quantity::Pressure, from, to, value)
}

pub fn convert_temperature(
    from: Unit,
    to: Unit,
    value: f64,
) -> Result<Calculation<ConversionOutput>> {
    convert_units(Quantity::Temperature, from, to, value)
}

pub fn convert_flow(from: Unit, to: Unit, value: f64) -> Result<Calculation<ConversionOutput>> {
    convert_units(Quantity::Flow, from, to, value)
}

pub fn convert_length(from: Unit, to: Unit, value: f64) -> Result<Calculation<ConversionOutput>> {
    convert_units(Quantity::Length, from, to, value)
}

pub fn convert_volume(from: Unit, to: Unit, value: f64) -> Result<Calculation<ConversionOutput>> {
    convert_units(Quantity::Volume, from, to, value)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_temperature_record() {
        let calc = convert_temperature(Unit::Celsius, Unit::Fahrenheit, 100.0).unwrap();
        assert_eq!(calc.record.name, "Конвертация температуры");
        assert_eq!(calc.record.description, "100 °C → °F");
        assert_eq!(calc.record.result, "212 °F");
        assert_eq!(calc.display, "100 °C = 212 °F");
    }

    #[test]
    fn test_length_display_groups_thousands() {
        let calc = convert_length(Unit::Kilometer, Unit::Meter, 12.5).unwrap();
        assert_eq!(calc.record.result, "12 500 м");
    }

    #[test]
    fn test_electrical_kind_guard() {
        let err = convert_electrical(Quantity::Pressure, Unit::Bar, Unit::Atmosphere, 1.0)
            .unwrap_err();
        assert!(matches!(err, CalcError::UnsupportedConversion { .. }));

        let calc = convert_electrical(Quantity::Power, Unit::Kilowatt, Unit::Watt, 2.2).unwrap();
        assert_eq!(calc.record.result, "2 200 Ватт (Вт)");
        assert_eq!(calc.record.name, "Конвертация мощности");
    }

    #[test]
    fn test_wrong_unit_for_front_end() {
        assert!(convert_volume(Unit::Liter, Unit::Meter, 1.0).is_err());
    }
}
