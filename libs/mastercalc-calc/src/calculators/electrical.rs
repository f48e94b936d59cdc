//! Ohm's law, power and voltage divider

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CalcError, Result};
use crate::format::{fixed, format_number};
use crate::input::{require_finite, require_non_negative};
use crate::record::{Calculation, HistoryRecord, Lines};

/// Ohm's law input, one variant per unknown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "solve_for", rename_all = "snake_case")]
pub enum OhmInput {
    Voltage { current: f64, resistance: f64 },
    Current { voltage: f64, resistance: f64 },
    Resistance { voltage: f64, current: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OhmOutput {
    pub voltage: f64,
    pub current: f64,
    pub resistance: f64,
}

/// Solve U = I·R for the missing quantity
pub fn ohm(input: OhmInput) -> Result<Calculation<OhmOutput>> {
    match input {
        OhmInput::Voltage {
            current,
            resistance,
        } => {
            let current = require_non_negative("current", current)?;
            let resistance = require_non_negative("resistance", resistance)?;
            let voltage = current * resistance;
            let (u, i, r) = (
                format_number(voltage),
                format_number(current),
                format_number(resistance),
            );
            Ok(Calculation::new(
                OhmOutput {
                    voltage,
                    current,
                    resistance,
                },
                Lines::new()
                    .line(format!("Напряжение: {} В", u))
                    .line(format!("I = {} А, R = {} Ом", i, r))
                    .build(),
                HistoryRecord::new(
                    "Закон Ома (U)",
                    format!("Ток: {} А, Сопротивление: {} Ом", i, r),
                    format!("U = {} В", u),
                ),
            ))
        },
        OhmInput::Current {
            voltage,
            resistance,
        } => {
            let voltage = require_non_negative("voltage", voltage)?;
            let resistance = require_non_negative("resistance", resistance)?;
            if resistance == 0.0 {
                return Err(CalcError::division_by_zero("resistance"));
            }
            let current = voltage / resistance;
            let (u, i, r) = (
                format_number(voltage),
                format_number(current),
                format_number(resistance),
            );
            Ok(Calculation::new(
                OhmOutput {
                    voltage,
                    current,
                    resistance,
                },
                Lines::new()
                    .line(format!("Ток: {} А", i))
                    .line(format!("U = {} В, R = {} Ом", u, r))
                    .build(),
                HistoryRecord::new(
                    "Закон Ома (I)",
                    format!("Напряжение: {} В, Сопротивление: {} Ом", u, r),
                    format!("I = {} А", i),
                ),
            ))
        },
        OhmInput::Resistance { voltage, current } => {
            let voltage = require_non_negative("voltage", voltage)?;
            let current = require_non_negative("current", current)?;
            if current == 0.0 {
                return Err(CalcError::division_by_zero("current"));
            }
            let resistance = voltage / current;
            let (u, i, r) = (
                format_number(voltage),
                format_number(current),
                format_number(resistance),
            );
            Ok(Calculation::new(
                OhmOutput {
                    voltage,
                    current,
                    resistance,
                },
                Lines::new()
                    .line(format!("Сопротивление: {} Ом", r))
                    .line(format!("U = {} В, I = {} А", u, i))
                    .build(),
                HistoryRecord::new(
                    "Закон Ома (R)",
                    format!("Напряжение: {} В, Ток: {} А", u, i),
                    format!("R = {} Ом", r),
                ),
            ))
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerOutput {
    pub watts: f64,
    pub kilowatts: f64,
}

/// P = U·I
pub fn power(voltage: f64, current: f64) -> Result<Calculation<PowerOutput>> {
    let voltage = require_non_negative("voltage", voltage)?;
    let current = require_non_negative("current", current)?;
    let watts = voltage * current;
    let kilowatts = watts / 1000.0;

    let (u, i) = (format_number(voltage), format_number(current));
    let (p, kw) = (format_number(watts), format_number(kilowatts));
    Ok(Calculation::new(
        PowerOutput { watts, kilowatts },
        Lines::new()
            .line(format!("Мощность: {} Вт ({} кВт)", p, kw))
            .line(format!("U = {} В, I = {} А", u, i))
            .build(),
        HistoryRecord::new(
            "Мощность P=UI",
            format!("Напряжение: {} В, Ток: {} А", u, i),
            format!("P = {} Вт ({} кВт)", p, kw),
        ),
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DividerInput {
    pub input_voltage: f64,
    pub r1: f64,
    pub r2: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DividerOutput {
    pub output_voltage: f64,
    pub current: f64,
    pub power_r1: f64,
    pub power_r2: f64,
    /// R2 / (R1 + R2)
    pub ratio: f64,
}

/// Unloaded resistive divider
pub fn divider(input: DividerInput) -> Result<Calculation<DividerOutput>> {
    let uin = require_finite("input_voltage", input.input_voltage)?;
    let r1 = require_finite("r1", input.r1)?;
    let r2 = require_finite("r2", input.r2)?;
    if r1 <= 0.0 {
        return Err(CalcError::degenerate("r1", "resistance must be greater than zero"));
    }
    if r2 <= 0.0 {
        return Err(CalcError::degenerate("r2", "resistance must be greater than zero"));
    }

    let total = r1 + r2;
    let ratio = r2 / total;
    let output_voltage = uin * ratio;
    let current = uin / total;
    let power_r1 = current * current * r1;
    let power_r2 = current * current * r2;
    debug!(uin, r1, r2, output_voltage, "divider computed");

    let uout = format_number(output_voltage);
    Ok(Calculation::new(
        DividerOutput {
            output_voltage,
            current,
            power_r1,
            power_r2,
            ratio,
        },
        Lines::new()
            .line(format!("Выходное напряжение: {} В", uout))
            .line(format!("Ток через делитель: {} А", format_number(current)))
            .line(format!("Мощность на R1: {} Вт", format_number(power_r1)))
            .line(format!("Мощность на R2: {} Вт", format_number(power_r2)))
            .line(format!("Коэффициент деления: {}", fixed(ratio, 3)))
            .build(),
        HistoryRecord::new(
            "Делитель напряжения",
            format!(
                "Uвх: {} В, R1: {} Ом, R2: {} Ом",
                format_number(uin),
                format_number(r1),
                format_number(r2)
            ),
            format!("Uвых = {} В", uout),
        ),
    ))
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_ohm_voltage_mode() {
        let calc = ohm(OhmInput::Voltage {
            current: 5.0,
            resistance: 44.0,
        })
        .unwrap();
        assert_eq!(calc.value.voltage, 220.0);
        assert_eq!(calc.record.name, "Закон Ома (U)");
        assert_eq!(calc.record.result, "U = 220 В");
        assert_eq!(calc.record.description, "Ток: 5 А, Сопротивление: 44 Ом");
        assert!(calc.display.starts_with("Напряжение: 220 В"));
    }

    #[test]
    fn test_ohm_current_mode() {
        let calc = ohm(OhmInput::Current {
            voltage: 220.0,
            resistance: 44.0,
        })
        .unwrap();
        assert_eq!(calc.value.current, 5.0);
        assert_eq!(calc.record.result, "I = 5 А");
    }

    #[test]
    fn test_ohm_zero_denominators() {
        let err = ohm(OhmInput::Current {
            voltage: 220.0,
            resistance: 0.0,
        })
        .unwrap_err();
        assert_eq!(err, CalcError::division_by_zero("resistance"));

        let err = ohm(OhmInput::Resistance {
            voltage: 220.0,
            current: 0.0,
        })
        .unwrap_err();
        assert_eq!(err, CalcError::division_by_zero("current"));
    }

    #[test]
    fn test_ohm_voltage_mode_allows_zero() {
        let calc = ohm(OhmInput::Voltage {
            current: 0.0,
            resistance: 10.0,
        })
        .unwrap();
        assert_eq!(calc.record.result, "U = 0 В");
    }

    #[test]
    fn test_ohm_input_serde_tag() {
        let input: OhmInput =
            serde_json::from_str(r#"{"solve_for":"resistance","voltage":12,"current":0.5}"#)
                .unwrap();
        assert_eq!(
            input,
            OhmInput::Resistance {
                voltage: 12.0,
                current: 0.5
            }
        );
    }

    #[test]
    fn test_power() {
        let calc = power(220.0, 5.0).unwrap();
        assert_eq!(calc.value.watts, 1100.0);
        assert_eq!(calc.record.result, "P = 1 100 Вт (1.1 кВт)");
        assert!(power(-1.0, 5.0).is_err());
    }

    #[test]
    fn test_divider() {
        let calc = divider(DividerInput {
            input_voltage: 12.0,
            r1: 1000.0,
            r2: 1000.0,
        })
        .unwrap();
        assert_eq!(calc.value.output_voltage, 6.0);
        assert_eq!(calc.value.ratio, 0.5);
        assert_eq!(calc.record.result, "Uвых = 6 В");
        assert!(calc.display.contains("Коэффициент деления: 0.500"));
        let balance = calc.value.power_r1 + calc.value.power_r2 - 12.0 * calc.value.current;
        assert!(balance.abs() < 1e-12);
    }

    #[test]
    fn test_divider_degenerate_resistances() {
        let err = divider(DividerInput {
            input_voltage: 12.0,
            r1: 0.0,
            r2: 100.0,
        })
        .unwrap_err();
        assert!(matches!(err, CalcError::DegenerateInput { ref field, .. } if field == "r1"));

        let err = divider(DividerInput {
            input_voltage: 12.0,
            r1: 100.0,
            r2: -5.0,
        })
        .unwrap_err();
        assert_eq!(err.field(), Some("r2"));
    }
}
