//! Voltage drop, cable section selection and cable ampacity

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CalcError, Result};
use crate::format::{format_decimals, format_number, plain};
use crate::input::{require_non_negative, require_positive};
use crate::record::{Calculation, HistoryRecord, Lines};
use crate::tables::{
    cable_rating, cable_temperature_factor, conductor_count_factor, Installation, Material,
    AMPACITY_MAX_SECTION, CABLE_TABLE,
};

/// Nominal voltage of a single-phase line
pub const SINGLE_PHASE_VOLTAGE: f64 = 220.0;

/// Line-to-line voltage of a three-phase line
pub const THREE_PHASE_VOLTAGE: f64 = 380.0;

// ============================================================================
// Voltage drop
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropInput {
    /// A
    pub current: f64,
    /// One-way line length, m
    pub length: f64,
    /// mm²
    pub section: f64,
    pub material: Material,
    /// V
    pub voltage: f64,
}

/// Voltage drop band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropSeverity {
    /// ≤ 3 %
    Nominal,
    /// (3, 5] %
    Warning,
    /// > 5 %
    Violation,
}

impl DropSeverity {
    pub fn from_percent(percent: f64) -> Self {
        if percent > 5.0 {
            Self::Violation
        } else if percent > 3.0 {
            Self::Warning
        } else {
            Self::Nominal
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Nominal => "✅ В пределах нормы",
            Self::Warning => "⚠️ На грани допустимого (3-5%)",
            Self::Violation => "⚠️ Превышено допустимое значение (5%)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DropOutput {
    /// V
    pub drop: f64,
    pub percent: f64,
    pub severity: DropSeverity,
    pub single_phase: bool,
}

/// ΔU over a copper or aluminum line
///
/// A 220 V line uses the single-phase loop formula, any other voltage the
/// three-phase one.
pub fn voltage_drop(input: DropInput) -> Result<Calculation<DropOutput>> {
    let current = require_non_negative("current", input.current)?;
    let length = require_positive("length", input.length)?;
    let section = require_positive("section", input.section)?;
    let voltage = require_positive("voltage", input.voltage)?;
    let rho = input.material.resistivity();

    let single_phase = voltage == SINGLE_PHASE_VOLTAGE;
    let (drop, formula) = if single_phase {
        (2.0 * length * current * rho / section, "ΔU = (2 × L × I × ρ) / S")
    } else {
        (3f64.sqrt() * length * current * rho / section, "ΔU = (√3 × L × I × ρ) / S")
    };
    let percent = drop / voltage * 100.0;
    let severity = DropSeverity::from_percent(percent);
    debug!(drop, percent, ?severity, "voltage drop computed");

    let summary = format!(
        "{} В ({}%)",
        format_number(drop),
        format_decimals(percent, 2)
    );
    Ok(Calculation::new(
        DropOutput {
            drop,
            percent,
            severity,
            single_phase,
        },
        Lines::new()
            .line(format!("Падение напряжения: {}", summary))
            .line(format!("Формула: {}", formula))
            .line(format!(
                "Ток: {} А, Длина: {} м, Сечение: {} мм²",
                plain(current),
                plain(length),
                plain(section)
            ))
            .line(format!(
                "Материал: {}, Напряжение: {} В",
                input.material.name(),
                plain(voltage)
            ))
            .line(severity.message())
            .build(),
        HistoryRecord::new(
            "Падение напряжения",
            format!(
                "Ток: {} А, Длина: {} м, Сечение: {} мм², {} В",
                plain(current),
                plain(length),
                plain(section),
                plain(voltage)
            ),
            format!("ΔU = {}", summary),
        ),
    ))
}

// ============================================================================
// Cable section
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionInput {
    /// Load current, A
    pub current: f64,
    pub material: Material,
    pub installation: Installation,
    /// Loaded conductors in the run
    pub conductors: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectionOutput {
    /// mm²
    pub section: f64,
    /// Derated ampacity of the chosen section, A
    pub allowed_current: f64,
    /// False when even the largest section is not enough
    pub sufficient: bool,
}

/// Smallest tabulated section whose derated ampacity covers the load
pub fn cable_section(input: SectionInput) -> Result<Calculation<SectionOutput>> {
    let current = require_non_negative("current", input.current)?;
    let derating = input.installation.factor() * conductor_count_factor(input.conductors);

    let chosen = CABLE_TABLE
        .iter()
        .find(|row| row.ampacity(input.material) * derating >= current)
        .or(CABLE_TABLE.last())
        .ok_or_else(|| CalcError::invalid_input("section", "cable table is empty"))?;
    let allowed_current = chosen.ampacity(input.material) * derating;
    let sufficient = allowed_current >= current;

    let section = plain(chosen.section);
    let allowed = format_number(allowed_current);
    Ok(Calculation::new(
        SectionOutput {
            section: chosen.section,
            allowed_current,
            sufficient,
        },
        Lines::new()
            .line(format!("Рекомендуемое сечение: {} мм²", section))
            .line(format!("Материал: {}", input.material.name()))
            .line(format!("Прокладка: {}", input.installation.name()))
            .line(format!("Количество проводников: {}", input.conductors))
            .line(format!("Допустимый ток: {} А", allowed))
            .line(format!("Требуемый ток: {} А", plain(current)))
            .line(if sufficient {
                "✅ Сечение подходит"
            } else {
                "⚠️ Увеличьте сечение или измените условия прокладки"
            })
            .build(),
        HistoryRecord::new(
            "Подбор сечения кабеля",
            format!(
                "Ток: {} А, Материал: {}, Прокладка: {}",
                plain(current),
                input.material.name(),
                input.installation.name()
            ),
            format!("{} мм² ({} А)", section, allowed),
        ),
    ))
}

// ============================================================================
// Cable ampacity
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CableCurrentInput {
    /// Tabulated section up to 25 mm²
    pub section: f64,
    pub material: Material,
    /// Ambient temperature, °C
    pub temperature: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CableCurrentOutput {
    /// A
    pub allowed_current: f64,
    /// Single-phase power at 220 V, kW
    pub power_single_phase: f64,
    /// Three-phase power at 380 V, kW
    pub power_three_phase: f64,
}

/// Allowed continuous current of a section at the given ambient temperature
pub fn cable_current(input: CableCurrentInput) -> Result<Calculation<CableCurrentOutput>> {
    let rating = cable_rating(input.section)
        .filter(|row| row.section <= AMPACITY_MAX_SECTION)
        .ok_or_else(|| {
            CalcError::invalid_input(
                "section",
                format!("no ampacity data for {} mm²", plain(input.section)),
            )
        })?;

    let allowed_current =
        rating.ampacity(input.material) * cable_temperature_factor(input.temperature);
    let power_single_phase = allowed_current * SINGLE_PHASE_VOLTAGE / 1000.0;
    let power_three_phase = allowed_current * THREE_PHASE_VOLTAGE * 3f64.sqrt() / 1000.0;

    let section = plain(rating.section);
    let allowed = format_number(allowed_current);
    Ok(Calculation::new(
        CableCurrentOutput {
            allowed_current,
            power_single_phase,
            power_three_phase,
        },
        Lines::new()
            .line(format!("Допустимый ток: {} А", allowed))
            .line(format!(
                "Сечение: {} мм², Материал: {}",
                section,
                input.material.name()
            ))
            .line(format!("Температура: {}°C", input.temperature))
            .line(format!(
                "Мощность при 220В: {} кВт",
                format_number(power_single_phase)
            ))
            .line(format!(
                "Мощность при 380В: {} кВт",
                format_number(power_three_phase)
            ))
            .build(),
        HistoryRecord::new(
            "Допустимый ток кабеля",
            format!(
                "Сечение: {} мм², Материал: {}, Температура: {}°C",
                section,
                input.material.name(),
                input.temperature
            ),
            format!("{} А", allowed),
        ),
    ))
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    fn copper_drop(voltage: f64) -> DropInput {
        DropInput {
            current: 10.0,
            length: 50.0,
            section: 2.5,
            material: Material::Copper,
            voltage,
        }
    }

    #[test]
    fn test_single_phase_drop() {
        let calc = voltage_drop(copper_drop(220.0)).unwrap();
        assert!((calc.value.drop - 7.0).abs() < 1e-9);
        assert_eq!(calc.value.severity, DropSeverity::Warning);
        assert!(calc.value.single_phase);
        assert_eq!(calc.record.result, "ΔU = 7 В (3.18%)");
        assert_eq!(
            calc.record.description,
            "Ток: 10 А, Длина: 50 м, Сечение: 2.5 мм², 220 В"
        );
    }

    #[test]
    fn test_three_phase_drop() {
        let calc = voltage_drop(copper_drop(380.0)).unwrap();
        assert!(!calc.value.single_phase);
        assert!((calc.value.drop - 3f64.sqrt() * 3.5).abs() < 1e-9);
        assert_eq!(calc.value.severity, DropSeverity::Nominal);
    }

    #[test]
    fn test_drop_rejects_zero_section() {
        let mut input = copper_drop(220.0);
        input.section = 0.0;
        assert_eq!(voltage_drop(input).unwrap_err().field(), Some("section"));
    }

    #[test]
    fn test_severity_bands() {
        assert_eq!(DropSeverity::from_percent(3.0), DropSeverity::Nominal);
        assert_eq!(DropSeverity::from_percent(5.0), DropSeverity::Warning);
        assert_eq!(DropSeverity::from_percent(5.01), DropSeverity::Violation);
    }

    #[test]
    fn test_section_boundary_is_inclusive() {
        let calc = cable_section(SectionInput {
            current: 27.0,
            material: Material::Copper,
            installation: Installation::Open,
            conductors: 2,
        })
        .unwrap();
        assert_eq!(calc.value.section, 2.5);
        assert!(calc.value.sufficient);
        assert_eq!(calc.record.result, "2.5 мм² (27 А)");
    }

    #[test]
    fn test_section_with_derating() {
        // 27 × 0.8 × 0.7 = 15.12 < 16, 38 × 0.56 = 21.28
        let calc = cable_section(SectionInput {
            current: 16.0,
            material: Material::Copper,
            installation: Installation::Tube,
            conductors: 3,
        })
        .unwrap();
        assert_eq!(calc.value.section, 4.0);
    }

    #[test]
    fn test_section_insufficient() {
        let calc = cable_section(SectionInput {
            current: 500.0,
            material: Material::Aluminum,
            installation: Installation::Open,
            conductors: 1,
        })
        .unwrap();
        assert_eq!(calc.value.section, 50.0);
        assert!(!calc.value.sufficient);
        assert!(calc.display.ends_with("измените условия прокладки"));
    }

    #[test]
    fn test_cable_current() {
        let calc = cable_current(CableCurrentInput {
            section: 2.5,
            material: Material::Copper,
            temperature: 40,
        })
        .unwrap();
        assert!((calc.value.allowed_current - 24.57).abs() < 1e-9);
        assert_eq!(calc.record.result, "24.57 А");
    }

    #[test]
    fn test_cable_current_unknown_section() {
        for section in [3.0, 35.0] {
            let err = cable_current(CableCurrentInput {
                section,
                material: Material::Copper,
                temperature: 25,
            })
            .unwrap_err();
            assert_eq!(err.field(), Some("section"));
        }
    }
}
