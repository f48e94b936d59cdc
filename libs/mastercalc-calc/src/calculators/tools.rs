//! Breaker, busbar, resistor, UPS and grounding calculators

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

use crate::error::{CalcError, Result};
use crate::format::{fixed, format_decimals, format_number, plain};
use crate::input::{require_non_negative, require_percent, require_positive};
use crate::record::{Calculation, HistoryRecord, Lines};
use crate::tables::{
    breaker_temperature_factor, busbar_temperature_factor, is_multiplier, is_tolerance, BandColor,
    BusbarPosition, ElectrodeShape, LoadType, Material, Soil, TripCurve, BREAKER_RATINGS,
    BUSBAR_TABLE,
};

use super::cabling::{SINGLE_PHASE_VOLTAGE, THREE_PHASE_VOLTAGE};

// ============================================================================
// Circuit breaker
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakerInput {
    /// Load current, A
    pub current: f64,
    pub load: LoadType,
    pub curve: TripCurve,
    /// Ambient temperature, °C
    pub temperature: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BreakerOutput {
    /// Load current corrected for load type and temperature, A
    pub design_current: f64,
    /// Selected standard rating, A
    pub rating: u32,
    pub curve: TripCurve,
    /// False when the design current exceeds the largest standard rating
    pub sufficient: bool,
    /// kW
    pub power_single_phase: f64,
    /// kW
    pub power_three_phase: f64,
}

/// Smallest standard rating covering the design current
///
/// Above the largest rating the largest one is reported and flagged as
/// insufficient.
pub fn breaker(input: BreakerInput) -> Result<Calculation<BreakerOutput>> {
    let current = require_non_negative("current", input.current)?;
    let design_current =
        current * input.load.factor() * breaker_temperature_factor(input.temperature);

    let (rating, sufficient) = match BREAKER_RATINGS
        .iter()
        .find(|&&rating| f64::from(rating) >= design_current)
    {
        Some(&rating) => (rating, true),
        None => (BREAKER_RATINGS[BREAKER_RATINGS.len() - 1], false),
    };
    debug!(design_current, rating, sufficient, "breaker selected");

    let rated = f64::from(rating);
    let power_single_phase = rated * SINGLE_PHASE_VOLTAGE / 1000.0;
    let power_three_phase = rated * THREE_PHASE_VOLTAGE * 3f64.sqrt() / 1000.0;

    let selection = format!("{}А {}", rating, input.curve.code());
    Ok(Calculation::new(
        BreakerOutput {
            design_current,
            rating,
            curve: input.curve,
            sufficient,
            power_single_phase,
            power_three_phase,
        },
        Lines::new()
            .line(format!("Рекомендуемый автомат: {}", selection))
            .line(format!(
                "Расчетный ток: {} А",
                format_decimals(design_current, 1)
            ))
            .line(format!("Тип нагрузки: {}", input.load.name()))
            .line(format!("Характеристика: {}", input.curve.description()))
            .line(format!("Температура: {}°C", input.temperature))
            .line(format!(
                "Мощность (220В): {} кВт",
                format_decimals(power_single_phase, 1)
            ))
            .line(format!(
                "Мощность (380В): {} кВт",
                format_decimals(power_three_phase, 1)
            ))
            .line_if(
                !sufficient,
                format!(
                    "⚠️ Расчетный ток превышает максимальный номинал {}А",
                    rating
                ),
            )
            .build(),
        HistoryRecord::new(
            "Подбор автомата",
            format!(
                "Ток: {} А, Тип: {}, Характеристика: {}",
                plain(current),
                input.load.name(),
                input.curve.code()
            ),
            selection,
        ),
    ))
}

// ============================================================================
// Busbar
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BusbarInput {
    /// Load current, A
    pub current: f64,
    pub material: Material,
    pub position: BusbarPosition,
    /// Bars per phase
    pub count: u32,
    /// Ambient temperature, °C
    pub temperature: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusbarOutput {
    /// Width x thickness, mm
    pub size: String,
    /// mm²
    pub area: u32,
    /// Table rating of one bar, A
    pub per_bar_current: f64,
    /// Derated rating of all bars in the phase, A
    pub allowed_current: f64,
    pub sufficient: bool,
}

/// Smallest busbar size whose derated total covers the load
pub fn busbar(input: BusbarInput) -> Result<Calculation<BusbarOutput>> {
    let current = require_non_negative("current", input.current)?;
    if input.count == 0 {
        return Err(CalcError::invalid_input("count", "at least one bar per phase"));
    }
    let derating = input.position.factor()
        * busbar_temperature_factor(input.temperature)
        * f64::from(input.count);

    let chosen = BUSBAR_TABLE
        .iter()
        .find(|row| row.ampacity(input.material) * derating >= current)
        .or(BUSBAR_TABLE.last())
        .ok_or_else(|| CalcError::invalid_input("size", "busbar table is empty"))?;
    let per_bar_current = chosen.ampacity(input.material);
    let allowed_current = per_bar_current * derating;
    let sufficient = allowed_current >= current;

    Ok(Calculation::new(
        BusbarOutput {
            size: chosen.size.to_string(),
            area: chosen.area,
            per_bar_current,
            allowed_current,
            sufficient,
        },
        Lines::new()
            .line(format!("Рекомендуемая шина: {} мм", chosen.size))
            .line(format!("Площадь сечения: {} мм²", chosen.area))
            .line(format!("Материал: {}", input.material.name()))
            .line(format!("Расположение: {}", input.position.name()))
            .line(format!("Количество в фазе: {} шт.", input.count))
            .line(format!("Температура: {}°C", input.temperature))
            .line(format!(
                "Допустимый ток на шину: {} А",
                format_number(per_bar_current)
            ))
            .line(format!(
                "Общий допустимый ток: {} А",
                format_number(allowed_current)
            ))
            .line(format!("Требуемый ток: {} А", plain(current)))
            .line(if sufficient {
                "✅ Шина подходит"
            } else {
                "⚠️ Увеличьте количество шин или выберите большее сечение"
            })
            .build(),
        HistoryRecord::new(
            "Подбор шины",
            format!(
                "Ток: {} А, Материал: {}, Шин в фазе: {}",
                plain(current),
                input.material.name(),
                input.count
            ),
            format!("Шина {} мм ({} мм²)", chosen.size, chosen.area),
        ),
    ))
}

// ============================================================================
// Resistor color code
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResistorInput {
    pub first: u8,
    pub second: u8,
    pub multiplier: f64,
    /// %
    pub tolerance: f64,
}

impl ResistorInput {
    /// Build from four band colors
    pub fn from_colors(
        first: BandColor,
        second: BandColor,
        multiplier: BandColor,
        tolerance: BandColor,
    ) -> Result<Self> {
        Ok(Self {
            first: first
                .digit()
                .ok_or_else(|| CalcError::invalid_input("first", "not a digit band color"))?,
            second: second
                .digit()
                .ok_or_else(|| CalcError::invalid_input("second", "not a digit band color"))?,
            multiplier: multiplier.multiplier().ok_or_else(|| {
                CalcError::invalid_input("multiplier", "not a multiplier band color")
            })?,
            tolerance: tolerance.tolerance().ok_or_else(|| {
                CalcError::invalid_input("tolerance", "not a tolerance band color")
            })?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResistorOutput {
    /// Ω
    pub resistance: f64,
    pub min: f64,
    pub max: f64,
    /// Auto-scaled nominal (`4.70 кОм`)
    pub nominal: String,
}

/// Nominal with МОм / кОм / Ом scaling
pub fn scale_resistance(ohms: f64) -> String {
    if ohms >= 1_000_000.0 {
        format!("{} МОм", fixed(ohms / 1_000_000.0, 2))
    } else if ohms >= 1000.0 {
        format!("{} кОм", fixed(ohms / 1000.0, 2))
    } else {
        format!("{} Ом", fixed(ohms, 0))
    }
}

/// Decode a four-band resistor
pub fn resistor(input: ResistorInput) -> Result<Calculation<ResistorOutput>> {
    if input.first > 9 {
        return Err(CalcError::invalid_input("first", "digit must be 0-9"));
    }
    if input.second > 9 {
        return Err(CalcError::invalid_input("second", "digit must be 0-9"));
    }
    if !is_multiplier(input.multiplier) {
        return Err(CalcError::invalid_input(
            "multiplier",
            format!("{} is not a color code multiplier", plain(input.multiplier)),
        ));
    }
    if !is_tolerance(input.tolerance) {
        return Err(CalcError::invalid_input(
            "tolerance",
            format!("{}% is not a color code tolerance", plain(input.tolerance)),
        ));
    }

    let digits = f64::from(input.first) * 10.0 + f64::from(input.second);
    let resistance = digits * input.multiplier;
    let min = resistance * (1.0 - input.tolerance / 100.0);
    let max = resistance * (1.0 + input.tolerance / 100.0);
    let nominal = scale_resistance(resistance);
    let code = format!(
        "{}-{}-×{}±{}%",
        input.first,
        input.second,
        plain(input.multiplier),
        plain(input.tolerance)
    );

    Ok(Calculation::new(
        ResistorOutput {
            resistance,
            min,
            max,
            nominal: nominal.clone(),
        },
        Lines::new()
            .line(format!("Номинал резистора: {}", nominal))
            .line(format!("Точность: ±{}%", plain(input.tolerance)))
            .line(format!("Диапазон: {}...{} Ом", fixed(min, 1), fixed(max, 1)))
            .line(format!("Цветовой код: {}", code))
            .build(),
        HistoryRecord::new("Цветовой код резистора", format!("Код: {}", code), nominal),
    ))
}

// ============================================================================
// UPS autonomy
// ============================================================================

/// Autonomy below this is flagged, h
pub const LOW_AUTONOMY_HOURS: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpsInput {
    /// Load, W
    pub load: f64,
    /// Battery bank voltage, V
    pub battery_voltage: f64,
    /// Capacity of one battery, A·h
    pub capacity: f64,
    pub battery_count: u32,
    /// Inverter efficiency, %
    pub efficiency: f64,
    /// Allowed depth of discharge, %
    pub depth_of_discharge: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UpsOutput {
    pub hours: f64,
    pub minutes: u64,
    /// Battery discharge current, A
    pub discharge_current: f64,
    /// A·h
    pub total_capacity: f64,
    /// A·h
    pub used_capacity: f64,
    pub low_autonomy: bool,
}

/// Battery autonomy time
pub fn ups(input: UpsInput) -> Result<Calculation<UpsOutput>> {
    let load = require_positive("load", input.load)?;
    let voltage = require_positive("battery_voltage", input.battery_voltage)?;
    let capacity = require_positive("capacity", input.capacity)?;
    if input.battery_count == 0 {
        return Err(CalcError::invalid_input("battery_count", "at least one battery"));
    }
    let eta = require_percent("efficiency", input.efficiency)?;
    let dod = require_percent("depth_of_discharge", input.depth_of_discharge)?;

    let total_capacity = capacity * f64::from(input.battery_count);
    let discharge_current = load / voltage / eta;
    let hours = total_capacity * voltage * dod / load;
    let minutes = (hours * 60.0).round() as u64;
    let used_capacity = total_capacity * dod;
    let low_autonomy = hours < LOW_AUTONOMY_HOURS;

    let time = format_decimals(hours, 1);
    Ok(Calculation::new(
        UpsOutput {
            hours,
            minutes,
            discharge_current,
            total_capacity,
            used_capacity,
            low_autonomy,
        },
        Lines::new()
            .line(format!("Время автономии: {} ч ({} мин)", time, minutes))
            .line(format!(
                "Ток разряда: {} А",
                format_decimals(discharge_current, 1)
            ))
            .line(format!("Мощность нагрузки: {} Вт", plain(load)))
            .line(format!(
                "АКБ: {} А·ч при {} В ({} шт.)",
                plain(total_capacity),
                plain(voltage),
                input.battery_count
            ))
            .line(format!(
                "КПД ИБП: {}%, Глубина разряда: {}%",
                plain(input.efficiency),
                plain(input.depth_of_discharge)
            ))
            .line(format!(
                "Использовано емкости: {} А·ч",
                format_decimals(used_capacity, 1)
            ))
            .line_if(low_autonomy, "⚠️ Малое время автономии!")
            .build(),
        HistoryRecord::new(
            "Расчет ИБП",
            format!(
                "Нагрузка: {} Вт, АКБ: {} А·ч {} В, КПД: {}%",
                plain(load),
                plain(total_capacity),
                plain(voltage),
                plain(input.efficiency)
            ),
            format!("{} ч автономии", time),
        ),
    ))
}

// ============================================================================
// Grounding
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundingInput {
    /// Electrode length, m
    pub length: f64,
    /// Electrode diameter, mm
    pub diameter_mm: f64,
    /// Burial depth, m (reported only)
    pub depth: Option<f64>,
    pub soil: Soil,
    pub shape: ElectrodeShape,
}

/// Grounding resistance band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundingBand {
    /// > 30 Ω
    AboveResidential,
    /// (10, 30] Ω
    AboveIndustrial,
    /// (4, 10] Ω
    Acceptable,
    /// ≤ 4 Ω
    Excellent,
}

impl GroundingBand {
    pub fn from_resistance(ohms: f64) -> Self {
        if ohms > 30.0 {
            Self::AboveResidential
        } else if ohms > 10.0 {
            Self::AboveIndustrial
        } else if ohms > 4.0 {
            Self::Acceptable
        } else {
            Self::Excellent
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::AboveResidential => "⚠️ Превышена норма для жилых домов (30 Ом)",
            Self::AboveIndustrial => "⚠️ Превышена норма для промпредприятий (10 Ом)",
            Self::Acceptable => "⚠️ Соответствует большинству норм",
            Self::Excellent => "✅ Отличное сопротивление заземления",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroundingOutput {
    /// Ω
    pub resistance: f64,
    pub band: GroundingBand,
}

/// Single vertical electrode: R = ρ/(2πL) · ln(4L/d) · k
pub fn grounding(input: GroundingInput) -> Result<Calculation<GroundingOutput>> {
    let length = require_positive("length", input.length)?;
    let diameter_mm = require_positive("diameter", input.diameter_mm)?;
    let depth = match input.depth {
        Some(depth) => Some(require_non_negative("depth", depth)?),
        None => None,
    };
    let ratio = 4.0 * length / (diameter_mm / 1000.0);
    if ratio <= 1.0 {
        return Err(CalcError::degenerate(
            "diameter",
            "electrode diameter is too large for its length",
        ));
    }

    let rho = f64::from(input.soil.resistivity());
    let resistance = rho / (2.0 * PI * length) * ratio.ln() * input.shape.factor();
    let band = GroundingBand::from_resistance(resistance);
    debug!(resistance, ?band, "grounding computed");

    let ohms = format!("{} Ом", format_decimals(resistance, 2));
    Ok(Calculation::new(
        GroundingOutput { resistance, band },
        Lines::new()
            .line(format!("Сопротивление заземлителя: {}", ohms))
            .line(format!("Тип: {}", input.shape.name()))
            .line(format!(
                "Длина: {} м, Диаметр: {} мм",
                plain(length),
                plain(diameter_mm)
            ))
            .line(match depth {
                Some(depth) => format!("Глубина заложения: {} м", plain(depth)),
                None => "Глубина заложения: не указана".to_string(),
            })
            .line(format!(
                "Уд. сопротивление грунта: {} Ом·м ({})",
                input.soil.resistivity(),
                input.soil.name()
            ))
            .line(band.message())
            .build(),
        HistoryRecord::new(
            "Расчет заземления",
            format!(
                "{}, Длина: {} м, Диаметр: {} мм, Грунт: {}",
                input.shape.name(),
                plain(length),
                plain(diameter_mm),
                input.soil.name()
            ),
            ohms,
        ),
    ))
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    fn breaker_input(current: f64) -> BreakerInput {
        BreakerInput {
            current,
            load: LoadType::Resistive,
            curve: TripCurve::C,
            temperature: 25,
        }
    }

    #[test]
    fn test_breaker_exact_rating() {
        let calc = breaker(breaker_input(16.0)).unwrap();
        assert_eq!(calc.value.rating, 16);
        assert!(calc.value.sufficient);
        assert_eq!(calc.record.result, "16А C");
    }

    #[test]
    fn test_breaker_inductive_load() {
        let mut input = breaker_input(14.0);
        input.load = LoadType::Inductive;
        let calc = breaker(input).unwrap();
        assert_eq!(calc.value.design_current, 17.5);
        assert_eq!(calc.value.rating, 20);
    }

    #[test]
    fn test_breaker_above_largest_rating() {
        let calc = breaker(breaker_input(80.0)).unwrap();
        assert_eq!(calc.value.rating, 63);
        assert!(!calc.value.sufficient);
        assert!(calc.display.contains("превышает максимальный номинал 63А"));
    }

    #[test]
    fn test_busbar_selection() {
        let calc = busbar(BusbarInput {
            current: 400.0,
            material: Material::Copper,
            position: BusbarPosition::Vertical,
            count: 1,
            temperature: 25,
        })
        .unwrap();
        assert_eq!(calc.value.size, "30x4");
        assert_eq!(calc.record.result, "Шина 30x4 мм (120 мм²)");

        let calc = busbar(BusbarInput {
            current: 400.0,
            material: Material::Copper,
            position: BusbarPosition::Vertical,
            count: 2,
            temperature: 25,
        })
        .unwrap();
        assert_eq!(calc.value.size, "15x3");
        assert_eq!(calc.value.allowed_current, 420.0);
    }

    #[test]
    fn test_busbar_insufficient_and_zero_count() {
        let calc = busbar(BusbarInput {
            current: 5000.0,
            material: Material::Aluminum,
            position: BusbarPosition::Horizontal,
            count: 1,
            temperature: 45,
        })
        .unwrap();
        assert_eq!(calc.value.size, "80x8");
        assert!(!calc.value.sufficient);

        let err = busbar(BusbarInput {
            current: 100.0,
            material: Material::Copper,
            position: BusbarPosition::Vertical,
            count: 0,
            temperature: 25,
        })
        .unwrap_err();
        assert_eq!(err.field(), Some("count"));
    }

    #[test]
    fn test_resistor_brown_black_red_gold() {
        let input = ResistorInput::from_colors(
            BandColor::Brown,
            BandColor::Black,
            BandColor::Red,
            BandColor::Gold,
        )
        .unwrap();
        let calc = resistor(input).unwrap();
        assert_eq!(calc.value.nominal, "1.00 кОм");
        assert!(calc.display.contains("Диапазон: 950.0...1050.0 Ом"));
        assert_eq!(calc.record.description, "Код: 1-0-×100±5%");
    }

    #[test]
    fn test_resistor_scaling() {
        assert_eq!(scale_resistance(470.0), "470 Ом");
        assert_eq!(scale_resistance(4700.0), "4.70 кОм");
        assert_eq!(scale_resistance(2_200_000.0), "2.20 МОм");
    }

    #[test]
    fn test_resistor_rejects_unknown_bands() {
        let err = resistor(ResistorInput {
            first: 1,
            second: 0,
            multiplier: 3.0,
            tolerance: 5.0,
        })
        .unwrap_err();
        assert_eq!(err.field(), Some("multiplier"));
        assert!(ResistorInput::from_colors(
            BandColor::Gold,
            BandColor::Black,
            BandColor::Red,
            BandColor::Gold
        )
        .is_err());
    }

    #[test]
    fn test_ups_autonomy() {
        let calc = ups(UpsInput {
            load: 500.0,
            battery_voltage: 12.0,
            capacity: 100.0,
            battery_count: 2,
            efficiency: 90.0,
            depth_of_discharge: 80.0,
        })
        .unwrap();
        // 200 A·h × 12 V × 0.8 / 500 W
        assert!((calc.value.hours - 3.84).abs() < 1e-9);
        assert_eq!(calc.value.minutes, 230);
        assert!(!calc.value.low_autonomy);
        assert_eq!(calc.record.result, "3.8 ч автономии");
    }

    #[test]
    fn test_ups_low_autonomy_warning() {
        let calc = ups(UpsInput {
            load: 2000.0,
            battery_voltage: 12.0,
            capacity: 7.0,
            battery_count: 1,
            efficiency: 90.0,
            depth_of_discharge: 50.0,
        })
        .unwrap();
        assert!(calc.value.low_autonomy);
        assert!(calc.display.ends_with("Малое время автономии!"));
    }

    #[test]
    fn test_grounding_rod_in_loam() {
        let calc = grounding(GroundingInput {
            length: 2.5,
            diameter_mm: 16.0,
            depth: Some(0.7),
            soil: Soil::Loam,
            shape: ElectrodeShape::Rod,
        })
        .unwrap();
        let expected = 300.0 / (2.0 * PI * 2.5) * (10.0_f64 / 0.016).ln();
        assert!((calc.value.resistance - expected).abs() < 1e-9);
        assert_eq!(calc.value.band, GroundingBand::AboveResidential);
    }

    #[test]
    fn test_grounding_degenerate_diameter() {
        let err = grounding(GroundingInput {
            length: 0.001,
            diameter_mm: 16.0,
            depth: None,
            soil: Soil::Sand,
            shape: ElectrodeShape::Strip,
        })
        .unwrap_err();
        assert!(matches!(err, CalcError::DegenerateInput { .. }));
    }
}
