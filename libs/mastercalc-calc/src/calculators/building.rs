//! Lighting, motor power and heat energy

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, Result};
use crate::format::{format_decimals, format_number, plain};
use crate::input::{require_non_negative, require_percent, require_positive};
use crate::record::{Calculation, HistoryRecord, Lines};
use crate::tables::HeatUnit;

use super::cabling::SINGLE_PHASE_VOLTAGE;

const HP_PER_KW: f64 = 1.35962;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightingInput {
    /// m²
    pub area: f64,
    /// Required illuminance, lx
    pub lux: f64,
    /// Fixture power, W
    pub fixture_power: f64,
    /// Luminous efficacy, lm/W
    pub efficacy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LightingOutput {
    pub fixtures: u64,
    /// W
    pub total_power: f64,
    /// W/m²
    pub power_density: f64,
}

/// Fixture count by the lumen method
pub fn lighting(input: LightingInput) -> Result<Calculation<LightingOutput>> {
    let area = require_positive("area", input.area)?;
    let lux = require_positive("lux", input.lux)?;
    let fixture_power = require_positive("fixture_power", input.fixture_power)?;
    let efficacy = require_positive("efficacy", input.efficacy)?;

    let fixtures = (area * lux / (fixture_power * efficacy)).ceil() as u64;
    let total_power = fixtures as f64 * fixture_power;
    let power_density = total_power / area;

    let total = format_number(total_power);
    Ok(Calculation::new(
        LightingOutput {
            fixtures,
            total_power,
            power_density,
        },
        Lines::new()
            .line(format!("Количество светильников: {} шт.", fixtures))
            .line(format!("Общая мощность: {} Вт", total))
            .line(format!(
                "Удельная мощность: {} Вт/м²",
                format_decimals(power_density, 1)
            ))
            .line(format!(
                "Площадь: {} м², Норма освещенности: {} лк",
                plain(area),
                plain(lux)
            ))
            .line(format!(
                "Мощность светильника: {} Вт, Светоотдача: {} лм/Вт",
                plain(fixture_power),
                plain(efficacy)
            ))
            .build(),
        HistoryRecord::new(
            "Расчет освещенности",
            format!(
                "Площадь: {} м², Норма: {} лк, Светильник: {} Вт",
                plain(area),
                plain(lux),
                plain(fixture_power)
            ),
            format!("{} светильников, {} Вт", fixtures, total),
        ),
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotorInput {
    /// Supply voltage, V (220 selects the single-phase formula)
    pub voltage: f64,
    /// A
    pub current: f64,
    pub cos_phi: f64,
    /// %
    pub efficiency: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MotorOutput {
    pub watts: f64,
    pub kilowatts: f64,
    pub horsepower: f64,
}

/// Shaft power from electrical input
pub fn motor(input: MotorInput) -> Result<Calculation<MotorOutput>> {
    let voltage = require_positive("voltage", input.voltage)?;
    let current = require_non_negative("current", input.current)?;
    let cos_phi = require_positive("cos_phi", input.cos_phi)?;
    if cos_phi > 1.0 {
        return Err(CalcError::invalid_input("cos_phi", "must not exceed 1"));
    }
    let eta = require_percent("efficiency", input.efficiency)?;

    let single = voltage * current * cos_phi * eta;
    let watts = if voltage == SINGLE_PHASE_VOLTAGE {
        single
    } else {
        3f64.sqrt() * single
    };
    let kilowatts = watts / 1000.0;
    let horsepower = kilowatts * HP_PER_KW;

    let (kw, hp) = (format_decimals(kilowatts, 2), format_decimals(horsepower, 2));
    let conditions = format!(
        "{} В, {} А, cosφ: {}, КПД: {}%",
        plain(voltage),
        plain(current),
        plain(cos_phi),
        plain(input.efficiency)
    );
    Ok(Calculation::new(
        MotorOutput {
            watts,
            kilowatts,
            horsepower,
        },
        Lines::new()
            .line("Мощность двигателя:")
            .line(format!("{} Вт", format_number(watts)))
            .line(format!("{} кВт", kw))
            .line(format!("{} л.с.", hp))
            .line(conditions.clone())
            .build(),
        HistoryRecord::new(
            "Мощность двигателя",
            conditions,
            format!("{} кВт ({} л.с.)", kw, hp),
        ),
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatInput {
    /// kW
    pub power: f64,
    /// h
    pub hours: f64,
    pub unit: HeatUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatOutput {
    pub energy_kwh: f64,
    /// Energy in the requested unit
    pub value: f64,
}

/// Energy of a constant load over time
pub fn heat(input: HeatInput) -> Result<Calculation<HeatOutput>> {
    let power = require_non_negative("power", input.power)?;
    let hours = require_non_negative("hours", input.hours)?;

    let energy_kwh = power * hours;
    let value = energy_kwh * input.unit.per_kwh();

    let result = format!("{} {}", format_number(value), input.unit.symbol());
    let conditions = format!("Мощность: {} кВт, Время: {} ч", plain(power), plain(hours));
    Ok(Calculation::new(
        HeatOutput { energy_kwh, value },
        Lines::new()
            .line(format!("Тепловая энергия: {}", result))
            .line(conditions.clone())
            .line(format!("Общая энергия: {} кВт·ч", format_number(energy_kwh)))
            .build(),
        HistoryRecord::new("Тепловая энергия", conditions, result),
    ))
}
