//! Hydrostatic level pressure

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, Result};
use crate::format::{format_number, plain};
use crate::input::require_non_negative;
use crate::record::{Calculation, HistoryRecord, Lines};

/// Standard gravity, m/s²
pub const GRAVITY: f64 = 9.80665;

/// Water, kg/m³
pub const DEFAULT_DENSITY: f64 = 1000.0;

const PASCALS_PER_BAR: f64 = 100_000.0;
const PASCALS_PER_MM_HG: f64 = 133.322;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelInput {
    /// Liquid column height, mm
    pub height_mm: f64,
    /// kg/m³
    pub density: f64,
}

impl LevelInput {
    pub fn water(height_mm: f64) -> Self {
        Self {
            height_mm,
            density: DEFAULT_DENSITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelOutput {
    pub pascals: f64,
    pub bar: f64,
    pub mm_hg: f64,
}

/// p = ρ·g·h
pub fn level_pressure(input: LevelInput) -> Result<Calculation<LevelOutput>> {
    let height = require_non_negative("height", input.height_mm)?;
    if !input.density.is_finite() || input.density <= 0.0 {
        return Err(CalcError::invalid_input(
            "density",
            "density must be greater than zero",
        ));
    }
    let density = input.density;

    let pascals = density * GRAVITY * (height / 1000.0);
    let bar = pascals / PASCALS_PER_BAR;
    let mm_hg = pascals / PASCALS_PER_MM_HG;

    let conditions = format!(
        "Высота: {} мм, Плотность: {} кг/м³",
        plain(height),
        plain(density)
    );
    Ok(Calculation::new(
        LevelOutput {
            pascals,
            bar,
            mm_hg,
        },
        Lines::new()
            .line("Давление столба жидкости:")
            .line(format!("{} Па", format_number(pascals)))
            .line(format!("{} бар", format_number(bar)))
            .line(format!("{} мм рт.ст.", format_number(mm_hg)))
            .line(conditions.clone())
            .build(),
        HistoryRecord::new(
            "Давление по уровню",
            conditions,
            format!("{} бар", format_number(bar)),
        ),
    ))
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_ten_meters_of_water() {
        let calc = level_pressure(LevelInput::water(10_000.0)).unwrap();
        assert!((calc.value.pascals - 98_066.5).abs() < 1e-6);
        assert_eq!(calc.record.result, "0.981 бар");
        assert_eq!(
            calc.record.description,
            "Высота: 10000 мм, Плотность: 1000 кг/м³"
        );
    }

    #[test]
    fn test_density_must_be_positive() {
        let err = level_pressure(LevelInput {
            height_mm: 100.0,
            density: 0.0,
        })
        .unwrap_err();
        assert_eq!(err.field(), Some("density"));
    }
}
