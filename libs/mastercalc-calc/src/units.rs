//! Unit table
//!
//! Every quantity kind has one canonical unit. A conversion normalizes the
//! source value to the canonical unit and then denormalizes to the target,
//! so each unit only carries its own canonical mapping.
//!
//! | Kind | Canonical | Other units |
//! |------|-----------|-------------|
//! | voltage | V | kV, mV |
//! | current | A | mA |
//! | resistance | Ohm | kOhm |
//! | power | W | kW |
//! | pressure | bar | MPa, kgf/cm2, atm |
//! | temperature | C | F, K |
//! | flow | m3/h | l/min, l/s |
//! | length | m | cm, mm, km, inch, feet |
//! | volume | l | m3, ml, cm3, gal |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CalcError, Result};

/// Physical quantity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Voltage,
    Current,
    Resistance,
    Power,
    Pressure,
    Temperature,
    Flow,
    Length,
    Volume,
}

impl Quantity {
    pub const ALL: [Quantity; 9] = [
        Quantity::Voltage,
        Quantity::Current,
        Quantity::Resistance,
        Quantity::Power,
        Quantity::Pressure,
        Quantity::Temperature,
        Quantity::Flow,
        Quantity::Length,
        Quantity::Volume,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Voltage => "voltage",
            Self::Current => "current",
            Self::Resistance => "resistance",
            Self::Power => "power",
            Self::Pressure => "pressure",
            Self::Temperature => "temperature",
            Self::Flow => "flow",
            Self::Length => "length",
            Self::Volume => "volume",
        }
    }

    /// Genitive noun used in history names (`Конвертация давления`)
    pub fn genitive(self) -> &'static str {
        match self {
            Self::Voltage => "напряжения",
            Self::Current => "тока",
            Self::Resistance => "сопротивления",
            Self::Power => "мощности",
            Self::Pressure => "давления",
            Self::Temperature => "температуры",
            Self::Flow => "расхода",
            Self::Length => "длины",
            Self::Volume => "объема",
        }
    }

    pub fn canonical(self) -> Unit {
        self.units()[0]
    }

    /// Units of this kind, canonical first
    pub fn units(self) -> &'static [Unit] {
        use Unit::*;
        match self {
            Self::Voltage => &[Volt, Kilovolt, Millivolt],
            Self::Current => &[Ampere, Milliampere],
            Self::Resistance => &[Ohm, Kiloohm],
            Self::Power => &[Watt, Kilowatt],
            Self::Pressure => &[Bar, Megapascal, KgfPerCm2, Atmosphere],
            Self::Temperature => &[Celsius, Fahrenheit, Kelvin],
            Self::Flow => &[CubicMeterPerHour, LiterPerMinute, LiterPerSecond],
            Self::Length => &[Meter, Centimeter, Millimeter, Kilometer, Inch, Foot],
            Self::Volume => &[Liter, CubicMeter, Milliliter, CubicCentimeter, Gallon],
        }
    }

    /// Whether the kind belongs to the electrical converter
    pub fn is_electrical(self) -> bool {
        matches!(
            self,
            Self::Voltage | Self::Current | Self::Resistance | Self::Power
        )
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Quantity {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.code() == wanted)
            .ok_or_else(|| CalcError::invalid_input("kind", format!("unknown quantity '{}'", s)))
    }
}

/// Measurement unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    // voltage
    Volt,
    Kilovolt,
    Millivolt,
    // current
    Ampere,
    Milliampere,
    // resistance
    Ohm,
    Kiloohm,
    // power
    Watt,
    Kilowatt,
    // pressure
    Bar,
    Megapascal,
    KgfPerCm2,
    Atmosphere,
    // temperature
    Celsius,
    Fahrenheit,
    Kelvin,
    // flow
    CubicMeterPerHour,
    LiterPerMinute,
    LiterPerSecond,
    // length
    Meter,
    Centimeter,
    Millimeter,
    Kilometer,
    Inch,
    Foot,
    // volume
    Liter,
    CubicMeter,
    Milliliter,
    CubicCentimeter,
    Gallon,
}

/// Mapping of a unit onto its canonical unit
enum Scale {
    /// canonical = value × factor
    Linear(f64),
    /// °F ↔ °C
    Fahrenheit,
    /// K ↔ °C
    Kelvin,
}

const KELVIN_OFFSET: f64 = 273.15;

impl Unit {
    pub fn code(self) -> &'static str {
        match self {
            Self::Volt => "V",
            Self::Kilovolt => "kV",
            Self::Millivolt => "mV",
            Self::Ampere => "A",
            Self::Milliampere => "mA",
            Self::Ohm => "Ohm",
            Self::Kiloohm => "kOhm",
            Self::Watt => "W",
            Self::Kilowatt => "kW",
            Self::Bar => "bar",
            Self::Megapascal => "MPa",
            Self::KgfPerCm2 => "kgf/cm2",
            Self::Atmosphere => "atm",
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
            Self::Kelvin => "K",
            Self::CubicMeterPerHour => "m3/h",
            Self::LiterPerMinute => "l/min",
            Self::LiterPerSecond => "l/s",
            Self::Meter => "m",
            Self::Centimeter => "cm",
            Self::Millimeter => "mm",
            Self::Kilometer => "km",
            Self::Inch => "inch",
            Self::Foot => "feet",
            Self::Liter => "l",
            Self::CubicMeter => "m3",
            Self::Milliliter => "ml",
            Self::CubicCentimeter => "cm3",
            Self::Gallon => "gal",
        }
    }

    /// Display name in the result text
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Volt => "Вольт (В)",
            Self::Kilovolt => "Киловольт (кВ)",
            Self::Millivolt => "Милливольт (мВ)",
            Self::Ampere => "Ампер (А)",
            Self::Milliampere => "Миллиампер (мА)",
            Self::Ohm => "Ом",
            Self::Kiloohm => "Килоом (кОм)",
            Self::Watt => "Ватт (Вт)",
            Self::Kilowatt => "Киловатт (кВт)",
            Self::Bar => "бар",
            Self::Megapascal => "МПа",
            Self::KgfPerCm2 => "кгс/см²",
            Self::Atmosphere => "атм",
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
            Self::Kelvin => "K",
            Self::CubicMeterPerHour => "м³/ч",
            Self::LiterPerMinute => "л/мин",
            Self::LiterPerSecond => "л/с",
            Self::Meter => "м",
            Self::Centimeter => "см",
            Self::Millimeter => "мм",
            Self::Kilometer => "км",
            Self::Inch => "дюйм",
            Self::Foot => "фут",
            Self::Liter => "л",
            Self::CubicMeter => "м³",
            Self::Milliliter => "мл",
            Self::CubicCentimeter => "см³",
            Self::Gallon => "галлонов",
        }
    }

    pub fn quantity(self) -> Quantity {
        match self {
            Self::Volt | Self::Kilovolt | Self::Millivolt => Quantity::Voltage,
            Self::Ampere | Self::Milliampere => Quantity::Current,
            Self::Ohm | Self::Kiloohm => Quantity::Resistance,
            Self::Watt | Self::Kilowatt => Quantity::Power,
            Self::Bar | Self::Megapascal | Self::KgfPerCm2 | Self::Atmosphere => {
                Quantity::Pressure
            },
            Self::Celsius | Self::Fahrenheit | Self::Kelvin => Quantity::Temperature,
            Self::CubicMeterPerHour | Self::LiterPerMinute | Self::LiterPerSecond => {
                Quantity::Flow
            },
            Self::Meter
            | Self::Centimeter
            | Self::Millimeter
            | Self::Kilometer
            | Self::Inch
            | Self::Foot => Quantity::Length,
            Self::Liter
            | Self::CubicMeter
            | Self::Milliliter
            | Self::CubicCentimeter
            | Self::Gallon => Quantity::Volume,
        }
    }

    fn scale(self) -> Scale {
        match self {
            Self::Fahrenheit => Scale::Fahrenheit,
            Self::Kelvin => Scale::Kelvin,
            Self::Kilovolt | Self::Kiloohm | Self::Kilowatt | Self::Kilometer => {
                Scale::Linear(1000.0)
            },
            Self::CubicMeter => Scale::Linear(1000.0),
            Self::Millivolt | Self::Milliampere | Self::Millimeter | Self::Milliliter => {
                Scale::Linear(0.001)
            },
            Self::CubicCentimeter => Scale::Linear(0.001),
            Self::Megapascal => Scale::Linear(10.0),
            Self::KgfPerCm2 => Scale::Linear(0.980665),
            Self::Atmosphere => Scale::Linear(1.01325),
            Self::LiterPerMinute => Scale::Linear(0.06),
            Self::LiterPerSecond => Scale::Linear(3.6),
            Self::Centimeter => Scale::Linear(0.01),
            Self::Inch => Scale::Linear(0.0254),
            Self::Foot => Scale::Linear(0.3048),
            Self::Gallon => Scale::Linear(3.78541),
            Self::Volt
            | Self::Ampere
            | Self::Ohm
            | Self::Watt
            | Self::Bar
            | Self::Celsius
            | Self::CubicMeterPerHour
            | Self::Meter
            | Self::Liter => Scale::Linear(1.0),
        }
    }

    /// Multiplier onto the canonical unit, `None` for affine units
    pub fn factor(self) -> Option<f64> {
        match self.scale() {
            Scale::Linear(factor) => Some(factor),
            Scale::Fahrenheit | Scale::Kelvin => None,
        }
    }

    /// Value expressed in the canonical unit of the kind
    pub fn to_canonical(self, value: f64) -> f64 {
        match self.scale() {
            Scale::Linear(factor) => value * factor,
            Scale::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
            Scale::Kelvin => value - KELVIN_OFFSET,
        }
    }

    /// Canonical value expressed in this unit
    pub fn from_canonical(self, value: f64) -> f64 {
        match self.scale() {
            Scale::Linear(factor) => value / factor,
            Scale::Fahrenheit => value * 9.0 / 5.0 + 32.0,
            Scale::Kelvin => value + KELVIN_OFFSET,
        }
    }

    fn all() -> impl Iterator<Item = Unit> {
        Quantity::ALL
            .into_iter()
            .flat_map(|kind| kind.units().iter().copied())
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Unit {
    type Err = CalcError;

    /// Accepts unit codes case-insensitively plus the short codes of the
    /// form selects (`mpa`, `kgf`, `m3h`, `lmin`, `ls`, `c`, `f`, `k`)
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        let alias = match wanted.as_str() {
            "mpa" => Some(Self::Megapascal),
            "kgf" | "kgf/cm²" | "kgf/cm^2" => Some(Self::KgfPerCm2),
            "m3h" | "m³/h" => Some(Self::CubicMeterPerHour),
            "lmin" => Some(Self::LiterPerMinute),
            "ls" => Some(Self::LiterPerSecond),
            "°c" => Some(Self::Celsius),
            "°f" => Some(Self::Fahrenheit),
            "ft" | "foot" => Some(Self::Foot),
            "in" => Some(Self::Inch),
            "m³" => Some(Self::CubicMeter),
            "cm³" => Some(Self::CubicCentimeter),
            "ом" => Some(Self::Ohm),
            _ => None,
        };
        alias
            .or_else(|| Self::all().find(|unit| unit.code().to_lowercase() == wanted))
            .ok_or_else(|| CalcError::invalid_input("unit", format!("unknown unit '{}'", s)))
    }
}

fn check_kind(kind: Quantity, from: Unit, to: Unit) -> Result<()> {
    if from.quantity() != kind || to.quantity() != kind {
        return Err(CalcError::unsupported(kind, from, to));
    }
    Ok(())
}

/// Multiplicative factor for a linear (kind, from, to) triple
///
/// Temperature pairs are affine and only the identity pair has a factor.
pub fn factor(kind: Quantity, from: Unit, to: Unit) -> Result<f64> {
    check_kind(kind, from, to)?;
    if from == to {
        return Ok(1.0);
    }
    match (from.factor(), to.factor()) {
        (Some(from_factor), Some(to_factor)) => Ok(from_factor / to_factor),
        _ => Err(CalcError::unsupported(kind, from, to)),
    }
}

/// Convert `value` between two units of the same kind
pub fn convert(kind: Quantity, from: Unit, to: Unit, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(CalcError::invalid_input("value", "not a finite number"));
    }
    check_kind(kind, from, to)?;
    if from == to {
        return Ok(value);
    }
    Ok(to.from_canonical(from.to_canonical(value)))
}
