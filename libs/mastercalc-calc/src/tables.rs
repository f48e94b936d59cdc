//! Fixed engineering lookup tables
//!
//! Ampacity tables, derating factors, standard breaker ratings, resistor
//! color codes and soil resistivities. All values are constants; selects
//! are modelled as enums so an unknown option cannot reach a formula.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{CalcError, Result};

macro_rules! parse_options {
    ($ty:ident, $field:literal, { $($text:literal => $variant:expr),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = CalcError;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($variant),)+
                    other => Err(CalcError::invalid_input(
                        $field,
                        format!("unknown option '{}'", other),
                    )),
                }
            }
        }
    };
}

// ============================================================================
// Conductors
// ============================================================================

/// Conductor material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    Copper,
    Aluminum,
}

impl Material {
    /// Resistivity, Ω·mm²/m
    pub fn resistivity(self) -> f64 {
        match self {
            Self::Copper => 0.0175,
            Self::Aluminum => 0.028,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Copper => "Медь",
            Self::Aluminum => "Алюминий",
        }
    }
}

parse_options!(Material, "material", {
    "copper" => Material::Copper,
    "cu" => Material::Copper,
    "aluminum" => Material::Aluminum,
    "aluminium" => Material::Aluminum,
    "al" => Material::Aluminum,
});

/// Continuous current rating of a cable section
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CableRating {
    /// Cross-section, mm²
    pub section: f64,
    pub copper: f64,
    pub aluminum: f64,
}

impl CableRating {
    pub fn ampacity(&self, material: Material) -> f64 {
        match material {
            Material::Copper => self.copper,
            Material::Aluminum => self.aluminum,
        }
    }
}

/// Ascending by section
pub static CABLE_TABLE: [CableRating; 9] = [
    CableRating {
        section: 1.5,
        copper: 19.0,
        aluminum: 15.0,
    },
    CableRating {
        section: 2.5,
        copper: 27.0,
        aluminum: 21.0,
    },
    CableRating {
        section: 4.0,
        copper: 38.0,
        aluminum: 29.0,
    },
    CableRating {
        section: 6.0,
        copper: 46.0,
        aluminum: 36.0,
    },
    CableRating {
        section: 10.0,
        copper: 68.0,
        aluminum: 50.0,
    },
    CableRating {
        section: 16.0,
        copper: 90.0,
        aluminum: 70.0,
    },
    CableRating {
        section: 25.0,
        copper: 115.0,
        aluminum: 90.0,
    },
    CableRating {
        section: 35.0,
        copper: 140.0,
        aluminum: 110.0,
    },
    CableRating {
        section: 50.0,
        copper: 175.0,
        aluminum: 135.0,
    },
];

/// Largest section offered by the ampacity lookup
pub const AMPACITY_MAX_SECTION: f64 = 25.0;

/// Table row for an exact section
pub fn cable_rating(section: f64) -> Option<&'static CableRating> {
    CABLE_TABLE.iter().find(|row| row.section == section)
}

/// Cable installation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Installation {
    Open,
    Tube,
    Hidden,
}

impl Installation {
    pub fn factor(self) -> f64 {
        match self {
            Self::Open => 1.0,
            Self::Tube => 0.8,
            Self::Hidden => 0.7,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Open => "Открытая",
            Self::Tube => "В трубе",
            Self::Hidden => "Скрытая",
        }
    }
}

parse_options!(Installation, "install", {
    "open" => Installation::Open,
    "tube" => Installation::Tube,
    "hidden" => Installation::Hidden,
});

/// Grouping factor for loaded conductors in one run
pub fn conductor_count_factor(count: u32) -> f64 {
    match count {
        3 => 0.7,
        5 => 0.6,
        _ => 1.0,
    }
}

/// Ambient temperature factor for cable ampacity
pub fn cable_temperature_factor(temperature: i32) -> f64 {
    match temperature {
        40 => 0.91,
        50 => 0.82,
        _ => 1.0,
    }
}

// ============================================================================
// Circuit breakers
// ============================================================================

/// Standard ratings, A, ascending
pub const BREAKER_RATINGS: [u32; 9] = [6, 10, 16, 20, 25, 32, 40, 50, 63];

/// Load character of a breaker circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadType {
    Resistive,
    Inductive,
    Mixed,
}

impl LoadType {
    pub fn factor(self) -> f64 {
        match self {
            Self::Resistive => 1.0,
            Self::Inductive => 1.25,
            Self::Mixed => 1.15,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Resistive => "Активная",
            Self::Inductive => "Индуктивная",
            Self::Mixed => "Смешанная",
        }
    }
}

parse_options!(LoadType, "load", {
    "resistive" => LoadType::Resistive,
    "inductive" => LoadType::Inductive,
    "mixed" => LoadType::Mixed,
});

/// Breaker trip curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripCurve {
    B,
    C,
    D,
}

impl TripCurve {
    pub fn code(self) -> &'static str {
        match self {
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    /// Instantaneous trip band
    pub fn description(self) -> &'static str {
        match self {
            Self::B => "B (3-5×Iн)",
            Self::C => "C (5-10×Iн)",
            Self::D => "D (10-20×Iн)",
        }
    }
}

parse_options!(TripCurve, "curve", {
    "b" => TripCurve::B,
    "c" => TripCurve::C,
    "d" => TripCurve::D,
});

pub fn breaker_temperature_factor(temperature: i32) -> f64 {
    match temperature {
        40 => 0.9,
        50 => 0.8,
        _ => 1.0,
    }
}

// ============================================================================
// Busbars
// ============================================================================

/// Current rating of a rectangular busbar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BusbarRating {
    /// Width x thickness, mm
    pub size: &'static str,
    /// Cross-section, mm²
    pub area: u32,
    pub copper: f64,
    pub aluminum: f64,
}

impl BusbarRating {
    pub fn ampacity(&self, material: Material) -> f64 {
        match material {
            Material::Copper => self.copper,
            Material::Aluminum => self.aluminum,
        }
    }
}

/// Ascending by size
pub static BUSBAR_TABLE: [BusbarRating; 8] = [
    BusbarRating {
        size: "15x3",
        area: 45,
        copper: 210.0,
        aluminum: 165.0,
    },
    BusbarRating {
        size: "20x3",
        area: 60,
        copper: 275.0,
        aluminum: 215.0,
    },
    BusbarRating {
        size: "25x3",
        area: 75,
        copper: 340.0,
        aluminum: 265.0,
    },
    BusbarRating {
        size: "30x4",
        area: 120,
        copper: 475.0,
        aluminum: 370.0,
    },
    BusbarRating {
        size: "40x4",
        area: 160,
        copper: 625.0,
        aluminum: 490.0,
    },
    BusbarRating {
        size: "50x5",
        area: 250,
        copper: 860.0,
        aluminum: 675.0,
    },
    BusbarRating {
        size: "60x6",
        area: 360,
        copper: 1125.0,
        aluminum: 880.0,
    },
    BusbarRating {
        size: "80x8",
        area: 640,
        copper: 1680.0,
        aluminum: 1320.0,
    },
];

/// Busbar mounting orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusbarPosition {
    Vertical,
    Horizontal,
}

impl BusbarPosition {
    pub fn factor(self) -> f64 {
        match self {
            Self::Vertical => 1.0,
            Self::Horizontal => 0.95,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Vertical => "Вертикально",
            Self::Horizontal => "Горизонтально",
        }
    }
}

parse_options!(BusbarPosition, "position", {
    "vertical" => BusbarPosition::Vertical,
    "horizontal" => BusbarPosition::Horizontal,
});

pub fn busbar_temperature_factor(temperature: i32) -> f64 {
    match temperature {
        35 => 0.91,
        45 => 0.82,
        _ => 1.0,
    }
}

// ============================================================================
// Resistor color code
// ============================================================================

/// Resistor band color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandColor {
    Black,
    Brown,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Violet,
    Grey,
    White,
    Gold,
    Silver,
}

impl BandColor {
    /// Digit bands, index = digit
    pub const DIGITS: [BandColor; 10] = [
        BandColor::Black,
        BandColor::Brown,
        BandColor::Red,
        BandColor::Orange,
        BandColor::Yellow,
        BandColor::Green,
        BandColor::Blue,
        BandColor::Violet,
        BandColor::Grey,
        BandColor::White,
    ];

    pub fn digit(self) -> Option<u8> {
        Self::DIGITS
            .iter()
            .position(|color| *color == self)
            .map(|index| index as u8)
    }

    pub fn multiplier(self) -> Option<f64> {
        MULTIPLIERS
            .iter()
            .find(|(color, _)| *color == self)
            .map(|(_, multiplier)| *multiplier)
    }

    pub fn tolerance(self) -> Option<f64> {
        TOLERANCES
            .iter()
            .find(|(color, _)| *color == self)
            .map(|(_, tolerance)| *tolerance)
    }
}

parse_options!(BandColor, "color", {
    "black" => BandColor::Black,
    "brown" => BandColor::Brown,
    "red" => BandColor::Red,
    "orange" => BandColor::Orange,
    "yellow" => BandColor::Yellow,
    "green" => BandColor::Green,
    "blue" => BandColor::Blue,
    "violet" => BandColor::Violet,
    "purple" => BandColor::Violet,
    "grey" => BandColor::Grey,
    "gray" => BandColor::Grey,
    "white" => BandColor::White,
    "gold" => BandColor::Gold,
    "silver" => BandColor::Silver,
});

/// Third band multipliers
pub const MULTIPLIERS: [(BandColor, f64); 10] = [
    (BandColor::Black, 1.0),
    (BandColor::Brown, 10.0),
    (BandColor::Red, 100.0),
    (BandColor::Orange, 1_000.0),
    (BandColor::Yellow, 10_000.0),
    (BandColor::Green, 100_000.0),
    (BandColor::Blue, 1_000_000.0),
    (BandColor::Violet, 10_000_000.0),
    (BandColor::Gold, 0.1),
    (BandColor::Silver, 0.01),
];

/// Fourth band tolerances, %
pub const TOLERANCES: [(BandColor, f64); 7] = [
    (BandColor::Brown, 1.0),
    (BandColor::Red, 2.0),
    (BandColor::Green, 0.5),
    (BandColor::Blue, 0.25),
    (BandColor::Violet, 0.1),
    (BandColor::Gold, 5.0),
    (BandColor::Silver, 10.0),
];

pub fn is_multiplier(value: f64) -> bool {
    MULTIPLIERS.iter().any(|(_, multiplier)| *multiplier == value)
}

pub fn is_tolerance(value: f64) -> bool {
    TOLERANCES.iter().any(|(_, tolerance)| *tolerance == value)
}

// ============================================================================
// Grounding
// ============================================================================

/// Soil type with its specific resistivity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Soil {
    BlackEarth,
    Loam,
    Sand,
    Rocky,
}

impl Soil {
    pub const ALL: [Soil; 4] = [Soil::BlackEarth, Soil::Loam, Soil::Sand, Soil::Rocky];

    /// Ω·m
    pub fn resistivity(self) -> u32 {
        match self {
            Self::BlackEarth => 100,
            Self::Loam => 300,
            Self::Sand => 500,
            Self::Rocky => 1000,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::BlackEarth => "Чернозем, глина",
            Self::Loam => "Суглинок",
            Self::Sand => "Песок",
            Self::Rocky => "Каменистый грунт",
        }
    }

    pub fn from_resistivity(value: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|soil| soil.resistivity() == value)
    }
}

impl FromStr for Soil {
    type Err = CalcError;

    /// Soil name or its resistivity (`100`, `300`, `500`, `1000`)
    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim().to_lowercase();
        if let Ok(value) = text.parse::<u32>() {
            return Self::from_resistivity(value).ok_or_else(|| {
                CalcError::invalid_input("soil", format!("no soil with resistivity {}", value))
            });
        }
        match text.as_str() {
            "black_earth" | "clay" => Ok(Self::BlackEarth),
            "loam" => Ok(Self::Loam),
            "sand" => Ok(Self::Sand),
            "rocky" | "rock" => Ok(Self::Rocky),
            other => Err(CalcError::invalid_input(
                "soil",
                format!("unknown option '{}'", other),
            )),
        }
    }
}

/// Earth electrode profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectrodeShape {
    Rod,
    Angle,
    Strip,
}

impl ElectrodeShape {
    pub fn factor(self) -> f64 {
        match self {
            Self::Rod => 1.0,
            Self::Angle => 1.2,
            Self::Strip => 1.4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Rod => "Стержневой",
            Self::Angle => "Уголковая сталь",
            Self::Strip => "Полоса",
        }
    }
}

parse_options!(ElectrodeShape, "shape", {
    "rod" => ElectrodeShape::Rod,
    "angle" => ElectrodeShape::Angle,
    "strip" => ElectrodeShape::Strip,
});

// ============================================================================
// Heat
// ============================================================================

/// Output unit of the heat energy calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatUnit {
    Kcal,
    Kj,
    Kwh,
}

impl HeatUnit {
    /// Multiplier from kWh
    pub fn per_kwh(self) -> f64 {
        match self {
            Self::Kcal => 860.0,
            Self::Kj => 3600.0,
            Self::Kwh => 1.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Kcal => "ккал",
            Self::Kj => "кДж",
            Self::Kwh => "кВт·ч",
        }
    }
}

parse_options!(HeatUnit, "unit", {
    "kcal" => HeatUnit::Kcal,
    "kj" => HeatUnit::Kj,
    "kwh" => HeatUnit::Kwh,
});
