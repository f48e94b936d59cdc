//! Calculator catalog
//!
//! Stable identifiers for every calculator and screen. Favorites are keyed
//! by [`CalculatorId::id`], never by the display title.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CalcError;

/// Application screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    Menu,
    Elec,
    Kip,
    Cable,
    NewCalculators,
    Len,
    Vol,
    Tools,
    CircuitBreakers,
    ResistorCodes,
    UpsCalc,
    Grounding,
    Busbars,
    Templates,
    Draft,
    Donate,
    Reference,
    Favorites,
    History,
}

impl Screen {
    pub const ALL: [Screen; 19] = [
        Screen::Menu,
        Screen::Elec,
        Screen::Kip,
        Screen::Cable,
        Screen::NewCalculators,
        Screen::Len,
        Screen::Vol,
        Screen::Tools,
        Screen::CircuitBreakers,
        Screen::ResistorCodes,
        Screen::UpsCalc,
        Screen::Grounding,
        Screen::Busbars,
        Screen::Templates,
        Screen::Draft,
        Screen::Donate,
        Screen::Reference,
        Screen::Favorites,
        Screen::History,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Elec => "elec",
            Self::Kip => "kip",
            Self::Cable => "cable",
            Self::NewCalculators => "new-calculators",
            Self::Len => "len",
            Self::Vol => "vol",
            Self::Tools => "tools",
            Self::CircuitBreakers => "circuit-breakers",
            Self::ResistorCodes => "resistor-codes",
            Self::UpsCalc => "ups-calc",
            Self::Grounding => "grounding",
            Self::Busbars => "busbars",
            Self::Templates => "templates",
            Self::Draft => "draft",
            Self::Donate => "donate",
            Self::Reference => "reference",
            Self::Favorites => "favorites",
            Self::History => "history",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Menu => "Главное меню",
            Self::Elec => "Электрика",
            Self::Kip => "КИПиА",
            Self::Cable => "Кабели",
            Self::NewCalculators => "Новые калькуляторы",
            Self::Len => "Длина",
            Self::Vol => "Объем",
            Self::Tools => "Инструменты",
            Self::CircuitBreakers => "Автоматы",
            Self::ResistorCodes => "Резисторы",
            Self::UpsCalc => "ИБП/АКБ",
            Self::Grounding => "Заземление",
            Self::Busbars => "Шины",
            Self::Templates => "Шаблоны",
            Self::Draft => "Черновик",
            Self::Donate => "Поддержка",
            Self::Reference => "Справочник",
            Self::Favorites => "Избранное",
            Self::History => "История",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Screen {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|screen| screen.id() == wanted)
            .ok_or_else(|| CalcError::invalid_input("screen", format!("unknown screen '{}'", s)))
    }
}

/// Calculator identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalculatorId {
    Ohm,
    Power,
    ElecConvert,
    Divider,
    Pressure,
    Temperature,
    Flow,
    Level,
    VoltageDrop,
    CableSection,
    CableCurrent,
    Lighting,
    Motor,
    Heat,
    Length,
    Volume,
    Breaker,
    Resistor,
    Ups,
    Grounding,
    Busbar,
}

impl CalculatorId {
    pub const ALL: [CalculatorId; 21] = [
        CalculatorId::Ohm,
        CalculatorId::Power,
        CalculatorId::ElecConvert,
        CalculatorId::Divider,
        CalculatorId::Pressure,
        CalculatorId::Temperature,
        CalculatorId::Flow,
        CalculatorId::Level,
        CalculatorId::VoltageDrop,
        CalculatorId::CableSection,
        CalculatorId::CableCurrent,
        CalculatorId::Lighting,
        CalculatorId::Motor,
        CalculatorId::Heat,
        CalculatorId::Length,
        CalculatorId::Volume,
        CalculatorId::Breaker,
        CalculatorId::Resistor,
        CalculatorId::Ups,
        CalculatorId::Grounding,
        CalculatorId::Busbar,
    ];

    /// Stable identifier persisted in favorites
    pub fn id(self) -> &'static str {
        match self {
            Self::Ohm => "ohm",
            Self::Power => "power",
            Self::ElecConvert => "elec-convert",
            Self::Divider => "divider",
            Self::Pressure => "pressure",
            Self::Temperature => "temperature",
            Self::Flow => "flow",
            Self::Level => "level",
            Self::VoltageDrop => "voltage-drop",
            Self::CableSection => "cable-section",
            Self::CableCurrent => "cable-current",
            Self::Lighting => "lighting",
            Self::Motor => "motor",
            Self::Heat => "heat",
            Self::Length => "length",
            Self::Volume => "volume",
            Self::Breaker => "breaker",
            Self::Resistor => "resistor",
            Self::Ups => "ups",
            Self::Grounding => "grounding",
            Self::Busbar => "busbar",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Ohm => "Закон Ома",
            Self::Power => "Мощность P=UI",
            Self::ElecConvert => "Конвертер электрических величин",
            Self::Divider => "Делитель напряжения",
            Self::Pressure => "Конвертер давления",
            Self::Temperature => "Конвертер температуры",
            Self::Flow => "Конвертер расхода",
            Self::Level => "Давление по уровню",
            Self::VoltageDrop => "Падение напряжения",
            Self::CableSection => "Подбор сечения кабеля",
            Self::CableCurrent => "Допустимый ток кабеля",
            Self::Lighting => "Расчет освещенности",
            Self::Motor => "Мощность двигателя",
            Self::Heat => "Тепловая энергия",
            Self::Length => "Конвертер длины",
            Self::Volume => "Конвертер объема",
            Self::Breaker => "Подбор автомата",
            Self::Resistor => "Цветовой код резистора",
            Self::Ups => "Расчет ИБП",
            Self::Grounding => "Расчет заземления",
            Self::Busbar => "Подбор шины",
        }
    }

    /// Short hint stored alongside a favorite
    pub fn description(self) -> &'static str {
        match self {
            Self::Ohm => "Напряжение, ток или сопротивление по двум величинам",
            Self::Power => "Мощность по напряжению и току",
            Self::ElecConvert => "В, кВ, мВ, А, мА, Ом, кОм, Вт, кВт",
            Self::Divider => "Выходное напряжение резистивного делителя",
            Self::Pressure => "бар, МПа, кгс/см², атм",
            Self::Temperature => "°C, °F, K",
            Self::Flow => "м³/ч, л/мин, л/с",
            Self::Level => "Гидростатическое давление столба жидкости",
            Self::VoltageDrop => "Потери напряжения в линии",
            Self::CableSection => "Сечение по току нагрузки и условиям прокладки",
            Self::CableCurrent => "Длительно допустимый ток сечения",
            Self::Lighting => "Количество светильников по норме освещенности",
            Self::Motor => "Мощность по току, cosφ и КПД",
            Self::Heat => "Энергия в ккал, кДж, кВт·ч",
            Self::Length => "м, см, мм, км, дюймы, футы",
            Self::Volume => "л, м³, мл, см³, галлоны",
            Self::Breaker => "Номинал и характеристика автомата",
            Self::Resistor => "Номинал по цветовой маркировке",
            Self::Ups => "Время автономии от АКБ",
            Self::Grounding => "Сопротивление одиночного заземлителя",
            Self::Busbar => "Сечение шины по току",
        }
    }

    pub fn screen(self) -> Screen {
        match self {
            Self::Ohm | Self::Power | Self::ElecConvert | Self::Divider => Screen::Elec,
            Self::Pressure | Self::Temperature | Self::Flow | Self::Level => Screen::Kip,
            Self::VoltageDrop | Self::CableSection | Self::CableCurrent => Screen::Cable,
            Self::Lighting | Self::Motor | Self::Heat => Screen::NewCalculators,
            Self::Length => Screen::Len,
            Self::Volume => Screen::Vol,
            Self::Breaker => Screen::CircuitBreakers,
            Self::Resistor => Screen::ResistorCodes,
            Self::Ups => Screen::UpsCalc,
            Self::Grounding => Screen::Grounding,
            Self::Busbar => Screen::Busbars,
        }
    }
}

impl fmt::Display for CalculatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for CalculatorId {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|calc| calc.id() == wanted)
            .ok_or_else(|| {
                CalcError::invalid_input("calculator", format!("unknown calculator '{}'", s))
            })
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<_> = CalculatorId::ALL.iter().map(|c| c.id()).collect();
        assert_eq!(ids.len(), CalculatorId::ALL.len());
        let screens: HashSet<_> = Screen::ALL.iter().map(|s| s.id()).collect();
        assert_eq!(screens.len(), Screen::ALL.len());
    }

    #[test]
    fn test_id_round_trip() {
        for calc in CalculatorId::ALL {
            assert_eq!(calc.id().parse::<CalculatorId>().unwrap(), calc);
        }
        assert_eq!("ups-calc".parse::<Screen>().unwrap(), Screen::UpsCalc);
    }

    #[test]
    fn test_serde_matches_id() {
        let json = serde_json::to_string(&CalculatorId::VoltageDrop).unwrap();
        assert_eq!(json, "\"voltage-drop\"");
        let json = serde_json::to_string(&Screen::NewCalculators).unwrap();
        assert_eq!(json, "\"new-calculators\"");
    }

    #[test]
    fn test_calculators_live_on_screens() {
        assert_eq!(CalculatorId::Busbar.screen(), Screen::Busbars);
        assert_eq!(CalculatorId::Level.screen().title(), "КИПиА");
    }
}
