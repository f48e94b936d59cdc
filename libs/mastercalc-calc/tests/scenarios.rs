//! End-to-end calculator scenarios through the public API

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use errors::MasterCalcErrorTrait;
use mastercalc_calc::calculators::{
    cable_section, divider, ohm, resistor, voltage_drop, DividerInput, DropInput, DropSeverity,
    OhmInput, ResistorInput, SectionInput,
};
use mastercalc_calc::tables::{Installation, Material, CABLE_TABLE};
use mastercalc_calc::{convert, format_number, parse_number, CalcError, Quantity, Unit};

#[test]
fn ohm_from_raw_fields() {
    let current = parse_number("current", "5").unwrap();
    let resistance = parse_number("resistance", "44,0").unwrap();
    let calc = ohm(OhmInput::Voltage {
        current,
        resistance,
    })
    .unwrap();

    assert_eq!(calc.record.name, "Закон Ома (U)");
    assert_eq!(calc.record.result, "U = 220 В");
}

#[test]
fn ohm_large_values_are_grouped() {
    let calc = ohm(OhmInput::Voltage {
        current: 1234.5678,
        resistance: 10.0,
    })
    .unwrap();
    assert_eq!(calc.record.result, "U = 12 345.678 В");
}

#[test]
fn zero_resistance_has_its_own_message() {
    let err = ohm(OhmInput::Current {
        voltage: 220.0,
        resistance: 0.0,
    })
    .unwrap_err();
    assert_eq!(err.user_message(), "Сопротивление не может быть равно нулю!");
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn unparseable_field_is_invalid_input() {
    let err = parse_number("current", "пять").unwrap_err();
    assert!(matches!(err, CalcError::InvalidInput { .. }));
    assert_eq!(err.user_message(), "Заполните все поля корректно!");
}

#[test]
fn divider_conserves_power() {
    for (uin, r1, r2) in [(12.0, 1000.0, 2200.0), (5.0, 10.0, 0.5), (230.0, 1e6, 3.3e3)] {
        let calc = divider(DividerInput {
            input_voltage: uin,
            r1,
            r2,
        })
        .unwrap();
        let expected = uin * r2 / (r1 + r2);
        assert!((calc.value.output_voltage - expected).abs() <= 1e-12 * expected.abs().max(1.0));
        let dissipated = calc.value.power_r1 + calc.value.power_r2;
        let supplied = uin * calc.value.current;
        assert!((dissipated - supplied).abs() <= 1e-9 * supplied.max(1e-12));
    }
}

#[test]
fn every_supported_pair_round_trips() {
    let samples = [0.001, 1.0, 37.5, 1234.5, 98_765.4321];
    for kind in Quantity::ALL {
        for &from in kind.units() {
            for &to in kind.units() {
                for value in samples {
                    let there = convert(kind, from, to, value).unwrap();
                    let back = convert(kind, to, from, there).unwrap();
                    let tolerance = 1e-9 * value.abs().max(1.0);
                    assert!(
                        (back - value).abs() <= tolerance,
                        "{} {} -> {} -> {}: {} vs {}",
                        kind,
                        from,
                        to,
                        from,
                        value,
                        back
                    );
                }
            }
        }
    }
}

#[test]
fn boiling_water_in_fahrenheit() {
    let f = convert(Quantity::Temperature, Unit::Celsius, Unit::Fahrenheit, 100.0).unwrap();
    assert_eq!(format_number(f), "212");
}

#[test]
fn resistor_one_kilo_ohm() {
    let calc = resistor(ResistorInput {
        first: 1,
        second: 0,
        multiplier: 100.0,
        tolerance: 5.0,
    })
    .unwrap();
    assert_eq!(calc.record.result, "1.00 кОм");
    assert_eq!(calc.value.min, 950.0);
    assert_eq!(calc.value.max, 1050.0);
}

#[test]
fn voltage_drop_warning_band() {
    let calc = voltage_drop(DropInput {
        current: 10.0,
        length: 50.0,
        section: 2.5,
        material: Material::Copper,
        voltage: 220.0,
    })
    .unwrap();
    assert_eq!(format_number(calc.value.drop), "7");
    assert_eq!(calc.value.severity, DropSeverity::Warning);
    assert_eq!(calc.record.result, "ΔU = 7 В (3.18%)");
}

#[test]
fn cable_section_picks_each_boundary() {
    for row in CABLE_TABLE.iter() {
        for material in [Material::Copper, Material::Aluminum] {
            let calc = cable_section(SectionInput {
                current: row.ampacity(material),
                material,
                installation: Installation::Open,
                conductors: 1,
            })
            .unwrap();
            assert_eq!(calc.value.section, row.section);
            assert!(calc.value.sufficient);
        }
    }
}
