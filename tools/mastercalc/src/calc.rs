//! Calculator subcommands
//!
//! Fields arrive as raw text and are parsed inside the calculation, so a bad
//! field is reported the same way as a bad formula input and nothing is
//! recorded in history.

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use mastercalc_calc::calculators::{
    breaker, busbar, cable_current, cable_section, convert_electrical, convert_flow,
    convert_length, convert_pressure, convert_temperature, convert_units, convert_volume, divider,
    grounding, heat, level_pressure, lighting, motor, ohm, power, resistor, ups, voltage_drop,
    BreakerInput, BusbarInput, CableCurrentInput, DividerInput, DropInput, GroundingInput,
    HeatInput, LevelInput, LightingInput, MotorInput, OhmInput, ResistorInput, SectionInput,
    UpsInput,
};
use mastercalc_calc::input::parse_optional;
use mastercalc_calc::tables::BandColor;
use mastercalc_calc::{parse_number, CalcError, Calculation, CalculatorId, Quantity, Unit};
use serde::Serialize;
use tracing::debug;

use crate::context::AppContext;

/// Which quantity Ohm's law solves for
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OhmMode {
    Voltage,
    Current,
    Resistance,
}

/// `<value> <from> <to>` for the fixed-kind converters
#[derive(Debug, Clone, Args)]
pub struct ConvertArgs {
    /// Value to convert
    #[arg(allow_hyphen_values = true)]
    pub value: String,
    /// Source unit (e.g. bar, mpa, c, f, m3h, mm, l)
    pub from: String,
    /// Target unit
    pub to: String,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CalcCommand {
    /// Ohm's law: solve U, I or R from the other two
    Ohm {
        #[arg(long, value_enum, default_value_t = OhmMode::Voltage)]
        solve: OhmMode,
        /// Voltage, V
        #[arg(short = 'u', long)]
        voltage: Option<String>,
        /// Current, A
        #[arg(short = 'i', long)]
        current: Option<String>,
        /// Resistance, Ω
        #[arg(short = 'r', long)]
        resistance: Option<String>,
    },

    /// Power P = U × I
    Power {
        #[arg(short = 'u', long)]
        voltage: String,
        #[arg(short = 'i', long)]
        current: String,
    },

    /// Convert voltage, current, resistance or power units
    ElecConvert {
        /// voltage, current, resistance or power
        kind: String,
        #[command(flatten)]
        args: ConvertArgs,
    },

    /// Voltage divider output
    Divider {
        /// Input voltage, V
        #[arg(long)]
        vin: String,
        /// Upper resistor, Ω
        #[arg(long)]
        r1: String,
        /// Lower resistor, Ω
        #[arg(long)]
        r2: String,
    },

    /// Pressure units
    Pressure(ConvertArgs),

    /// Temperature units
    Temperature(ConvertArgs),

    /// Flow units
    Flow(ConvertArgs),

    /// Hydrostatic pressure of a liquid column
    Level {
        /// Column height, mm
        #[arg(long)]
        height: String,
        /// Density, kg/m³
        #[arg(long, default_value = "1000")]
        density: String,
    },

    /// Voltage drop along a cable line
    VoltageDrop {
        /// Current, A
        #[arg(short = 'i', long)]
        current: String,
        /// Line length, m
        #[arg(short = 'l', long)]
        length: String,
        /// Cross-section, mm²
        #[arg(short = 's', long)]
        section: String,
        /// copper or aluminum
        #[arg(long, default_value = "copper")]
        material: String,
        /// 220 for single-phase, 380 for three-phase
        #[arg(short = 'u', long, default_value = "220")]
        voltage: String,
    },

    /// Cable cross-section for a load current
    CableSection {
        #[arg(short = 'i', long)]
        current: String,
        #[arg(long, default_value = "copper")]
        material: String,
        /// open, tube or hidden
        #[arg(long, default_value = "open")]
        install: String,
        /// Loaded conductors in the bundle
        #[arg(long, default_value_t = 1)]
        conductors: u32,
    },

    /// Allowed current of a cable section
    CableCurrent {
        #[arg(short = 's', long)]
        section: String,
        #[arg(long, default_value = "copper")]
        material: String,
        /// Ambient temperature, °C
        #[arg(long, default_value_t = 25, allow_negative_numbers = true)]
        temperature: i32,
    },

    /// Number of fixtures for a target illuminance
    Lighting {
        /// Room area, m²
        #[arg(long)]
        area: String,
        /// Target illuminance, lx
        #[arg(long)]
        lux: String,
        /// Fixture power, W
        #[arg(long)]
        fixture_power: String,
        /// Luminous efficacy, lm/W
        #[arg(long, default_value = "100")]
        efficacy: String,
    },

    /// Motor shaft power
    Motor {
        #[arg(short = 'u', long, default_value = "380")]
        voltage: String,
        #[arg(short = 'i', long)]
        current: String,
        #[arg(long, default_value = "0.85")]
        cos_phi: String,
        /// Efficiency, %
        #[arg(long, default_value = "90")]
        efficiency: String,
    },

    /// Heat energy of a heater
    Heat {
        /// Power, kW
        #[arg(long)]
        power: String,
        #[arg(long)]
        hours: String,
        /// kcal, kj or kwh
        #[arg(long, default_value = "kcal")]
        unit: String,
    },

    /// Length units
    Length(ConvertArgs),

    /// Volume units
    Volume(ConvertArgs),

    /// Circuit breaker rating
    Breaker {
        #[arg(short = 'i', long)]
        current: String,
        /// resistive, inductive or mixed
        #[arg(long, default_value = "resistive")]
        load: String,
        /// Trip curve B, C or D
        #[arg(long, default_value = "c")]
        curve: String,
        #[arg(long, default_value_t = 25, allow_negative_numbers = true)]
        temperature: i32,
    },

    /// Decode a four-band resistor
    Resistor {
        first: String,
        second: String,
        multiplier: String,
        #[arg(default_value = "gold")]
        tolerance: String,
    },

    /// UPS battery autonomy
    Ups {
        /// Load, W
        #[arg(long)]
        load: String,
        /// Battery voltage, V
        #[arg(long, default_value = "12")]
        battery_voltage: String,
        /// Battery capacity, Ah
        #[arg(long)]
        capacity: String,
        #[arg(long, default_value_t = 1)]
        batteries: u32,
        /// Inverter efficiency, %
        #[arg(long, default_value = "90")]
        efficiency: String,
        /// Depth of discharge, %
        #[arg(long, default_value = "80")]
        dod: String,
    },

    /// Single electrode grounding resistance
    Grounding {
        /// Electrode length, m
        #[arg(long)]
        length: String,
        /// Electrode diameter, mm
        #[arg(long)]
        diameter: String,
        /// Burial depth to the electrode middle, m
        #[arg(long)]
        depth: Option<String>,
        /// black_earth, loam, sand, rocky or resistivity 100/300/500/1000
        #[arg(long, default_value = "loam")]
        soil: String,
        /// rod, angle or strip
        #[arg(long, default_value = "rod")]
        shape: String,
    },

    /// Busbar size for a load current
    Busbar {
        #[arg(short = 'i', long)]
        current: String,
        #[arg(long, default_value = "copper")]
        material: String,
        /// vertical or horizontal
        #[arg(long, default_value = "vertical")]
        position: String,
        /// Bars per phase
        #[arg(long, default_value_t = 1)]
        count: u32,
        #[arg(long, default_value_t = 25, allow_negative_numbers = true)]
        temperature: i32,
    },

    /// Convert any supported quantity: <kind> <value> <from> <to>
    Convert {
        /// voltage, current, resistance, power, pressure, temperature, flow, length, volume
        kind: String,
        #[command(flatten)]
        args: ConvertArgs,
    },
}

impl CalcCommand {
    /// Calculator the command belongs to
    pub fn calculator(&self) -> Option<CalculatorId> {
        Some(match self {
            Self::Ohm { .. } => CalculatorId::Ohm,
            Self::Power { .. } => CalculatorId::Power,
            Self::ElecConvert { .. } => CalculatorId::ElecConvert,
            Self::Divider { .. } => CalculatorId::Divider,
            Self::Pressure(_) => CalculatorId::Pressure,
            Self::Temperature(_) => CalculatorId::Temperature,
            Self::Flow(_) => CalculatorId::Flow,
            Self::Level { .. } => CalculatorId::Level,
            Self::VoltageDrop { .. } => CalculatorId::VoltageDrop,
            Self::CableSection { .. } => CalculatorId::CableSection,
            Self::CableCurrent { .. } => CalculatorId::CableCurrent,
            Self::Lighting { .. } => CalculatorId::Lighting,
            Self::Motor { .. } => CalculatorId::Motor,
            Self::Heat { .. } => CalculatorId::Heat,
            Self::Length(_) => CalculatorId::Length,
            Self::Volume(_) => CalculatorId::Volume,
            Self::Breaker { .. } => CalculatorId::Breaker,
            Self::Resistor { .. } => CalculatorId::Resistor,
            Self::Ups { .. } => CalculatorId::Ups,
            Self::Grounding { .. } => CalculatorId::Grounding,
            Self::Busbar { .. } => CalculatorId::Busbar,
            Self::Convert { .. } => return None,
        })
    }

    pub async fn run(self, ctx: &mut AppContext) -> Result<()> {
        let title = match self.calculator() {
            Some(calculator) => {
                ctx.state.open(calculator.screen());
                calculator.title()
            },
            None => "Конвертация",
        };
        debug!("Running calculator: {}", title);

        match self {
            Self::Ohm {
                solve,
                voltage,
                current,
                resistance,
            } => {
                record(ctx, title, || {
                    let input = match solve {
                        OhmMode::Voltage => OhmInput::Voltage {
                            current: required("current", &current)?,
                            resistance: required("resistance", &resistance)?,
                        },
                        OhmMode::Current => OhmInput::Current {
                            voltage: required("voltage", &voltage)?,
                            resistance: required("resistance", &resistance)?,
                        },
                        OhmMode::Resistance => OhmInput::Resistance {
                            voltage: required("voltage", &voltage)?,
                            current: required("current", &current)?,
                        },
                    };
                    ohm(input)
                })
                .await
            },
            Self::Power { voltage, current } => {
                record(ctx, title, || {
                    power(
                        parse_number("voltage", &voltage)?,
                        parse_number("current", &current)?,
                    )
                })
                .await
            },
            Self::ElecConvert { kind, args } => {
                record(ctx, title, || {
                    let (from, to, value) = args.parse()?;
                    convert_electrical(kind.parse::<Quantity>()?, from, to, value)
                })
                .await
            },
            Self::Divider { vin, r1, r2 } => {
                record(ctx, title, || {
                    divider(DividerInput {
                        input_voltage: parse_number("input_voltage", &vin)?,
                        r1: parse_number("r1", &r1)?,
                        r2: parse_number("r2", &r2)?,
                    })
                })
                .await
            },
            Self::Pressure(args) => {
                record(ctx, title, || {
                    let (from, to, value) = args.parse()?;
                    convert_pressure(from, to, value)
                })
                .await
            },
            Self::Temperature(args) => {
                record(ctx, title, || {
                    let (from, to, value) = args.parse()?;
                    convert_temperature(from, to, value)
                })
                .await
            },
            Self::Flow(args) => {
                record(ctx, title, || {
                    let (from, to, value) = args.parse()?;
                    convert_flow(from, to, value)
                })
                .await
            },
            Self::Level { height, density } => {
                record(ctx, title, || {
                    level_pressure(LevelInput {
                        height_mm: parse_number("height", &height)?,
                        density: parse_number("density", &density)?,
                    })
                })
                .await
            },
            Self::VoltageDrop {
                current,
                length,
                section,
                material,
                voltage,
            } => {
                record(ctx, title, || {
                    voltage_drop(DropInput {
                        current: parse_number("current", &current)?,
                        length: parse_number("length", &length)?,
                        section: parse_number("section", &section)?,
                        material: material.parse()?,
                        voltage: parse_number("voltage", &voltage)?,
                    })
                })
                .await
            },
            Self::CableSection {
                current,
                material,
                install,
                conductors,
            } => {
                record(ctx, title, || {
                    cable_section(SectionInput {
                        current: parse_number("current", &current)?,
                        material: material.parse()?,
                        installation: install.parse()?,
                        conductors,
                    })
                })
                .await
            },
            Self::CableCurrent {
                section,
                material,
                temperature,
            } => {
                record(ctx, title, || {
                    cable_current(CableCurrentInput {
                        section: parse_number("section", &section)?,
                        material: material.parse()?,
                        temperature,
                    })
                })
                .await
            },
            Self::Lighting {
                area,
                lux,
                fixture_power,
                efficacy,
            } => {
                record(ctx, title, || {
                    lighting(LightingInput {
                        area: parse_number("area", &area)?,
                        lux: parse_number("lux", &lux)?,
                        fixture_power: parse_number("fixture_power", &fixture_power)?,
                        efficacy: parse_number("efficacy", &efficacy)?,
                    })
                })
                .await
            },
            Self::Motor {
                voltage,
                current,
                cos_phi,
                efficiency,
            } => {
                record(ctx, title, || {
                    motor(MotorInput {
                        voltage: parse_number("voltage", &voltage)?,
                        current: parse_number("current", &current)?,
                        cos_phi: parse_number("cos_phi", &cos_phi)?,
                        efficiency: parse_number("efficiency", &efficiency)?,
                    })
                })
                .await
            },
            Self::Heat { power, hours, unit } => {
                record(ctx, title, || {
                    heat(HeatInput {
                        power: parse_number("power", &power)?,
                        hours: parse_number("hours", &hours)?,
                        unit: unit.parse()?,
                    })
                })
                .await
            },
            Self::Length(args) => {
                record(ctx, title, || {
                    let (from, to, value) = args.parse()?;
                    convert_length(from, to, value)
                })
                .await
            },
            Self::Volume(args) => {
                record(ctx, title, || {
                    let (from, to, value) = args.parse()?;
                    convert_volume(from, to, value)
                })
                .await
            },
            Self::Breaker {
                current,
                load,
                curve,
                temperature,
            } => {
                record(ctx, title, || {
                    breaker(BreakerInput {
                        current: parse_number("current", &current)?,
                        load: load.parse()?,
                        curve: curve.parse()?,
                        temperature,
                    })
                })
                .await
            },
            Self::Resistor {
                first,
                second,
                multiplier,
                tolerance,
            } => {
                record(ctx, title, || {
                    resistor(ResistorInput::from_colors(
                        first.parse::<BandColor>()?,
                        second.parse()?,
                        multiplier.parse()?,
                        tolerance.parse()?,
                    )?)
                })
                .await
            },
            Self::Ups {
                load,
                battery_voltage,
                capacity,
                batteries,
                efficiency,
                dod,
            } => {
                record(ctx, title, || {
                    ups(UpsInput {
                        load: parse_number("load", &load)?,
                        battery_voltage: parse_number("battery_voltage", &battery_voltage)?,
                        capacity: parse_number("capacity", &capacity)?,
                        battery_count: batteries,
                        efficiency: parse_number("efficiency", &efficiency)?,
                        depth_of_discharge: parse_number("depth_of_discharge", &dod)?,
                    })
                })
                .await
            },
            Self::Grounding {
                length,
                diameter,
                depth,
                soil,
                shape,
            } => {
                record(ctx, title, || {
                    grounding(GroundingInput {
                        length: parse_number("length", &length)?,
                        diameter_mm: parse_number("diameter", &diameter)?,
                        depth: parse_optional("depth", depth.as_deref())?,
                        soil: soil.parse()?,
                        shape: shape.parse()?,
                    })
                })
                .await
            },
            Self::Busbar {
                current,
                material,
                position,
                count,
                temperature,
            } => {
                record(ctx, title, || {
                    busbar(BusbarInput {
                        current: parse_number("current", &current)?,
                        material: material.parse()?,
                        position: position.parse()?,
                        count,
                        temperature,
                    })
                })
                .await
            },
            Self::Convert { kind, args } => {
                record(ctx, title, || {
                    let (from, to, value) = args.parse()?;
                    convert_units(kind.parse()?, from, to, value)
                })
                .await
            },
        }
    }
}

impl ConvertArgs {
    fn parse(&self) -> mastercalc_calc::Result<(Unit, Unit, f64)> {
        Ok((
            self.from.parse()?,
            self.to.parse()?,
            parse_number("value", &self.value)?,
        ))
    }
}

/// Missing option reads as an empty field
fn required(field: &str, raw: &Option<String>) -> mastercalc_calc::Result<f64> {
    match raw {
        Some(text) => parse_number(field, text),
        None => Err(CalcError::invalid_input(field, "empty value")),
    }
}

/// Run through the store so history is appended only on success
async fn record<T, F>(ctx: &AppContext, title: &str, calculate: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce() -> mastercalc_calc::Result<Calculation<T>>,
{
    let calc = ctx.store.record_calculation(calculate).await?;
    ctx.output.calculation(title, &calc)
}
