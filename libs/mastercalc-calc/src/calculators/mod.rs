//! Calculation functions
//!
//! One pure function per calculator. Each validates its typed input, computes
//! the result and returns a [`Calculation`](crate::Calculation) carrying the
//! display text and the history record. Errors abort before anything is
//! recorded.

pub mod building;
pub mod cabling;
pub mod conversion;
pub mod electrical;
pub mod instrumentation;
pub mod tools;

pub use building::{heat, lighting, motor, HeatInput, LightingInput, MotorInput};
pub use cabling::{
    cable_current, cable_section, voltage_drop, CableCurrentInput, DropInput, DropSeverity,
    SectionInput,
};
pub use conversion::{
    convert_electrical, convert_flow, convert_length, convert_pressure, convert_temperature,
    convert_units, convert_volume, ConversionOutput,
};
pub use electrical::{divider, ohm, power, DividerInput, OhmInput};
pub use instrumentation::{level_pressure, LevelInput};
pub use tools::{
    breaker, busbar, grounding, resistor, ups, BreakerInput, BusbarInput, GroundingBand,
    GroundingInput, ResistorInput, UpsInput,
};
