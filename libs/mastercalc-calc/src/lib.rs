//! mastercalc-calc - Engineering calculators for MasterCalc
//!
//! Pure, synchronous calculation functions plus the formatter, unit table and
//! lookup tables they are built on.
//!
//! # Example
//!
//! ```rust
//! use mastercalc_calc::calculators::{ohm, OhmInput};
//!
//! let calc = ohm(OhmInput::Voltage { current: 5.0, resistance: 44.0 }).unwrap();
//! assert_eq!(calc.value.voltage, 220.0);
//! assert_eq!(calc.record.name, "Закон Ома (U)");
//! assert_eq!(calc.record.result, "U = 220 В");
//! ```
//!
//! # Calculators
//!
//! | Group | Functions |
//! |-------|-----------|
//! | Electrical | `ohm`, `power`, `divider`, `convert_electrical` |
//! | Instrumentation | `convert_pressure`, `convert_temperature`, `convert_flow`, `level_pressure` |
//! | Cabling | `voltage_drop`, `cable_section`, `cable_current` |
//! | Building | `lighting`, `motor`, `heat`, `convert_length`, `convert_volume` |
//! | Tools | `breaker`, `resistor`, `ups`, `grounding`, `busbar` |

pub mod calculators;
pub mod catalog;
pub mod error;
pub mod format;
pub mod input;
pub mod record;
pub mod tables;
pub mod units;

// Re-exports for convenience
pub use catalog::{CalculatorId, Screen};
pub use error::{CalcError, Result};
pub use format::{fixed, format_decimals, format_number, INVALID_NUMBER_TEXT};
pub use input::parse_number;
pub use record::{Calculation, HistoryRecord};
pub use units::{convert, factor, Quantity, Unit};
