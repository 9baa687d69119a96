//! Reporter blocks.

use std::fmt;
use std::str::FromStr;

use crate::accessor::{charge_time_of, charging_of, discharge_time_of, level_of};
use crate::platform::BatteryManager;

/// Reporter block that can be evaluated against the battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reporter {
    /// `charging`: boolean.
    Charging,
    /// `level`: percentage.
    Level,
    /// `chargeTime`: seconds until full.
    ChargeTime,
    /// `dischargeTime`: seconds until empty.
    DischargeTime,
}

impl Reporter {
    /// Every reporter.
    pub const ALL: [Reporter; 4] = [
        Reporter::Charging,
        Reporter::Level,
        Reporter::ChargeTime,
        Reporter::DischargeTime,
    ];

    /// Block opcode.
    #[must_use]
    pub fn opcode(self) -> &'static str {
        match self {
            Reporter::Charging => "charging",
            Reporter::Level => "level",
            Reporter::ChargeTime => "chargeTime",
            Reporter::DischargeTime => "dischargeTime",
        }
    }

    /// Evaluates the reporter; `None` yields the fallback.
    #[must_use]
    pub fn value_of(self, battery: Option<&dyn BatteryManager>) -> ReporterValue {
        match self {
            Reporter::Charging => ReporterValue::Bool(charging_of(battery)),
            Reporter::Level => ReporterValue::Number(level_of(battery)),
            Reporter::ChargeTime => ReporterValue::Number(charge_time_of(battery)),
            Reporter::DischargeTime => ReporterValue::Number(discharge_time_of(battery)),
        }
    }

    /// Value reported when no battery is available.
    #[must_use]
    pub fn fallback(self) -> ReporterValue {
        self.value_of(None)
    }
}

/// Error returned when parsing an unknown reporter opcode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown battery reporter '{0}'")]
pub struct UnknownReporter(pub String);

impl FromStr for Reporter {
    type Err = UnknownReporter;

    fn from_str(opcode: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|reporter| reporter.opcode() == opcode)
            .ok_or_else(|| UnknownReporter(opcode.to_string()))
    }
}

/// Value produced by a reporter block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReporterValue {
    /// A boolean reporter.
    Bool(bool),
    /// A numeric reporter. May be infinite.
    Number(f64),
}

impl ReporterValue {
    /// The boolean, if this is a boolean value.
    #[must_use]
    pub fn as_bool(self) -> Option<bool> {
        match self {
            ReporterValue::Bool(value) => Some(value),
            ReporterValue::Number(_) => None,
        }
    }

    /// The number, if this is a numeric value.
    #[must_use]
    pub fn as_f64(self) -> Option<f64> {
        match self {
            ReporterValue::Number(value) => Some(value),
            ReporterValue::Bool(_) => None,
        }
    }
}

impl fmt::Display for ReporterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReporterValue::Bool(value) => write!(f, "{value}"),
            ReporterValue::Number(value) if value.is_infinite() => {
                f.write_str(if *value > 0.0 { "Infinity" } else { "-Infinity" })
            }
            ReporterValue::Number(value) => write!(f, "{value}"),
        }
    }
}
