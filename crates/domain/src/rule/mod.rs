//! Rule building blocks: triggers, conditions and actions bound to local
//! devices.
//!
//! Rule storage hands every rule element to the factory as a bag of
//! name/value pairs ([`RuleParams`]). Each element kind has a builder that
//! consumes those pairs one at a time through [`ParamBuilder::parse_param`]
//! and produces a strongly typed parameter struct on [`ParamBuilder::build`],
//! where range clamping is applied.

mod device_action;
mod device_condition;
mod device_trigger;
mod params;
mod sensor_condition;
mod sensor_trigger;

pub use device_action::{DeviceActionBuilder, DeviceActionParams, MAX_REPEATS, MIN_REPEATS};
pub use device_condition::{DeviceConditionBuilder, DeviceConditionParams};
pub use device_trigger::{DeviceTriggerBuilder, DeviceTriggerParams};
pub use params::{ParamBuilder, RuleParams};
pub use sensor_condition::{SensorConditionBuilder, SensorConditionParams};
pub use sensor_trigger::{
    MAX_RELOAD_VALUE, MIN_RELOAD_VALUE, SensorHysteresis, SensorTriggerBuilder,
    SensorTriggerParams, TriggerState, Transition,
};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which family of rule element the storage layer asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Device,
    Sensor,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Device => "device",
            Self::Sensor => "sensor",
        })
    }
}

/// Returned when a rule kind string is not one this core owns.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rule kind `{0}`")]
pub struct UnknownRuleKind(pub String);

impl FromStr for RuleKind {
    type Err = UnknownRuleKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "device" => Ok(Self::Device),
            "sensor" => Ok(Self::Sensor),
            other => Err(UnknownRuleKind(other.to_string())),
        }
    }
}
