//! Device vocabulary: method codes, state snapshots, commands and change
//! notifications exchanged with the device registry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::DeviceId;
use crate::sensor::{Scale, SensorReading, ValueType};

/// Class tag of one-way 433 MHz RF devices.
///
/// These receivers never acknowledge a command, so actions repeat the
/// transmission up front instead of retrying on failure.
pub const ONE_WAY_RF_CLASS: &str = "433";

/// Discrete command code understood by a device.
///
/// Rule conditions and triggers compare methods with exact equality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Method(u32);

impl Method {
    pub const TURN_ON: Self = Self(1);
    pub const TURN_OFF: Self = Self(2);
    pub const BELL: Self = Self(4);
    pub const TOGGLE: Self = Self(8);
    pub const DIM: Self = Self(16);
    pub const LEARN: Self = Self(32);
    pub const EXECUTE: Self = Self(64);
    pub const UP: Self = Self(128);
    pub const DOWN: Self = Self(256);
    pub const STOP: Self = Self(512);

    #[must_use]
    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    #[must_use]
    pub const fn code(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for Method {
    type Error = std::num::TryFromIntError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        u32::try_from(code).map(Self)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Last known state of a device: the method it last executed plus the
/// optional method argument (dim level, …) as reported by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceState {
    pub method: Method,
    #[serde(default)]
    pub value: String,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            method: Method::TURN_OFF,
            value: String::new(),
        }
    }
}

/// A command sent to a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub method: Method,
    pub value: Option<i64>,
    /// Audit label identifying who issued the command.
    pub origin: String,
}

impl Command {
    /// Build the command an automation issues on behalf of a rule.
    #[must_use]
    pub fn from_rule(method: Method, value: Option<i64>, description: &str) -> Self {
        Self {
            method,
            value,
            origin: format!("Event - {description}"),
        }
    }
}

/// Notification emitted by the device registry.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceChange {
    StateChanged {
        device_id: DeviceId,
        method: Method,
        value: String,
    },
    SensorValueUpdated {
        device_id: DeviceId,
        value_type: ValueType,
        value: f64,
        scale: Scale,
    },
}

impl DeviceChange {
    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        match self {
            Self::StateChanged { device_id, .. } | Self::SensorValueUpdated { device_id, .. } => {
                *device_id
            }
        }
    }

    /// The sensor reading carried by a `SensorValueUpdated` notification.
    #[must_use]
    pub fn reading(&self) -> Option<SensorReading> {
        match self {
            Self::SensorValueUpdated {
                value_type,
                value,
                scale,
                ..
            } => Some(SensorReading {
                value_type: *value_type,
                value: *value,
                scale: *scale,
            }),
            Self::StateChanged { .. } => None,
        }
    }
}
