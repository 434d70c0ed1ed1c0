//! Device events typed on stdin.
//!
//! ```text
//! state <id> <method> [value]
//! sensor <id> <valueType> <value> [scale]
//! ```
//!
//! Methods are numeric codes or one of `on`, `off`, `bell`, `toggle`,
//! `dim`, `learn`, `execute`, `up`, `down`, `stop`.

use std::str::FromStr;

use devrules_adapter_virtual::VirtualRegistry;
use devrules_domain::device::Method;
use devrules_domain::error::DevRulesError;
use devrules_domain::id::DeviceId;
use devrules_domain::sensor::{Scale, ValueType};

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    State {
        device_id: DeviceId,
        method: Method,
        value: String,
    },
    Sensor {
        device_id: DeviceId,
        value_type: ValueType,
        value: f64,
        scale: Scale,
    },
}

impl Input {
    /// Report the event to the registry, as the device would.
    ///
    /// # Errors
    ///
    /// Returns [`DevRulesError::NotFound`] when the device is not registered.
    pub fn apply(self, registry: &VirtualRegistry) -> Result<(), DevRulesError> {
        match self {
            Self::State {
                device_id,
                method,
                value,
            } => registry.report_state(device_id, method, value)?,
            Self::Sensor {
                device_id,
                value_type,
                value,
                scale,
            } => registry.report_sensor(device_id, value_type, value, scale)?,
        }
        Ok(())
    }
}

/// Input line errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("empty line")]
    Empty,
    #[error("unknown event `{0}`, expected `state` or `sensor`")]
    UnknownEvent(String),
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("invalid {field} `{value}`")]
    Invalid { field: &'static str, value: String },
}

impl FromStr for Input {
    type Err = InputError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let event = words.next().ok_or(InputError::Empty)?;
        if !matches!(event, "state" | "sensor") {
            return Err(InputError::UnknownEvent(event.to_string()));
        }
        let device_id = parse(words.next(), "device id", |s| s.parse::<DeviceId>().ok())?;

        match event {
            "state" => {
                let method = parse(words.next(), "method", parse_method)?;
                let value = words.next().unwrap_or_default().to_string();
                Ok(Self::State {
                    device_id,
                    method,
                    value,
                })
            }
            "sensor" => {
                let value_type = parse(words.next(), "value type", |s| s.parse().ok())?;
                let value = parse(words.next(), "value", |s| {
                    s.parse::<f64>().ok().filter(|v| v.is_finite())
                })?;
                let scale = match words.next() {
                    Some(word) => parse(Some(word), "scale", |s| {
                        s.parse::<i64>().ok().and_then(|v| Scale::try_from(v).ok())
                    })?,
                    None => Scale::default(),
                };
                Ok(Self::Sensor {
                    device_id,
                    value_type,
                    value,
                    scale,
                })
            }
            _ => Err(InputError::UnknownEvent(event.to_string())),
        }
    }
}

fn parse<T>(
    word: Option<&str>,
    field: &'static str,
    convert: impl FnOnce(&str) -> Option<T>,
) -> Result<T, InputError> {
    let word = word.ok_or(InputError::Missing(field))?;
    convert(word).ok_or_else(|| InputError::Invalid {
        field,
        value: word.to_string(),
    })
}

fn parse_method(word: &str) -> Option<Method> {
    let method = match word {
        "on" => Method::TURN_ON,
        "off" => Method::TURN_OFF,
        "bell" => Method::BELL,
        "toggle" => Method::TOGGLE,
        "dim" => Method::DIM,
        "learn" => Method::LEARN,
        "execute" => Method::EXECUTE,
        "up" => Method::UP,
        "down" => Method::DOWN,
        "stop" => Method::STOP,
        code => return code.parse().ok().map(Method::new),
    };
    Some(method)
}
