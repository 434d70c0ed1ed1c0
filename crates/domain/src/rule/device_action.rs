//! Device action parameters: send a command to a device.

use serde_json::Value;

use super::params::{ParamBuilder, integer, ranged};
use crate::device::Method;
use crate::error::ParamError;
use crate::id::DeviceId;

pub const MIN_REPEATS: u8 = 1;
pub const MAX_REPEATS: u8 = 10;

/// What a device action sends, and how persistently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceActionParams {
    pub device_id: DeviceId,
    pub method: Method,
    pub value: Option<i64>,
    /// Number of deliveries attempted, within `MIN_REPEATS..=MAX_REPEATS`.
    pub repeats: u8,
    /// Description of the owning rule, used as the command origin.
    pub description: String,
}

impl DeviceActionParams {
    #[must_use]
    pub fn builder(description: impl Into<String>) -> DeviceActionBuilder {
        DeviceActionBuilder {
            description: description.into(),
            ..DeviceActionBuilder::default()
        }
    }
}

#[derive(Debug)]
pub struct DeviceActionBuilder {
    device_id: DeviceId,
    method: Method,
    value: Option<i64>,
    repeats: i64,
    description: String,
}

impl Default for DeviceActionBuilder {
    fn default() -> Self {
        Self {
            device_id: DeviceId::default(),
            method: Method::default(),
            value: None,
            repeats: i64::from(MIN_REPEATS),
            description: String::new(),
        }
    }
}

impl DeviceActionBuilder {
    #[must_use]
    pub fn device_id(mut self, device_id: DeviceId) -> Self {
        self.device_id = device_id;
        self
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn value(mut self, value: i64) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn repeats(mut self, repeats: i64) -> Self {
        self.repeats = repeats;
        self
    }
}

impl ParamBuilder for DeviceActionBuilder {
    type Output = DeviceActionParams;

    fn parse_param(&mut self, name: &str, value: &Value) -> Result<(), ParamError> {
        match name {
            "clientDeviceId" => self.device_id = ranged(name, value)?,
            "method" => self.method = ranged(name, value)?,
            "repeats" => self.repeats = integer(name, value)?,
            "value" => self.value = Some(integer(name, value)?),
            _ => {}
        }
        Ok(())
    }

    fn build(self) -> DeviceActionParams {
        let clamped = self
            .repeats
            .clamp(i64::from(MIN_REPEATS), i64::from(MAX_REPEATS));
        DeviceActionParams {
            device_id: self.device_id,
            method: self.method,
            value: self.value,
            repeats: u8::try_from(clamped).unwrap_or(MIN_REPEATS),
            description: self.description,
        }
    }
}
