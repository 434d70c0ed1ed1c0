//! Device trigger parameters: fire when a device executes a given method.

use serde_json::Value;

use super::params::{ParamBuilder, ranged};
use crate::device::Method;
use crate::error::ParamError;
use crate::id::DeviceId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceTriggerParams {
    pub device_id: DeviceId,
    pub method: Method,
}

impl DeviceTriggerParams {
    #[must_use]
    pub fn builder() -> DeviceTriggerBuilder {
        DeviceTriggerBuilder::default()
    }

    #[must_use]
    pub fn matches(&self, device_id: DeviceId, method: Method) -> bool {
        self.device_id == device_id && self.method == method
    }
}

#[derive(Debug, Default)]
pub struct DeviceTriggerBuilder {
    params: DeviceTriggerParams,
}

impl DeviceTriggerBuilder {
    #[must_use]
    pub fn device_id(mut self, device_id: DeviceId) -> Self {
        self.params.device_id = device_id;
        self
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.params.method = method;
        self
    }
}

impl ParamBuilder for DeviceTriggerBuilder {
    type Output = DeviceTriggerParams;

    fn parse_param(&mut self, name: &str, value: &Value) -> Result<(), ParamError> {
        match name {
            "clientDeviceId" => self.params.device_id = ranged(name, value)?,
            "method" => self.params.method = ranged(name, value)?,
            _ => {}
        }
        Ok(())
    }

    fn build(self) -> DeviceTriggerParams {
        self.params
    }
}
