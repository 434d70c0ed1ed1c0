//! Device condition parameters: require a device to be in a given state.

use serde_json::Value;

use super::params::{ParamBuilder, ranged};
use crate::device::{DeviceState, Method};
use crate::error::ParamError;
use crate::id::DeviceId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceConditionParams {
    pub device_id: DeviceId,
    pub method: Method,
}

impl DeviceConditionParams {
    #[must_use]
    pub fn builder() -> DeviceConditionBuilder {
        DeviceConditionBuilder::default()
    }

    /// Methods are discrete codes, so only an exact match satisfies the condition.
    #[must_use]
    pub fn is_satisfied_by(&self, state: &DeviceState) -> bool {
        state.method == self.method
    }
}

#[derive(Debug, Default)]
pub struct DeviceConditionBuilder {
    params: DeviceConditionParams,
}

impl DeviceConditionBuilder {
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

impl ParamBuilder for DeviceConditionBuilder {
    type Output = DeviceConditionParams;

    fn parse_param(&mut self, name: &str, value: &Value) -> Result<(), ParamError> {
        match name {
            "clientDeviceId" => self.params.device_id = ranged(name, value)?,
            "method" => self.params.method = ranged(name, value)?,
            _ => {}
        }
        Ok(())
    }

    fn build(self) -> DeviceConditionParams {
        self.params
    }
}
