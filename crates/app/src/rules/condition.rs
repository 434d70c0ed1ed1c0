//! Conditions read the current state of the registry when evaluated; they
//! keep no state of their own.

use std::sync::Arc;

use devrules_domain::rule::{DeviceConditionParams, RuleKind, SensorConditionParams};

use crate::ports::{DeviceHandle, DeviceRegistry};

/// Holds while a device's last executed method equals the configured one.
#[derive(Debug)]
pub struct DeviceCondition<R> {
    registry: Arc<R>,
    params: DeviceConditionParams,
}

impl<R: DeviceRegistry> DeviceCondition<R> {
    pub(crate) fn new(registry: Arc<R>, params: DeviceConditionParams) -> Self {
        Self { registry, params }
    }

    #[must_use]
    pub fn params(&self) -> &DeviceConditionParams {
        &self.params
    }

    /// An unknown device never satisfies the condition.
    #[must_use]
    pub fn evaluate(&self) -> bool {
        self.registry
            .device(self.params.device_id)
            .is_some_and(|device| self.params.is_satisfied_by(&device.state()))
    }
}

/// Holds while a sensor's current reading compares true to the reference.
#[derive(Debug)]
pub struct SensorCondition<R> {
    registry: Arc<R>,
    params: SensorConditionParams,
}

impl<R: DeviceRegistry> SensorCondition<R> {
    pub(crate) fn new(registry: Arc<R>, params: SensorConditionParams) -> Self {
        Self { registry, params }
    }

    #[must_use]
    pub fn params(&self) -> &SensorConditionParams {
        &self.params
    }

    /// False when the sensor is unknown, the value type is unset, or the
    /// sensor has no reading for the configured type and scale.
    #[must_use]
    pub fn evaluate(&self) -> bool {
        let Some(value_type) = self.params.value_type else {
            return false;
        };
        self.registry
            .device(self.params.sensor_id)
            .and_then(|sensor| sensor.sensor_value(value_type, self.params.scale))
            .is_some_and(|reading| self.params.is_satisfied_by(reading))
    }
}

/// A live condition returned by the factory.
#[derive(Debug)]
pub enum Condition<R> {
    Device(DeviceCondition<R>),
    Sensor(SensorCondition<R>),
}

impl<R: DeviceRegistry> Condition<R> {
    #[must_use]
    pub fn kind(&self) -> RuleKind {
        match self {
            Self::Device(_) => RuleKind::Device,
            Self::Sensor(_) => RuleKind::Sensor,
        }
    }

    #[must_use]
    pub fn evaluate(&self) -> bool {
        match self {
            Self::Device(c) => c.evaluate(),
            Self::Sensor(c) => c.evaluate(),
        }
    }

    /// Evaluate once and invoke exactly one of the callbacks.
    pub fn validate(&self, on_success: impl FnOnce(), on_failure: impl FnOnce()) {
        if self.evaluate() {
            on_success();
        } else {
            on_failure();
        }
    }
}
