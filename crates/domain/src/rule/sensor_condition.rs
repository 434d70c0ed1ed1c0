//! Sensor condition parameters: compare the current reading of a sensor
//! against a reference value.

use serde_json::Value;

use super::params::{ParamBuilder, integer, number, ranged, value_type};
use crate::compare::{Edge, compare};
use crate::error::ParamError;
use crate::id::DeviceId;
use crate::sensor::{Scale, ValueType};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorConditionParams {
    pub sensor_id: DeviceId,
    pub value: f64,
    pub edge: Edge,
    /// `None` until configured; an unconfigured condition never holds.
    pub value_type: Option<ValueType>,
    pub scale: Scale,
}

impl SensorConditionParams {
    #[must_use]
    pub fn builder() -> SensorConditionBuilder {
        SensorConditionBuilder::default()
    }

    #[must_use]
    pub fn is_satisfied_by(&self, reading: f64) -> bool {
        compare(reading, self.value, self.edge)
    }
}

#[derive(Debug, Default)]
pub struct SensorConditionBuilder {
    params: SensorConditionParams,
}

impl SensorConditionBuilder {
    #[must_use]
    pub fn sensor_id(mut self, sensor_id: DeviceId) -> Self {
        self.params.sensor_id = sensor_id;
        self
    }

    #[must_use]
    pub fn value(mut self, value: f64) -> Self {
        self.params.value = value;
        self
    }

    #[must_use]
    pub fn edge(mut self, edge: Edge) -> Self {
        self.params.edge = edge;
        self
    }

    #[must_use]
    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.params.value_type = Some(value_type);
        self
    }

    #[must_use]
    pub fn scale(mut self, scale: Scale) -> Self {
        self.params.scale = scale;
        self
    }
}

impl ParamBuilder for SensorConditionBuilder {
    type Output = SensorConditionParams;

    fn parse_param(&mut self, name: &str, value: &Value) -> Result<(), ParamError> {
        match name {
            "clientSensorId" => self.params.sensor_id = ranged(name, value)?,
            "value" => self.params.value = number(name, value)?,
            "edge" => self.params.edge = Edge::try_from(integer(name, value)?)?,
            "valueType" => self.params.value_type = Some(value_type(value)?),
            "scale" => self.params.scale = ranged(name, value)?,
            _ => {}
        }
        Ok(())
    }

    fn build(self) -> SensorConditionParams {
        self.params
    }
}
