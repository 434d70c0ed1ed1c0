//! Sensor readings keyed by value type and scale.

use std::collections::HashMap;

use devrules_domain::sensor::{Scale, ValueType};

/// Latest reading of each (value type, scale) pair a device reported.
#[derive(Debug, Default)]
pub struct SensorReadings {
    values: HashMap<(ValueType, Scale), f64>,
}

impl SensorReadings {
    pub fn set(&mut self, value_type: ValueType, scale: Scale, value: f64) {
        self.values.insert((value_type, scale), value);
    }

    #[must_use]
    pub fn get(&self, value_type: ValueType, scale: Scale) -> Option<f64> {
        self.values.get(&(value_type, scale)).copied()
    }
}
