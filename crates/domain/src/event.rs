//! Trigger event: the record handed to the rule pipeline when a trigger fires.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::device::Method;
use crate::id::{DeviceId, TriggerId};
use crate::sensor::{Scale, ValueType};

/// UTC timestamp of a fired trigger.
pub type Timestamp = DateTime<Utc>;

/// Emitted once per trigger firing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerFired {
    pub trigger_id: TriggerId,
    pub fired_at: Timestamp,
    pub payload: TriggerPayload,
}

impl TriggerFired {
    #[must_use]
    pub fn new(trigger_id: TriggerId, payload: TriggerPayload) -> Self {
        Self {
            trigger_id,
            fired_at: Utc::now(),
            payload,
        }
    }
}

/// What caused a trigger to fire, keyed the way rule pipelines expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "triggertype", rename_all = "lowercase")]
pub enum TriggerPayload {
    Device {
        #[serde(rename = "clientdeviceid")]
        client_device_id: DeviceId,
        method: Method,
    },
    Sensor {
        #[serde(rename = "clientsensorid")]
        client_sensor_id: DeviceId,
        value: f64,
        #[serde(rename = "valueType")]
        value_type: ValueType,
        scale: Scale,
    },
}
