//! Event factory: builds rule elements from rule-storage parameters, owns
//! the live triggers and routes device notifications to them.
//!
//! The factory is the only inbound entry point of the rule core:
//!
//! ```text
//! registry ──DeviceChange──▶ EventFactory ──▶ matching triggers ──TriggerFired──▶ publisher
//!                                │
//!                                └─ create_condition / create_action ──▶ rule pipeline
//! ```
//!
//! Triggers live in a shared [`TriggerRegistry`]; each trigger keeps a weak
//! reference to it so [`Trigger::close`] works without going through the
//! factory.

use std::sync::Arc;

use devrules_domain::device::{DeviceChange, Method};
use devrules_domain::id::DeviceId;
use devrules_domain::rule::{
    DeviceActionParams, DeviceConditionParams, DeviceTriggerParams, ParamBuilder, RuleKind,
    RuleParams, SensorConditionParams, SensorTriggerParams,
};
use devrules_domain::sensor::{Scale, SensorReading, ValueType};

use crate::ports::{DeviceRegistry, TriggerPublisher};
use crate::rules::{
    Action, Condition, DeviceAction, DeviceCondition, DeviceTrigger, SensorCondition,
    SensorTrigger, Trigger, TriggerRegistry,
};

pub struct EventFactory<R, P> {
    registry: Arc<R>,
    publisher: P,
    triggers: Arc<TriggerRegistry>,
}

impl<R: DeviceRegistry, P: TriggerPublisher> EventFactory<R, P> {
    #[must_use]
    pub fn new(registry: Arc<R>, publisher: P) -> Self {
        Self {
            registry,
            publisher,
            triggers: Arc::new(TriggerRegistry::default()),
        }
    }

    /// Build a trigger and register it for dispatch.
    #[tracing::instrument(skip(self, params))]
    pub fn create_trigger(&self, kind: RuleKind, params: &RuleParams) -> Trigger {
        let registry = Arc::downgrade(&self.triggers);
        let trigger = match kind {
            RuleKind::Device => {
                let params = build_params(DeviceTriggerParams::builder(), params);
                Trigger::Device(Arc::new(DeviceTrigger::new(params, registry)))
            }
            RuleKind::Sensor => {
                let params = build_params(SensorTriggerParams::builder(), params);
                Trigger::Sensor(Arc::new(SensorTrigger::new(params, registry)))
            }
        };
        self.triggers.insert(&trigger);
        tracing::debug!(trigger = %trigger.id(), "trigger registered");
        trigger
    }

    /// Build a condition, or `None` when the rule element is not handled
    /// locally.
    #[tracing::instrument(skip(self, params))]
    pub fn create_condition(&self, kind: RuleKind, params: &RuleParams) -> Option<Condition<R>> {
        if !params.is_local() {
            return None;
        }
        let registry = Arc::clone(&self.registry);
        Some(match kind {
            RuleKind::Device => Condition::Device(DeviceCondition::new(
                registry,
                build_params(DeviceConditionParams::builder(), params),
            )),
            RuleKind::Sensor => Condition::Sensor(SensorCondition::new(
                registry,
                build_params(SensorConditionParams::builder(), params),
            )),
        })
    }

    /// Build an action, or `None` when the rule element is not handled
    /// locally. Sensors have no action.
    #[tracing::instrument(skip(self, params))]
    pub fn create_action(
        &self,
        kind: RuleKind,
        params: &RuleParams,
        description: &str,
    ) -> Option<Action<R>> {
        if !params.is_local() {
            return None;
        }
        match kind {
            RuleKind::Device => Some(Action::Device(DeviceAction::new(
                Arc::clone(&self.registry),
                build_params(DeviceActionParams::builder(description), params),
            ))),
            RuleKind::Sensor => None,
        }
    }

    /// Unregister a trigger. Returns `false` when it was not registered.
    pub fn delete_trigger(&self, trigger: &Trigger) -> bool {
        self.triggers.remove(trigger.id())
    }

    /// Fire every device trigger watching `device_id` for `method`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn on_device_state_changed(&self, device_id: DeviceId, method: Method, value: &str) {
        for trigger in self.triggers.device_triggers() {
            if trigger.params().matches(device_id, method) {
                trigger.fire(&self.publisher, method);
            }
        }
    }

    /// Feed a reading to every sensor trigger bound to `device_id`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn on_sensor_value_updated(
        &self,
        device_id: DeviceId,
        value_type: ValueType,
        value: f64,
        scale: Scale,
    ) {
        let reading = SensorReading {
            value_type,
            value,
            scale,
        };
        for trigger in self.triggers.sensor_triggers() {
            if trigger.sensor_id() == device_id {
                trigger.on_sensor_update(&reading, &self.publisher);
            }
        }
    }

    /// Route a registry notification.
    pub fn handle_change(&self, change: &DeviceChange) {
        match change {
            DeviceChange::StateChanged {
                device_id,
                method,
                value,
            } => self.on_device_state_changed(*device_id, *method, value),
            DeviceChange::SensorValueUpdated {
                device_id,
                value_type,
                value,
                scale,
            } => self.on_sensor_value_updated(*device_id, *value_type, *value, *scale),
        }
    }

    /// Drop every registered trigger. Outstanding [`Trigger`] handles stay
    /// valid but no longer receive events.
    pub fn clear_all(&self) {
        self.triggers.clear();
    }

    #[must_use]
    pub fn device_trigger_count(&self) -> usize {
        self.triggers.device_len()
    }

    #[must_use]
    pub fn sensor_trigger_count(&self) -> usize {
        self.triggers.sensor_len()
    }
}

/// Feed `params` to `builder`, logging and skipping the rejected entries.
fn build_params<B: ParamBuilder>(mut builder: B, params: &RuleParams) -> B::Output {
    for err in builder.parse_all(params) {
        tracing::warn!(%err, "ignoring rule parameter");
    }
    builder.build()
}
