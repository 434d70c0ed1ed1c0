//! Triggers and the registry that holds them while they are live.

use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use devrules_domain::device::Method;
use devrules_domain::error::EvaluationError;
use devrules_domain::event::{TriggerFired, TriggerPayload};
use devrules_domain::id::{DeviceId, TriggerId};
use devrules_domain::rule::{
    DeviceTriggerParams, RuleKind, SensorHysteresis, SensorTriggerParams, Transition, TriggerState,
};
use devrules_domain::sensor::SensorReading;

use crate::ports::TriggerPublisher;

/// The device and sensor trigger sets.
///
/// Dispatch iterates over snapshots, so triggers may be added or closed
/// while an unrelated dispatch is running.
#[derive(Debug, Default)]
pub(crate) struct TriggerRegistry {
    device: RwLock<Vec<Arc<DeviceTrigger>>>,
    sensor: RwLock<Vec<Arc<SensorTrigger>>>,
}

impl TriggerRegistry {
    pub(crate) fn insert(&self, trigger: &Trigger) {
        match trigger {
            Trigger::Device(t) => write(&self.device).push(Arc::clone(t)),
            Trigger::Sensor(t) => write(&self.sensor).push(Arc::clone(t)),
        }
    }

    /// Remove the trigger from whichever set holds it.
    pub(crate) fn remove(&self, id: TriggerId) -> bool {
        let mut device = write(&self.device);
        if let Some(pos) = device.iter().position(|t| t.id == id) {
            device.remove(pos);
            return true;
        }
        drop(device);

        let mut sensor = write(&self.sensor);
        if let Some(pos) = sensor.iter().position(|t| t.id == id) {
            sensor.remove(pos);
            return true;
        }
        false
    }

    pub(crate) fn clear(&self) {
        write(&self.device).clear();
        write(&self.sensor).clear();
    }

    pub(crate) fn device_triggers(&self) -> Vec<Arc<DeviceTrigger>> {
        read(&self.device).clone()
    }

    pub(crate) fn sensor_triggers(&self) -> Vec<Arc<SensorTrigger>> {
        read(&self.sensor).clone()
    }

    pub(crate) fn device_len(&self) -> usize {
        read(&self.device).len()
    }

    pub(crate) fn sensor_len(&self) -> usize {
        read(&self.sensor).len()
    }
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Fires when a device executes a given method.
#[derive(Debug)]
pub struct DeviceTrigger {
    id: TriggerId,
    params: DeviceTriggerParams,
    registry: Weak<TriggerRegistry>,
}

impl DeviceTrigger {
    pub(crate) fn new(params: DeviceTriggerParams, registry: Weak<TriggerRegistry>) -> Self {
        Self {
            id: TriggerId::new(),
            params,
            registry,
        }
    }

    #[must_use]
    pub fn id(&self) -> TriggerId {
        self.id
    }

    #[must_use]
    pub fn params(&self) -> &DeviceTriggerParams {
        &self.params
    }

    pub(crate) fn fire<P: TriggerPublisher>(&self, publisher: &P, method: Method) {
        tracing::debug!(
            trigger = %self.id,
            device = %self.params.device_id,
            %method,
            "device trigger fired"
        );
        publisher.publish(TriggerFired::new(
            self.id,
            TriggerPayload::Device {
                client_device_id: self.params.device_id,
                method,
            },
        ));
    }
}

/// Fires when a sensor reading crosses a threshold, with hysteresis.
#[derive(Debug)]
pub struct SensorTrigger {
    id: TriggerId,
    sensor_id: DeviceId,
    hysteresis: Mutex<SensorHysteresis>,
    registry: Weak<TriggerRegistry>,
}

impl SensorTrigger {
    pub(crate) fn new(params: SensorTriggerParams, registry: Weak<TriggerRegistry>) -> Self {
        Self {
            id: TriggerId::new(),
            sensor_id: params.sensor_id,
            hysteresis: Mutex::new(SensorHysteresis::new(params)),
            registry,
        }
    }

    #[must_use]
    pub fn id(&self) -> TriggerId {
        self.id
    }

    #[must_use]
    pub fn sensor_id(&self) -> DeviceId {
        self.sensor_id
    }

    #[must_use]
    pub fn params(&self) -> SensorTriggerParams {
        *self.lock().params()
    }

    #[must_use]
    pub fn state(&self) -> TriggerState {
        self.lock().state()
    }

    /// Feed one reading. Evaluation errors are logged and end as "no fire".
    pub(crate) fn on_sensor_update<P: TriggerPublisher>(
        &self,
        reading: &SensorReading,
        publisher: &P,
    ) {
        match self.process(reading) {
            Ok(Transition::Fired) => {
                tracing::debug!(
                    trigger = %self.id,
                    sensor = %self.sensor_id,
                    value = reading.value,
                    "sensor trigger fired"
                );
                publisher.publish(TriggerFired::new(
                    self.id,
                    TriggerPayload::Sensor {
                        client_sensor_id: self.sensor_id,
                        value: reading.value,
                        value_type: reading.value_type,
                        scale: reading.scale,
                    },
                ));
            }
            Ok(transition) => {
                tracing::trace!(trigger = %self.id, ?transition, "sensor update processed");
            }
            Err(err) => {
                tracing::warn!(trigger = %self.id, %err, "sensor update ignored");
            }
        }
    }

    fn process(&self, reading: &SensorReading) -> Result<Transition, EvaluationError> {
        self.lock().process(reading)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SensorHysteresis> {
        self.hysteresis
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// A live trigger returned by the factory.
#[derive(Debug, Clone)]
pub enum Trigger {
    Device(Arc<DeviceTrigger>),
    Sensor(Arc<SensorTrigger>),
}

impl Trigger {
    #[must_use]
    pub fn id(&self) -> TriggerId {
        match self {
            Self::Device(t) => t.id,
            Self::Sensor(t) => t.id,
        }
    }

    #[must_use]
    pub fn kind(&self) -> RuleKind {
        match self {
            Self::Device(_) => RuleKind::Device,
            Self::Sensor(_) => RuleKind::Sensor,
        }
    }

    /// Unregister the trigger. Closing twice, or after the factory was
    /// cleared or dropped, does nothing.
    pub fn close(&self) {
        let registry = match self {
            Self::Device(t) => &t.registry,
            Self::Sensor(t) => &t.registry,
        };
        if let Some(registry) = registry.upgrade() {
            registry.remove(self.id());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devrules_domain::rule::ParamBuilder;
    use crate::testing::SpyPublisher;
    use devrules_domain::compare::Edge;
    use devrules_domain::sensor::{Scale, ValueType};

    fn registry() -> Arc<TriggerRegistry> {
        Arc::new(TriggerRegistry::default())
    }

    fn device_trigger(registry: &Arc<TriggerRegistry>) -> Trigger {
        let params = DeviceTriggerParams::builder()
            .device_id(DeviceId::new(1))
            .method(Method::TURN_ON)
            .build();
        let trigger = Trigger::Device(Arc::new(DeviceTrigger::new(
            params,
            Arc::downgrade(registry),
        )));
        registry.insert(&trigger);
        trigger
    }

    #[test]
    fn should_remove_trigger_on_close() {
        let registry = registry();
        let trigger = device_trigger(&registry);
        assert_eq!(registry.device_len(), 1);

        trigger.close();
        assert_eq!(registry.device_len(), 0);
    }

    #[test]
    fn should_tolerate_closing_twice() {
        let registry = registry();
        let trigger = device_trigger(&registry);
        let other = device_trigger(&registry);

        trigger.close();
        trigger.close();
        assert_eq!(registry.device_len(), 1);
        assert_eq!(registry.device_triggers()[0].id(), other.id());
    }

    #[test]
    fn should_tolerate_closing_after_registry_dropped() {
        let registry = registry();
        let trigger = device_trigger(&registry);
        drop(registry);
        trigger.close();
    }

    #[test]
    fn should_keep_snapshot_stable_while_trigger_closes() {
        let registry = registry();
        let trigger = device_trigger(&registry);
        let snapshot = registry.device_triggers();

        trigger.close();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.device_len(), 0);
    }

    #[test]
    fn should_publish_sensor_payload_when_fired() {
        let registry = registry();
        let params = SensorTriggerParams::builder()
            .sensor_id(DeviceId::new(7))
            .value_type(ValueType::Watt)
            .scale(Scale::new(2))
            .threshold(100.0)
            .edge(Edge::Greater)
            .build();
        let trigger = SensorTrigger::new(params, Arc::downgrade(&registry));
        let publisher = SpyPublisher::default();

        for value in [50.0, 150.0] {
            let reading = SensorReading {
                value_type: ValueType::Watt,
                value,
                scale: Scale::new(2),
            };
            trigger.on_sensor_update(&reading, &publisher);
        }

        let events = publisher.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].trigger_id, trigger.id());
        assert_eq!(
            events[0].payload,
            TriggerPayload::Sensor {
                client_sensor_id: DeviceId::new(7),
                value: 150.0,
                value_type: ValueType::Watt,
                scale: Scale::new(2),
            }
        );
    }

    #[test]
    fn should_swallow_evaluation_error_without_firing() {
        let registry = registry();
        let params = SensorTriggerParams::builder()
            .sensor_id(DeviceId::new(7))
            .value_type(ValueType::Watt)
            .scale(Scale::new(0))
            .build();
        let trigger = SensorTrigger::new(params, Arc::downgrade(&registry));
        let publisher = SpyPublisher::default();

        let reading = SensorReading {
            value_type: ValueType::Watt,
            value: 10.0,
            scale: Scale::new(0),
        };
        trigger.on_sensor_update(&reading, &publisher);
        trigger.on_sensor_update(&reading, &publisher);

        assert!(publisher.events().is_empty());
        assert_eq!(trigger.state(), TriggerState::Idle);
    }
}
