//! # devrules-adapter-virtual
//!
//! In-memory device registry with simulated devices, for testing and
//! demonstration purposes.
//!
//! ## Behaviour
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | `command` | applies the method to the device state, then notifies `StateChanged` |
//! | `report_state` | overwrites the state, then notifies `StateChanged` |
//! | `report_sensor` | stores the reading, then notifies `SensorValueUpdated` |
//!
//! Notifications go out on an unbounded channel handed back by
//! [`VirtualRegistry::new`]; whoever owns the receiver forwards them to the
//! event factory. A device declared with `failures = n` rejects its first
//! `n` deliveries.
//!
//! ## Dependency rule
//!
//! Depends on `devrules-app` (port traits) and `devrules-domain` only.

mod devices;

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tokio::sync::mpsc;

use devrules_app::ports::{DeviceHandle, DeviceRegistry};
use devrules_domain::device::{DeviceChange, DeviceState, Method};
use devrules_domain::error::NotFoundError;
use devrules_domain::id::DeviceId;
use devrules_domain::sensor::{Scale, ValueType};

pub use devices::{DeviceDefinition, VirtualDevice};

/// Registry of simulated devices.
#[derive(Debug)]
pub struct VirtualRegistry {
    devices: RwLock<HashMap<DeviceId, VirtualDevice>>,
    changes: mpsc::UnboundedSender<DeviceChange>,
}

impl VirtualRegistry {
    /// Create an empty registry and the receiving end of its notifications.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DeviceChange>) {
        let (changes, receiver) = mpsc::unbounded_channel();
        let registry = Self {
            devices: RwLock::new(HashMap::new()),
            changes,
        };
        (registry, receiver)
    }

    /// Add a device, replacing any previous device with the same id.
    pub fn add(&self, definition: DeviceDefinition) -> VirtualDevice {
        let device = VirtualDevice::new(definition, self.changes.clone());
        tracing::debug!(device = ?device, "virtual device added");
        self.write().insert(device.id(), device.clone());
        device
    }

    /// Remove a device. Returns `false` when it was not registered.
    pub fn remove(&self, id: DeviceId) -> bool {
        self.write().remove(&id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Report a state change for a device, as its hardware would.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when the device is not registered.
    pub fn report_state(
        &self,
        id: DeviceId,
        method: Method,
        value: impl Into<String>,
    ) -> Result<(), NotFoundError> {
        self.lookup(id)?.report_state(DeviceState {
            method,
            value: value.into(),
        });
        Ok(())
    }

    /// Report a sensor reading for a device.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when the device is not registered.
    pub fn report_sensor(
        &self,
        id: DeviceId,
        value_type: ValueType,
        value: f64,
        scale: Scale,
    ) -> Result<(), NotFoundError> {
        self.lookup(id)?.report_sensor(value_type, value, scale);
        Ok(())
    }

    fn lookup(&self, id: DeviceId) -> Result<VirtualDevice, NotFoundError> {
        self.device(id).ok_or_else(|| NotFoundError {
            entity: "Device",
            id: id.to_string(),
        })
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<DeviceId, VirtualDevice>> {
        self.devices.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<DeviceId, VirtualDevice>> {
        self.devices.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeviceRegistry for VirtualRegistry {
    type Device = VirtualDevice;

    fn device(&self, id: DeviceId) -> Option<VirtualDevice> {
        self.read().get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devrules_domain::device::ONE_WAY_RF_CLASS;

    #[test]
    fn should_resolve_added_device() {
        let (registry, _rx) = VirtualRegistry::new();
        registry.add(DeviceDefinition::new(DeviceId::new(3), "Garden").with_class(ONE_WAY_RF_CLASS));

        let device = registry.device(DeviceId::new(3)).unwrap();
        assert_eq!(device.name(), "Garden");
        assert_eq!(device.class_tag(), ONE_WAY_RF_CLASS);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn should_return_none_when_device_removed() {
        let (registry, _rx) = VirtualRegistry::new();
        registry.add(DeviceDefinition::new(DeviceId::new(3), "Garden"));

        assert!(registry.remove(DeviceId::new(3)));
        assert!(!registry.remove(DeviceId::new(3)));
        assert!(registry.device(DeviceId::new(3)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn should_return_not_found_when_reporting_unknown_device() {
        let (registry, _rx) = VirtualRegistry::new();

        let err = registry
            .report_state(DeviceId::new(42), Method::TURN_ON, "")
            .unwrap_err();
        assert_eq!(err.to_string(), "Device 42 not found");
        assert!(registry
            .report_sensor(DeviceId::new(42), ValueType::Temperature, 1.0, Scale::new(0))
            .is_err());
    }

    #[test]
    fn should_notify_when_state_reported() {
        let (registry, mut rx) = VirtualRegistry::new();
        registry.add(DeviceDefinition::new(DeviceId::new(3), "Garden"));

        registry
            .report_state(DeviceId::new(3), Method::DIM, "40")
            .unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            DeviceChange::StateChanged {
                device_id: DeviceId::new(3),
                method: Method::DIM,
                value: "40".to_string(),
            }
        );
        let state = registry.device(DeviceId::new(3)).unwrap().state();
        assert_eq!(state.method, Method::DIM);
    }

    #[test]
    fn should_notify_when_sensor_reported() {
        let (registry, mut rx) = VirtualRegistry::new();
        registry.add(DeviceDefinition::new(DeviceId::new(8), "Attic"));

        registry
            .report_sensor(DeviceId::new(8), ValueType::Temperature, 31.5, Scale::new(0))
            .unwrap();

        let change = rx.try_recv().unwrap();
        assert_eq!(change.device_id(), DeviceId::new(8));
        assert_eq!(change.reading().map(|r| r.value), Some(31.5));
    }
}
