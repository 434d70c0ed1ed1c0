//! Virtual device handle: actuator state, sensor readings and scripted
//! delivery failures behind a cheap-to-clone handle.

mod actuator;
mod sensor;

pub use actuator::apply_method;
pub use sensor::SensorReadings;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Deserialize;
use tokio::sync::mpsc;

use devrules_app::ports::DeviceHandle;
use devrules_domain::device::{Command, DeviceChange, DeviceState};
use devrules_domain::error::DeliveryError;
use devrules_domain::id::DeviceId;
use devrules_domain::sensor::{Scale, ValueType};

/// Declaration of one virtual device.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceDefinition {
    pub id: DeviceId,
    pub name: String,
    /// Device class, e.g. `"433"` for one-way RF receivers.
    #[serde(default)]
    pub class: String,
    /// Number of deliveries that fail before the device starts answering.
    #[serde(default)]
    pub failures: u32,
}

impl DeviceDefinition {
    #[must_use]
    pub fn new(id: DeviceId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            class: String::new(),
            failures: 0,
        }
    }

    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    #[must_use]
    pub fn with_failures(mut self, failures: u32) -> Self {
        self.failures = failures;
        self
    }
}

struct Inner {
    id: DeviceId,
    name: String,
    class: String,
    state: Mutex<DeviceState>,
    readings: Mutex<SensorReadings>,
    failures: AtomicU32,
    changes: mpsc::UnboundedSender<DeviceChange>,
}

/// A simulated device.
#[derive(Clone)]
pub struct VirtualDevice {
    inner: Arc<Inner>,
}

impl VirtualDevice {
    pub(crate) fn new(
        definition: DeviceDefinition,
        changes: mpsc::UnboundedSender<DeviceChange>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: definition.id,
                name: definition.name,
                class: definition.class,
                state: Mutex::new(DeviceState::default()),
                readings: Mutex::new(SensorReadings::default()),
                failures: AtomicU32::new(definition.failures),
                changes,
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Overwrite the state, as if the device reported it, and notify.
    pub fn report_state(&self, state: DeviceState) {
        *self.lock_state() = state.clone();
        self.notify(DeviceChange::StateChanged {
            device_id: self.inner.id,
            method: state.method,
            value: state.value,
        });
    }

    /// Store a sensor reading and notify.
    pub fn report_sensor(&self, value_type: ValueType, value: f64, scale: Scale) {
        self.lock_readings().set(value_type, scale, value);
        self.notify(DeviceChange::SensorValueUpdated {
            device_id: self.inner.id,
            value_type,
            value,
            scale,
        });
    }

    fn deliver(&self, command: &Command) -> Result<(), DeliveryError> {
        let scripted_failure = self
            .inner
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if scripted_failure {
            return Err(DeliveryError::NotAcknowledged(self.inner.id));
        }

        let state = {
            let mut state = self.lock_state();
            *state = apply_method(&state, command.method, command.value).ok_or(
                DeliveryError::UnsupportedMethod {
                    device: self.inner.id,
                    method: command.method,
                },
            )?;
            state.clone()
        };
        tracing::info!(
            device = %self.inner.id,
            method = %state.method,
            origin = %command.origin,
            "virtual device executed command"
        );
        self.notify(DeviceChange::StateChanged {
            device_id: self.inner.id,
            method: state.method,
            value: state.value,
        });
        Ok(())
    }

    fn notify(&self, change: DeviceChange) {
        if self.inner.changes.send(change).is_err() {
            tracing::trace!(device = %self.inner.id, "no listener for device changes");
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, DeviceState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_readings(&self) -> std::sync::MutexGuard<'_, SensorReadings> {
        self.inner
            .readings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for VirtualDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualDevice")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("class", &self.inner.class)
            .finish_non_exhaustive()
    }
}

impl DeviceHandle for VirtualDevice {
    fn id(&self) -> DeviceId {
        self.inner.id
    }

    fn state(&self) -> DeviceState {
        self.lock_state().clone()
    }

    fn sensor_value(&self, value_type: ValueType, scale: Scale) -> Option<f64> {
        self.lock_readings().get(value_type, scale)
    }

    fn class_tag(&self) -> &str {
        &self.inner.class
    }

    async fn command(&self, command: Command) -> Result<(), DeliveryError> {
        self.deliver(&command)
    }
}
