//! In-memory fakes of the ports, shared by the unit tests of this crate.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::time::Instant;

use devrules_domain::device::{Command, DeviceState, Method};
use devrules_domain::error::DeliveryError;
use devrules_domain::event::TriggerFired;
use devrules_domain::id::DeviceId;
use devrules_domain::sensor::{Scale, ValueType};

use crate::ports::{DeviceHandle, DeviceRegistry, TriggerPublisher};

// ── Fake device ────────────────────────────────────────────────

struct FakeDeviceInner {
    id: DeviceId,
    class: String,
    state: Mutex<DeviceState>,
    sensors: Mutex<HashMap<(ValueType, Scale), f64>>,
    calls: Mutex<Vec<(Instant, Command)>>,
    failing: AtomicBool,
}

#[derive(Clone)]
pub(crate) struct FakeDevice {
    inner: Arc<FakeDeviceInner>,
}

impl FakeDevice {
    pub(crate) fn new(id: DeviceId, class: &str) -> Self {
        Self {
            inner: Arc::new(FakeDeviceInner {
                id,
                class: class.to_string(),
                state: Mutex::new(DeviceState::default()),
                sensors: Mutex::new(HashMap::new()),
                calls: Mutex::new(Vec::new()),
                failing: AtomicBool::new(false),
            }),
        }
    }

    pub(crate) fn fail_always(&self) {
        self.inner.failing.store(true, Ordering::SeqCst);
    }

    pub(crate) fn set_method(&self, method: Method) {
        self.inner.state.lock().unwrap().method = method;
    }

    pub(crate) fn set_sensor(&self, value_type: ValueType, scale: Scale, value: f64) {
        self.inner
            .sensors
            .lock()
            .unwrap()
            .insert((value_type, scale), value);
    }

    pub(crate) fn commands(&self) -> Vec<Command> {
        let calls = self.inner.calls.lock().unwrap();
        calls.iter().map(|(_, c)| c.clone()).collect()
    }

    /// Whole seconds between `start` and each recorded command.
    pub(crate) fn call_offsets(&self, start: Instant) -> Vec<u64> {
        let calls = self.inner.calls.lock().unwrap();
        calls
            .iter()
            .map(|(at, _)| at.duration_since(start).as_secs())
            .collect()
    }
}

impl DeviceHandle for FakeDevice {
    fn id(&self) -> DeviceId {
        self.inner.id
    }

    fn state(&self) -> DeviceState {
        self.inner.state.lock().unwrap().clone()
    }

    fn sensor_value(&self, value_type: ValueType, scale: Scale) -> Option<f64> {
        self.inner
            .sensors
            .lock()
            .unwrap()
            .get(&(value_type, scale))
            .copied()
    }

    fn class_tag(&self) -> &str {
        &self.inner.class
    }

    fn command(&self, command: Command) -> impl Future<Output = Result<(), DeliveryError>> + Send {
        self.inner
            .calls
            .lock()
            .unwrap()
            .push((Instant::now(), command));
        let result = if self.inner.failing.load(Ordering::SeqCst) {
            Err(DeliveryError::NotAcknowledged(self.inner.id))
        } else {
            Ok(())
        };
        std::future::ready(result)
    }
}

// ── Fake registry ──────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct FakeRegistry {
    devices: Mutex<HashMap<DeviceId, FakeDevice>>,
}

impl FakeRegistry {
    pub(crate) fn with(devices: Vec<FakeDevice>) -> Self {
        let map = devices.into_iter().map(|d| (d.id(), d)).collect();
        Self {
            devices: Mutex::new(map),
        }
    }

    pub(crate) fn remove(&self, id: DeviceId) {
        self.devices.lock().unwrap().remove(&id);
    }
}

impl DeviceRegistry for FakeRegistry {
    type Device = FakeDevice;

    fn device(&self, id: DeviceId) -> Option<FakeDevice> {
        self.devices.lock().unwrap().get(&id).cloned()
    }
}

// ── Spy publisher ──────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct SpyPublisher {
    events: Mutex<Vec<TriggerFired>>,
}

impl SpyPublisher {
    pub(crate) fn events(&self) -> Vec<TriggerFired> {
        self.events.lock().unwrap().clone()
    }
}

impl TriggerPublisher for SpyPublisher {
    fn publish(&self, fired: TriggerFired) {
        self.events.lock().unwrap().push(fired);
    }
}
