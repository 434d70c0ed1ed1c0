//! Device registry port: lookup, state and command dispatch.

use std::future::Future;
use std::sync::Arc;

use devrules_domain::device::{Command, DeviceState};
use devrules_domain::error::DeliveryError;
use devrules_domain::id::DeviceId;
use devrules_domain::sensor::{Scale, ValueType};

/// A live device as seen through the registry.
///
/// Handles are cheap to clone and may outlive the registry entry they came
/// from; the rule core never stores them beyond a single evaluation or action.
pub trait DeviceHandle: Clone + Send + Sync + 'static {
    fn id(&self) -> DeviceId;

    /// Last method executed by the device and its argument.
    fn state(&self) -> DeviceState;

    /// Current reading for `value_type` in `scale`, if the device reports one.
    fn sensor_value(&self, value_type: ValueType, scale: Scale) -> Option<f64>;

    /// Device class, such as [`ONE_WAY_RF_CLASS`](devrules_domain::device::ONE_WAY_RF_CLASS).
    fn class_tag(&self) -> &str;

    /// Send a command to the device.
    ///
    /// Resolves once the device layer knows whether delivery succeeded.
    fn command(&self, command: Command) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// Resolves device ids into live handles.
pub trait DeviceRegistry: Send + Sync + 'static {
    type Device: DeviceHandle;

    /// Look up a device; `None` when it was removed or never existed.
    fn device(&self, id: DeviceId) -> Option<Self::Device>;
}

impl<T: DeviceRegistry> DeviceRegistry for Arc<T> {
    type Device = T::Device;

    fn device(&self, id: DeviceId) -> Option<Self::Device> {
        (**self).device(id)
    }
}
