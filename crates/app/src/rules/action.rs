//! Actions resolve their target device at execution time and hand the
//! delivery over to an [`ActionExecutor`].

use std::sync::Arc;

use devrules_domain::event::TriggerFired;
use devrules_domain::rule::{DeviceActionParams, RuleKind};

use crate::action_executor::ActionExecutor;
use crate::ports::DeviceRegistry;

/// Sends a method (and optional value) to a device.
#[derive(Debug)]
pub struct DeviceAction<R> {
    registry: Arc<R>,
    params: DeviceActionParams,
}

impl<R: DeviceRegistry> DeviceAction<R> {
    pub(crate) fn new(registry: Arc<R>, params: DeviceActionParams) -> Self {
        Self { registry, params }
    }

    #[must_use]
    pub fn params(&self) -> &DeviceActionParams {
        &self.params
    }

    /// Start delivery. The fired trigger is accepted for context only.
    ///
    /// Does nothing when the device is unknown at the time of execution.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn execute(&self, context: Option<&TriggerFired>) {
        let Some(device) = self.registry.device(self.params.device_id) else {
            tracing::debug!(
                device = %self.params.device_id,
                description = %self.params.description,
                "action target not found"
            );
            return;
        };
        tracing::debug!(
            device = %self.params.device_id,
            trigger = ?context.map(|fired| fired.trigger_id),
            "executing action"
        );
        ActionExecutor::spawn(device, &self.params);
    }
}

/// A live action returned by the factory.
#[derive(Debug)]
pub enum Action<R> {
    Device(DeviceAction<R>),
}

impl<R: DeviceRegistry> Action<R> {
    #[must_use]
    pub fn kind(&self) -> RuleKind {
        match self {
            Self::Device(_) => RuleKind::Device,
        }
    }

    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn execute(&self, context: Option<&TriggerFired>) {
        match self {
            Self::Device(action) => action.execute(context),
        }
    }
}
