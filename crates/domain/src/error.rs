//! Common error types used across the workspace.
//!
//! Each failure class of the rule core has its own typed error; the
//! top-level [`DevRulesError`] aggregates them through `#[from]`.
//! None of them is fatal: callers degrade to "this rule does not fire /
//! does not execute this time".

use crate::id::DeviceId;
use crate::device::Method;

/// Top-level error for the devrules workspace.
#[derive(Debug, thiserror::Error)]
pub enum DevRulesError {
    #[error("invalid rule parameter")]
    Param(#[from] ParamError),

    #[error("trigger evaluation failed")]
    Evaluation(#[from] EvaluationError),

    #[error("reference not found")]
    NotFound(#[from] NotFoundError),

    #[error("command delivery failed")]
    Delivery(#[from] DeliveryError),
}

/// A rule parameter carried a value that could not be interpreted.
///
/// The builder keeps its previous value for that field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("parameter `{name}` expects an integer, got {value}")]
    NotAnInteger {
        name: String,
        value: serde_json::Value,
    },

    #[error("parameter `{name}` expects a finite number, got {value}")]
    NotANumber {
        name: String,
        value: serde_json::Value,
    },

    #[error("parameter `{name}` is out of range: {value}")]
    OutOfRange { name: String, value: i64 },

    #[error("unknown edge code {0}")]
    UnknownEdge(i64),

    #[error("unknown sensor value type {0}")]
    UnknownValueType(serde_json::Value),
}

/// Processing a sensor reading failed; the trigger does not fire.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("trigger threshold was never configured")]
    ThresholdNotSet,

    #[error("sensor reading is not a finite number: {0}")]
    NonFiniteReading(f64),
}

/// A referenced object could not be found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A command could not be delivered to a device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("device {0} did not acknowledge the command")]
    NotAcknowledged(DeviceId),

    #[error("device {device} does not support method {method}")]
    UnsupportedMethod { device: DeviceId, method: Method },

    #[error("device {0} is unreachable")]
    Unreachable(DeviceId),
}
