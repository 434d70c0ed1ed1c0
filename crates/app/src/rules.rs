//! Live rule objects: the triggers, conditions and actions the
//! [`EventFactory`](crate::event_factory::EventFactory) hands to the rule
//! pipeline.
//!
//! Each family is a closed enum over its local variants:
//!
//! | Family | Variants | Protocol |
//! |--------|----------|----------|
//! | [`Trigger`] | device, sensor | fires [`TriggerFired`](devrules_domain::event::TriggerFired) through the publisher; `close()` |
//! | [`Condition`] | device, sensor | `evaluate()` / `validate(on_success, on_failure)` |
//! | [`Action`] | device | `execute(context)` |

mod action;
mod condition;
mod trigger;

pub use action::{Action, DeviceAction};
pub use condition::{Condition, DeviceCondition, SensorCondition};
pub use trigger::{DeviceTrigger, SensorTrigger, Trigger};

pub(crate) use trigger::TriggerRegistry;
