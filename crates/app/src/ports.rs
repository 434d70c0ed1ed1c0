//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the rule core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod registry;
pub mod trigger_publisher;

pub use registry::{DeviceHandle, DeviceRegistry};
pub use trigger_publisher::TriggerPublisher;
