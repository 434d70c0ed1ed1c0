//! # devrules-app
//!
//! Application layer: the rule-evaluation core and its **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceRegistry` / `DeviceHandle`: device lookup, state, sensor values, commands
//!   - `TriggerPublisher`: receives fired triggers on behalf of the rule pipeline
//! - Provide the **driving/inbound** entry point:
//!   - `EventFactory`: creates triggers, conditions and actions from rule-storage
//!     parameters, owns the live triggers and routes device notifications to them
//! - Run actions against unreliable devices (`ActionExecutor`)
//! - Provide **in-process infrastructure** (trigger event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `devrules-domain` only (plus `tokio` for timers and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod action_executor;
pub mod event_bus;
pub mod event_factory;
pub mod ports;
pub mod rules;

#[cfg(test)]
mod testing;
