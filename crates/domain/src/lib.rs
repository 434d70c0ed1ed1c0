//! # devrules-domain
//!
//! Pure domain model for the devrules rule-evaluation core.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions
//! - Define **device vocabulary** (method codes, state, commands, change notifications)
//! - Define **sensor vocabulary** (value types, scales)
//! - Define the **comparator** shared by device and sensor rules
//! - Define **rule parameters** (trigger → condition → action building blocks)
//!   and the builders that consume rule-storage name/value pairs
//! - Hold the **sensor hysteresis** state machine
//! - Define the **trigger event** payload handed to the rule pipeline
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod compare;
pub mod device;
pub mod event;
pub mod rule;
pub mod sensor;
