//! # devrulesd: devrules daemon
//!
//! Composition root that wires the virtual registry, the event factory and
//! a minimal rule pipeline together.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Register the configured virtual devices
//! - Create every configured rule through the event factory
//! - Forward registry notifications to the factory
//! - Run matched rules: conditions (logical AND), then actions
//! - Feed device events read from stdin to the registry
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no rule logic belongs here.

pub mod config;
pub mod input;
pub mod pipeline;
