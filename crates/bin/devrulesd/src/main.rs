//! # devrulesd: devrules daemon
//!
//! Reads device events from stdin, one per line, and runs the configured
//! rules against a registry of virtual devices. Exits on end of input or
//! Ctrl-C.

use std::error::Error as _;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use devrules_adapter_virtual::VirtualRegistry;
use devrules_app::event_bus::InProcessEventBus;
use devrules_app::event_factory::EventFactory;
use devrulesd::config::Config;
use devrulesd::input::Input;
use devrulesd::pipeline::{self, Pipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .with_target(true)
        .init();

    // Devices
    let (registry, changes) = VirtualRegistry::new();
    for definition in &config.devices {
        registry.add(definition.clone());
    }
    let registry = Arc::new(registry);

    // Rule core
    let bus = Arc::new(InProcessEventBus::new(config.bus.capacity));
    let events = bus.subscribe();
    let factory = Arc::new(EventFactory::new(Arc::clone(&registry), bus));
    let rules = Pipeline::load(&factory, &config.rules);

    tracing::info!(
        devices = registry.len(),
        rules = rules.len(),
        "devrulesd started"
    );
    tokio::spawn(rules.run(events));
    tokio::spawn(pipeline::forward_changes(Arc::clone(&factory), changes));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    tracing::info!("end of input");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Input>() {
                    Ok(input) => {
                        if let Err(err) = input.apply(&registry) {
                            let cause = err.source().map(ToString::to_string).unwrap_or_default();
                            tracing::warn!(%err, %cause, "event rejected");
                        }
                    }
                    Err(err) => tracing::warn!(%err, %line, "unreadable input"),
                }
            }
            result = &mut shutdown => {
                result.context("waiting for Ctrl-C")?;
                tracing::info!("shutting down");
                break;
            }
        }
    }

    factory.clear_all();
    Ok(())
}
