//! Action executor: deliver one command to one device with bounded retries.
//!
//! Ordinary devices report delivery failures, so a failed command is retried
//! after [`RETRY_DELAY`] until the repeat budget is spent. One-way RF devices
//! ([`ONE_WAY_RF_CLASS`]) never confirm delivery; instead of retrying, the
//! command is transmitted `repeats` times up front, [`REPEAT_INTERVAL`] apart.
//!
//! Every attempt runs on a detached tokio task that owns everything it
//! needs. Nobody holds a handle to the executor and nothing cancels it:
//! once fired, an action is independent of the rule that fired it.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::Instrument;

use devrules_domain::device::{Command, ONE_WAY_RF_CLASS};
use devrules_domain::rule::DeviceActionParams;

use crate::ports::DeviceHandle;

/// Delay before retrying a failed delivery.
pub const RETRY_DELAY: Duration = Duration::from_secs(60);

/// Spacing of the blind repeats sent to one-way RF devices.
pub const REPEAT_INTERVAL: Duration = Duration::from_secs(3);

/// One command bound for one device.
pub struct ActionExecutor<D> {
    device: D,
    command: Command,
}

impl<D: DeviceHandle> ActionExecutor<D> {
    /// Start delivering the action to `device`.
    ///
    /// The first attempt is scheduled immediately; nothing is awaited here.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn spawn(device: D, params: &DeviceActionParams) {
        let span = tracing::info_span!(
            "action",
            device = %device.id(),
            method = %params.method,
            description = %params.description,
        );
        let executor = Arc::new(Self {
            device,
            command: Command::from_rule(params.method, params.value, &params.description),
        });

        let one_way = executor.device.class_tag() == ONE_WAY_RF_CLASS && params.repeats > 1;
        let retries = if one_way {
            let start = Instant::now();
            for i in 1..params.repeats {
                let executor = Arc::clone(&executor);
                let deadline = start + REPEAT_INTERVAL * u32::from(i);
                tokio::spawn(
                    async move {
                        tokio::time::sleep_until(deadline).await;
                        executor.deliver_once(i).await;
                    }
                    .instrument(span.clone()),
                );
            }
            0
        } else {
            params.repeats
        };

        tokio::spawn(async move { executor.deliver(retries).await }.instrument(span));
    }

    /// Blind repeat for one-way devices: failures are not retried.
    async fn deliver_once(&self, repeat: u8) {
        if let Err(err) = self.device.command(self.command.clone()).await {
            tracing::debug!(%err, repeat, "repeat transmission failed");
        }
    }

    async fn deliver(&self, mut retries: u8) {
        loop {
            let Err(err) = self.device.command(self.command.clone()).await else {
                tracing::debug!("command delivered");
                return;
            };
            retries = retries.saturating_sub(1);
            if retries == 0 {
                tracing::warn!(%err, "giving up on command delivery");
                return;
            }
            tracing::warn!(%err, retries, "command delivery failed, retrying");
            tokio::time::sleep(RETRY_DELAY).await;
        }
    }
}
