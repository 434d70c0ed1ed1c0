//! In-process trigger bus backed by a tokio broadcast channel.

use tokio::sync::broadcast;

use devrules_domain::event::TriggerFired;

use crate::ports::TriggerPublisher;

/// In-process trigger bus using a tokio [`broadcast`] channel.
///
/// Rule pipelines subscribe and match fired events against the triggers
/// they own through [`TriggerFired::trigger_id`]. Publishing succeeds even
/// when there are no active subscribers (the event is simply dropped).
pub struct InProcessEventBus {
    sender: broadcast::Sender<TriggerFired>,
}

impl InProcessEventBus {
    /// Create a new event bus with the given channel capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to trigger events on this bus.
    ///
    /// Returns a receiver that will get all events published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TriggerFired> {
        self.sender.subscribe()
    }
}

impl TriggerPublisher for InProcessEventBus {
    fn publish(&self, fired: TriggerFired) {
        // broadcast::send fails only when there are zero receivers.
        if self.sender.send(fired).is_err() {
            tracing::trace!("no subscriber for fired trigger");
        }
    }
}
