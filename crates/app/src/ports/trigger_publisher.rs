//! Trigger publisher port: hands fired triggers to the rule pipeline.

use devrules_domain::event::TriggerFired;

/// Receives every trigger firing.
///
/// Publishing never blocks the dispatch path and never fails: a pipeline
/// that is not listening simply misses the event.
pub trait TriggerPublisher: Send + Sync + 'static {
    fn publish(&self, fired: TriggerFired);
}

impl<T: TriggerPublisher> TriggerPublisher for std::sync::Arc<T> {
    fn publish(&self, fired: TriggerFired) {
        (**self).publish(fired);
    }
}
