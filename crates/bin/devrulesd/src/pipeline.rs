//! Minimal rule pipeline: matches fired triggers to the rule that owns
//! them, checks the rule's conditions and runs its actions.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use devrules_app::event_factory::EventFactory;
use devrules_app::ports::{DeviceRegistry, TriggerPublisher};
use devrules_app::rules::{Action, Condition, Trigger};
use devrules_domain::device::DeviceChange;
use devrules_domain::event::TriggerFired;
use devrules_domain::id::TriggerId;

use crate::config::RuleConfig;

/// A loaded rule.
pub struct Rule<R> {
    name: String,
    trigger: Trigger,
    conditions: Vec<Condition<R>>,
    actions: Vec<Action<R>>,
}

impl<R: DeviceRegistry> Rule<R> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }
}

/// Every loaded rule, keyed by the id of its trigger.
pub struct Pipeline<R> {
    rules: HashMap<TriggerId, Rule<R>>,
}

impl<R: DeviceRegistry> Pipeline<R> {
    /// Create each rule's trigger, conditions and actions through the factory.
    ///
    /// Conditions and actions the factory does not handle locally are left
    /// out of the rule.
    #[must_use]
    pub fn load<P: TriggerPublisher>(factory: &EventFactory<R, P>, configs: &[RuleConfig]) -> Self {
        let rules = configs
            .iter()
            .map(|config| {
                let rule = Self::build_rule(factory, config);
                (rule.trigger.id(), rule)
            })
            .collect();
        Self { rules }
    }

    fn build_rule<P: TriggerPublisher>(factory: &EventFactory<R, P>, config: &RuleConfig) -> Rule<R> {
        let trigger = factory.create_trigger(config.trigger.kind, &config.trigger.params);
        let conditions = config
            .conditions
            .iter()
            .filter_map(|c| {
                let condition = factory.create_condition(c.kind, &c.params);
                if condition.is_none() {
                    tracing::warn!(rule = %config.name, kind = %c.kind, "condition skipped, not handled locally");
                }
                condition
            })
            .collect();
        let actions = config
            .actions
            .iter()
            .filter_map(|a| {
                let action = factory.create_action(a.kind, &a.params, &config.description);
                if action.is_none() {
                    tracing::warn!(rule = %config.name, kind = %a.kind, "action skipped, not handled locally");
                }
                action
            })
            .collect();
        tracing::info!(
            rule = %config.name,
            trigger = %trigger.id(),
            kind = %trigger.kind(),
            "rule loaded"
        );
        Rule {
            name: config.name.clone(),
            trigger,
            conditions,
            actions,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule<R>> {
        self.rules.values()
    }

    /// Run the rule owning the fired trigger. Returns `true` when its
    /// actions were executed.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn handle(&self, fired: &TriggerFired) -> bool {
        let Some(rule) = self.rules.get(&fired.trigger_id) else {
            tracing::debug!(trigger = %fired.trigger_id, "no rule for fired trigger");
            return false;
        };
        if let Some(failed) = rule.conditions.iter().find(|c| !c.evaluate()) {
            tracing::info!(rule = %rule.name, condition = %failed.kind(), "conditions not met");
            return false;
        }
        tracing::info!(rule = %rule.name, actions = rule.actions.len(), "running rule");
        for action in &rule.actions {
            tracing::debug!(rule = %rule.name, kind = %action.kind(), "executing action");
            action.execute(Some(fired));
        }
        true
    }

    /// Handle fired triggers until the bus closes.
    pub async fn run(self, mut events: broadcast::Receiver<TriggerFired>) {
        loop {
            match events.recv().await {
                Ok(fired) => {
                    self.handle(&fired);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "rule pipeline lagging, fired triggers dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return,
            }
        }
    }
}

/// Forward registry notifications to the factory until the registry is
/// dropped.
pub async fn forward_changes<R, P>(
    factory: Arc<EventFactory<R, P>>,
    mut changes: mpsc::UnboundedReceiver<DeviceChange>,
) where
    R: DeviceRegistry,
    P: TriggerPublisher,
{
    while let Some(change) = changes.recv().await {
        factory.handle_change(&change);
    }
}
