//! Counter resolution - Which counters can answer a threat right now
//!
//! Walks the descriptor's counter catalog in order and keeps the entries
//! that are usable this tick. The catalog order is the priority; the
//! resolver filters but never re-sorts.

use crate::catalog::{CounterAction, CounterVocabulary};
use crate::tracker::Threat;
use crate::world::ActorResources;

/// Usable counters for `threat`, in descriptor priority order.
///
/// An empty result is the normal "nothing to do" answer.
pub fn resolve<'v>(
    threat: &Threat,
    vocabulary: &'v CounterVocabulary,
    resources: &ActorResources,
    now: f64,
) -> Vec<&'v CounterAction> {
    let descriptor = &threat.descriptor;
    if !descriptor.responds() {
        return Vec::new();
    }

    descriptor
        .counter_catalog
        .iter()
        .filter_map(|id| {
            let action = vocabulary.get(id);
            if action.is_none() {
                tracing::trace!(counter = %id, effect = %descriptor.id, "counter not in vocabulary");
            }
            action
        })
        .filter(|action| resources.is_available(&action.id, action.cost))
        .filter(|action| {
            let disables = action.is_disable() || descriptor.is_disable(&action.id);
            !disables || disable_window_open(threat, action, now)
        })
        .collect()
}

/// Whether a disable issued now lands before the caster's cast commits (or
/// its channel ends) and before the effect next reaches the actor
pub fn disable_window_open(threat: &Threat, action: &CounterAction, now: f64) -> bool {
    let applies_at = now + action.min_application_time;
    applies_at < threat.interrupt_deadline() && applies_at <= threat.predicted_impact
}
