//! Threat - One in-flight hostile effect aimed at one protected actor

use crate::catalog::EffectDescriptor;
use crate::geometry::ImpactRegion;
use crate::types::{ActorId, CounterKind, ThreatHandle};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lifecycle of a threat.
///
/// Pending -> Imminent -> Resolved | Expired. A cast can also resolve or be
/// interrupted while still Pending. Terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatStatus {
    Pending,
    Imminent,
    /// The effect landed (or its impact time elapsed)
    Resolved,
    /// The cast was interrupted or cancelled before resolution
    Expired,
}

impl ThreatStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ThreatStatus::Resolved | ThreatStatus::Expired)
    }

    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    pub fn can_transition_to(self, next: ThreatStatus) -> bool {
        use ThreatStatus::*;
        matches!(
            (self, next),
            (Pending, Imminent) | (Pending, Resolved) | (Pending, Expired) | (Imminent, Resolved)
                | (Imminent, Expired)
        )
    }
}

/// Counter already issued against a threat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuedCounter {
    pub counter_id: String,
    pub kind: CounterKind,
    pub issued_at: f64,
}

/// A tracked hostile effect instance
#[derive(Debug, Clone)]
pub struct Threat {
    pub handle: ThreatHandle,
    pub caster: ActorId,
    /// Protected actor this threat is evaluated against
    pub target: ActorId,
    pub descriptor: Arc<EffectDescriptor>,
    pub cast_start: f64,
    /// Cast start plus base and additional delay, from the latest tick
    pub resolve_at: f64,
    /// When the effect next reaches the protected actor. Channels roll this
    /// forward to their next damage instance.
    pub predicted_impact: f64,
    /// Region still to be swept before impact; `None` until first predicted
    /// or while the actor cannot be reached
    pub region: Option<ImpactRegion>,
    /// Full region of the effect, frozen once the cast commits
    pub footprint: Option<ImpactRegion>,
    pub footprint_locked: bool,
    /// The actor's position (current or extrapolated) is inside the region
    pub on_course: bool,
    pub countered_by: Option<IssuedCounter>,
    status: ThreatStatus,
}

impl Threat {
    pub fn new(
        handle: ThreatHandle,
        caster: ActorId,
        target: ActorId,
        descriptor: Arc<EffectDescriptor>,
        cast_start: f64,
    ) -> Self {
        let resolve_at = cast_start + descriptor.base_delay + descriptor.additional_delay;
        Threat {
            handle,
            caster,
            target,
            descriptor,
            cast_start,
            resolve_at,
            predicted_impact: resolve_at,
            region: None,
            footprint: None,
            footprint_locked: false,
            on_course: false,
            countered_by: None,
            status: ThreatStatus::Pending,
        }
    }

    pub fn status(&self) -> ThreatStatus {
        self.status
    }

    pub fn effect_id(&self) -> &str {
        &self.descriptor.id
    }

    /// Move to `next` if the lifecycle allows it
    pub(crate) fn transition(&mut self, next: ThreatStatus) -> bool {
        if !self.status.can_transition_to(next) {
            tracing::debug!(
                threat = %self.handle,
                from = ?self.status,
                to = ?next,
                "ignored illegal threat transition"
            );
            return false;
        }
        self.status = next;
        true
    }

    pub fn time_to_impact(&self, now: f64) -> f64 {
        self.predicted_impact - now
    }

    /// End of the cast point: the last moment disabling the caster cancels
    /// the effect, or the channel end for channeled effects
    pub fn interrupt_deadline(&self) -> f64 {
        let channel = self.descriptor.geometry.channel_duration();
        if channel > 0.0 {
            self.resolve_at + channel
        } else {
            self.cast_start + self.descriptor.base_delay
        }
    }

    /// Time after which the effect can no longer hit
    pub fn resolution_time(&self) -> f64 {
        let channel = self.descriptor.geometry.channel_duration();
        if channel > 0.0 {
            self.resolve_at + channel
        } else {
            self.predicted_impact
        }
    }

    /// A persistent mitigation (immunity, invulnerability) is already up
    pub fn is_mitigated(&self) -> bool {
        self.countered_by
            .as_ref()
            .is_some_and(|issued| issued.kind.is_persistent_mitigation())
    }

    /// The counter last issued against this threat is `counter_id`
    pub fn was_answered_with(&self, counter_id: &str) -> bool {
        self.countered_by
            .as_ref()
            .is_some_and(|issued| issued.counter_id == counter_id)
    }

    /// Whether the executor should try to answer this threat now
    pub fn is_actionable(&self) -> bool {
        self.status == ThreatStatus::Imminent
            && self.on_course
            && self.region.is_some()
            && self.descriptor.responds()
            && !self.is_mitigated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_order() {
        use ThreatStatus::*;
        assert!(Pending.can_transition_to(Imminent));
        assert!(Imminent.can_transition_to(Resolved));
        assert!(Imminent.can_transition_to(Expired));
        assert!(Pending.can_transition_to(Expired));

        assert!(!Imminent.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
        for terminal in [Resolved, Expired] {
            for next in [Pending, Imminent, Resolved, Expired] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_status_flags() {
        assert!(ThreatStatus::Pending.is_active());
        assert!(ThreatStatus::Imminent.is_active());
        assert!(ThreatStatus::Resolved.is_terminal());
        assert!(ThreatStatus::Expired.is_terminal());
    }
}
