//! Core identifiers and enums shared across the engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an actor (hero, unit) in the game-state feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

impl From<u32> for ActorId {
    fn from(id: u32) -> Self {
        ActorId(id)
    }
}

/// Team an actor belongs to. Actors on different teams are hostile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Team(pub u8);

impl Team {
    pub fn is_hostile_to(self, other: Team) -> bool {
        self != other
    }
}

/// Handle to a tracked threat. Handles are never reused within a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ThreatHandle(pub u64);

impl fmt::Display for ThreatHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "threat#{}", self.0)
    }
}

/// What a counter-action does for the protected actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterKind {
    /// Blink, dash, displacement: leave the impact region
    Reposition,
    /// Block or absorb the damage
    DamageImmunity,
    MagicImmunity,
    Invulnerability,
    /// Invisibility, untargetability
    Untargetable,
    /// Stun, hex, silence or cyclone on the caster
    CasterDisable,
}

impl CounterKind {
    /// Whether the counter acts on the caster rather than the protected actor
    pub fn targets_caster(self) -> bool {
        matches!(self, CounterKind::CasterDisable)
    }

    /// Mitigation stays in effect through impact once issued
    pub fn is_persistent_mitigation(self) -> bool {
        matches!(
            self,
            CounterKind::DamageImmunity
                | CounterKind::MagicImmunity
                | CounterKind::Invulnerability
                | CounterKind::Untargetable
        )
    }
}

/// Whether a descriptor answers its threats or only observes them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    #[default]
    Respond,
    /// Track and log, never issue a counter
    DetectOnly,
}
