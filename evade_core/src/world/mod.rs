//! World access - tick context, snapshots and the collaborator traits the
//! host implements

mod snapshot;

pub use snapshot::{ActorResources, ActorState, CounterResource, WorldSnapshot};

use crate::executor::CounterCommand;
use crate::types::ActorId;
use std::collections::HashMap;

/// Source of effect-specific scalars ("damage_delay", "delay", ...)
///
/// Values may change during a match (ability level ups), so the tracker
/// re-reads them for every threat.
pub trait EffectParameterSource {
    fn effect_parameter(&self, effect_id: &str, name: &str) -> Option<f64>;
}

/// Issues counter-actions in the game.
///
/// Implementations answer synchronously within the tick. A rejection means
/// the action was available at resolve time but refused at issue time.
pub trait ActionIssuer {
    fn issue(&mut self, actor: ActorId, command: &CounterCommand) -> Result<(), String>;
}

/// Parameter table keyed by effect then scalar name
#[derive(Debug, Clone, Default)]
pub struct StaticParameters {
    values: HashMap<String, HashMap<String, f64>>,
}

impl StaticParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, effect_id: &str, name: &str, value: f64) {
        self.values
            .entry(effect_id.to_string())
            .or_default()
            .insert(name.to_string(), value);
    }

    pub fn with(mut self, effect_id: &str, name: &str, value: f64) -> Self {
        self.set(effect_id, name, value);
        self
    }

    /// Insert every scalar of one effect
    pub fn extend_effect(&mut self, effect_id: &str, data: &HashMap<String, f64>) {
        let entry = self.values.entry(effect_id.to_string()).or_default();
        for (name, value) in data {
            entry.insert(name.clone(), *value);
        }
    }
}

impl EffectParameterSource for StaticParameters {
    fn effect_parameter(&self, effect_id: &str, name: &str) -> Option<f64> {
        self.values.get(effect_id)?.get(name).copied()
    }
}

/// Immutable view of the world for one evaluation tick.
///
/// Built once at tick start and passed by reference through tracker,
/// predictor, resolver and executor so every decision in a tick sees the
/// same state.
#[derive(Clone, Copy)]
pub struct TickContext<'a> {
    pub now: f64,
    pub world: &'a WorldSnapshot,
    pub params: &'a dyn EffectParameterSource,
}

impl<'a> TickContext<'a> {
    pub fn new(now: f64, world: &'a WorldSnapshot, params: &'a dyn EffectParameterSource) -> Self {
        TickContext { now, world, params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_parameters() {
        let params = StaticParameters::new().with("lina_laguna_blade", "damage_delay", 0.25);
        assert_eq!(
            params.effect_parameter("lina_laguna_blade", "damage_delay"),
            Some(0.25)
        );
        assert_eq!(params.effect_parameter("lina_laguna_blade", "radius"), None);
        assert_eq!(params.effect_parameter("unknown", "damage_delay"), None);
    }

    #[test]
    fn test_extend_effect_overrides() {
        let mut params = StaticParameters::new().with("x", "delay", 1.0);
        let mut data = HashMap::new();
        data.insert("delay".to_string(), 2.0);
        data.insert("radius".to_string(), 175.0);
        params.extend_effect("x", &data);
        assert_eq!(params.effect_parameter("x", "delay"), Some(2.0));
        assert_eq!(params.effect_parameter("x", "radius"), Some(175.0));
    }
}
