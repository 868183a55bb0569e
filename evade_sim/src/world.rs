//! ToyWorld - Minimal game state the engine's orders are applied to

use crate::scenario::Scenario;
use evade_core::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// How long a self-cast mitigation protects its owner
const MITIGATION_DURATION: f64 = 2.5;
/// How long a disable keeps a caster from acting
const DISABLE_DURATION: f64 = 1.5;

#[derive(Debug, Clone)]
pub struct SimActor {
    pub state: ActorState,
    pub protected: bool,
    pub mitigated_until: f64,
    pub disabled_until: f64,
}

/// An order the world accepted
#[derive(Debug, Clone)]
pub struct AppliedOrder {
    pub time: f64,
    pub actor: ActorId,
    pub command: CounterCommand,
}

pub struct ToyWorld {
    actors: BTreeMap<ActorId, SimActor>,
    resources: HashMap<ActorId, ActorResources>,
    /// Cooldown applied when a counter is used
    cooldowns: HashMap<(ActorId, String), f64>,
    vocabulary: Arc<CounterVocabulary>,
    rng: StdRng,
    reject_chance: f64,
    now: f64,
    applied: Vec<AppliedOrder>,
}

impl ToyWorld {
    pub fn from_scenario(scenario: &Scenario, vocabulary: Arc<CounterVocabulary>) -> Self {
        let radius = scenario.constants.default_actor_radius;
        let mut actors = BTreeMap::new();
        let mut resources = HashMap::new();
        let mut cooldowns = HashMap::new();

        for spec in &scenario.actors {
            let id = spec.actor_id();
            actors.insert(
                id,
                SimActor {
                    state: spec.to_state(radius),
                    protected: spec.protected,
                    mitigated_until: f64::NEG_INFINITY,
                    disabled_until: f64::NEG_INFINITY,
                },
            );

            let mut owned = ActorResources::new(spec.mana);
            for counter in &spec.counters {
                let resource = CounterResource {
                    charges: counter.charges,
                    ..CounterResource::on_cooldown(counter.ready_in)
                };
                owned = owned.with_counter(&counter.id, resource);
                cooldowns.insert((id, counter.id.clone()), counter.cooldown);
            }
            resources.insert(id, owned);
        }

        ToyWorld {
            actors,
            resources,
            cooldowns,
            vocabulary,
            rng: StdRng::seed_from_u64(scenario.seed),
            reject_chance: scenario.reject_chance,
            now: 0.0,
            applied: Vec::new(),
        }
    }

    pub fn actor(&self, id: ActorId) -> Option<&SimActor> {
        self.actors.get(&id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut SimActor> {
        self.actors.get_mut(&id)
    }

    pub fn protected(&self) -> impl Iterator<Item = &SimActor> {
        self.actors.values().filter(|a| a.protected)
    }

    pub fn is_mitigated(&self, id: ActorId) -> bool {
        self.actors
            .get(&id)
            .is_some_and(|a| a.mitigated_until > self.now)
    }

    pub fn is_disabled(&self, id: ActorId) -> bool {
        self.actors
            .get(&id)
            .is_some_and(|a| a.disabled_until > self.now)
    }

    pub fn resources(&self, id: ActorId) -> Option<&ActorResources> {
        self.resources.get(&id)
    }

    /// Orders applied since the last call
    pub fn take_applied(&mut self) -> Vec<AppliedOrder> {
        std::mem::take(&mut self.applied)
    }

    /// Read-only copy of the world for one engine tick
    pub fn snapshot(&self) -> WorldSnapshot {
        let mut snapshot = WorldSnapshot::new();
        for actor in self.actors.values() {
            snapshot = snapshot.with_actor(actor.state.clone());
        }
        for (id, resources) in &self.resources {
            snapshot = snapshot.with_resources(*id, resources.clone());
        }
        snapshot
    }

    /// Move time forward: cooldowns tick down, actors drift by velocity
    pub fn advance(&mut self, dt: f64) {
        self.now += dt;
        for actor in self.actors.values_mut() {
            if actor.state.alive {
                actor.state.position = actor.state.extrapolate(dt);
            }
        }
        for resources in self.resources.values_mut() {
            for counter in resources.counters.values_mut() {
                counter.cooldown_remaining = (counter.cooldown_remaining - dt).max(0.0);
            }
        }
    }

    fn apply(&mut self, actor: ActorId, command: &CounterCommand) -> Result<(), String> {
        let id = command.counter_id();
        let action = self
            .vocabulary
            .get(id)
            .ok_or_else(|| format!("unknown counter '{}'", id))?;
        let kind = action.kind;
        let cost = action.cost;

        let resources = self
            .resources
            .get_mut(&actor)
            .ok_or_else(|| format!("{} owns no counters", actor))?;
        if !resources.is_available(id, cost) {
            return Err(format!("'{}' is not ready", id));
        }
        resources.mana -= cost;
        let cooldown = self
            .cooldowns
            .get(&(actor, id.to_string()))
            .copied()
            .unwrap_or_default();
        if let Some(resource) = resources.counters.get_mut(id) {
            resource.cooldown_remaining = cooldown;
            if let Some(charges) = resource.charges.as_mut() {
                *charges = charges.saturating_sub(1);
            }
        }

        let now = self.now;
        match command {
            CounterCommand::Reposition { target, .. } => {
                if let Some(sim) = self.actors.get_mut(&actor) {
                    sim.state.position = *target;
                    sim.state.velocity = Vec2::ZERO;
                }
            }
            CounterCommand::TargetCaster { caster, .. } => {
                if let Some(sim) = self.actors.get_mut(caster) {
                    sim.disabled_until = now + DISABLE_DURATION;
                }
            }
            CounterCommand::SelfCast { .. } => {
                if kind.is_persistent_mitigation() {
                    if let Some(sim) = self.actors.get_mut(&actor) {
                        sim.mitigated_until = now + MITIGATION_DURATION;
                    }
                }
            }
        }
        Ok(())
    }
}

impl ActionIssuer for ToyWorld {
    fn issue(&mut self, actor: ActorId, command: &CounterCommand) -> Result<(), String> {
        if self.reject_chance > 0.0 && self.rng.gen_bool(self.reject_chance) {
            return Err("order dropped by the game".to_string());
        }
        self.apply(actor, command)?;
        self.applied.push(AppliedOrder {
            time: self.now,
            actor,
            command: command.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evade_core::catalog::CounterAction;

    fn scenario(reject_chance: f64) -> Scenario {
        let mut scenario = Scenario::parse(
            r#"
[[actors]]
id = 1
team = 1
position = [400, 0]
protected = true
mana = 100
counters = [{ id = "item_blink", cooldown = 12 }, { id = "item_black_king_bar" }]

[[actors]]
id = 2
team = 2
position = [0, 0]
"#,
        )
        .unwrap();
        scenario.reject_chance = reject_chance;
        scenario
    }

    fn vocabulary() -> Arc<CounterVocabulary> {
        let mut vocab = CounterVocabulary::new();
        vocab
            .register(CounterAction::new("item_blink", CounterKind::Reposition).with_range(1200.0))
            .unwrap();
        vocab
            .register(CounterAction::new("item_black_king_bar", CounterKind::MagicImmunity))
            .unwrap();
        Arc::new(vocab)
    }

    #[test]
    fn test_reposition_moves_actor_and_starts_cooldown() {
        let mut world = ToyWorld::from_scenario(&scenario(0.0), vocabulary());
        let command = CounterCommand::Reposition {
            counter: "item_blink".to_string(),
            target: Vec2::new(400.0, 250.0),
        };
        world.issue(ActorId(1), &command).unwrap();

        let hero = world.actor(ActorId(1)).unwrap();
        assert!((hero.state.position.y - 250.0).abs() < 1e-9);
        assert!(!world
            .resources(ActorId(1))
            .unwrap()
            .is_available("item_blink", 0.0));

        // Second use is refused while on cooldown
        assert!(world.issue(ActorId(1), &command).is_err());
        assert_eq!(world.take_applied().len(), 1);
    }

    #[test]
    fn test_immunity_is_temporary() {
        let mut world = ToyWorld::from_scenario(&scenario(0.0), vocabulary());
        let command = CounterCommand::SelfCast {
            counter: "item_black_king_bar".to_string(),
        };
        world.issue(ActorId(1), &command).unwrap();
        assert!(world.is_mitigated(ActorId(1)));

        world.advance(MITIGATION_DURATION + 0.1);
        assert!(!world.is_mitigated(ActorId(1)));
    }

    #[test]
    fn test_certain_rejection() {
        let mut world = ToyWorld::from_scenario(&scenario(1.0), vocabulary());
        let command = CounterCommand::SelfCast {
            counter: "item_black_king_bar".to_string(),
        };
        assert!(world.issue(ActorId(1), &command).is_err());
        assert!(!world.is_mitigated(ActorId(1)));
    }

    #[test]
    fn test_snapshot_carries_resources() {
        let world = ToyWorld::from_scenario(&scenario(0.0), vocabulary());
        let snapshot = world.snapshot();
        assert_eq!(snapshot.actors.len(), 2);
        assert!(snapshot
            .resources(ActorId(1))
            .unwrap()
            .is_available("item_black_king_bar", 0.0));
    }
}
