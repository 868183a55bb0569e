//! Per-tick snapshots of actor state and counter resources

use crate::geometry::Vec2;
use crate::types::{ActorId, Team};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Live state of one actor as reported by the game-state feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorState {
    pub id: ActorId,
    pub team: Team,
    pub position: Vec2,
    #[serde(default)]
    pub velocity: Vec2,
    /// Facing angle in radians
    #[serde(default)]
    pub facing: f64,
    /// Collision radius
    #[serde(default = "default_radius")]
    pub radius: f64,
    /// Maximum movement speed in units per second
    #[serde(default)]
    pub move_speed: f64,
    #[serde(default = "default_alive")]
    pub alive: bool,
    /// Ground point of the actor's current cast, if any
    #[serde(default)]
    pub cast_point: Option<Vec2>,
    /// The current cast has committed to its direction or target point
    #[serde(default)]
    pub target_locked: bool,
}

fn default_radius() -> f64 {
    24.0
}

fn default_alive() -> bool {
    true
}

impl ActorState {
    pub fn new(id: ActorId, team: Team, position: Vec2) -> Self {
        ActorState {
            id,
            team,
            position,
            velocity: Vec2::ZERO,
            facing: 0.0,
            radius: default_radius(),
            move_speed: 0.0,
            alive: true,
            cast_point: None,
            target_locked: false,
        }
    }

    pub fn with_facing(mut self, radians: f64) -> Self {
        self.facing = radians;
        self
    }

    pub fn with_move_speed(mut self, speed: f64) -> Self {
        self.move_speed = speed;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_cast_point(mut self, point: Vec2) -> Self {
        self.cast_point = Some(point);
        self
    }

    /// Position after `dt` seconds at the current velocity
    pub fn extrapolate(&self, dt: f64) -> Vec2 {
        self.position + self.velocity * dt.max(0.0)
    }

    pub fn facing_direction(&self) -> Vec2 {
        Vec2::from_angle(self.facing)
    }
}

/// Resource state of one counter-action for one actor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CounterResource {
    /// Seconds until the counter is off cooldown
    #[serde(default)]
    pub cooldown_remaining: f64,
    /// Remaining charges, for charge-based items and abilities
    #[serde(default)]
    pub charges: Option<u32>,
    /// Already promised to another system this tick
    #[serde(default)]
    pub committed: bool,
    /// Silenced, muted, hexed or otherwise unable to use it
    #[serde(default)]
    pub blocked: bool,
}

impl CounterResource {
    pub fn ready() -> Self {
        CounterResource::default()
    }

    pub fn on_cooldown(seconds: f64) -> Self {
        CounterResource {
            cooldown_remaining: seconds,
            ..CounterResource::default()
        }
    }
}

/// Counter-actions a protected actor owns and the mana to pay for them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorResources {
    #[serde(default)]
    pub mana: f64,
    #[serde(default)]
    pub counters: HashMap<String, CounterResource>,
}

impl ActorResources {
    pub fn new(mana: f64) -> Self {
        ActorResources {
            mana,
            counters: HashMap::new(),
        }
    }

    /// Add an owned counter
    pub fn with_counter(mut self, id: &str, resource: CounterResource) -> Self {
        self.counters.insert(id.to_string(), resource);
        self
    }

    /// Availability predicate: owned, off cooldown, has a charge, affordable,
    /// and not committed elsewhere
    pub fn is_available(&self, counter_id: &str, cost: f64) -> bool {
        let Some(resource) = self.counters.get(counter_id) else {
            return false;
        };
        resource.cooldown_remaining <= 0.0
            && resource.charges.map_or(true, |c| c > 0)
            && !resource.committed
            && !resource.blocked
            && self.mana >= cost
    }
}

/// Everything the engine reads about the world, captured at tick start
#[derive(Debug, Clone, Default)]
pub struct WorldSnapshot {
    pub actors: HashMap<ActorId, ActorState>,
    pub resources: HashMap<ActorId, ActorResources>,
}

impl WorldSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actor(mut self, actor: ActorState) -> Self {
        self.actors.insert(actor.id, actor);
        self
    }

    pub fn with_resources(mut self, actor: ActorId, resources: ActorResources) -> Self {
        self.resources.insert(actor, resources);
        self
    }

    pub fn actor(&self, id: ActorId) -> Option<&ActorState> {
        self.actors.get(&id)
    }

    pub fn resources(&self, id: ActorId) -> Option<&ActorResources> {
        self.resources.get(&id)
    }
}
