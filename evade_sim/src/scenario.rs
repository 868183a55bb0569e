//! Scenario files - Actors, scripted casts and live parameter overrides

use evade_core::config::{self, ConfigError};
use evade_core::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Scenario validation error
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cast of '{effect}' references unknown actor {actor}")]
    UnknownActor { effect: String, actor: u32 },
    #[error("duplicate actor id {0}")]
    DuplicateActor(u32),
    #[error("invalid scenario: {0}")]
    Invalid(String),
}

/// A scripted encounter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    /// Simulated seconds
    #[serde(default = "default_duration")]
    pub duration: f64,
    /// Seconds between engine ticks
    #[serde(default = "default_tick")]
    pub tick: f64,
    /// Seed for dropped orders
    #[serde(default)]
    pub seed: u64,
    /// Probability that the game drops an issued order
    #[serde(default)]
    pub reject_chance: f64,
    #[serde(default)]
    pub constants: EngineConstants,
    pub actors: Vec<ActorSpec>,
    #[serde(default)]
    pub casts: Vec<CastSpec>,
    /// Live effect scalars, overriding the catalog's data tables
    #[serde(default)]
    pub params: Vec<ParamSpec>,
}

fn default_duration() -> f64 {
    3.0
}
fn default_tick() -> f64 {
    0.03
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorSpec {
    pub id: u32,
    pub team: u8,
    pub position: [f64; 2],
    #[serde(default)]
    pub velocity: [f64; 2],
    /// Facing in degrees
    #[serde(default)]
    pub facing: f64,
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default)]
    pub move_speed: f64,
    /// Protected by the engine
    #[serde(default)]
    pub protected: bool,
    #[serde(default)]
    pub mana: f64,
    #[serde(default)]
    pub counters: Vec<OwnedCounter>,
}

impl ActorSpec {
    pub fn actor_id(&self) -> ActorId {
        ActorId(self.id)
    }

    pub fn to_state(&self, default_radius: f64) -> ActorState {
        let mut state = ActorState::new(
            self.actor_id(),
            Team(self.team),
            Vec2::new(self.position[0], self.position[1]),
        )
        .with_facing(self.facing.to_radians())
        .with_velocity(Vec2::new(self.velocity[0], self.velocity[1]))
        .with_move_speed(self.move_speed);
        state.radius = self.radius.unwrap_or(default_radius);
        state
    }
}

/// A counter an actor owns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnedCounter {
    pub id: String,
    /// Cooldown applied after use
    #[serde(default = "default_cooldown")]
    pub cooldown: f64,
    /// Seconds until first ready
    #[serde(default)]
    pub ready_in: f64,
    #[serde(default)]
    pub charges: Option<u32>,
}

fn default_cooldown() -> f64 {
    12.0
}

/// A scripted cast
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastSpec {
    pub time: f64,
    pub caster: u32,
    pub effect: String,
    #[serde(default)]
    pub target: Option<u32>,
    /// Ground point for point-target and aimed linear casts
    #[serde(default)]
    pub cast_point: Option<[f64; 2]>,
    /// Cast cancelled by the caster at this time
    #[serde(default)]
    pub cancel_at: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    pub effect: String,
    pub name: String,
    pub value: f64,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let scenario: Scenario = config::load_toml(path)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn parse(content: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = config::parse_toml(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// The bundled sample encounter
    pub fn sample() -> Result<Self, ScenarioError> {
        Scenario::parse(include_str!("../scenarios/laguna_duel.toml"))
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.tick.is_nan() || self.tick <= 0.0 {
            return Err(ScenarioError::Invalid(format!("tick must be positive, got {}", self.tick)));
        }
        if !(0.0..=1.0).contains(&self.reject_chance) {
            return Err(ScenarioError::Invalid(format!(
                "reject_chance must be within 0..=1, got {}",
                self.reject_chance
            )));
        }
        self.constants.validate()?;

        let mut ids = HashSet::new();
        for actor in &self.actors {
            if !ids.insert(actor.id) {
                return Err(ScenarioError::DuplicateActor(actor.id));
            }
        }
        for cast in &self.casts {
            for actor in std::iter::once(cast.caster).chain(cast.target) {
                if !ids.contains(&actor) {
                    return Err(ScenarioError::UnknownActor {
                        effect: cast.effect.clone(),
                        actor,
                    });
                }
            }
        }
        Ok(())
    }

    /// Live parameter source for the run
    pub fn parameters(&self, base: StaticParameters) -> StaticParameters {
        self.params
            .iter()
            .fold(base, |params, p| params.with(&p.effect, &p.name, p.value))
    }
}
