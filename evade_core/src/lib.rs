//! evade_core - Evasion decision engine for protected game actors
//!
//! This library provides:
//! - ThreatCatalog: Declarative descriptors for every evadable effect
//! - ThreatTracker: Live threats created from cast events, updated per tick
//! - Geometry prediction: Impact regions, impact times, reachability
//! - Counter resolution: Usable counters in descriptor priority order
//! - EvasionExecutor: One counter per protected actor per tick
//! - EvasionEngine: The per-tick pipeline tying them together

pub mod catalog;
pub mod config;
pub mod counter;
pub mod engine;
pub mod executor;
pub mod geometry;
pub mod prelude;
pub mod tracker;
pub mod types;
pub mod world;

// Re-export core types for convenience
pub use catalog::{
    CatalogError, CounterAction, CounterVocabulary, EffectDescriptor, EffectRecord, GeometryClass,
    ThreatCatalog,
};
pub use config::{default_catalog, default_vocabulary, ConfigError, EngineConstants};
pub use engine::{ActorDecision, EvasionEngine, TickReport};
pub use executor::{CounterCommand, EvasionExecutor, EvasionOutcome, IssueFailure};
pub use geometry::{ImpactRegion, Prediction, Vec2};
pub use tracker::{CastStart, Threat, ThreatStatus, ThreatTracker};
pub use types::{ActorId, CounterKind, ResponseMode, Team, ThreatHandle};
pub use world::{
    ActionIssuer, ActorResources, ActorState, CounterResource, EffectParameterSource,
    StaticParameters, TickContext, WorldSnapshot,
};
