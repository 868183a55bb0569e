//! Prelude module for convenient imports
//!
//! ```rust
//! use evade_core::prelude::*;
//! ```

// Core types
pub use crate::types::{ActorId, CounterKind, ResponseMode, Team, ThreatHandle};

// Catalog
pub use crate::catalog::{CounterAction, CounterVocabulary, EffectDescriptor, GeometryClass, ThreatCatalog};

// Threats and geometry
pub use crate::geometry::{ImpactRegion, Vec2};
pub use crate::tracker::{CastStart, Threat, ThreatStatus};

// Engine
pub use crate::engine::{EvasionEngine, TickReport};
pub use crate::executor::{CounterCommand, EvasionOutcome};

// World access
pub use crate::world::{
    ActionIssuer, ActorResources, ActorState, CounterResource, StaticParameters, TickContext,
    WorldSnapshot,
};

// Config
pub use crate::config::{default_catalog, default_vocabulary, EngineConstants};
