//! EvasionEngine - Per-tick pipeline wiring tracker, predictor, resolver and
//! executor together

use crate::catalog::{CounterVocabulary, ThreatCatalog};
use crate::config::{ConfigError, EngineConstants};
use crate::executor::{EvasionExecutor, EvasionOutcome, ExecutionRecord};
use crate::tracker::{CastStart, Threat, ThreatTracker, TrackerTick};
use crate::types::{ActorId, Team, ThreatHandle};
use crate::world::{ActionIssuer, TickContext, WorldSnapshot};
use std::sync::Arc;

/// Outcome of one actor's evaluation in a tick
#[derive(Debug, Clone, PartialEq)]
pub struct ActorDecision {
    pub actor: ActorId,
    pub outcome: EvasionOutcome,
}

/// Everything a single engine tick did
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub now: f64,
    pub tracker: TrackerTick,
    pub decisions: Vec<ActorDecision>,
}

impl TickReport {
    /// Decisions that actually issued a counter
    pub fn executed(&self) -> impl Iterator<Item = &ActorDecision> {
        self.decisions.iter().filter(|d| d.outcome.is_executed())
    }
}

/// Single-threaded evasion engine.
///
/// Catalog and vocabulary are shared read-only; the engine owns every
/// mutable piece of state.
#[derive(Debug)]
pub struct EvasionEngine {
    catalog: Arc<ThreatCatalog>,
    vocabulary: Arc<CounterVocabulary>,
    tracker: ThreatTracker,
    executor: EvasionExecutor,
    constants: EngineConstants,
}

impl EvasionEngine {
    /// Build an engine, rejecting negative or non-finite constants
    pub fn new(
        catalog: Arc<ThreatCatalog>,
        vocabulary: Arc<CounterVocabulary>,
        constants: EngineConstants,
    ) -> Result<Self, ConfigError> {
        constants.validate()?;
        Ok(EvasionEngine::assemble(catalog, vocabulary, constants))
    }

    /// Engine over the bundled counters and effects
    pub fn with_defaults() -> Self {
        EvasionEngine::assemble(
            Arc::new(crate::config::default_catalog()),
            Arc::new(crate::config::default_vocabulary()),
            EngineConstants::default(),
        )
    }

    fn assemble(
        catalog: Arc<ThreatCatalog>,
        vocabulary: Arc<CounterVocabulary>,
        constants: EngineConstants,
    ) -> Self {
        let tracker = ThreatTracker::new(catalog.clone(), constants.reaction_budget_total());
        let executor = EvasionExecutor::new(constants.escape_margin)
            .with_min_reposition_distance(constants.min_reposition_distance);
        EvasionEngine {
            catalog,
            vocabulary,
            tracker,
            executor,
            constants,
        }
    }

    pub fn catalog(&self) -> &ThreatCatalog {
        &self.catalog
    }

    pub fn vocabulary(&self) -> &CounterVocabulary {
        &self.vocabulary
    }

    pub fn constants(&self) -> &EngineConstants {
        &self.constants
    }

    pub fn tracker(&self) -> &ThreatTracker {
        &self.tracker
    }

    pub fn track(&mut self, actor: ActorId, team: Team) {
        tracing::debug!(actor = %actor, "tracking actor");
        self.tracker.track(actor, team);
    }

    pub fn untrack(&mut self, actor: ActorId) {
        tracing::debug!(actor = %actor, "untracking actor");
        self.tracker.untrack(actor);
    }

    /// Cast-start event. The caster's team is taken from the snapshot when
    /// the caster is in view.
    pub fn on_cast_start(&mut self, cast: &CastStart, world: &WorldSnapshot) -> Vec<ThreatHandle> {
        match world.actor(cast.caster) {
            Some(caster) if caster.team != cast.caster_team => {
                let mut cast = cast.clone();
                cast.caster_team = caster.team;
                self.tracker.on_cast_start(&cast)
            }
            _ => self.tracker.on_cast_start(cast),
        }
    }

    pub fn on_cast_resolved(&mut self, handle: ThreatHandle) -> Option<Threat> {
        self.tracker.on_cast_resolved(handle)
    }

    pub fn on_cast_interrupted(&mut self, handle: ThreatHandle) -> Option<Threat> {
        self.tracker.on_cast_interrupted(handle)
    }

    /// A caster's effect landed, ending every threat it created
    pub fn resolve_cast(&mut self, caster: ActorId, effect: &str) -> usize {
        self.tracker.resolve_cast(caster, effect)
    }

    /// A caster's cast was cancelled or interrupted
    pub fn interrupt_cast(&mut self, caster: ActorId, effect: &str) -> usize {
        self.tracker.interrupt_cast(caster, effect)
    }

    /// Run one evaluation tick.
    ///
    /// Updates every threat, then evaluates each protected actor once. At
    /// most one counter is issued per actor.
    pub fn tick(&mut self, ctx: &TickContext, issuer: &mut dyn ActionIssuer) -> TickReport {
        let tracker = self.tracker.tick(ctx);
        let actors: Vec<ActorId> = self.tracker.protected_actors().collect();

        let mut decisions = Vec::with_capacity(actors.len());
        for actor in actors {
            let outcome = {
                let threats = self.tracker.active_for(actor);
                self.executor
                    .evaluate(actor, &threats, ctx, &self.vocabulary, issuer)
            };

            if let EvasionOutcome::Executed {
                threat, command, ..
            } = &outcome
            {
                if let Some(action) = self.vocabulary.get(command.counter_id()) {
                    self.tracker
                        .record_counter(*threat, &action.id, action.kind, ctx.now);
                }
            }

            if outcome != EvasionOutcome::Idle {
                decisions.push(ActorDecision { actor, outcome });
            }
        }

        TickReport {
            now: ctx.now,
            tracker,
            decisions,
        }
    }

    /// Recent executor decisions, oldest first
    pub fn history(&self) -> impl Iterator<Item = &ExecutionRecord> {
        self.executor.history()
    }

    /// Drop every threat and protected actor. Events are ignored until an
    /// actor is tracked again.
    pub fn teardown(&mut self) {
        tracing::info!(threats = self.tracker.len(), "engine teardown");
        self.tracker.clear();
        self.executor.clear();
    }
}
