//! Evasion executor - Picks the most urgent threat for an actor and issues
//! the first usable counter for it

mod outcome;

pub use outcome::{CounterCommand, EvasionOutcome, ExecutionRecord, IssueFailure};

use crate::catalog::{CounterAction, CounterVocabulary};
use crate::counter;
use crate::tracker::Threat;
use crate::types::{ActorId, CounterKind};
use crate::world::{ActionIssuer, ActorResources, TickContext};
use std::collections::{HashMap, VecDeque};

const DEFAULT_HISTORY_LIMIT: usize = 64;

/// Issues at most one counter per protected actor per tick
#[derive(Debug, Clone)]
pub struct EvasionExecutor {
    /// Extra clearance beyond the region edge for reposition targets
    escape_margin: f64,
    /// Shortest reposition worth issuing
    min_reposition_distance: f64,
    history: VecDeque<ExecutionRecord>,
    history_limit: usize,
    /// Tick time of the last decision per actor
    last_decision: HashMap<ActorId, f64>,
}

impl EvasionExecutor {
    pub fn new(escape_margin: f64) -> Self {
        EvasionExecutor {
            escape_margin,
            min_reposition_distance: 0.0,
            history: VecDeque::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            last_decision: HashMap::new(),
        }
    }

    pub fn with_min_reposition_distance(mut self, distance: f64) -> Self {
        self.min_reposition_distance = distance;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Decide and act for one protected actor.
    ///
    /// Selects the actionable threat with the least time to impact, resolves
    /// its counters and issues the first one not already issued against that
    /// threat. Failures are recorded, never retried within the tick.
    pub fn evaluate(
        &mut self,
        actor: ActorId,
        threats: &[&Threat],
        ctx: &TickContext,
        vocabulary: &CounterVocabulary,
        issuer: &mut dyn ActionIssuer,
    ) -> EvasionOutcome {
        if self.last_decision.get(&actor) == Some(&ctx.now) {
            return EvasionOutcome::Idle;
        }

        let Some(threat) = select_threat(threats, ctx.now) else {
            return EvasionOutcome::Idle;
        };

        let empty = ActorResources::default();
        let resources = ctx.world.resources(actor).unwrap_or(&empty);
        let usable = counter::resolve(threat, vocabulary, resources, ctx.now);
        let fresh = usable.iter().find(|action| !threat.was_answered_with(&action.id));
        if fresh.is_none() && !usable.is_empty() {
            // The counter already issued is still taking effect
            tracing::trace!(threat = %threat.handle, "awaiting issued counter");
            return EvasionOutcome::Idle;
        }

        let outcome = match fresh {
            None => {
                tracing::debug!(threat = %threat.handle, effect = %threat.effect_id(), "no usable counter");
                EvasionOutcome::NoOption {
                    threat: threat.handle,
                    effect: threat.effect_id().to_string(),
                }
            }
            Some(action) => self.issue(actor, threat, action, ctx, issuer),
        };

        self.last_decision.insert(actor, ctx.now);
        self.record(ctx.now, actor, outcome.clone());
        outcome
    }

    fn issue(
        &self,
        actor: ActorId,
        threat: &Threat,
        action: &CounterAction,
        ctx: &TickContext,
        issuer: &mut dyn ActionIssuer,
    ) -> EvasionOutcome {
        let failed = |error: IssueFailure| EvasionOutcome::Failed {
            threat: threat.handle,
            effect: threat.effect_id().to_string(),
            error,
        };

        // Cancellation check right before issuing
        if !threat.status().is_active() {
            return failed(IssueFailure::ThreatNoLongerActive(threat.handle));
        }

        let command = match self.build_command(actor, threat, action, ctx) {
            Ok(command) => command,
            Err(error) => return failed(error),
        };

        match issuer.issue(actor, &command) {
            Ok(()) => {
                tracing::info!(
                    actor = %actor,
                    threat = %threat.handle,
                    effect = %threat.effect_id(),
                    counter = %action.id,
                    time_to_impact = threat.time_to_impact(ctx.now),
                    "counter issued"
                );
                EvasionOutcome::Executed {
                    threat: threat.handle,
                    effect: threat.effect_id().to_string(),
                    command,
                }
            }
            Err(reason) => {
                tracing::warn!(
                    actor = %actor,
                    counter = %action.id,
                    reason = %reason,
                    "counter rejected at issue time"
                );
                failed(IssueFailure::ActionIssueFailure {
                    counter: action.id.clone(),
                    reason,
                })
            }
        }
    }

    fn build_command(
        &self,
        actor: ActorId,
        threat: &Threat,
        action: &CounterAction,
        ctx: &TickContext,
    ) -> Result<CounterCommand, IssueFailure> {
        let counter = action.id.clone();
        match action.kind {
            CounterKind::Reposition => {
                let state = ctx
                    .world
                    .actor(actor)
                    .ok_or(IssueFailure::ActorNotInSnapshot(actor))?;
                let region = threat
                    .region
                    .ok_or(IssueFailure::ThreatNoLongerActive(threat.handle))?;
                let escape = region.escape_point(state.position, state.radius, self.escape_margin);
                let offset = escape - state.position;
                let mut distance = offset.length().max(self.min_reposition_distance);
                if action.range > 0.0 {
                    distance = distance.min(action.range);
                }
                let target = match offset.try_normalize() {
                    Some(direction) => state.position + direction * distance,
                    None => escape,
                };
                Ok(CounterCommand::Reposition { counter, target })
            }
            CounterKind::CasterDisable => Ok(CounterCommand::TargetCaster {
                counter,
                caster: threat.caster,
            }),
            _ => Ok(CounterCommand::SelfCast { counter }),
        }
    }

    fn record(&mut self, time: f64, actor: ActorId, outcome: EvasionOutcome) {
        if self.history_limit == 0 {
            return;
        }
        while self.history.len() >= self.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(ExecutionRecord {
            time,
            actor,
            outcome,
        });
    }

    /// Most recent decisions, oldest first
    pub fn history(&self) -> impl Iterator<Item = &ExecutionRecord> {
        self.history.iter()
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.last_decision.clear();
    }
}

/// Actionable threat with the smallest time to impact
pub fn select_threat<'t>(threats: &[&'t Threat], now: f64) -> Option<&'t Threat> {
    threats
        .iter()
        .copied()
        .filter(|threat| threat.is_actionable())
        .min_by(|a, b| a.time_to_impact(now).total_cmp(&b.time_to_impact(now)))
}
