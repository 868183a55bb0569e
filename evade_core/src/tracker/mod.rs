//! Threat tracking - Turns cast notifications into tracked threats and keeps
//! their predictions current every tick

mod threat;

pub use threat::{IssuedCounter, Threat, ThreatStatus};

use crate::catalog::ThreatCatalog;
use crate::geometry::{self, Prediction, PredictionInput};
use crate::types::{ActorId, CounterKind, Team, ThreatHandle};
use crate::world::TickContext;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Cast-start notification from the game-state feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastStart {
    pub caster: ActorId,
    pub caster_team: Team,
    /// Effect identity, looked up in the catalog
    pub effect: String,
    pub time: f64,
    /// Unit target, for targeted casts
    #[serde(default)]
    pub target: Option<ActorId>,
}

impl CastStart {
    pub fn new(caster: ActorId, caster_team: Team, effect: &str, time: f64) -> Self {
        CastStart {
            caster,
            caster_team,
            effect: effect.to_string(),
            time,
            target: None,
        }
    }

    pub fn targeting(mut self, target: ActorId) -> Self {
        self.target = Some(target);
        self
    }
}

/// What one tracker tick changed
#[derive(Debug, Clone, Default)]
pub struct TrackerTick {
    pub promoted: Vec<ThreatHandle>,
    pub resolved: Vec<ThreatHandle>,
    pub expired: Vec<ThreatHandle>,
}

/// Owns every active threat. The only component that mutates threat status.
#[derive(Debug)]
pub struct ThreatTracker {
    catalog: Arc<ThreatCatalog>,
    protected: BTreeMap<ActorId, Team>,
    threats: BTreeMap<ThreatHandle, Threat>,
    next_handle: u64,
    reaction_budget: f64,
}

impl ThreatTracker {
    pub fn new(catalog: Arc<ThreatCatalog>, reaction_budget: f64) -> Self {
        ThreatTracker {
            catalog,
            protected: BTreeMap::new(),
            threats: BTreeMap::new(),
            next_handle: 1,
            reaction_budget,
        }
    }

    pub fn reaction_budget(&self) -> f64 {
        self.reaction_budget
    }

    /// Start protecting an actor
    pub fn track(&mut self, actor: ActorId, team: Team) {
        self.protected.insert(actor, team);
    }

    /// Stop protecting an actor and drop its threats
    pub fn untrack(&mut self, actor: ActorId) {
        self.protected.remove(&actor);
        self.threats.retain(|_, threat| threat.target != actor);
    }

    pub fn protected_actors(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.protected.keys().copied()
    }

    /// Create a pending threat for every protected actor the cast can hit.
    ///
    /// Unregistered effects are untracked by configuration and ignored.
    pub fn on_cast_start(&mut self, cast: &CastStart) -> Vec<ThreatHandle> {
        let descriptor = match self.catalog.lookup(&cast.effect) {
            Ok(descriptor) => descriptor,
            Err(err) => {
                tracing::trace!(error = %err, caster = %cast.caster, "untracked cast");
                return Vec::new();
            }
        };

        let targets: Vec<ActorId> = self
            .protected
            .iter()
            .filter(|(actor, team)| {
                **actor != cast.caster
                    && cast.caster_team.is_hostile_to(**team)
                    && cast.target.map_or(true, |target| target == **actor)
            })
            .map(|(actor, _)| *actor)
            .collect();

        let mut handles = Vec::with_capacity(targets.len());
        for target in targets {
            let handle = ThreatHandle(self.next_handle);
            self.next_handle += 1;

            let threat = Threat::new(handle, cast.caster, target, descriptor.clone(), cast.time);
            tracing::debug!(
                threat = %handle,
                effect = %cast.effect,
                caster = %cast.caster,
                target = %target,
                impact = threat.predicted_impact,
                "threat detected"
            );
            self.threats.insert(handle, threat);
            handles.push(handle);
        }
        handles
    }

    /// The effect landed. Returns the discarded threat.
    pub fn on_cast_resolved(&mut self, handle: ThreatHandle) -> Option<Threat> {
        self.finish(handle, ThreatStatus::Resolved)
    }

    /// The cast was interrupted or cancelled. Returns the discarded threat.
    pub fn on_cast_interrupted(&mut self, handle: ThreatHandle) -> Option<Threat> {
        self.finish(handle, ThreatStatus::Expired)
    }

    /// Resolve every threat from one caster's effect. Returns how many ended.
    pub fn resolve_cast(&mut self, caster: ActorId, effect: &str) -> usize {
        self.finish_matching(caster, effect, ThreatStatus::Resolved)
    }

    /// Expire every threat from one caster's effect. Returns how many ended.
    pub fn interrupt_cast(&mut self, caster: ActorId, effect: &str) -> usize {
        self.finish_matching(caster, effect, ThreatStatus::Expired)
    }

    fn finish_matching(&mut self, caster: ActorId, effect: &str, status: ThreatStatus) -> usize {
        let handles: Vec<ThreatHandle> = self
            .threats
            .values()
            .filter(|t| t.caster == caster && t.effect_id() == effect)
            .map(|t| t.handle)
            .collect();
        handles
            .into_iter()
            .filter_map(|handle| self.finish(handle, status))
            .count()
    }

    fn finish(&mut self, handle: ThreatHandle, status: ThreatStatus) -> Option<Threat> {
        let mut threat = self.threats.remove(&handle)?;
        threat.transition(status);
        tracing::debug!(threat = %handle, status = ?threat.status(), "threat finished");
        Some(threat)
    }

    /// Re-derive region and impact time for every active threat, promote
    /// threats inside the reaction budget and drop finished ones
    pub fn tick(&mut self, ctx: &TickContext) -> TrackerTick {
        let mut summary = TrackerTick::default();

        for threat in self.threats.values_mut() {
            match refresh(threat, ctx) {
                Some(ThreatStatus::Resolved) => {
                    threat.transition(ThreatStatus::Resolved);
                    summary.resolved.push(threat.handle);
                    continue;
                }
                Some(ThreatStatus::Expired) => {
                    threat.transition(ThreatStatus::Expired);
                    summary.expired.push(threat.handle);
                    continue;
                }
                _ => {}
            }

            if threat.status() == ThreatStatus::Pending
                && threat.time_to_impact(ctx.now) <= self.reaction_budget
                && threat.transition(ThreatStatus::Imminent)
            {
                tracing::debug!(
                    threat = %threat.handle,
                    effect = %threat.effect_id(),
                    time_to_impact = threat.time_to_impact(ctx.now),
                    "threat imminent"
                );
                summary.promoted.push(threat.handle);
            }
        }

        self.threats.retain(|_, threat| threat.status().is_active());
        summary
    }

    /// Note a counter issued against a threat
    pub fn record_counter(&mut self, handle: ThreatHandle, counter_id: &str, kind: CounterKind, now: f64) {
        if let Some(threat) = self.threats.get_mut(&handle) {
            threat.countered_by = Some(IssuedCounter {
                counter_id: counter_id.to_string(),
                kind,
                issued_at: now,
            });
        }
    }

    pub fn get(&self, handle: ThreatHandle) -> Option<&Threat> {
        self.threats.get(&handle)
    }

    /// Whether the threat is still tracked and not terminal
    pub fn is_live(&self, handle: ThreatHandle) -> bool {
        self.threats
            .get(&handle)
            .is_some_and(|t| t.status().is_active())
    }

    /// Active threats against one protected actor, in detection order
    pub fn active_for(&self, actor: ActorId) -> Vec<&Threat> {
        self.threats.values().filter(|t| t.target == actor).collect()
    }

    pub fn threats(&self) -> impl Iterator<Item = &Threat> {
        self.threats.values()
    }

    pub fn len(&self) -> usize {
        self.threats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threats.is_empty()
    }

    /// Drop every threat and protected actor
    pub fn clear(&mut self) {
        self.threats.clear();
        self.protected.clear();
    }
}

/// Update one threat from the tick snapshot. Returns a terminal status when
/// the threat should end.
fn refresh(threat: &mut Threat, ctx: &TickContext) -> Option<ThreatStatus> {
    let descriptor = threat.descriptor.clone();
    let resolve_at = threat.cast_start + descriptor.total_delay(ctx.params);
    let cast_point_end = threat.cast_start + descriptor.base_delay;
    threat.resolve_at = resolve_at;

    let Some(actor) = ctx.world.actor(threat.target).filter(|a| a.alive) else {
        return Some(ThreatStatus::Expired);
    };

    let caster = ctx.world.actor(threat.caster);
    let caster_alive = caster.is_some_and(|c| c.alive);
    let channeled = descriptor.geometry.channel_duration() > 0.0;
    if caster.is_some() && !caster_alive && (channeled || ctx.now < cast_point_end) {
        // Died mid-cast or mid-channel
        return Some(ThreatStatus::Expired);
    }

    if !threat.footprint_locked {
        if let Some(caster) = caster.filter(|c| c.alive) {
            if let Some(footprint) = geometry::footprint(&descriptor, caster) {
                threat.footprint = Some(footprint);
                if descriptor.geometry.locks_region()
                    && (caster.target_locked || ctx.now >= cast_point_end)
                {
                    threat.footprint_locked = true;
                }
            }
        }
    }

    let prediction = threat.footprint.map(|footprint| {
        geometry::predict(&PredictionInput {
            descriptor: &descriptor,
            footprint,
            actor,
            resolve_at,
            now: ctx.now,
        })
    });

    match prediction {
        Some(Prediction::Threat {
            region,
            impact_time,
            on_course,
        }) => {
            threat.region = Some(region);
            threat.predicted_impact = impact_time;
            threat.on_course = on_course;
        }
        Some(Prediction::NoThreat) | None => {
            threat.region = None;
            threat.on_course = false;
            let next = descriptor.geometry.next_impact(resolve_at, ctx.now);
            threat.predicted_impact = threat.predicted_impact.max(next);
        }
    }

    if ctx.now > threat.resolution_time() {
        return Some(ThreatStatus::Resolved);
    }
    None
}
