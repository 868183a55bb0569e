//! Scenario simulation - Drives the engine at a fixed tick rate against a
//! toy world and records what happened

use crate::scenario::{CastSpec, Scenario};
use crate::world::ToyWorld;
use evade_core::catalog::{EffectDescriptor, GeometryClass};
use evade_core::geometry::{self, ImpactRegion};
use evade_core::prelude::*;
use serde::Serialize;
use std::sync::Arc;

/// Something observable during a run
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    CastStarted { time: f64, caster: ActorId, effect: String, threats: usize },
    Decision { time: f64, actor: ActorId, outcome: EvasionOutcome },
    Interrupted { time: f64, caster: ActorId, effect: String },
    Hit { time: f64, actor: ActorId, effect: String },
    Avoided { time: f64, actor: ActorId, effect: String, mitigated: bool },
}

impl SimEvent {
    pub fn time(&self) -> f64 {
        match self {
            SimEvent::CastStarted { time, .. }
            | SimEvent::Decision { time, .. }
            | SimEvent::Interrupted { time, .. }
            | SimEvent::Hit { time, .. }
            | SimEvent::Avoided { time, .. } => *time,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            SimEvent::CastStarted { caster, effect, threats, .. } => {
                format!("{} starts {} ({} threat(s))", caster, effect, threats)
            }
            SimEvent::Decision { actor, outcome, .. } => format!("{}: {}", actor, outcome.summary()),
            SimEvent::Interrupted { caster, effect, .. } => {
                format!("{} interrupted while casting {}", caster, effect)
            }
            SimEvent::Hit { actor, effect, .. } => format!("{} hit by {}", actor, effect),
            SimEvent::Avoided { actor, effect, mitigated, .. } => {
                let how = if *mitigated { "mitigated" } else { "dodged" };
                format!("{} {} {}", actor, how, effect)
            }
        }
    }
}

/// Summary of one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimReport {
    pub scenario: String,
    pub ticks: u32,
    pub events: Vec<SimEvent>,
}

impl SimReport {
    pub fn hits(&self) -> usize {
        self.events.iter().filter(|e| matches!(e, SimEvent::Hit { .. })).count()
    }

    pub fn avoided(&self) -> usize {
        self.events.iter().filter(|e| matches!(e, SimEvent::Avoided { .. })).count()
    }

    pub fn counters_used(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SimEvent::Decision { outcome, .. } if outcome.is_executed()))
            .count()
    }
}

#[derive(Debug, PartialEq)]
enum CastPhase {
    Scheduled,
    Active,
    Finished,
}

/// A scripted cast and the targets it has not reached yet
struct LiveCast {
    spec: CastSpec,
    descriptor: Option<Arc<EffectDescriptor>>,
    phase: CastPhase,
    footprint: Option<ImpactRegion>,
    pending: Vec<ActorId>,
}

pub struct Simulation {
    engine: EvasionEngine,
    world: ToyWorld,
    params: StaticParameters,
    casts: Vec<LiveCast>,
    scenario: Scenario,
}

impl Simulation {
    pub fn new(scenario: Scenario, engine: EvasionEngine, params: StaticParameters) -> Self {
        let vocabulary = Arc::new(engine.vocabulary().clone());
        let world = ToyWorld::from_scenario(&scenario, vocabulary);
        let casts = scenario
            .casts
            .iter()
            .map(|spec| LiveCast {
                spec: spec.clone(),
                descriptor: engine.catalog().lookup(&spec.effect).ok(),
                phase: CastPhase::Scheduled,
                footprint: None,
                pending: Vec::new(),
            })
            .collect();

        let mut sim = Simulation {
            engine,
            world,
            params,
            casts,
            scenario,
        };
        for spec in &sim.scenario.actors {
            if spec.protected {
                sim.engine.track(spec.actor_id(), Team(spec.team));
            }
        }
        sim
    }

    /// Run to the scenario's end
    pub fn run(mut self) -> SimReport {
        let mut report = SimReport {
            scenario: self.scenario.name.clone(),
            ..SimReport::default()
        };
        let tick = self.scenario.tick;
        let steps = (self.scenario.duration / tick).floor() as u32;

        for step in 0..=steps {
            let now = step as f64 * tick;
            self.step(now, &mut report.events);
            report.ticks += 1;
            self.world.advance(tick);
        }

        self.engine.teardown();
        tracing::info!(
            ticks = report.ticks,
            hits = report.hits(),
            avoided = report.avoided(),
            "simulation finished"
        );
        report
    }

    fn step(&mut self, now: f64, events: &mut Vec<SimEvent>) {
        self.start_casts(now, events);
        self.cancel_casts(now, events);

        let snapshot = self.world.snapshot();
        let ctx = TickContext::new(now, &snapshot, &self.params);
        let tick = self.engine.tick(&ctx, &mut self.world);
        for decision in tick.decisions {
            events.push(SimEvent::Decision {
                time: now,
                actor: decision.actor,
                outcome: decision.outcome,
            });
        }

        // Disables issued this tick break the caster's cast
        for order in self.world.take_applied() {
            if let CounterCommand::TargetCaster { caster, .. } = order.command {
                self.interrupt_caster(caster, now, events);
            }
        }

        self.land_casts(now, events);
    }

    fn start_casts(&mut self, now: f64, events: &mut Vec<SimEvent>) {
        for index in 0..self.casts.len() {
            let cast = &self.casts[index];
            if cast.phase != CastPhase::Scheduled || cast.spec.time > now {
                continue;
            }
            let caster = ActorId(cast.spec.caster);
            if self.world.is_disabled(caster) {
                continue;
            }
            let cast_point = cast.spec.cast_point.map(|[x, y]| Vec2::new(x, y));
            if let Some(sim) = self.world.actor_mut(caster) {
                sim.state.cast_point = cast_point;
                sim.state.target_locked = false;
            }

            let snapshot = self.world.snapshot();
            let Some(state) = snapshot.actor(caster) else {
                continue;
            };
            let mut event = CastStart::new(caster, state.team, &cast.spec.effect, now);
            if let Some(target) = cast.spec.target {
                event = event.targeting(ActorId(target));
            }
            let handles = self.engine.on_cast_start(&event, &snapshot);

            let footprint = cast
                .descriptor
                .as_ref()
                .and_then(|d| geometry::footprint(d, state));
            let team = state.team;
            let pending: Vec<ActorId> = self
                .world
                .protected()
                .filter(|a| a.state.team.is_hostile_to(team))
                .filter(|a| cast.spec.target.map_or(true, |t| t == a.state.id.0))
                .map(|a| a.state.id)
                .collect();

            events.push(SimEvent::CastStarted {
                time: now,
                caster,
                effect: cast.spec.effect.clone(),
                threats: handles.len(),
            });

            let cast = &mut self.casts[index];
            cast.phase = CastPhase::Active;
            cast.footprint = footprint;
            cast.pending = pending;
        }
    }

    fn cancel_casts(&mut self, now: f64, events: &mut Vec<SimEvent>) {
        let cancelled: Vec<ActorId> = self
            .casts
            .iter()
            .filter(|c| c.phase == CastPhase::Active && c.spec.cancel_at.is_some_and(|t| t <= now))
            .map(|c| ActorId(c.spec.caster))
            .collect();
        for caster in cancelled {
            self.interrupt_caster(caster, now, events);
        }
    }

    fn interrupt_caster(&mut self, caster: ActorId, now: f64, events: &mut Vec<SimEvent>) {
        for cast in self.casts.iter_mut() {
            if cast.phase != CastPhase::Active || ActorId(cast.spec.caster) != caster {
                continue;
            }
            // Past the cast point the effect is already out
            let committed = cast
                .descriptor
                .as_ref()
                .is_some_and(|d| now >= cast.spec.time + d.base_delay && d.geometry.channel_duration() <= 0.0);
            if committed {
                continue;
            }
            self.engine.interrupt_cast(caster, &cast.spec.effect);
            cast.phase = CastPhase::Finished;
            cast.pending.clear();
            events.push(SimEvent::Interrupted {
                time: now,
                caster,
                effect: cast.spec.effect.clone(),
            });
        }
    }

    fn land_casts(&mut self, now: f64, events: &mut Vec<SimEvent>) {
        for index in 0..self.casts.len() {
            if self.casts[index].phase != CastPhase::Active {
                continue;
            }
            let cast = &self.casts[index];
            let (Some(descriptor), Some(footprint)) = (cast.descriptor.clone(), cast.footprint) else {
                // Untracked effects still land, unanswered
                let cast = &mut self.casts[index];
                cast.phase = CastPhase::Finished;
                continue;
            };

            let resolve_at = cast.spec.time + descriptor.total_delay(&self.params);
            let mut still_pending = Vec::new();
            for target in cast.pending.clone() {
                let Some(actor) = self.world.actor(target) else {
                    continue;
                };
                if now < landing_time(&descriptor, footprint, actor.state.position, resolve_at) {
                    still_pending.push(target);
                    continue;
                }
                let inside = footprint.overlaps(actor.state.position, actor.state.radius);
                let mitigated = self.world.is_mitigated(target);
                let effect = cast.spec.effect.clone();
                if inside && !mitigated {
                    events.push(SimEvent::Hit { time: now, actor: target, effect });
                } else {
                    events.push(SimEvent::Avoided {
                        time: now,
                        actor: target,
                        effect,
                        mitigated: inside,
                    });
                }
            }

            let caster = ActorId(cast.spec.caster);
            let effect = cast.spec.effect.clone();
            let done = still_pending.is_empty();
            let cast = &mut self.casts[index];
            cast.pending = still_pending;
            if done {
                cast.phase = CastPhase::Finished;
                self.engine.resolve_cast(caster, &effect);
            }
        }
    }
}

/// When the effect reaches `position`: projectiles add travel time along the
/// line
fn landing_time(
    descriptor: &EffectDescriptor,
    footprint: ImpactRegion,
    position: Vec2,
    resolve_at: f64,
) -> f64 {
    match (&descriptor.geometry, footprint) {
        (GeometryClass::Linear { speed: Some(speed), .. }, ImpactRegion::Line { start, end, .. })
            if *speed > 0.0 =>
        {
            let (_, t) = geometry::distance_to_segment(position, start, end);
            resolve_at + t * start.distance(end) / speed
        }
        _ => resolve_at,
    }
}
