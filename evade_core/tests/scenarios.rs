//! Integration test: Cast event -> Tracker -> Prediction -> Resolver -> Executor
//!
//! Drives the full engine tick loop against small hand-built catalogs.

use evade_core::catalog::{CounterAction, CounterVocabulary, EffectRecord, GeometryClass, ThreatCatalog};
use evade_core::counter;
use evade_core::prelude::*;
use std::sync::Arc;

const HERO: ActorId = ActorId(1);
const LINA: ActorId = ActorId(2);
const LION: ActorId = ActorId(3);

/// Issuer that accepts everything and remembers when
#[derive(Default)]
struct Recorder {
    issued: Vec<(f64, CounterCommand)>,
    now: f64,
}

impl ActionIssuer for Recorder {
    fn issue(&mut self, _actor: ActorId, command: &CounterCommand) -> Result<(), String> {
        self.issued.push((self.now, command.clone()));
        Ok(())
    }
}

fn vocabulary() -> CounterVocabulary {
    let mut vocab = CounterVocabulary::new();
    let actions = [
        CounterAction::new("item_blink", CounterKind::Reposition)
            .with_range(1200.0)
            .in_group("blink"),
        CounterAction::new("puck_phase_shift", CounterKind::Untargetable),
        CounterAction::new("item_black_king_bar", CounterKind::MagicImmunity).in_group("vs_magic"),
        CounterAction::new("lion_voodoo", CounterKind::CasterDisable)
            .with_cost(125.0)
            .with_application_time(0.3)
            .in_group("disable"),
    ];
    for action in actions {
        vocab.register(action).unwrap();
    }
    vocab
}

fn laguna() -> EffectRecord {
    EffectRecord::new(
        "lina_laguna_blade",
        GeometryClass::Linear {
            range: 600.0,
            width: 250.0,
            speed: None,
        },
    )
    .with_base_delay(0.4)
    .with_delay_param("damage_delay", 0.1)
}

fn engine(records: &[EffectRecord], constants: EngineConstants) -> EvasionEngine {
    let vocab = vocabulary();
    let catalog =
        ThreatCatalog::from_records(records, &vocab, &StaticParameters::new()).unwrap();
    let mut engine = EvasionEngine::new(Arc::new(catalog), Arc::new(vocab), constants).unwrap();
    engine.track(HERO, Team(1));
    engine
}

fn world(resources: ActorResources) -> WorldSnapshot {
    WorldSnapshot::new()
        .with_actor(ActorState::new(HERO, Team(1), Vec2::new(400.0, 0.0)))
        .with_actor(ActorState::new(LINA, Team(2), Vec2::new(0.0, 0.0)))
        .with_actor(ActorState::new(LION, Team(2), Vec2::new(400.0, 100.0)))
        .with_resources(HERO, resources)
}

/// Tick every 50ms from `start` until `end`
fn run(
    engine: &mut EvasionEngine,
    world: &WorldSnapshot,
    issuer: &mut Recorder,
    start: f64,
    end: f64,
) -> Vec<TickReport> {
    let params = StaticParameters::new();
    let mut reports = Vec::new();
    let mut step = 0;
    loop {
        let now = start + step as f64 * 0.05;
        if now > end {
            break;
        }
        issuer.now = now;
        reports.push(engine.tick(&TickContext::new(now, world, &params), issuer));
        step += 1;
    }
    reports
}

#[test]
fn test_reposition_issued_within_reaction_budget() {
    let mut engine = engine(&[laguna().with_blink(&["@blink"])], EngineConstants::default());
    let world = world(ActorResources::new(0.0).with_counter("item_blink", CounterResource::ready()));
    engine.on_cast_start(&CastStart::new(LINA, Team(2), "lina_laguna_blade", 0.0), &world);

    let mut issuer = Recorder::default();
    run(&mut engine, &world, &mut issuer, 0.0, 0.6);

    // The snapshot never moves the hero, but the blink already issued is not
    // spent again while the threat stays on course
    assert_eq!(issuer.issued.len(), 1, "issued {:?}", issuer.issued);
    let (time, command) = &issuer.issued[0];
    // Impact at 0.5, budget 0.15
    assert!(*time >= 0.35 - 1e-9 && *time < 0.5, "issued at {}", time);
    match command {
        CounterCommand::Reposition { counter, target } => {
            assert_eq!(counter, "item_blink");
            assert!(target.y.abs() > 125.0 + 24.0);
        }
        other => panic!("expected reposition, got {:?}", other),
    }
}

#[test]
fn test_slow_disable_gives_no_action() {
    let mut engine = engine(&[laguna().with_disable(&["@disable"])], EngineConstants::default());
    let world = world(ActorResources::new(500.0).with_counter("lion_voodoo", CounterResource::ready()));
    engine.on_cast_start(&CastStart::new(LINA, Team(2), "lina_laguna_blade", 0.0), &world);

    let mut issuer = Recorder::default();
    let reports = run(&mut engine, &world, &mut issuer, 0.0, 0.6);

    assert!(issuer.issued.is_empty());
    let no_option = reports
        .iter()
        .flat_map(|r| r.decisions.iter())
        .filter(|d| matches!(d.outcome, EvasionOutcome::NoOption { .. }))
        .count();
    assert!(no_option > 0);
    // The effect lands and the threat is gone
    assert!(engine.tracker().is_empty());
}

#[test]
fn test_soonest_of_two_threats_answered_first() {
    let fast = EffectRecord::new("lion_impale", GeometryClass::InstantOnCast { radius: 300.0 })
        .with_base_delay(0.2)
        .with_counters(&["puck_phase_shift"]);
    let slow = laguna().with_counters(&["item_black_king_bar"]);
    let constants = EngineConstants {
        reaction_budget: 0.6,
        ..EngineConstants::default()
    };
    let mut engine = engine(&[fast, slow], constants);
    let world = world(
        ActorResources::new(500.0)
            .with_counter("puck_phase_shift", CounterResource::ready())
            .with_counter("item_black_king_bar", CounterResource::ready()),
    );
    engine.on_cast_start(&CastStart::new(LION, Team(2), "lion_impale", 0.0), &world);
    engine.on_cast_start(&CastStart::new(LINA, Team(2), "lina_laguna_blade", 0.0), &world);

    let params = StaticParameters::new();
    let mut issuer = Recorder::default();
    let report = engine.tick(&TickContext::new(0.0, &world, &params), &mut issuer);

    assert_eq!(report.tracker.promoted.len(), 2);
    assert_eq!(issuer.issued.len(), 1);
    assert_eq!(issuer.issued[0].1.counter_id(), "puck_phase_shift");

    // The slower threat gets its answer on the next tick
    issuer.now = 0.05;
    engine.tick(&TickContext::new(0.05, &world, &params), &mut issuer);
    assert_eq!(issuer.issued.len(), 2);
    assert_eq!(issuer.issued[1].1.counter_id(), "item_black_king_bar");
}

#[test]
fn test_unregistered_effect_is_ignored() {
    let mut engine = engine(&[laguna().with_blink(&["@blink"])], EngineConstants::default());
    let world = world(ActorResources::new(0.0).with_counter("item_blink", CounterResource::ready()));

    let handles = engine.on_cast_start(&CastStart::new(LINA, Team(2), "lina_dragon_slave", 0.0), &world);
    assert!(handles.is_empty());

    let mut issuer = Recorder::default();
    let reports = run(&mut engine, &world, &mut issuer, 0.0, 1.0);
    assert!(issuer.issued.is_empty());
    assert!(reports.iter().all(|r| r.decisions.is_empty()));
}

#[test]
fn test_repeated_tick_gives_same_decision() {
    let mut engine = engine(
        &[laguna().with_blink(&["@blink"]).with_counters(&["@vs_magic"])],
        EngineConstants::default(),
    );
    let world = world(
        ActorResources::new(0.0)
            .with_counter("item_blink", CounterResource::ready())
            .with_counter("item_black_king_bar", CounterResource::ready()),
    );
    let handle = engine.on_cast_start(&CastStart::new(LINA, Team(2), "lina_laguna_blade", 0.0), &world)[0];

    let params = StaticParameters::new();
    let ctx = TickContext::new(0.4, &world, &params);
    let mut issuer = Recorder::default();
    engine.tick(&ctx, &mut issuer);
    let before = engine.tracker().get(handle).unwrap().clone();
    engine.tick(&ctx, &mut issuer);
    let after = engine.tracker().get(handle).unwrap();

    assert_eq!(before.region, after.region);
    assert_eq!(before.predicted_impact, after.predicted_impact);

    let resources = world.resources(HERO).unwrap();
    let first: Vec<String> = counter::resolve(after, engine.vocabulary(), resources, 0.4)
        .iter()
        .map(|a| a.id.clone())
        .collect();
    let second: Vec<String> = counter::resolve(after, engine.vocabulary(), resources, 0.4)
        .iter()
        .map(|a| a.id.clone())
        .collect();
    assert_eq!(first, second);
    assert_eq!(first, vec!["item_blink", "item_black_king_bar"]);
    // Only one counter for the tick, even though the tick ran twice
    assert_eq!(issuer.issued.len(), 1);
}

#[test]
fn test_interrupted_cast_stops_response() {
    let mut engine = engine(&[laguna().with_blink(&["@blink"])], EngineConstants::default());
    let world = world(ActorResources::new(0.0).with_counter("item_blink", CounterResource::ready()));
    engine.on_cast_start(&CastStart::new(LINA, Team(2), "lina_laguna_blade", 0.0), &world);

    let mut issuer = Recorder::default();
    run(&mut engine, &world, &mut issuer, 0.0, 0.2);
    assert_eq!(engine.interrupt_cast(LINA, "lina_laguna_blade"), 1);
    run(&mut engine, &world, &mut issuer, 0.25, 0.6);

    assert!(issuer.issued.is_empty());
}

#[test]
fn test_actor_out_of_reach_is_not_threatened() {
    let mut engine = engine(&[laguna().with_blink(&["@blink"])], EngineConstants::default());
    let far = WorldSnapshot::new()
        .with_actor(ActorState::new(HERO, Team(1), Vec2::new(300.0, 900.0)))
        .with_actor(ActorState::new(LINA, Team(2), Vec2::new(0.0, 0.0)))
        .with_resources(
            HERO,
            ActorResources::new(0.0).with_counter("item_blink", CounterResource::ready()),
        );
    engine.on_cast_start(&CastStart::new(LINA, Team(2), "lina_laguna_blade", 0.0), &far);

    let mut issuer = Recorder::default();
    let reports = run(&mut engine, &far, &mut issuer, 0.0, 0.45);
    assert!(issuer.issued.is_empty());
    assert!(reports.iter().all(|r| r.decisions.is_empty()));
}
