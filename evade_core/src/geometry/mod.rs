//! Geometry prediction - Where an effect lands and whether the protected
//! actor can be inside it when it does
//!
//! Two steps:
//! 1. `footprint` derives the full region from the caster's live state
//!    (the tracker freezes it once the cast commits)
//! 2. `predict` sweeps that footprint forward to now, computes the actor's
//!    impact time and prunes threats the actor cannot reach before impact

mod region;
mod vector;

pub use region::ImpactRegion;
pub use vector::{distance_to_segment, Vec2};

use crate::catalog::{EffectDescriptor, GeometryClass};
use crate::world::ActorState;
use serde::{Deserialize, Serialize};

/// Outcome of a geometry prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Prediction {
    /// The actor cannot intersect the region before impact even moving
    /// straight at it
    NoThreat,
    Threat {
        /// Region still to be swept between now and impact
        region: ImpactRegion,
        /// When the effect reaches the actor
        impact_time: f64,
        /// The actor's current or extrapolated position is inside the region
        on_course: bool,
    },
}

impl Prediction {
    pub fn is_threat(&self) -> bool {
        matches!(self, Prediction::Threat { .. })
    }
}

/// Inputs for one prediction, all read from the same tick
#[derive(Debug, Clone, Copy)]
pub struct PredictionInput<'a> {
    pub descriptor: &'a EffectDescriptor,
    /// Full region of the effect (live or frozen)
    pub footprint: ImpactRegion,
    pub actor: &'a ActorState,
    /// Cast start + base delay + additional delay
    pub resolve_at: f64,
    pub now: f64,
}

/// Full region of an effect given the caster's current state.
///
/// Returns `None` when the caster state does not pin the region down
/// (a point-target cast without a reported ground point).
pub fn footprint(descriptor: &EffectDescriptor, caster: &ActorState) -> Option<ImpactRegion> {
    match descriptor.geometry {
        GeometryClass::Linear { range, width, .. } => {
            let direction = caster
                .cast_point
                .and_then(|point| (point - caster.position).try_normalize())
                .unwrap_or_else(|| caster.facing_direction());
            Some(ImpactRegion::Line {
                start: caster.position,
                end: caster.position + direction * range,
                width,
            })
        }
        GeometryClass::PointTarget { radius } => caster
            .cast_point
            .map(|center| ImpactRegion::Circle { center, radius }),
        GeometryClass::Channeled { radius, .. } | GeometryClass::InstantOnCast { radius } => {
            Some(ImpactRegion::Circle {
                center: caster.position,
                radius,
            })
        }
    }
}

/// Predict whether and when the effect reaches the actor
pub fn predict(input: &PredictionInput) -> Prediction {
    let actor = input.actor;
    let (region, impact_time) = match swept_region(input) {
        Some(swept) => swept,
        None => return Prediction::NoThreat,
    };

    let remaining = (impact_time - input.now).max(0.0);
    let gap = region.gap_to_edge(actor.position) - actor.radius;
    let reach = actor.move_speed.max(0.0) * remaining;
    if gap > reach {
        return Prediction::NoThreat;
    }

    let on_course = region.overlaps(actor.position, actor.radius)
        || region.overlaps(actor.extrapolate(remaining), actor.radius);

    Prediction::Threat {
        region,
        impact_time,
        on_course,
    }
}

/// Portion of the footprint still ahead of the effect, and the time it
/// reaches the actor
fn swept_region(input: &PredictionInput) -> Option<(ImpactRegion, f64)> {
    let speed = match input.descriptor.geometry {
        GeometryClass::Linear { speed: Some(speed), .. } if speed > 0.0 => speed,
        // Channels keep hitting: the impact is the next damage instance
        _ => {
            let impact = input.descriptor.geometry.next_impact(input.resolve_at, input.now);
            return Some((input.footprint, impact));
        }
    };

    let ImpactRegion::Line { start, end, width } = input.footprint else {
        return Some((input.footprint, input.resolve_at));
    };

    let axis = end - start;
    let length = axis.length();
    let direction = axis.try_normalize()?;

    let travelled = ((input.now - input.resolve_at) * speed).max(0.0);
    if travelled >= length {
        return None;
    }

    let (_, t) = distance_to_segment(input.actor.position, start, end);
    let along = (t * length).max(travelled);
    let impact_time = input.resolve_at + along / speed;

    Some((
        ImpactRegion::Line {
            start: start + direction * travelled,
            end,
            width,
        },
        impact_time,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CounterVocabulary, EffectRecord};
    use crate::types::{ActorId, ResponseMode, Team};
    use crate::world::StaticParameters;

    fn descriptor(geometry: GeometryClass) -> EffectDescriptor {
        let record = EffectRecord::new("test_effect", geometry)
            .with_base_delay(0.4)
            .with_mode(ResponseMode::DetectOnly);
        EffectDescriptor::build(&record, &CounterVocabulary::new(), &StaticParameters::new())
            .unwrap()
    }

    fn caster() -> ActorState {
        ActorState::new(ActorId(2), Team(2), Vec2::new(0.0, 0.0))
    }

    fn actor_at(x: f64, y: f64) -> ActorState {
        ActorState::new(ActorId(1), Team(1), Vec2::new(x, y))
    }

    fn laguna() -> EffectDescriptor {
        descriptor(GeometryClass::Linear {
            range: 600.0,
            width: 250.0,
            speed: None,
        })
    }

    #[test]
    fn test_linear_footprint_follows_facing() {
        let d = laguna();
        let facing_north = caster().with_facing(std::f64::consts::FRAC_PI_2);
        match footprint(&d, &facing_north).unwrap() {
            ImpactRegion::Line { end, .. } => {
                assert!(end.x.abs() < 1e-9);
                assert!((end.y - 600.0).abs() < 1e-9);
            }
            other => panic!("unexpected region {:?}", other),
        }
    }

    #[test]
    fn test_linear_footprint_prefers_cast_point() {
        let d = laguna();
        let aimed = caster().with_cast_point(Vec2::new(0.0, -100.0));
        match footprint(&d, &aimed).unwrap() {
            ImpactRegion::Line { end, .. } => assert!((end.y + 600.0).abs() < 1e-9),
            other => panic!("unexpected region {:?}", other),
        }
    }

    #[test]
    fn test_point_target_needs_cast_point() {
        let d = descriptor(GeometryClass::PointTarget { radius: 175.0 });
        assert!(footprint(&d, &caster()).is_none());
        let region = footprint(&d, &caster().with_cast_point(Vec2::new(300.0, 0.0))).unwrap();
        assert_eq!(
            region,
            ImpactRegion::Circle {
                center: Vec2::new(300.0, 0.0),
                radius: 175.0
            }
        );
    }

    #[test]
    fn test_actor_in_path_is_on_course() {
        let d = laguna();
        let actor = actor_at(400.0, 0.0);
        let input = PredictionInput {
            descriptor: &d,
            footprint: footprint(&d, &caster()).unwrap(),
            actor: &actor,
            resolve_at: 0.5,
            now: 0.0,
        };
        match predict(&input) {
            Prediction::Threat {
                impact_time,
                on_course,
                ..
            } => {
                assert!((impact_time - 0.5).abs() < 1e-12);
                assert!(on_course);
            }
            Prediction::NoThreat => panic!("expected a threat"),
        }
    }

    #[test]
    fn test_unreachable_line_is_no_threat() {
        let d = laguna();
        // 1000 units off the axis, 300 speed, 0.5s: can cover 150
        let actor = actor_at(300.0, 1000.0).with_move_speed(300.0);
        let input = PredictionInput {
            descriptor: &d,
            footprint: footprint(&d, &caster()).unwrap(),
            actor: &actor,
            resolve_at: 0.5,
            now: 0.0,
        };
        assert_eq!(predict(&input), Prediction::NoThreat);
    }

    #[test]
    fn test_reachable_but_off_course() {
        let d = laguna();
        // Gap to edge: 200 - 125 - 24 = 51, reach 150
        let actor = actor_at(300.0, 200.0).with_move_speed(300.0);
        let input = PredictionInput {
            descriptor: &d,
            footprint: footprint(&d, &caster()).unwrap(),
            actor: &actor,
            resolve_at: 0.5,
            now: 0.0,
        };
        match predict(&input) {
            Prediction::Threat { on_course, .. } => assert!(!on_course),
            Prediction::NoThreat => panic!("actor can still walk into the line"),
        }
    }

    #[test]
    fn test_velocity_extrapolation_puts_actor_on_course() {
        let d = laguna();
        let actor = actor_at(300.0, 300.0)
            .with_move_speed(600.0)
            .with_velocity(Vec2::new(0.0, -600.0));
        let input = PredictionInput {
            descriptor: &d,
            footprint: footprint(&d, &caster()).unwrap(),
            actor: &actor,
            resolve_at: 0.5,
            now: 0.0,
        };
        match predict(&input) {
            Prediction::Threat { on_course, .. } => assert!(on_course),
            Prediction::NoThreat => panic!("expected a threat"),
        }
    }

    #[test]
    fn test_projectile_travel_time_and_sweep() {
        let d = descriptor(GeometryClass::Linear {
            range: 3000.0,
            width: 115.0,
            speed: Some(1000.0),
        });
        let actor = actor_at(2000.0, 0.0);
        let full = footprint(&d, &caster()).unwrap();

        let before = PredictionInput {
            descriptor: &d,
            footprint: full,
            actor: &actor,
            resolve_at: 0.5,
            now: 0.0,
        };
        match predict(&before) {
            Prediction::Threat { impact_time, .. } => assert!((impact_time - 2.5).abs() < 1e-9),
            Prediction::NoThreat => panic!("expected a threat"),
        }

        // One second after launch the front is 1000 units out
        let during = PredictionInput { now: 1.5, ..before };
        match predict(&during) {
            Prediction::Threat {
                region: ImpactRegion::Line { start, .. },
                ..
            } => assert!((start.x - 1000.0).abs() < 1e-9),
            other => panic!("unexpected prediction {:?}", other),
        }

        // Past the end of the line nothing is left
        let after = PredictionInput { now: 4.0, ..before };
        assert_eq!(predict(&after), Prediction::NoThreat);
    }

    #[test]
    fn test_projectile_already_past_actor() {
        let d = descriptor(GeometryClass::Linear {
            range: 3000.0,
            width: 115.0,
            speed: Some(1000.0),
        });
        let actor = actor_at(500.0, 0.0);
        let input = PredictionInput {
            descriptor: &d,
            footprint: footprint(&d, &caster()).unwrap(),
            actor: &actor,
            resolve_at: 0.0,
            now: 1.0,
        };
        assert_eq!(predict(&input), Prediction::NoThreat);
    }

    #[test]
    fn test_channel_follows_caster() {
        let d = descriptor(GeometryClass::Channeled {
            radius: 420.0,
            duration: 4.0,
            interval: 1.0,
        });
        let moved = ActorState::new(ActorId(2), Team(2), Vec2::new(100.0, 100.0));
        assert_eq!(
            footprint(&d, &moved).unwrap(),
            ImpactRegion::Circle {
                center: Vec2::new(100.0, 100.0),
                radius: 420.0
            }
        );
    }
}
