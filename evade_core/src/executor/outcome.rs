//! EvasionOutcome - What the executor did for one actor in one tick

use crate::geometry::Vec2;
use crate::types::{ActorId, ThreatHandle};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Order sent to the game for a chosen counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CounterCommand {
    /// Move to a ground point (blink, dash)
    Reposition { counter: String, target: Vec2 },
    /// Self-cast ability or item
    SelfCast { counter: String },
    /// Cast on the threat's caster (disables)
    TargetCaster { counter: String, caster: ActorId },
}

impl CounterCommand {
    pub fn counter_id(&self) -> &str {
        match self {
            CounterCommand::Reposition { counter, .. }
            | CounterCommand::SelfCast { counter }
            | CounterCommand::TargetCaster { counter, .. } => counter,
        }
    }
}

/// Why a chosen counter was not carried out
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IssueFailure {
    /// Available at resolve time, rejected at issue time
    #[error("counter '{counter}' rejected: {reason}")]
    ActionIssueFailure { counter: String, reason: String },
    #[error("{0} ended before the counter was issued")]
    ThreatNoLongerActive(ThreatHandle),
    #[error("protected {0} missing from the tick snapshot")]
    ActorNotInSnapshot(ActorId),
}

/// Result of one executor evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EvasionOutcome {
    /// No actionable threat
    Idle,
    Executed {
        threat: ThreatHandle,
        effect: String,
        command: CounterCommand,
    },
    Failed {
        threat: ThreatHandle,
        effect: String,
        error: IssueFailure,
    },
    /// The threat is real but nothing usable answers it
    NoOption { threat: ThreatHandle, effect: String },
}

impl EvasionOutcome {
    pub fn threat(&self) -> Option<ThreatHandle> {
        match self {
            EvasionOutcome::Idle => None,
            EvasionOutcome::Executed { threat, .. }
            | EvasionOutcome::Failed { threat, .. }
            | EvasionOutcome::NoOption { threat, .. } => Some(*threat),
        }
    }

    pub fn is_executed(&self) -> bool {
        matches!(self, EvasionOutcome::Executed { .. })
    }

    /// One-line description for logs and reports
    pub fn summary(&self) -> String {
        match self {
            EvasionOutcome::Idle => "idle".to_string(),
            EvasionOutcome::Executed {
                threat,
                effect,
                command,
            } => format!("{} ({}): used {}", threat, effect, command.counter_id()),
            EvasionOutcome::Failed {
                threat,
                effect,
                error,
            } => format!("{} ({}): failed, {}", threat, effect, error),
            EvasionOutcome::NoOption { threat, effect } => {
                format!("{} ({}): no usable counter", threat, effect)
            }
        }
    }
}

/// History entry kept for feedback and diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub time: f64,
    pub actor: ActorId,
    pub outcome: EvasionOutcome,
}
