//! Engine tuning constants

use super::ConfigError;
use serde::{Deserialize, Serialize};

/// Tunable engine constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConstants {
    /// Seconds before impact at which a threat becomes imminent
    #[serde(default = "default_reaction_budget")]
    pub reaction_budget: f64,
    /// Round-trip latency in milliseconds, added to the reaction budget
    #[serde(default)]
    pub ping: f64,
    /// Clearance beyond the region edge a reposition aims for
    #[serde(default = "default_escape_margin")]
    pub escape_margin: f64,
    /// Collision radius for actors the feed reports without one
    #[serde(default = "default_actor_radius")]
    pub default_actor_radius: f64,
    /// Repositions shorter than this are stretched to it
    #[serde(default)]
    pub min_reposition_distance: f64,
}

impl Default for EngineConstants {
    fn default() -> Self {
        EngineConstants {
            reaction_budget: default_reaction_budget(),
            ping: 0.0,
            escape_margin: default_escape_margin(),
            default_actor_radius: default_actor_radius(),
            min_reposition_distance: 0.0,
        }
    }
}

fn default_reaction_budget() -> f64 {
    0.15
}
fn default_escape_margin() -> f64 {
    60.0
}
fn default_actor_radius() -> f64 {
    24.0
}

impl EngineConstants {
    pub fn with_ping(mut self, ms: f64) -> Self {
        self.ping = ms;
        self
    }

    /// Reaction budget in seconds including latency
    pub fn reaction_budget_total(&self) -> f64 {
        self.reaction_budget + self.ping / 1000.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("reaction_budget", self.reaction_budget),
            ("ping", self.ping),
            ("escape_margin", self.escape_margin),
            ("default_actor_radius", self.default_actor_radius),
            ("min_reposition_distance", self.min_reposition_distance),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
