//! EffectDescriptor - Declarative description of one hostile effect
//!
//! Each registered effect is a small data record: its geometry, its timing
//! and the counters that answer it. A single shared algorithm evaluates all
//! of them.

use super::vocabulary::CounterVocabulary;
use super::CatalogError;
use crate::types::ResponseMode;
use crate::world::EffectParameterSource;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Shape and travel behavior of an effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeometryClass {
    /// Line from the caster along its facing
    Linear {
        range: f64,
        width: f64,
        /// Projectile speed. `None` resolves along the whole line at once.
        #[serde(default)]
        speed: Option<f64>,
    },
    /// Fixed-radius area at a ground point
    PointTarget { radius: f64 },
    /// Area around the caster for the channel's duration
    Channeled {
        radius: f64,
        duration: f64,
        /// Seconds between damage instances; 0 hits continuously
        #[serde(default)]
        interval: f64,
    },
    /// Area around the caster resolving when the cast completes
    InstantOnCast { radius: f64 },
}

impl GeometryClass {
    /// Whether the region freezes once the cast commits
    pub fn locks_region(&self) -> bool {
        !matches!(self, GeometryClass::Channeled { .. })
    }

    /// Time the effect keeps resolving after first impact
    pub fn channel_duration(&self) -> f64 {
        match self {
            GeometryClass::Channeled { duration, .. } => *duration,
            _ => 0.0,
        }
    }

    /// First damage instance at or after `now` for an effect that starts
    /// resolving at `start`. Non-channeled effects resolve once, at `start`.
    pub fn next_impact(&self, start: f64, now: f64) -> f64 {
        let GeometryClass::Channeled { duration, interval, .. } = *self else {
            return start;
        };
        if now <= start {
            return start;
        }
        let pulse = if interval > 0.0 {
            start + ((now - start) / interval).ceil() * interval
        } else {
            now
        };
        pulse.min(start + duration)
    }
}

/// Configuration record for one effect, as written in `effects.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectRecord {
    /// Unique effect name (e.g., "lina_laguna_blade")
    pub id: String,
    pub geometry: GeometryClass,
    /// Visible cast start to resolution, excluding reaction and travel
    #[serde(default)]
    pub base_delay: f64,
    /// Constant extra delay, used when no parameter is named
    #[serde(default)]
    pub additional_delay: f64,
    /// Effect scalar holding the extra delay (e.g., "damage_delay")
    #[serde(default)]
    pub additional_delay_param: Option<String>,
    /// Repositioning counters; `@group` entries expand from the vocabulary
    #[serde(default)]
    pub blink: Vec<String>,
    /// Caster disables
    #[serde(default)]
    pub disable: Vec<String>,
    /// Effect-specific counters in priority order
    #[serde(default)]
    pub counters: Vec<String>,
    /// Counters that never work against this effect
    #[serde(default)]
    pub suppressed: Vec<String>,
    #[serde(default)]
    pub mode: ResponseMode,
    /// The effect's own scalars, consulted when the live source lacks one
    #[serde(default)]
    pub data: HashMap<String, f64>,
}

impl EffectRecord {
    pub fn new(id: &str, geometry: GeometryClass) -> Self {
        EffectRecord {
            id: id.to_string(),
            geometry,
            base_delay: 0.0,
            additional_delay: 0.0,
            additional_delay_param: None,
            blink: Vec::new(),
            disable: Vec::new(),
            counters: Vec::new(),
            suppressed: Vec::new(),
            mode: ResponseMode::Respond,
            data: HashMap::new(),
        }
    }

    pub fn with_base_delay(mut self, seconds: f64) -> Self {
        self.base_delay = seconds;
        self
    }

    pub fn with_delay_param(mut self, name: &str, value: f64) -> Self {
        self.additional_delay_param = Some(name.to_string());
        self.data.insert(name.to_string(), value);
        self
    }

    pub fn with_blink(mut self, ids: &[&str]) -> Self {
        self.blink.extend(ids.iter().map(|s| s.to_string()));
        self
    }

    pub fn with_disable(mut self, ids: &[&str]) -> Self {
        self.disable.extend(ids.iter().map(|s| s.to_string()));
        self
    }

    pub fn with_counters(mut self, ids: &[&str]) -> Self {
        self.counters.extend(ids.iter().map(|s| s.to_string()));
        self
    }

    pub fn with_mode(mut self, mode: ResponseMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Validated, immutable descriptor shared by every threat of one effect
#[derive(Debug, Clone)]
pub struct EffectDescriptor {
    pub id: String,
    pub geometry: GeometryClass,
    pub base_delay: f64,
    /// Extra delay as resolved at registration
    pub additional_delay: f64,
    pub additional_delay_param: Option<String>,
    pub blink_counters: Vec<String>,
    pub disable_counters: Vec<String>,
    /// Every eligible counter, deduplicated, in priority order
    pub counter_catalog: Vec<String>,
    pub mode: ResponseMode,
}

impl EffectDescriptor {
    /// Validate a record against the vocabulary and parameter source
    pub fn build(
        record: &EffectRecord,
        vocabulary: &CounterVocabulary,
        params: &dyn EffectParameterSource,
    ) -> Result<Self, CatalogError> {
        let additional_delay = match &record.additional_delay_param {
            Some(name) => params
                .effect_parameter(&record.id, name)
                .or_else(|| record.data.get(name).copied())
                .ok_or_else(|| CatalogError::MissingEffectParameter {
                    effect: record.id.clone(),
                    parameter: name.clone(),
                })?,
            None => record.additional_delay,
        };

        let suppressed: HashSet<&str> = record.suppressed.iter().map(String::as_str).collect();
        let blink_counters = expand(&record.id, &record.blink, vocabulary, &suppressed)?;
        let disable_counters = expand(&record.id, &record.disable, vocabulary, &suppressed)?;
        let extra = expand(&record.id, &record.counters, vocabulary, &suppressed)?;

        // Repositioning ahead of mitigation ahead of prevention
        let counter_catalog = dedup_in_order(
            blink_counters
                .iter()
                .chain(extra.iter())
                .chain(disable_counters.iter()),
        );

        if record.mode == ResponseMode::Respond && counter_catalog.is_empty() {
            return Err(CatalogError::EmptyCounterCatalog(record.id.clone()));
        }

        for id in &counter_catalog {
            if vocabulary.get(id).is_none() {
                tracing::debug!(effect = %record.id, counter = %id, "counter not in vocabulary yet");
            }
        }

        Ok(EffectDescriptor {
            id: record.id.clone(),
            geometry: record.geometry.clone(),
            base_delay: record.base_delay,
            additional_delay,
            additional_delay_param: record.additional_delay_param.clone(),
            blink_counters: dedup_in_order(blink_counters.iter()),
            disable_counters: dedup_in_order(disable_counters.iter()),
            counter_catalog,
            mode: record.mode,
        })
    }

    /// Extra delay as of now: the live value if the source has it, otherwise
    /// the value resolved at registration
    pub fn current_additional_delay(&self, params: &dyn EffectParameterSource) -> f64 {
        self.additional_delay_param
            .as_deref()
            .and_then(|name| params.effect_parameter(&self.id, name))
            .unwrap_or(self.additional_delay)
    }

    /// Cast start to impact, excluding travel
    pub fn total_delay(&self, params: &dyn EffectParameterSource) -> f64 {
        self.base_delay + self.current_additional_delay(params)
    }

    pub fn is_disable(&self, counter_id: &str) -> bool {
        self.disable_counters.iter().any(|id| id == counter_id)
    }

    pub fn responds(&self) -> bool {
        self.mode == ResponseMode::Respond
    }
}

/// Expand `@group` references and drop suppressed identities
fn expand(
    effect: &str,
    entries: &[String],
    vocabulary: &CounterVocabulary,
    suppressed: &HashSet<&str>,
) -> Result<Vec<String>, CatalogError> {
    let mut out = Vec::new();
    for entry in entries {
        if let Some(group) = entry.strip_prefix('@') {
            let members = vocabulary
                .group(group)
                .ok_or_else(|| CatalogError::UnknownCounterGroup {
                    effect: effect.to_string(),
                    group: group.to_string(),
                })?;
            out.extend(
                members
                    .iter()
                    .filter(|id| !suppressed.contains(id.as_str()))
                    .cloned(),
            );
        } else if !suppressed.contains(entry.as_str()) {
            out.push(entry.clone());
        }
    }
    Ok(out)
}

/// Keep the first occurrence of each identity
pub fn dedup_in_order<'a>(ids: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}
