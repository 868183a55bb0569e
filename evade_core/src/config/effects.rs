//! Effect descriptor loading

use super::ConfigError;
use crate::catalog::{CounterVocabulary, EffectRecord, ThreatCatalog};
use crate::world::{EffectParameterSource, StaticParameters};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Container for effect records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectsConfig {
    #[serde(rename = "effects")]
    pub effects: Vec<EffectRecord>,
}

/// Load effect records from a TOML file
pub fn load_effect_records(path: &Path) -> Result<Vec<EffectRecord>, ConfigError> {
    let config: EffectsConfig = super::load_toml(path)?;
    Ok(config.effects)
}

/// Load effect records from a TOML string
pub fn parse_effect_records(content: &str) -> Result<Vec<EffectRecord>, ConfigError> {
    let config: EffectsConfig = super::parse_toml(content)?;
    Ok(config.effects)
}

/// Every record's `data` table as a parameter source
pub fn effect_parameters(records: &[EffectRecord]) -> StaticParameters {
    let mut params = StaticParameters::new();
    for record in records {
        params.extend_effect(&record.id, &record.data);
    }
    params
}

/// Validate records against the vocabulary and build the catalog
pub fn build_catalog(
    records: &[EffectRecord],
    vocabulary: &CounterVocabulary,
    params: &dyn EffectParameterSource,
) -> Result<ThreatCatalog, ConfigError> {
    let catalog = ThreatCatalog::from_records(records, vocabulary, params)?;
    Ok(catalog)
}

/// Get the bundled effect records
pub fn default_effect_records() -> Vec<EffectRecord> {
    let toml = include_str!("../../config/effects.toml");
    parse_effect_records(toml).unwrap_or_else(|err| {
        tracing::error!(error = %err, "bundled effects.toml is invalid");
        Vec::new()
    })
}

/// Get the bundled catalog, validated against the bundled vocabulary
pub fn default_catalog() -> ThreatCatalog {
    let records = default_effect_records();
    let vocabulary = super::default_vocabulary();
    build_catalog(&records, &vocabulary, &effect_parameters(&records)).unwrap_or_else(|err| {
        tracing::error!(error = %err, "bundled catalog is invalid");
        ThreatCatalog::new()
    })
}
