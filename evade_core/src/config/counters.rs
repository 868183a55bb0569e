//! Counter vocabulary loading

use super::ConfigError;
use crate::catalog::{CounterAction, CounterVocabulary};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Container for counter-action records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountersConfig {
    #[serde(rename = "counters")]
    pub counters: Vec<CounterAction>,
}

impl CountersConfig {
    /// Register every record in file order
    pub fn into_vocabulary(self) -> Result<CounterVocabulary, ConfigError> {
        let mut vocabulary = CounterVocabulary::new();
        for action in self.counters {
            vocabulary.register(action)?;
        }
        Ok(vocabulary)
    }
}

/// Load the counter vocabulary from a TOML file
pub fn load_vocabulary(path: &Path) -> Result<CounterVocabulary, ConfigError> {
    let config: CountersConfig = super::load_toml(path)?;
    config.into_vocabulary()
}

/// Load the counter vocabulary from a TOML string
pub fn parse_vocabulary(content: &str) -> Result<CounterVocabulary, ConfigError> {
    let config: CountersConfig = super::parse_toml(content)?;
    config.into_vocabulary()
}

/// Get the bundled counter vocabulary
pub fn default_vocabulary() -> CounterVocabulary {
    let toml = include_str!("../../config/counters.toml");
    parse_vocabulary(toml).unwrap_or_else(|err| {
        tracing::error!(error = %err, "bundled counters.toml is invalid");
        CounterVocabulary::new()
    })
}
