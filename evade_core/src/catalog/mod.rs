//! Threat catalog - Registry of evadable effects and the counter vocabulary

mod descriptor;
mod vocabulary;

pub use descriptor::{dedup_in_order, EffectDescriptor, EffectRecord, GeometryClass};
pub use vocabulary::{CounterAction, CounterVocabulary};

use crate::world::EffectParameterSource;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Catalog construction and lookup errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("unknown effect '{0}'")]
    UnknownEffect(String),
    #[error("effect '{0}' is already registered")]
    DuplicateIdentity(String),
    #[error("counter '{0}' is already registered")]
    DuplicateCounter(String),
    #[error("effect '{effect}' has no parameter '{parameter}'")]
    MissingEffectParameter { effect: String, parameter: String },
    #[error("effect '{0}' responds to threats but lists no counters")]
    EmptyCounterCatalog(String),
    #[error("effect '{effect}' references unknown counter group '@{group}'")]
    UnknownCounterGroup { effect: String, group: String },
}

impl CatalogError {
    /// Errors that abort catalog construction. Everything else only drops
    /// the offending descriptor.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CatalogError::DuplicateIdentity(_) | CatalogError::DuplicateCounter(_)
        )
    }
}

/// Effect identity -> descriptor. Populated at startup, read-only after.
#[derive(Debug, Clone, Default)]
pub struct ThreatCatalog {
    descriptors: HashMap<String, Arc<EffectDescriptor>>,
}

impl ThreatCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor
    pub fn register(&mut self, descriptor: EffectDescriptor) -> Result<(), CatalogError> {
        if self.descriptors.contains_key(&descriptor.id) {
            return Err(CatalogError::DuplicateIdentity(descriptor.id));
        }
        self.descriptors
            .insert(descriptor.id.clone(), Arc::new(descriptor));
        Ok(())
    }

    pub fn lookup(&self, id: &str) -> Result<Arc<EffectDescriptor>, CatalogError> {
        self.descriptors
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownEffect(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.descriptors.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Registered effect identities, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.descriptors.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Build a catalog from configuration records.
    ///
    /// Descriptors that fail validation are logged and left untracked;
    /// duplicate identities abort construction.
    pub fn from_records(
        records: &[EffectRecord],
        vocabulary: &CounterVocabulary,
        params: &dyn EffectParameterSource,
    ) -> Result<Self, CatalogError> {
        let mut catalog = ThreatCatalog::new();
        let mut skipped = 0usize;

        for record in records {
            match EffectDescriptor::build(record, vocabulary, params) {
                Ok(descriptor) => catalog.register(descriptor)?,
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    tracing::warn!(effect = %record.id, error = %err, "effect left untracked");
                    skipped += 1;
                }
            }
        }

        tracing::info!(
            registered = catalog.len(),
            skipped,
            "threat catalog built"
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CounterKind;
    use crate::world::StaticParameters;

    fn vocabulary() -> CounterVocabulary {
        let mut vocab = CounterVocabulary::new();
        vocab
            .register(CounterAction::new("item_blink", CounterKind::Reposition).in_group("blink"))
            .unwrap();
        vocab
    }

    fn arrow() -> EffectRecord {
        EffectRecord::new(
            "mirana_arrow",
            GeometryClass::Linear {
                range: 3000.0,
                width: 115.0,
                speed: Some(857.0),
            },
        )
        .with_base_delay(0.5)
        .with_blink(&["@blink"])
    }

    #[test]
    fn test_register_and_lookup() {
        let mut catalog = ThreatCatalog::new();
        let descriptor =
            EffectDescriptor::build(&arrow(), &vocabulary(), &StaticParameters::new()).unwrap();
        catalog.register(descriptor).unwrap();

        assert!(catalog.contains("mirana_arrow"));
        assert_eq!(catalog.lookup("mirana_arrow").unwrap().id, "mirana_arrow");
        assert_eq!(
            catalog.lookup("lion_impale").unwrap_err(),
            CatalogError::UnknownEffect("lion_impale".to_string())
        );
    }

    #[test]
    fn test_duplicate_identity() {
        let mut catalog = ThreatCatalog::new();
        let vocab = vocabulary();
        let params = StaticParameters::new();
        catalog
            .register(EffectDescriptor::build(&arrow(), &vocab, &params).unwrap())
            .unwrap();
        let err = catalog
            .register(EffectDescriptor::build(&arrow(), &vocab, &params).unwrap())
            .unwrap_err();
        assert_eq!(err, CatalogError::DuplicateIdentity("mirana_arrow".to_string()));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_from_records_skips_invalid() {
        let mut broken = EffectRecord::new(
            "lina_laguna_blade",
            GeometryClass::Linear {
                range: 600.0,
                width: 250.0,
                speed: None,
            },
        )
        .with_blink(&["@blink"]);
        broken.additional_delay_param = Some("damage_delay".to_string());

        let catalog = ThreatCatalog::from_records(
            &[arrow(), broken],
            &vocabulary(),
            &StaticParameters::new(),
        )
        .unwrap();

        assert_eq!(catalog.ids(), vec!["mirana_arrow"]);
    }

    #[test]
    fn test_from_records_duplicate_is_fatal() {
        let result = ThreatCatalog::from_records(
            &[arrow(), arrow()],
            &vocabulary(),
            &StaticParameters::new(),
        );
        assert!(matches!(result, Err(CatalogError::DuplicateIdentity(_))));
    }
}
