//! CounterVocabulary - The shared, read-only set of counter-actions

use super::CatalogError;
use crate::types::CounterKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A counter-action the protected actor may own (ability or item)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterAction {
    /// Unique identifier (e.g., "item_blink", "puck_phase_shift")
    pub id: String,
    pub kind: CounterKind,
    /// Mana cost
    #[serde(default)]
    pub cost: f64,
    /// Time from issuing the order until the effect applies (cast point,
    /// projectile travel for disables)
    #[serde(default)]
    pub min_application_time: f64,
    /// Maximum reposition distance, or cast range for disables
    #[serde(default)]
    pub range: f64,
    /// Named groups this counter belongs to, in vocabulary order
    #[serde(default)]
    pub groups: Vec<String>,
}

impl CounterAction {
    pub fn new(id: &str, kind: CounterKind) -> Self {
        CounterAction {
            id: id.to_string(),
            kind,
            cost: 0.0,
            min_application_time: 0.0,
            range: 0.0,
            groups: Vec::new(),
        }
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_application_time(mut self, seconds: f64) -> Self {
        self.min_application_time = seconds;
        self
    }

    pub fn with_range(mut self, range: f64) -> Self {
        self.range = range;
        self
    }

    pub fn in_group(mut self, group: &str) -> Self {
        self.groups.push(group.to_string());
        self
    }

    pub fn is_disable(&self) -> bool {
        self.kind == CounterKind::CasterDisable
    }
}

/// Registry of every counter-action plus the named groups descriptors refer
/// to ("blink", "disable", "vs_magic", ...)
#[derive(Debug, Clone, Default)]
pub struct CounterVocabulary {
    actions: HashMap<String, CounterAction>,
    groups: HashMap<String, Vec<String>>,
}

impl CounterVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a counter-action. Group membership follows registration order.
    pub fn register(&mut self, action: CounterAction) -> Result<(), CatalogError> {
        if self.actions.contains_key(&action.id) {
            return Err(CatalogError::DuplicateCounter(action.id));
        }
        for group in &action.groups {
            self.groups
                .entry(group.clone())
                .or_default()
                .push(action.id.clone());
        }
        self.actions.insert(action.id.clone(), action);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&CounterAction> {
        self.actions.get(id)
    }

    /// Members of a named group in registration order
    pub fn group(&self, name: &str) -> Option<&[String]> {
        self.groups.get(name).map(|ids| ids.as_slice())
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
