//! Computed variables depending on a parameter
//!
//! Variable summaries list, per formula start date, the parameters and
//! variables each formula reads. A parameter's dependents are the variables
//! reading it directly, minus those already read by another dependent, with
//! customized (user-facing) variables first.

use crate::error::Result;
use lru::LruCache;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::info;

/// Default number of parameters whose dependents are cached
const DEFAULT_CACHE_CAPACITY: usize = 512;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormulaSummary {
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub variables: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariableSummary {
    /// Formulas by start date; a null formula ends the previous one
    #[serde(default)]
    pub formulas: BTreeMap<String, Option<FormulaSummary>>,
}

impl VariableSummary {
    fn formulas(&self) -> impl Iterator<Item = &FormulaSummary> {
        self.formulas.values().flatten()
    }
}

/// Variable summaries with a cache of parameter lookups
pub struct VariableIndex {
    summaries: BTreeMap<String, VariableSummary>,
    customized: HashSet<String>,
    cache: RwLock<LruCache<String, Arc<Vec<String>>>>,
}

impl std::fmt::Debug for VariableIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableIndex")
            .field("variables", &self.summaries.len())
            .field("customized", &self.customized.len())
            .finish()
    }
}

impl Default for VariableIndex {
    fn default() -> Self {
        Self::new(BTreeMap::new(), HashSet::new())
    }
}

impl VariableIndex {
    pub fn new(summaries: BTreeMap<String, VariableSummary>, customized: HashSet<String>) -> Self {
        Self::with_capacity(summaries, customized, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(
        summaries: BTreeMap<String, VariableSummary>,
        customized: HashSet<String>,
        capacity: usize,
    ) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            summaries,
            customized,
            cache: RwLock::new(LruCache::new(capacity)),
        }
    }

    /// Build from the summaries JSON and the customizations JSON (an object
    /// keyed by customized variable name).
    pub fn from_json(summaries: &str, customizations: Option<&str>) -> Result<Self> {
        let summaries: BTreeMap<String, VariableSummary> = serde_json::from_str(summaries)?;
        let customized = match customizations {
            Some(json) => serde_json::from_str::<BTreeMap<String, serde_json::Value>>(json)?
                .into_keys()
                .collect(),
            None => HashSet::new(),
        };
        Ok(Self::new(summaries, customized))
    }

    pub fn load(summaries: &Path, customizations: Option<&Path>) -> Result<Self> {
        let summaries_json = std::fs::read_to_string(summaries)?;
        let customizations_json = customizations.map(std::fs::read_to_string).transpose()?;
        let index = Self::from_json(&summaries_json, customizations_json.as_deref())?;
        info!(
            "Loaded {} variable summaries ({} customized)",
            index.summaries.len(),
            index.customized.len()
        );
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Variables depending on `parameter`, customized ones first
    pub fn variables_for_parameter(&self, parameter: &str) -> Arc<Vec<String>> {
        if let Ok(mut cache) = self.cache.write() {
            if let Some(cached) = cache.get(parameter) {
                return Arc::clone(cached);
            }
        }

        let variables = Arc::new(self.compute(parameter));
        if let Ok(mut cache) = self.cache.write() {
            cache.put(parameter.to_string(), Arc::clone(&variables));
        }
        variables
    }

    fn compute(&self, parameter: &str) -> Vec<String> {
        let direct: Vec<(&String, &VariableSummary)> = self
            .summaries
            .iter()
            .filter(|(_, summary)| {
                summary
                    .formulas()
                    .any(|formula| formula.parameters.iter().any(|name| name == parameter))
            })
            .collect();

        let read_by_dependents: HashSet<&str> = direct
            .iter()
            .flat_map(|(_, summary)| summary.formulas())
            .flat_map(|formula| formula.variables.iter().map(String::as_str))
            .collect();

        let mut variables: Vec<String> = direct
            .into_iter()
            .map(|(name, _)| name)
            .filter(|name| !read_by_dependents.contains(name.as_str()))
            .cloned()
            .collect();
        variables.sort_by_key(|name| !self.customized.contains(name));
        variables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUMMARIES: &str = r#"{
        "irpp": {"formulas": {"2002-01-01": {"parameters": ["impot_revenu.bareme"], "variables": ["ir_brut"]}}},
        "ir_brut": {"formulas": {"2002-01-01": {"parameters": ["impot_revenu.bareme"]}}},
        "decote": {"formulas": {"2002-01-01": null, "2014-01-01": {"parameters": ["impot_revenu.bareme", "impot_revenu.decote"]}}},
        "af": {"formulas": {"2002-01-01": {"parameters": ["prestations.af"]}}},
        "sans_formule": {}
    }"#;

    #[test]
    fn test_dependents_exclude_intermediate_variables() {
        let index = VariableIndex::from_json(SUMMARIES, None).unwrap();
        assert_eq!(
            *index.variables_for_parameter("impot_revenu.bareme"),
            vec!["decote".to_string(), "irpp".to_string()]
        );
    }

    #[test]
    fn test_customized_first() {
        let index = VariableIndex::from_json(SUMMARIES, Some(r#"{"irpp": {}}"#)).unwrap();
        assert_eq!(
            *index.variables_for_parameter("impot_revenu.bareme"),
            vec!["irpp".to_string(), "decote".to_string()]
        );
    }

    #[test]
    fn test_unknown_parameter() {
        let index = VariableIndex::from_json(SUMMARIES, None).unwrap();
        assert!(index.variables_for_parameter("inconnu").is_empty());
        // second lookup is served from the cache
        assert!(index.variables_for_parameter("inconnu").is_empty());
    }
}
