//! Legal identifier → parameters index
//!
//! Built once per parameter tree load by walking every parameter and the
//! references it cites. Identifiers renamed since (articles are re-numbered
//! when codes are consolidated) are resolved per document by
//! [`resolve_current_identifiers`].

pub mod rename;

pub use rename::{resolve_current_identifiers, NoRenames, RenameLookup, VersionRow, VersionTable};

use crate::parameters::Parameter;
use crate::patterns::CommonPatterns;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Legal identifiers found in a URL, upper-cased
pub fn extract_legal_identifiers(url: &str) -> Vec<String> {
    CommonPatterns::legal_identifier()
        .find_iter(url)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn push_unique(parameters: &mut Vec<Arc<Parameter>>, parameter: &Arc<Parameter>) {
    if !parameters.iter().any(|known| Arc::ptr_eq(known, parameter)) {
        parameters.push(Arc::clone(parameter));
    }
}

/// Parameters citing each legal identifier
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    by_identifier: BTreeMap<String, Vec<Arc<Parameter>>>,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk the tree under `root` and index every cited identifier.
    ///
    /// Node parameters create keys for the identifiers they cite but are
    /// never registered themselves.
    pub fn build(root: &Arc<Parameter>) -> Self {
        let mut by_identifier: BTreeMap<String, Vec<Arc<Parameter>>> = BTreeMap::new();
        let mut stack = vec![Arc::clone(root)];

        while let Some(parameter) = stack.pop() {
            for reference in parameter.cited_references() {
                let Some(href) = reference.href.as_deref() else {
                    continue;
                };
                for identifier in extract_legal_identifiers(href) {
                    let registrants = by_identifier.entry(identifier).or_default();
                    if !parameter.is_node() {
                        push_unique(registrants, &parameter);
                    }
                }
            }

            if let Some(children) = parameter.children() {
                // Reversed so that children are visited in key order
                stack.extend(children.values().rev().cloned());
            }
        }

        debug!("Indexed {} legal identifiers", by_identifier.len());
        Self { by_identifier }
    }

    pub fn len(&self) -> usize {
        self.by_identifier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identifier.is_empty()
    }

    pub fn get(&self, identifier: &str) -> Option<&[Arc<Parameter>]> {
        self.by_identifier.get(identifier).map(Vec::as_slice)
    }

    /// Parameters citing `identifier`, empty when unknown
    pub fn parameters_for(&self, identifier: &str) -> &[Arc<Parameter>] {
        self.get(identifier).unwrap_or(&[])
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &String> {
        self.by_identifier.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Arc<Parameter>>)> {
        self.by_identifier.iter()
    }

    /// Re-key with `renames` (old → current). Unrenamed keys are kept; lists
    /// landing on the same key are merged without duplicates.
    pub fn rekeyed(&self, renames: &HashMap<String, String>) -> Self {
        let mut by_identifier: BTreeMap<String, Vec<Arc<Parameter>>> = BTreeMap::new();
        for (identifier, parameters) in &self.by_identifier {
            let key = renames.get(identifier).unwrap_or(identifier);
            let merged = by_identifier.entry(key.clone()).or_default();
            for parameter in parameters {
                push_unique(merged, parameter);
            }
        }
        Self { by_identifier }
    }

    /// Parameter names per identifier
    pub fn names(&self) -> BTreeMap<String, Vec<String>> {
        self.by_identifier
            .iter()
            .map(|(identifier, parameters)| {
                let names = parameters
                    .iter()
                    .map(|parameter| parameter.name().to_string())
                    .collect();
                (identifier.clone(), names)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ParameterTree;

    fn tree() -> ParameterTree {
        ParameterTree::from_json(
            r#"{
            "class": "Node",
            "children": {
                "a": {
                    "class": "Value",
                    "reference": {"2020-01-01": [{"href": "https://legifrance.gouv.fr/LEGIARTI000000000001"}]},
                    "values": {"2020-01-01": {"value": 1, "reference": [{"href": "LEGIARTI000000000002 et JORFTEXT000000000003"}]}}
                },
                "b": {
                    "class": "Value",
                    "notes": {"2020-01-01": [{"href": "legiarti000000000001"}]},
                    "values": {}
                }
            }
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_extract_identifiers() {
        assert_eq!(
            extract_legal_identifiers("https://x/?a=JORFARTI000001&b=LEGITEXT0002"),
            vec!["JORFARTI000001", "LEGITEXT0002"]
        );
        assert!(extract_legal_identifiers("https://x/LEGISCTA000001").is_empty());
        assert!(extract_legal_identifiers("https://x/legiarti000001").is_empty());
    }

    #[test]
    fn test_build_index() {
        let index = ReferenceIndex::build(tree().root());
        let names: Vec<_> = index
            .parameters_for("LEGIARTI000000000001")
            .iter()
            .map(|parameter| parameter.name())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(index.parameters_for("JORFTEXT000000000003").len(), 1);
        assert!(index.parameters_for("LEGIARTI999").is_empty());
    }

    #[test]
    fn test_rekeyed_merges() {
        let index = ReferenceIndex::build(tree().root());
        let renames = HashMap::from([
            ("LEGIARTI000000000002".to_string(), "LEGIARTI000000000001".to_string()),
        ]);
        let rekeyed = index.rekeyed(&renames);
        assert!(rekeyed.get("LEGIARTI000000000002").is_none());
        assert_eq!(rekeyed.parameters_for("LEGIARTI000000000001").len(), 2);
        assert_eq!(rekeyed.len(), index.len() - 1);
    }
}
