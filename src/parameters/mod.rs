//! Fiscal parameter tree
//!
//! Parameters are loaded from the JSON export of the parameter database:
//! - **Node** parameters own children keyed by name segment
//! - **Value** parameters hold one value per instant
//! - **Scale** parameters hold brackets (threshold, amount, rate, base)
//!
//! Every parameter may cite legal texts through per-instant references.
//! The tree is loaded once and shared read-only afterwards.

use crate::error::{BillmarkError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub mod units;
pub mod values;

pub use units::{ConstantUnit, Unit, UnitTable};
pub use values::{number_values_with_units, UnitValue};

/// ISO date (`YYYY-MM-DD`) keying per-instant data
pub type Instant = String;

/// Values of one parameter component indexed by instant
pub type ValueByInstant = BTreeMap<Instant, ValueAtInstant>;

/// References indexed by instant
pub type ReferencesByInstant = BTreeMap<Instant, Vec<Reference>>;

/// A citation of a legal text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Citation URL, read from `href` or `url` whatever the key casing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl<'de> Deserialize<'de> for Reference {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        let field = |names: &[&str]| {
            map.iter()
                .find(|(key, _)| names.iter().any(|name| key.eq_ignore_ascii_case(name)))
                .and_then(|(_, value)| value.as_str())
                .map(str::to_owned)
        };

        Ok(Reference {
            title: field(&["title"]),
            note: field(&["note"]),
            href: field(&["href", "url"]),
        })
    }
}

/// Keep only well-formed reference arrays; anything else at an instant is ignored.
fn lenient_references_by_instant<'de, D>(
    deserializer: D,
) -> std::result::Result<ReferencesByInstant, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<Instant, serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(instant, value)| match value {
            serde_json::Value::Array(items) => Some((instant, references_from_values(items))),
            _ => None,
        })
        .collect())
}

fn lenient_reference_list<'de, D>(deserializer: D) -> std::result::Result<Vec<Reference>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::Array(items)) => references_from_values(items),
        _ => Vec::new(),
    })
}

fn references_from_values(items: Vec<serde_json::Value>) -> Vec<Reference> {
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

/// A concrete entry of a time-indexed value
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct KnownValue {
    #[serde(default)]
    pub value: serde_json::Value,

    #[serde(default, deserialize_with = "lenient_reference_list")]
    pub reference: Vec<Reference>,
}

impl KnownValue {
    /// Numeric value, if any
    pub fn number(&self) -> Option<f64> {
        self.value.as_f64()
    }
}

/// One entry of a time-indexed value
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawValueAtInstant")]
pub enum ValueAtInstant {
    /// Announced but not known yet
    Expected,
    Known(KnownValue),
    /// Entry of an unrecognized shape, never highlighted
    Unknown,
}

impl ValueAtInstant {
    pub fn known(&self) -> Option<&KnownValue> {
        match self {
            ValueAtInstant::Known(known) => Some(known),
            ValueAtInstant::Expected | ValueAtInstant::Unknown => None,
        }
    }

    pub fn number(&self) -> Option<f64> {
        self.known().and_then(KnownValue::number)
    }

    pub fn references(&self) -> &[Reference] {
        match self {
            ValueAtInstant::Known(known) => &known.reference,
            ValueAtInstant::Expected | ValueAtInstant::Unknown => &[],
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValueAtInstant {
    Sentinel(String),
    Known(KnownValue),
    Other(serde_json::Value),
}

impl From<RawValueAtInstant> for ValueAtInstant {
    fn from(raw: RawValueAtInstant) -> Self {
        match raw {
            RawValueAtInstant::Sentinel(sentinel) if sentinel == "expected" => {
                ValueAtInstant::Expected
            }
            RawValueAtInstant::Sentinel(other) => {
                warn!("Ignoring unknown value sentinel \"{}\"", other);
                ValueAtInstant::Unknown
            }
            RawValueAtInstant::Known(known) => ValueAtInstant::Known(known),
            RawValueAtInstant::Other(other) => {
                warn!("Ignoring value entry of unexpected shape: {}", other);
                ValueAtInstant::Unknown
            }
        }
    }
}

/// Fields shared by every parameter class
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParameterMetadata {
    /// Dotted path from the root (assigned on load when absent)
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub short_label: Option<String>,

    /// Source file of the parameter in the legislation repository
    #[serde(default)]
    pub file_path: Option<String>,

    #[serde(default, deserialize_with = "lenient_references_by_instant")]
    pub reference: ReferencesByInstant,

    #[serde(default, deserialize_with = "lenient_references_by_instant")]
    pub inflator_reference: ReferencesByInstant,

    #[serde(default, deserialize_with = "lenient_references_by_instant")]
    pub revaluation_reference: ReferencesByInstant,

    #[serde(default, deserialize_with = "lenient_references_by_instant")]
    pub notes: ReferencesByInstant,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeParameter {
    #[serde(flatten)]
    pub metadata: ParameterMetadata,

    #[serde(default)]
    pub children: BTreeMap<String, Arc<Parameter>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValueParameter {
    #[serde(flatten)]
    pub metadata: ParameterMetadata,

    #[serde(default)]
    pub values: ValueByInstant,

    #[serde(default)]
    pub unit: Option<String>,
}

/// One tier of a progressive scale
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScaleBracket {
    #[serde(default)]
    pub threshold: Option<ValueByInstant>,
    #[serde(default)]
    pub amount: Option<ValueByInstant>,
    #[serde(default)]
    pub rate: Option<ValueByInstant>,
    #[serde(default)]
    pub base: Option<ValueByInstant>,
}

impl ScaleBracket {
    /// Components present on this bracket, in threshold/amount/rate/base order
    pub fn components(&self) -> impl Iterator<Item = &ValueByInstant> {
        [&self.threshold, &self.amount, &self.rate, &self.base]
            .into_iter()
            .flatten()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScaleParameter {
    #[serde(flatten)]
    pub metadata: ParameterMetadata,

    #[serde(default)]
    pub brackets: Vec<ScaleBracket>,

    #[serde(default)]
    pub threshold_unit: Option<String>,

    #[serde(default)]
    pub amount_unit: Option<String>,

    #[serde(default)]
    pub rate_unit: Option<String>,

    #[serde(default, rename = "type")]
    pub scale_type: Option<String>,
}

/// A fiscal parameter
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "class")]
pub enum Parameter {
    Node(NodeParameter),
    Value(ValueParameter),
    Scale(ScaleParameter),
}

impl Parameter {
    pub fn metadata(&self) -> &ParameterMetadata {
        match self {
            Parameter::Node(node) => &node.metadata,
            Parameter::Value(value) => &value.metadata,
            Parameter::Scale(scale) => &scale.metadata,
        }
    }

    fn metadata_mut(&mut self) -> &mut ParameterMetadata {
        match self {
            Parameter::Node(node) => &mut node.metadata,
            Parameter::Value(value) => &mut value.metadata,
            Parameter::Scale(scale) => &mut scale.metadata,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata().name
    }

    pub fn file_path(&self) -> Option<&str> {
        self.metadata().file_path.as_deref()
    }

    /// Short label, falling back to the title then the name
    pub fn label(&self) -> &str {
        let metadata = self.metadata();
        metadata
            .short_label
            .as_deref()
            .or(metadata.title.as_deref())
            .unwrap_or(&metadata.name)
    }

    pub fn is_node(&self) -> bool {
        matches!(self, Parameter::Node(_))
    }

    pub fn children(&self) -> Option<&BTreeMap<String, Arc<Parameter>>> {
        match self {
            Parameter::Node(node) => Some(&node.children),
            _ => None,
        }
    }

    /// Every reference cited by this parameter itself (children excluded):
    /// primary, inflator and revaluation references, notes, and references
    /// embedded in values or bracket components.
    pub fn cited_references(&self) -> Vec<&Reference> {
        let metadata = self.metadata();
        let mut references: Vec<&Reference> = [
            &metadata.reference,
            &metadata.inflator_reference,
            &metadata.revaluation_reference,
            &metadata.notes,
        ]
        .into_iter()
        .flat_map(|by_instant| by_instant.values().flatten())
        .collect();

        match self {
            Parameter::Node(_) => {}
            Parameter::Value(value) => {
                references.extend(value.values.values().flat_map(ValueAtInstant::references));
            }
            Parameter::Scale(scale) => {
                references.extend(
                    scale
                        .brackets
                        .iter()
                        .flat_map(ScaleBracket::components)
                        .flat_map(|by_instant| by_instant.values())
                        .flat_map(ValueAtInstant::references),
                );
            }
        }

        references
    }
}

/// The root of the parameter hierarchy with names resolved
#[derive(Debug, Clone)]
pub struct ParameterTree {
    root: Arc<Parameter>,
}

impl ParameterTree {
    /// Wrap a root parameter, naming every parameter after its path
    pub fn new(mut root: Parameter) -> Self {
        assign_names(&mut root);
        Self {
            root: Arc::new(root),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let root: Parameter = serde_json::from_str(json)?;
        if !root.is_node() {
            return Err(BillmarkError::ParameterTree(
                "root parameter must be a Node".to_string(),
            ));
        }
        Ok(Self::new(root))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let tree = Self::from_json(&json)?;
        info!("Loaded parameter tree from {}", path.display());
        Ok(tree)
    }

    pub fn root(&self) -> &Arc<Parameter> {
        &self.root
    }

    /// Look a parameter up by dotted name
    pub fn get(&self, name: &str) -> Option<&Arc<Parameter>> {
        let mut parameter = &self.root;
        for segment in name.split('.') {
            parameter = parameter.children()?.get(segment)?;
        }
        Some(parameter)
    }
}

fn assign_names(root: &mut Parameter) {
    let mut stack: Vec<(&mut Parameter, String)> = vec![(root, String::new())];

    while let Some((parameter, name)) = stack.pop() {
        if parameter.metadata().name.is_empty() {
            parameter.metadata_mut().name = name;
        }

        if let Parameter::Node(node) = parameter {
            let prefix = node.metadata.name.clone();
            for (key, child) in node.children.iter_mut() {
                let child_name = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                stack.push((Arc::make_mut(child), child_name));
            }
        }
    }
}
