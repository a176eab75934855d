//! Measurement units of parameter values
//!
//! A unit is either constant (`currency`, `/1`, ...) or dated: a dated unit
//! points to different constant units over time (`currency` switching from
//! francs to euros for instance).

use crate::error::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Maximum number of dated-unit indirections followed before giving up
const MAX_UNIT_HOPS: usize = 8;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConstantUnit {
    pub name: String,

    #[serde(default)]
    pub label: Option<serde_yaml::Value>,

    /// Values are fractions displayed as percentages
    #[serde(default)]
    pub ratio: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatedUnitEntry {
    pub date: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatedUnit {
    pub name: String,
    pub units: Vec<DatedUnitEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Unit {
    Dated(DatedUnit),
    Constant(ConstantUnit),
}

impl Unit {
    pub fn name(&self) -> &str {
        match self {
            Unit::Dated(dated) => &dated.name,
            Unit::Constant(constant) => &constant.name,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UnitsFile {
    Sequence(Vec<Unit>),
    Mapping(HashMap<String, Unit>),
}

/// Units indexed by name
#[derive(Debug, Clone, Default)]
pub struct UnitTable {
    by_name: HashMap<String, Unit>,
}

impl UnitTable {
    pub fn new(units: impl IntoIterator<Item = Unit>) -> Self {
        Self {
            by_name: units
                .into_iter()
                .map(|unit| (unit.name().to_string(), unit))
                .collect(),
        }
    }

    /// Parse the units YAML file, either a sequence or a name-keyed mapping
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let units = match serde_yaml::from_str::<UnitsFile>(yaml)? {
            UnitsFile::Sequence(units) => units,
            UnitsFile::Mapping(units) => units.into_values().collect(),
        };
        Ok(Self::new(units))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        let table = Self::from_yaml(&yaml)?;
        info!("Loaded {} units from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Unit> {
        self.by_name.get(name)
    }

    /// Constant unit in force at `date` (an ISO instant).
    ///
    /// Dated units resolve to their latest entry dated at or before `date`,
    /// or to their earliest entry when `date` precedes all of them.
    pub fn unit_at(&self, name: Option<&str>, date: &str) -> Option<&ConstantUnit> {
        let mut name = name?;

        for _ in 0..MAX_UNIT_HOPS {
            match self.by_name.get(name)? {
                Unit::Constant(constant) => return Some(constant),
                Unit::Dated(dated) => {
                    let in_force = dated
                        .units
                        .iter()
                        .filter(|entry| entry.date.as_str() <= date)
                        .max_by(|a, b| a.date.cmp(&b.date))
                        .or_else(|| dated.units.iter().min_by(|a, b| a.date.cmp(&b.date)))?;
                    name = &in_force.name;
                }
            }
        }

        warn!("Unit {} does not resolve to a constant unit", name);
        None
    }
}
