//! Configuration for billmark
//!
//! Loaded from an optional TOML file, then overridden by `BILLMARK_*`
//! environment variables (`__` separates nested keys, e.g.
//! `BILLMARK_HIGHLIGHT__BUTTON_CLASS`).
//!
//! ```toml
//! default_date = "2025-10-14"
//!
//! [data]
//! parameters = "data/raw_processed_parameters.json"
//! units = "data/units.yaml"
//! variables = "data/variables_summaries.json"
//! customizations = "data/customizations.json"
//! versions = "data/versions.json"
//!
//! [bill_dates]
//! PRJLANR5L17B0324 = "2025-10-14"
//!
//! [highlight]
//! button_class = "highlighted"
//! show_parameter_labels = false
//! link_base = "/pjl"
//! ```

use crate::dates::parse_iso_date;
use crate::error::Result;
use crate::highlight::HighlightSettings;
use chrono::NaiveDate;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of environment overrides
const ENV_PREFIX: &str = "BILLMARK";

/// Location of the data files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    /// Parameter tree JSON
    pub parameters: PathBuf,
    /// Units YAML
    pub units: PathBuf,
    /// Variable summaries JSON
    pub variables: PathBuf,
    /// Customized variables JSON
    pub customizations: Option<PathBuf>,
    /// Identifier versions table JSON, for rename resolution
    pub versions: Option<PathBuf>,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            parameters: PathBuf::from("data/raw_processed_parameters.json"),
            units: PathBuf::from("data/units.yaml"),
            variables: PathBuf::from("data/variables_summaries.json"),
            customizations: None,
            versions: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillmarkConfig {
    /// Reference date used when a bill has none (`YYYY-MM-DD`)
    pub default_date: Option<String>,

    pub data: DataPaths,

    /// Reference date of each bill, by bill identifier
    pub bill_dates: BTreeMap<String, String>,

    pub highlight: HighlightSettings,
}

impl BillmarkConfig {
    /// Load from `path` (when it exists) and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            if path.exists() {
                info!("Loading configuration from {:?}", path);
            } else {
                info!("Config file not found, using defaults: {:?}", path);
            }
            builder = builder.add_source(File::from(path).required(false));
        }

        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Save configuration as TOML, creating the parent directory if needed
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Reference date of a bill: its own, else the default date, else today.
    ///
    /// Bill identifiers are compared case-insensitively.
    pub fn bill_date(&self, bill_id: &str) -> Result<NaiveDate> {
        let configured = self
            .bill_dates
            .iter()
            .find(|(id, _)| id.eq_ignore_ascii_case(bill_id))
            .map(|(_, date)| date)
            .or(self.default_date.as_ref());

        match configured {
            Some(date) => parse_iso_date(date),
            None => Ok(chrono::Local::now().date_naive()),
        }
    }
}
