//! Configuration and settings for value highlighting

use serde::{Deserialize, Serialize};

/// Highlighting and link rendering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightSettings {
    /// CSS class of the injected highlight buttons
    pub button_class: String,

    /// Add a `title` listing parameter labels to rewritten reference links
    pub show_parameter_labels: bool,

    /// Base path of rewritten reference links (`{link_base}?article=ID`)
    pub link_base: String,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            button_class: "highlighted".to_string(),
            show_parameter_labels: false,
            link_base: String::new(),
        }
    }
}

impl HighlightSettings {
    pub fn with_link_base(mut self, link_base: impl Into<String>) -> Self {
        self.link_base = link_base.into();
        self
    }

    pub fn with_parameter_labels(mut self, show: bool) -> Self {
        self.show_parameter_labels = show;
        self
    }
}
