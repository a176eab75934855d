//! Highlight payload: parameter name → dependent variable names
//!
//! Carried in the `data-params` attribute of highlight buttons as base64
//! (standard alphabet, padded) of the UTF-8 JSON object.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::collections::BTreeMap;
use tracing::warn;

/// Variables depending on each highlighted parameter, keys sorted
pub type ParametersToVariables = BTreeMap<String, Vec<String>>;

pub fn encode(parameters: &ParametersToVariables) -> String {
    // A map of string vectors always serializes.
    let json = serde_json::to_string(parameters).unwrap_or_default();
    STANDARD.encode(json)
}

/// Decode a payload, `None` when it is not valid base64 of the expected JSON
pub fn decode(encoded: &str) -> Option<ParametersToVariables> {
    let bytes = match STANDARD.decode(encoded.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Invalid highlight payload encoding: {}", e);
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(parameters) => Some(parameters),
        Err(e) => {
            warn!("Invalid highlight payload content: {}", e);
            None
        }
    }
}
