//! Literal strings a parameter value may take in French legal text
//!
//! A value is written either with grouped digits (`1 500`) or spelled out
//! (`mille cinq cents`). Ratios are also written as percentages, so a rate of
//! `0.055` yields `5,5` and `cinq virgule cinq`.

pub mod digits;
pub mod words;

pub use digits::Decimal;
pub use words::{integer_words, spelled_out};

use crate::parameters::UnitValue;

/// Digit and word forms of a single number
pub fn number_forms(value: f64) -> Vec<String> {
    let Some(decimal) = Decimal::from_f64(value) else {
        return Vec::new();
    };
    let mut forms = vec![decimal.grouped()];
    forms.extend(spelled_out(&decimal));
    forms
}

/// Forms of a value as percentage (unknown or ratio unit) then as is
/// (unknown or non-ratio unit), without duplicates.
pub fn text_forms(unit_value: &UnitValue) -> Vec<String> {
    let ratio = unit_value.unit.as_ref().map(|unit| unit.ratio);

    let mut candidates = Vec::new();
    if ratio != Some(false) {
        candidates.extend(number_forms(unit_value.value * 100.0));
    }
    if ratio != Some(true) {
        candidates.extend(number_forms(unit_value.value));
    }

    let mut forms: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !forms.contains(&candidate) {
            forms.push(candidate);
        }
    }
    forms
}
