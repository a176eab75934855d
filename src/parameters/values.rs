//! Numeric values of a parameter in force at a reference date

use super::units::{ConstantUnit, UnitTable};
use super::{Parameter, ScaleBracket, ScaleParameter, ValueAtInstant, ValueByInstant, ValueParameter};
use crate::dates::{instant_key, one_year_earlier};
use chrono::NaiveDate;
use std::ops::Bound;

/// Parameters under this path are voted one year ahead of the income they tax
const INCOME_TAX_PATH_PREFIX: &str = "openfisca_france/parameters/impot_revenu/";

/// A numeric value together with the unit it is expressed in
#[derive(Debug, Clone, PartialEq)]
pub struct UnitValue {
    pub unit: Option<ConstantUnit>,
    pub value: f64,
}

impl UnitValue {
    pub fn new(unit: Option<ConstantUnit>, value: f64) -> Self {
        Self { unit, value }
    }
}

/// One bracket of a scale, resolved at a single instant
#[derive(Debug, Clone, PartialEq)]
pub struct BracketAtInstant<'a> {
    pub threshold: &'a ValueAtInstant,
    pub amount: Option<&'a ValueAtInstant>,
    pub rate: Option<&'a ValueAtInstant>,
    pub base: Option<&'a ValueAtInstant>,
}

/// Instant used to select values: the reference date, shifted back one year
/// for income tax parameters.
pub fn cutoff_instant(parameter: &Parameter, date: NaiveDate) -> String {
    let shifted = parameter
        .file_path()
        .is_some_and(|path| path.starts_with(INCOME_TAX_PATH_PREFIX));
    if shifted {
        instant_key(one_year_earlier(date))
    } else {
        instant_key(date)
    }
}

fn latest_at<'a>(values: &'a ValueByInstant, instant: &str) -> Option<(&'a String, &'a ValueAtInstant)> {
    values
        .range::<str, _>((Bound::Unbounded, Bound::Included(instant)))
        .next_back()
}

/// Latest instant, at or before `cutoff`, at which any bracket component changes
fn latest_scale_instant<'a>(scale: &'a ScaleParameter, cutoff: &str) -> Option<&'a str> {
    scale
        .brackets
        .iter()
        .flat_map(ScaleBracket::components)
        .filter_map(|values| latest_at(values, cutoff))
        .map(|(instant, _)| instant.as_str())
        .max()
}

/// Brackets of `scale` as they stand at `instant`.
///
/// Brackets without a threshold at that instant, or with a null or
/// unrecognized threshold, are dropped.
pub fn scale_at<'a>(scale: &'a ScaleParameter, instant: &str) -> Vec<BracketAtInstant<'a>> {
    let component = |values: &'a Option<ValueByInstant>| {
        values
            .as_ref()
            .and_then(|values| latest_at(values, instant))
            .map(|(_, value)| value)
    };

    scale
        .brackets
        .iter()
        .filter_map(|bracket| {
            let threshold = component(&bracket.threshold)?;
            match threshold {
                ValueAtInstant::Known(known) if known.value.is_null() => return None,
                ValueAtInstant::Unknown => return None,
                _ => {}
            }
            Some(BracketAtInstant {
                threshold,
                amount: component(&bracket.amount),
                rate: component(&bracket.rate),
                base: component(&bracket.base),
            })
        })
        .collect()
}

fn value_parameter_values(
    parameter: &Parameter,
    value: &ValueParameter,
    units: &UnitTable,
    date: NaiveDate,
) -> Vec<UnitValue> {
    let cutoff = cutoff_instant(parameter, date);
    let Some((instant, latest)) = latest_at(&value.values, &cutoff) else {
        return Vec::new();
    };

    latest
        .number()
        .map(|number| {
            let unit = units.unit_at(value.unit.as_deref(), instant).cloned();
            UnitValue::new(unit, number)
        })
        .into_iter()
        .collect()
}

fn scale_parameter_values(
    parameter: &Parameter,
    scale: &ScaleParameter,
    units: &UnitTable,
    date: NaiveDate,
) -> Vec<UnitValue> {
    let cutoff = cutoff_instant(parameter, date);
    let Some(instant) = latest_scale_instant(scale, &cutoff) else {
        return Vec::new();
    };
    let brackets = scale_at(scale, instant);

    // A lone bracket starting at zero reads as a plain value: its threshold
    // is not worth highlighting.
    let hide_thresholds = brackets.len() == 1
        && match brackets[0].threshold {
            ValueAtInstant::Expected => true,
            ValueAtInstant::Known(known) => known.number() == Some(0.0),
            ValueAtInstant::Unknown => false,
        };

    let threshold_unit = units.unit_at(scale.threshold_unit.as_deref(), instant);
    let amount_unit = units.unit_at(scale.amount_unit.as_deref(), instant);
    let rate_unit = units.unit_at(scale.rate_unit.as_deref(), instant);

    let mut values = Vec::new();
    for bracket in &brackets {
        let mut emit = |component: Option<&ValueAtInstant>, unit: Option<&ConstantUnit>| {
            if let Some(number) = component.and_then(ValueAtInstant::number) {
                values.push(UnitValue::new(unit.cloned(), number));
            }
        };

        if !hide_thresholds {
            emit(Some(bracket.threshold), threshold_unit);
        }
        emit(bracket.amount, amount_unit);
        emit(bracket.base, threshold_unit);
        emit(bracket.rate, rate_unit);
    }
    values
}

/// Numeric values of `parameter` in force at `date`, with their units.
///
/// Node parameters, and parameters with nothing known at the cutoff, yield
/// nothing. Expected and non-numeric entries are skipped.
pub fn number_values_with_units(
    parameter: &Parameter,
    units: &UnitTable,
    date: NaiveDate,
) -> impl Iterator<Item = UnitValue> {
    let values = match parameter {
        Parameter::Node(_) => Vec::new(),
        Parameter::Value(value) => value_parameter_values(parameter, value, units, date),
        Parameter::Scale(scale) => scale_parameter_values(parameter, scale, units, date),
    };
    values.into_iter()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_iso_date;

    fn parameter(json: &str) -> Parameter {
        serde_json::from_str(json).unwrap()
    }

    fn units() -> UnitTable {
        UnitTable::from_yaml(
            "- name: currency\n  label: euros\n- name: /1\n  label: ratio\n  ratio: true\n",
        )
        .unwrap()
    }

    fn numbers(parameter: &Parameter, date: &str) -> Vec<f64> {
        number_values_with_units(parameter, &units(), parse_iso_date(date).unwrap())
            .map(|unit_value| unit_value.value)
            .collect()
    }

    #[test]
    fn test_value_parameter_latest_entry() {
        let seuil = parameter(
            r#"{"class": "Value", "unit": "currency", "values": {
                "2023-01-01": {"value": 1000},
                "2024-01-01": {"value": 1200},
                "2026-01-01": {"value": 1300}
            }}"#,
        );
        assert_eq!(numbers(&seuil, "2025-06-01"), vec![1200.0]);
        assert_eq!(numbers(&seuil, "2024-01-01"), vec![1200.0]);
        assert!(numbers(&seuil, "2022-12-31").is_empty());

        let values: Vec<_> =
            number_values_with_units(&seuil, &units(), parse_iso_date("2025-06-01").unwrap())
                .collect();
        assert_eq!(values[0].unit.as_ref().unwrap().name, "currency");
    }

    #[test]
    fn test_expected_and_non_numeric_are_skipped() {
        let seuil = parameter(
            r#"{"class": "Value", "values": {
                "2023-01-01": {"value": 1000},
                "2024-01-01": "expected",
                "2025-01-01": {"value": true}
            }}"#,
        );
        assert!(numbers(&seuil, "2024-06-01").is_empty());
        assert!(numbers(&seuil, "2025-06-01").is_empty());
    }

    #[test]
    fn test_income_tax_cutoff_shift() {
        let decote = parameter(
            r#"{"class": "Value", "file_path": "openfisca_france/parameters/impot_revenu/decote.yaml",
                "values": {"2024-01-01": {"value": 889}, "2025-01-01": {"value": 897}}}"#,
        );
        assert_eq!(numbers(&decote, "2025-10-14"), vec![889.0]);
        assert_eq!(numbers(&decote, "2026-01-01"), vec![897.0]);
    }

    #[test]
    fn test_scale_emission_order() {
        let bareme = parameter(
            r#"{"class": "Scale", "threshold_unit": "currency", "rate_unit": "/1", "brackets": [
                {"threshold": {"2024-01-01": {"value": 0}}, "rate": {"2024-01-01": {"value": 0}}},
                {"threshold": {"2024-01-01": {"value": 11294}}, "rate": {"2024-01-01": {"value": 0.11}}},
                {"threshold": {"2024-01-01": {"value": 28797}}, "rate": {"2024-01-01": {"value": 0.3}},
                 "base": {"2024-01-01": {"value": 0.5}}}
            ]}"#,
        );
        assert_eq!(
            numbers(&bareme, "2025-01-01"),
            vec![0.0, 0.0, 11294.0, 0.11, 28797.0, 0.5, 0.3]
        );
    }

    #[test]
    fn test_single_bracket_hides_threshold() {
        let taux = parameter(
            r#"{"class": "Scale", "brackets": [
                {"threshold": {"2024-01-01": {"value": 0}}, "rate": {"2024-01-01": {"value": 0.055}}}
            ]}"#,
        );
        assert_eq!(numbers(&taux, "2025-01-01"), vec![0.055]);
    }

    #[test]
    fn test_single_expected_bracket_emits_amount_only() {
        let forfait = parameter(
            r#"{"class": "Scale", "threshold_unit": "currency", "amount_unit": "currency", "brackets": [
                {"threshold": {"2024-01-01": "expected"}, "amount": {"2024-01-01": {"value": 450}}}
            ]}"#,
        );
        assert_eq!(numbers(&forfait, "2025-01-01"), vec![450.0]);
    }

    #[test]
    fn test_scale_drops_brackets_without_threshold() {
        let bareme = parameter(
            r#"{"class": "Scale", "brackets": [
                {"threshold": {"2024-01-01": {"value": 100}}, "amount": {"2024-01-01": {"value": 5}}},
                {"threshold": {"2024-01-01": {"value": null}}, "amount": {"2024-01-01": {"value": 7}}},
                {"amount": {"2024-01-01": {"value": 9}}},
                {"threshold": {"2030-01-01": {"value": 300}}, "amount": {"2024-01-01": {"value": 11}}}
            ]}"#,
        );
        assert_eq!(numbers(&bareme, "2025-01-01"), vec![100.0, 5.0]);
    }

    #[test]
    fn test_node_yields_nothing() {
        let node = parameter(r#"{"class": "Node", "children": {}}"#);
        assert!(numbers(&node, "2025-01-01").is_empty());
    }
}
