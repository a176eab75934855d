//! Common test utilities and helpers

#![allow(dead_code)]

use billmark_core::{AnnotationContext, ParameterTree, UnitTable, VariableIndex};
use chrono::NaiveDate;
use std::sync::Arc;

/// Parameter tree with a threshold, a reduced rate and a scale
pub const PARAMETERS_JSON: &str = r#"{
    "class": "Node",
    "children": {
        "impot_revenu": {
            "class": "Node",
            "reference": {"2020-01-01": [{"href": "https://www.legifrance.gouv.fr/codes/article_lc/LEGITEXT000006069577"}]},
            "children": {
                "seuil": {
                    "class": "Value",
                    "unit": "currency",
                    "short_label": "Seuil",
                    "reference": {"2024-01-01": [{"href": "https://www.legifrance.gouv.fr/codes/article_lc/LEGIARTI000012345678"}]},
                    "values": {
                        "2023-01-01": {"value": 1000},
                        "2024-01-01": {"value": 1200}
                    }
                }
            }
        },
        "tva": {
            "class": "Node",
            "children": {
                "taux_reduit": {
                    "class": "Value",
                    "unit": "/1",
                    "short_label": "Taux réduit",
                    "reference": {"2024-01-01": [{"Href": "https://www.legifrance.gouv.fr/codes/article_lc/LEGIARTI000044444444"}]},
                    "values": {
                        "2024-01-01": {"value": 0.055, "reference": [{"HREF": "https://www.legifrance.gouv.fr/codes/article_lc/LEGIARTI000044444444"}]}
                    }
                }
            }
        }
    }
}"#;

pub const UNITS_YAML: &str = r#"
- name: currency-EUR
  label: euros
- name: currency
  units:
    - date: "2002-01-01"
      name: currency-EUR
- name: /1
  label: ratio
  ratio: true
"#;

pub const VARIABLES_JSON: &str = r#"{
    "irpp": {"formulas": {"2002-01-01": {"parameters": ["impot_revenu.seuil"]}}},
    "tva_reduite": {"formulas": {"2002-01-01": {"parameters": ["tva.taux_reduit"]}}}
}"#;

/// Build the shared annotation context from the fixtures
pub fn test_context() -> Arc<AnnotationContext> {
    let tree = ParameterTree::from_json(PARAMETERS_JSON).expect("Valid parameter fixture");
    let units = UnitTable::from_yaml(UNITS_YAML).expect("Valid units fixture");
    let variables = VariableIndex::from_json(VARIABLES_JSON, None).expect("Valid variables fixture");
    Arc::new(AnnotationContext::new(tree, units, variables))
}

pub fn date(value: &str) -> NaiveDate {
    billmark_core::dates::parse_iso_date(value).expect("Valid test date")
}

/// Internal reference link to `identifier`
pub fn reference_link(identifier: &str, text: &str) -> String {
    format!(
        "<a class='law-article-link' href='/pjl/test?article={}'><law-link-text>{}</law-link-text></a>",
        identifier, text
    )
}
