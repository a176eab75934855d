//! Splicing highlight buttons into the original HTML

use super::remap::MappedInterval;
use crate::payload::{self, ParametersToVariables};
use crate::variables::VariableIndex;
use tracing::warn;

/// A mapped interval and the parameters whose values it mentions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightAnnotation {
    pub mapped: MappedInterval,
    /// Parameter names, in order of discovery, without duplicates
    pub parameters: Vec<String>,
}

impl HighlightAnnotation {
    pub fn new(mapped: MappedInterval, parameters: Vec<String>) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            if !unique.contains(&parameter) {
                unique.push(parameter);
            }
        }
        Self {
            mapped,
            parameters: unique,
        }
    }
}

/// Wraps annotated spans in highlight buttons
#[derive(Debug, Clone, Copy)]
pub struct HighlightInjector<'a> {
    variables: &'a VariableIndex,
    button_class: &'a str,
}

impl<'a> HighlightInjector<'a> {
    pub fn new(variables: &'a VariableIndex, button_class: &'a str) -> Self {
        Self {
            variables,
            button_class,
        }
    }

    fn payload(&self, annotation: &HighlightAnnotation) -> String {
        let parameters: ParametersToVariables = annotation
            .parameters
            .iter()
            .map(|name| {
                let variables = self.variables.variables_for_parameter(name);
                (name.clone(), variables.as_ref().clone())
            })
            .collect();
        payload::encode(&parameters)
    }

    fn markup(&self, annotation: &HighlightAnnotation, span: &str) -> String {
        let mapped = &annotation.mapped;
        format!(
            "{}<button class=\"{}\" data-params=\"{}\">{}{}{}</button>{}",
            mapped.outer_prefix,
            self.button_class,
            self.payload(annotation),
            mapped.inner_prefix,
            span,
            mapped.inner_suffix,
            mapped.outer_suffix,
        )
    }

    /// Splice every annotation into `html`, rightmost first so that earlier
    /// offsets stay valid. Annotations with the same start keep their order.
    pub fn inject(&self, html: &str, annotations: &[HighlightAnnotation]) -> String {
        let mut ordered: Vec<&HighlightAnnotation> = annotations.iter().collect();
        ordered.sort_by(|a, b| b.mapped.original.start.cmp(&a.mapped.original.start));

        let mut result = html.to_string();
        for annotation in ordered {
            let range = annotation.mapped.original.start..annotation.mapped.original.stop;
            let valid = range.end <= result.len()
                && result.is_char_boundary(range.start)
                && result.is_char_boundary(range.end);
            if !valid {
                warn!(
                    "Skipping highlight {}..{} outside of character boundaries",
                    range.start, range.end
                );
                continue;
            }

            let markup = self.markup(annotation, &result[range.clone()]);
            result.replace_range(range, &markup);
        }
        result
    }
}
