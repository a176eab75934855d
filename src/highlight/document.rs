//! Highlighting a whole bill
//!
//! The bill is cut at every internal reference link. The text following a
//! link, up to the next one (or the end of the document), is read in the
//! context of that link's identifier: values of the parameters citing it are
//! highlighted there. Links themselves are copied verbatim.

use super::inject::{HighlightAnnotation, HighlightInjector};
use super::matcher::ValueMatcher;
use super::remap::RemapCursor;
use super::settings::HighlightSettings;
use super::Interval;
use crate::error::Result;
use crate::parameters::{Parameter, UnitTable};
use crate::patterns::CommonPatterns;
use crate::references::ReferenceIndex;
use crate::simplify::{simplify_html, SimplifyOptions};
use crate::variables::VariableIndex;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Keep non-overlapping intervals, preferring the earliest then the longest
fn without_overlaps(hits: BTreeMap<(usize, usize), Vec<String>>) -> Vec<(Interval, Vec<String>)> {
    let mut candidates: Vec<(Interval, Vec<String>)> = hits
        .into_iter()
        .map(|((start, stop), names)| (Interval::new(start, stop), names))
        .collect();
    candidates.sort_by(|(a, _), (b, _)| a.start.cmp(&b.start).then(b.stop.cmp(&a.stop)));

    let mut kept: Vec<(Interval, Vec<String>)> = Vec::with_capacity(candidates.len());
    for (interval, names) in candidates {
        let overlaps = kept
            .last()
            .is_some_and(|(previous, _)| previous.overlaps(&interval));
        if !overlaps {
            kept.push((interval, names));
        }
    }
    kept
}

/// Highlights parameter values in bill HTML
#[derive(Debug, Clone)]
pub struct DocumentHighlighter<'a> {
    index: &'a ReferenceIndex,
    units: &'a UnitTable,
    variables: &'a VariableIndex,
    date: NaiveDate,
    settings: HighlightSettings,
}

impl<'a> DocumentHighlighter<'a> {
    pub fn new(
        index: &'a ReferenceIndex,
        units: &'a UnitTable,
        variables: &'a VariableIndex,
        date: NaiveDate,
    ) -> Self {
        Self {
            index,
            units,
            variables,
            date,
            settings: HighlightSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: HighlightSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Highlight the whole document
    pub fn highlight(&self, html: &str) -> Result<String> {
        let mut output = String::with_capacity(html.len());
        let mut last_end = 0;
        let mut current: Option<&str> = None;
        let mut links = 0;

        for captures in CommonPatterns::reference_link().captures_iter(html) {
            let (Some(link), Some(identifier)) = (captures.get(0), captures.get(1)) else {
                continue;
            };

            self.push_segment(&mut output, &html[last_end..link.start()], current)?;
            output.push_str(link.as_str());
            last_end = link.end();
            current = Some(identifier.as_str());
            links += 1;
        }
        self.push_segment(&mut output, &html[last_end..], current)?;

        debug!("Highlighted document with {} reference links", links);
        Ok(output)
    }

    fn push_segment(&self, output: &mut String, segment: &str, identifier: Option<&str>) -> Result<()> {
        let parameters = identifier
            .map(|identifier| self.index.parameters_for(identifier))
            .unwrap_or_default();
        if parameters.is_empty() || segment.is_empty() {
            output.push_str(segment);
        } else {
            output.push_str(&self.highlight_segment(segment, parameters)?);
        }
        Ok(())
    }

    /// Highlight the values of `parameters` in one segment
    pub fn highlight_segment(&self, segment: &str, parameters: &[Arc<Parameter>]) -> Result<String> {
        let simplified = simplify_html(segment, &SimplifyOptions::default());
        let matcher = ValueMatcher::new(self.units, self.date);
        let highlighted: Vec<_> = simplified.record.highlighted().collect();

        let mut hits: BTreeMap<(usize, usize), Vec<String>> = BTreeMap::new();
        for parameter in parameters {
            for interval in matcher.find(&simplified.text, parameter) {
                if highlighted
                    .iter()
                    .any(|range| range.start < interval.stop && interval.start < range.end)
                {
                    continue;
                }
                hits.entry((interval.start, interval.stop))
                    .or_default()
                    .push(parameter.name().to_string());
            }
        }
        if hits.is_empty() {
            return Ok(segment.to_string());
        }

        let mut cursor = RemapCursor::new(&simplified.record);
        let mut annotations = Vec::new();
        for (interval, names) in without_overlaps(hits) {
            let mapped = cursor.advance(interval)?;
            annotations.push(HighlightAnnotation::new(mapped, names));
        }
        debug!("Injecting {} highlights in segment", annotations.len());

        let injector = HighlightInjector::new(self.variables, &self.settings.button_class);
        Ok(injector.inject(segment, &annotations))
    }
}
