//! Mapping simplified intervals back onto the original HTML
//!
//! [`RemapCursor`] walks the [`TransformationRecord`] once, forward only, so
//! intervals must be submitted in ascending start order. Along the way it
//! tracks which elements are open, which is what lets it balance a span
//! that starts or ends inside an element:
//!
//! ```text
//! original:  <b>taux de 5</b>,5 %
//! span:            [ 5</b>,5 ]
//! result:    outer_prefix </b>  inner_prefix <b>
//! ```

use super::Interval;
use crate::simplify::{is_void_element, Fragment, FragmentKind, TagInfo, TransformationRecord};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemapError {
    #[error("interval starting at {start} submitted after one starting at {previous}")]
    OutOfOrder { previous: usize, start: usize },

    #[error("interval {start}..{stop} exceeds simplified text of length {len}")]
    OutOfBounds { start: usize, stop: usize, len: usize },
}

/// An interval in original coordinates with the markup that keeps it balanced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappedInterval {
    pub original: Interval,
    /// Closes elements opened before the span; goes before the highlight
    pub outer_prefix: String,
    /// Reopens those elements inside the highlight
    pub inner_prefix: String,
    /// Closes elements opened inside the span before the highlight ends
    pub inner_suffix: String,
    /// Reopens those elements after the highlight
    pub outer_suffix: String,
}

impl MappedInterval {
    pub fn new(original: Interval) -> Self {
        Self {
            original,
            ..Default::default()
        }
    }
}

fn opens_element(tag: &TagInfo) -> bool {
    !tag.closing && !tag.self_closing && !is_void_element(&tag.name)
}

/// Close `name` in a stack of open elements, returning the matching opener
fn close_in<'r>(stack: &mut Vec<&'r TagInfo>, name: &str) -> Option<&'r TagInfo> {
    let position = stack.iter().rposition(|open| open.name == name)?;
    let opener = stack[position];
    stack.truncate(position);
    Some(opener)
}

fn is_empty(fragment: &Fragment) -> bool {
    fragment.simplified.is_empty()
}

/// Forward-only mapper from simplified to original coordinates
#[derive(Debug)]
pub struct RemapCursor<'r> {
    fragments: &'r [Fragment],
    /// First fragment not yet folded into `open`
    next: usize,
    /// Elements open before fragment `next`
    open: Vec<&'r TagInfo>,
    previous_start: Option<usize>,
    simplified_len: usize,
}

impl<'r> RemapCursor<'r> {
    pub fn new(record: &'r TransformationRecord) -> Self {
        Self {
            fragments: record.fragments(),
            next: 0,
            open: Vec::new(),
            previous_start: None,
            simplified_len: record.simplified_len(),
        }
    }

    fn consume_until(&mut self, index: usize) {
        let fragments = self.fragments;
        while self.next < index {
            if let FragmentKind::Tag(tag) = &fragments[self.next].kind {
                if tag.closing {
                    close_in(&mut self.open, &tag.name);
                } else if opens_element(tag) {
                    self.open.push(tag);
                }
            }
            self.next += 1;
        }
    }

    fn original_end(&self) -> usize {
        self.fragments
            .last()
            .map_or(0, |fragment| fragment.original.end)
    }

    /// Map the next interval. Starts must not decrease between calls.
    pub fn advance(&mut self, interval: Interval) -> Result<MappedInterval, RemapError> {
        if interval.stop > self.simplified_len {
            return Err(RemapError::OutOfBounds {
                start: interval.start,
                stop: interval.stop,
                len: self.simplified_len,
            });
        }
        if let Some(previous) = self.previous_start {
            if interval.start < previous {
                return Err(RemapError::OutOfOrder {
                    previous,
                    start: interval.start,
                });
            }
        }
        self.previous_start = Some(interval.start);

        let fragments = self.fragments;
        let start_index = fragments[self.next..]
            .iter()
            .position(|fragment| !is_empty(fragment) && fragment.simplified.end > interval.start)
            .map(|offset| self.next + offset);

        let Some(start_index) = start_index else {
            // Empty interval at the very end of the text
            self.consume_until(fragments.len());
            let end = self.original_end();
            return Ok(MappedInterval::new(Interval::new(end, end)));
        };
        self.consume_until(start_index);

        let start_fragment = &fragments[start_index];
        let original_start = match start_fragment.kind {
            FragmentKind::Text => {
                start_fragment.original.start + (interval.start - start_fragment.simplified.start)
            }
            _ => start_fragment.original.start,
        };

        if interval.is_empty() {
            return Ok(MappedInterval::new(Interval::new(original_start, original_start)));
        }

        let stop_index = start_index
            + fragments[start_index..]
                .iter()
                .position(|fragment| !is_empty(fragment) && fragment.simplified.end >= interval.stop)
                .unwrap_or(fragments.len() - start_index - 1);
        let stop_fragment = &fragments[stop_index];
        let original_stop = match stop_fragment.kind {
            FragmentKind::Text => {
                stop_fragment.original.start + (interval.stop - stop_fragment.simplified.start)
            }
            _ => stop_fragment.original.end,
        };

        let mut mapped = MappedInterval::new(Interval::new(original_start, original_stop));
        let mut outside = self.open.clone();
        let mut inside: Vec<&TagInfo> = Vec::new();

        let within = fragments.get(start_index + 1..stop_index).unwrap_or(&[]);
        for fragment in within {
            let FragmentKind::Tag(tag) = &fragment.kind else {
                continue;
            };
            if tag.closing {
                if close_in(&mut inside, &tag.name).is_none() {
                    mapped.outer_prefix.push_str(&format!("</{}>", tag.name));
                    let opener = close_in(&mut outside, &tag.name)
                        .map_or_else(|| format!("<{}>", tag.name), |open| open.raw.clone());
                    mapped.inner_prefix.insert_str(0, &opener);
                }
            } else if opens_element(tag) {
                inside.push(tag);
            }
        }

        for tag in inside.iter().rev() {
            mapped.inner_suffix.push_str(&format!("</{}>", tag.name));
        }
        for tag in &inside {
            mapped.outer_suffix.push_str(&tag.raw);
        }

        Ok(mapped)
    }
}

/// Map ascending intervals in one pass
pub fn remap_intervals(
    record: &TransformationRecord,
    intervals: &[Interval],
) -> Result<Vec<MappedInterval>, RemapError> {
    let mut cursor = RemapCursor::new(record);
    intervals
        .iter()
        .map(|interval| cursor.advance(*interval))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simplify::{simplify_html, SimplifyOptions};

    fn map(html: &str, literal: &str) -> (MappedInterval, String) {
        let simplified = simplify_html(html, &SimplifyOptions::default());
        let start = simplified.text.find(literal).unwrap();
        let mut cursor = RemapCursor::new(&simplified.record);
        let mapped = cursor
            .advance(Interval::new(start, start + literal.len()))
            .unwrap();
        let span = html[mapped.original.start..mapped.original.stop].to_string();
        (mapped, span)
    }

    #[test]
    fn test_plain_text() {
        let (mapped, span) = map("<p>revenu de 1 500 euros.</p>", "1 500");
        assert_eq!(span, "1 500");
        assert!(mapped.outer_prefix.is_empty() && mapped.inner_suffix.is_empty());
    }

    #[test]
    fn test_entities_map_whole() {
        let (_, span) = map("un taux de 5,5&nbsp;% net", "5,5 %");
        assert_eq!(span, "5,5&nbsp;%");
    }

    #[test]
    fn test_edge_tags_stay_outside() {
        let (mapped, span) = map("de <b>1 500</b> euros", "1 500");
        assert_eq!(span, "1 500");
        assert_eq!(mapped, MappedInterval::new(mapped.original));
    }

    #[test]
    fn test_closing_tag_inside_span() {
        let (mapped, span) = map(r#"<b class="x">taux de 5</b>,5 %"#, "5,5");
        assert_eq!(span, "5</b>,5");
        assert_eq!(mapped.outer_prefix, "</b>");
        assert_eq!(mapped.inner_prefix, r#"<b class="x">"#);
        assert!(mapped.inner_suffix.is_empty());
    }

    #[test]
    fn test_opening_tag_inside_span() {
        let (mapped, span) = map("1 <i>500 euros</i>", "1 500");
        assert_eq!(span, "1 <i>500");
        assert_eq!(mapped.inner_suffix, "</i>");
        assert_eq!(mapped.outer_suffix, "<i>");
    }

    #[test]
    fn test_nested_closings_reopen_in_order() {
        let (mapped, span) = map("<b><i>mille</i></b> cinq cents", "mille cinq cents");
        assert_eq!(span, "mille</i></b> cinq cents");
        assert_eq!(mapped.outer_prefix, "</i></b>");
        assert_eq!(mapped.inner_prefix, "<b><i>");
    }

    #[test]
    fn test_void_elements_ignored() {
        let (mapped, _) = map("mille <img src='x'> cinq", "mille cinq");
        assert!(mapped.inner_suffix.is_empty() && mapped.outer_suffix.is_empty());
    }

    #[test]
    fn test_out_of_order() {
        let simplified = simplify_html("un deux trois", &SimplifyOptions::default());
        let mut cursor = RemapCursor::new(&simplified.record);
        cursor.advance(Interval::new(8, 13)).unwrap();
        assert_eq!(
            cursor.advance(Interval::new(3, 7)),
            Err(RemapError::OutOfOrder {
                previous: 8,
                start: 3
            })
        );
    }

    #[test]
    fn test_equal_starts_and_overlaps_accepted() {
        let simplified = simplify_html("un <b>deux</b> trois", &SimplifyOptions::default());
        let mapped = remap_intervals(
            &simplified.record,
            &[Interval::new(3, 7), Interval::new(3, 13), Interval::new(5, 13)],
        )
        .unwrap();
        assert_eq!(mapped[0].original, Interval::new(6, 10));
        assert_eq!(mapped[1].original, Interval::new(6, 20));
        assert_eq!(mapped[1].outer_prefix, "</b>");
    }

    #[test]
    fn test_out_of_bounds() {
        let simplified = simplify_html("court", &SimplifyOptions::default());
        let mut cursor = RemapCursor::new(&simplified.record);
        assert!(matches!(
            cursor.advance(Interval::new(2, 10)),
            Err(RemapError::OutOfBounds { len: 5, .. })
        ));
    }
}
