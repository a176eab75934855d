//! Boundary-aware literal search in simplified text
//!
//! A literal counts as a value mention when it stands alone:
//! - preceded by the start of the text, by whitespace that does not follow a
//!   digit, or by one of `>`, `(`, `[`
//! - not followed by optional whitespace then a digit
//! - followed by the end of the text, one of `.`, `<`, `)`, `]`, a comma and
//!   whitespace, or whitespace
//!
//! The recorded span covers the boundaries, minus one leading and one
//! trailing space or newline.

use super::{sort_dedup, Interval};
use crate::parameters::{number_values_with_units, Parameter, UnitTable};
use crate::text_forms::text_forms;
use chrono::NaiveDate;
use tracing::debug;

fn is_space(c: char) -> bool {
    c.is_whitespace()
}

/// Start of the leading boundary of a literal found at `at`, if any
fn leading_boundary(text: &str, at: usize) -> Option<usize> {
    let before = &text[..at];
    let Some(previous) = before.chars().next_back() else {
        return Some(at);
    };

    if matches!(previous, '>' | '(' | '[') {
        return Some(at - previous.len_utf8());
    }
    if !is_space(previous) {
        return None;
    }

    let run_start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_space(*c))
        .last()
        .map(|(index, _)| index)
        .unwrap_or(at);

    // The whitespace run must start right after something other than a digit.
    // Its first character can always serve when the run is longer than one.
    match before[..run_start].chars().next_back() {
        Some(c) if c.is_ascii_digit() => {
            let first = before[run_start..].chars().next()?;
            let second = run_start + first.len_utf8();
            (second < at).then_some(second)
        }
        _ => Some(run_start),
    }
}

/// End of the trailing boundary of a literal ending at `end`, if any
fn trailing_boundary(text: &str, end: usize) -> Option<usize> {
    let after = &text[end..];

    // No digit may follow, even after whitespace.
    if after
        .trim_start_matches(is_space)
        .starts_with(|c: char| c.is_ascii_digit())
    {
        return None;
    }

    let mut chars = after.chars();
    match chars.next() {
        None => Some(end),
        Some(c @ ('.' | '<' | ')' | ']')) => Some(end + c.len_utf8()),
        Some(',') => {
            let spaces = chars.as_str().len() - chars.as_str().trim_start_matches(is_space).len();
            (spaces > 0).then_some(end + 1 + spaces)
        }
        Some(c) if is_space(c) => Some(end + after.len() - after.trim_start_matches(is_space).len()),
        Some(_) => None,
    }
}

fn trimmed(text: &str, start: usize, stop: usize) -> Interval {
    let matched = &text[start..stop];
    let start = if matched.starts_with([' ', '\n']) {
        start + 1
    } else {
        start
    };
    let stop = if matched.ends_with([' ', '\n']) && stop > start {
        stop - 1
    } else {
        stop
    };
    Interval::new(start, stop)
}

/// Every standalone occurrence of `literal` in `text`, sorted and deduplicated.
///
/// Occurrences are examined independently, so a boundary shared by two
/// neighbouring mentions serves both.
pub fn find_literal(text: &str, literal: &str) -> Vec<Interval> {
    let mut intervals = Vec::new();
    if literal.is_empty() {
        return intervals;
    }

    let mut from = 0;
    while let Some(offset) = text[from..].find(literal) {
        let at = from + offset;
        let end = at + literal.len();

        if let (Some(start), Some(stop)) =
            (leading_boundary(text, at), trailing_boundary(text, end))
        {
            intervals.push(trimmed(text, start, stop));
        }

        from = at + text[at..].chars().next().map_or(1, char::len_utf8);
    }

    sort_dedup(&mut intervals);
    intervals
}

/// Locates the values of parameters in simplified text
#[derive(Debug, Clone, Copy)]
pub struct ValueMatcher<'a> {
    units: &'a UnitTable,
    date: NaiveDate,
}

impl<'a> ValueMatcher<'a> {
    pub fn new(units: &'a UnitTable, date: NaiveDate) -> Self {
        Self { units, date }
    }

    /// Intervals of `text` mentioning a value of `parameter` in force at the date
    pub fn find(&self, text: &str, parameter: &Parameter) -> Vec<Interval> {
        let mut intervals: Vec<Interval> = number_values_with_units(parameter, self.units, self.date)
            .flat_map(|unit_value| text_forms(&unit_value))
            .flat_map(|literal| find_literal(text, &literal))
            .collect();
        sort_dedup(&mut intervals);

        if !intervals.is_empty() {
            debug!(
                "Parameter {} matched {} times",
                parameter.name(),
                intervals.len()
            );
        }
        intervals
    }
}

/// Intervals of simplified `text` mentioning a value of `parameter`
pub fn simplified_coords_to_highlight(
    text: &str,
    parameter: &Parameter,
    units: &UnitTable,
    date: NaiveDate,
) -> Vec<Interval> {
    ValueMatcher::new(units, date).find(text, parameter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans<'t>(text: &'t str, literal: &str) -> Vec<&'t str> {
        find_literal(text, literal)
            .into_iter()
            .map(|interval| &text[interval.start..interval.stop])
            .collect()
    }

    #[test]
    fn test_sentence_mention() {
        let text = "revenu de 1 500 euros.";
        assert_eq!(find_literal(text, "1 500"), vec![Interval::new(10, 15)]);
    }

    #[test]
    fn test_digit_neighbours_reject() {
        assert!(find_literal("11 500 euros", "1 500").is_empty());
        assert!(find_literal("1 500 000 euros", "1 500").is_empty());
        assert!(find_literal("article 3 1 500 euros", "1 500").is_empty());
        assert!(find_literal("15000", "1 500").is_empty());
    }

    #[test]
    fn test_punctuation_boundaries() {
        assert_eq!(spans("(5,5 %)", "5,5"), vec!["(5,5"]);
        assert_eq!(spans("taux de 5,5.", "5,5"), vec!["5,5."]);
        assert_eq!(spans("5,5, puis", "5,5"), vec!["5,5,"]);
        assert_eq!(spans("[5,5]", "5,5"), vec!["[5,5]"]);
        assert!(find_literal("5,5,6", "5,5").is_empty());
        assert!(find_literal("x5,5 ", "5,5").is_empty());
    }

    #[test]
    fn test_text_edges() {
        assert_eq!(spans("1 500", "1 500"), vec!["1 500"]);
        assert_eq!(spans("1 500\nsuite", "1 500"), vec!["1 500"]);
    }

    #[test]
    fn test_adjacent_mentions_share_boundary() {
        assert_eq!(
            find_literal("cinq cinq", "cinq"),
            vec![Interval::new(0, 4), Interval::new(5, 9)]
        );
    }

    #[test]
    fn test_words_inside_words_are_ignored() {
        assert!(find_literal("cinquante", "cinq").is_empty());
    }

    #[test]
    fn test_value_matcher() {
        let parameter: Parameter = serde_json::from_str(
            r#"{"class": "Value", "name": "seuil", "unit": "currency",
                "values": {"2024-01-01": {"value": 1500}}}"#,
        )
        .unwrap();
        let units =
            UnitTable::from_yaml("- name: currency\n  label: euros\n").unwrap();
        let date = crate::dates::parse_iso_date("2025-01-01").unwrap();

        let text = "soit 1 500 euros ou mille cinq cents euros";
        let found = simplified_coords_to_highlight(text, &parameter, &units, date);
        let found: Vec<_> = found.iter().map(|i| &text[i.start..i.stop]).collect();
        assert_eq!(found, vec!["1 500", "mille cinq cents"]);
    }
}
