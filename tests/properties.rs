//! Property tests for matching, remapping and injection

use billmark_core::highlight::matcher::find_literal;
use billmark_core::highlight::remap::remap_intervals;
use billmark_core::parameters::ConstantUnit;
use billmark_core::{
    simplify_html, text_forms, HighlightAnnotation, HighlightInjector, Interval, MappedInterval,
    SimplifyOptions, UnitValue, VariableIndex,
};
use proptest::prelude::*;

fn unit(ratio: bool) -> Option<ConstantUnit> {
    Some(ConstantUnit {
        name: if ratio { "/1" } else { "currency" }.to_string(),
        label: None,
        ratio,
    })
}

#[test]
fn test_ratio_value_forms() {
    assert_eq!(
        text_forms(&UnitValue::new(unit(true), 0.055)),
        vec!["5,5", "cinq virgule cinq"]
    );
}

#[test]
fn test_amount_value_forms() {
    assert_eq!(
        text_forms(&UnitValue::new(unit(false), 1500.0)),
        vec!["1 500", "mille cinq cents"]
    );
}

#[test]
fn test_exact_span_in_sentence() {
    let text = "revenu de 1 500 euros.";
    let found = find_literal(text, "1 500");
    assert_eq!(found, vec![Interval::new(10, 15)]);
    assert_eq!(&text[10..15], "1 500");
}

proptest! {
    /// Property: found intervals are sorted, unique, in bounds and contain the literal
    #[test]
    fn found_intervals_are_well_formed(
        text in "[a-c0-9 ,.()\\n]{0,80}",
        literal in prop::sample::select(vec!["1 500", "a", "5,5", "b c"]),
    ) {
        let found = find_literal(&text, literal);
        for pair in found.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
        for interval in &found {
            prop_assert!(interval.start <= interval.stop);
            prop_assert!(interval.stop <= text.len());
            prop_assert!(text[interval.start..interval.stop].contains(literal));
        }
    }

    /// Property: simplification never panics and accounts for every byte
    #[test]
    fn simplification_covers_original(html in "[a-z <>/&;#0-9!-]{0,120}") {
        let simplified = simplify_html(&html, &SimplifyOptions::default());
        let mut original_end = 0;
        for fragment in simplified.record.fragments() {
            prop_assert_eq!(fragment.original.start, original_end);
            original_end = fragment.original.end;
        }
        prop_assert_eq!(original_end, html.len());
        prop_assert_eq!(simplified.record.simplified_len(), simplified.text.len());
    }

    /// Property: without markup, remapping is the identity
    #[test]
    fn remapping_plain_text_is_identity(words in prop::collection::vec("[a-z]{1,6}", 1..12)) {
        let text = words.join(" ");
        let simplified = simplify_html(&text, &SimplifyOptions::default());
        prop_assert_eq!(&simplified.text, &text);

        let mut intervals = Vec::new();
        let mut offset = 0;
        for word in &words {
            intervals.push(Interval::new(offset, offset + word.len()));
            offset += word.len() + 1;
        }
        let mapped = remap_intervals(&simplified.record, &intervals).unwrap();
        for (interval, mapped) in intervals.iter().zip(&mapped) {
            prop_assert_eq!(interval, &mapped.original);
            prop_assert!(mapped.outer_prefix.is_empty() && mapped.inner_suffix.is_empty());
        }
    }

    /// Property: the injector result does not depend on the annotation order
    #[test]
    fn injection_is_order_independent(
        words in prop::collection::vec("[a-z]{1,6}", 2..10),
        seed in any::<u64>(),
    ) {
        let text = words.join(" ");
        let mut annotations = Vec::new();
        let mut offset = 0;
        for (position, word) in words.iter().enumerate() {
            if position % 2 == 0 {
                annotations.push(HighlightAnnotation::new(
                    MappedInterval::new(Interval::new(offset, offset + word.len())),
                    vec![format!("p{}", position)],
                ));
            }
            offset += word.len() + 1;
        }

        let variables = VariableIndex::default();
        let injector = HighlightInjector::new(&variables, "highlighted");
        let expected = injector.inject(&text, &annotations);

        let mut shuffled = annotations.clone();
        let len = shuffled.len();
        shuffled.rotate_left((seed as usize) % len);
        if seed % 2 == 1 {
            shuffled.reverse();
        }
        prop_assert_eq!(injector.inject(&text, &shuffled), expected);
    }

    /// Property: grouped digits only add separators to integers
    #[test]
    fn grouped_integers_keep_their_digits(n in 0u32..10_000_000) {
        let forms = text_forms(&UnitValue::new(unit(false), f64::from(n)));
        prop_assert_eq!(forms[0].replace(' ', ""), n.to_string());
        prop_assert_eq!(forms.len(), 2);
    }
}
