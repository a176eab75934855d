//! French cardinal numbers spelled out, traditional spelling
//!
//! `21` → `vingt et un`, `80` → `quatre-vingts`, `200 000` → `deux cent mille`,
//! `2 000 000` → `deux millions`, `5,05` → `cinq virgule zéro cinq`.

use super::digits::Decimal;

const UNITS: [&str; 17] = [
    "zéro", "un", "deux", "trois", "quatre", "cinq", "six", "sept", "huit", "neuf", "dix", "onze",
    "douze", "treize", "quatorze", "quinze", "seize",
];

const TENS: [&str; 7] = ["", "", "vingt", "trente", "quarante", "cinquante", "soixante"];

/// Scale nouns above one thousand, largest first
const SCALE_NOUNS: [(u64, &str); 4] = [
    (1_000_000_000_000_000, "billiard"),
    (1_000_000_000_000, "billion"),
    (1_000_000_000, "milliard"),
    (1_000_000, "million"),
];

/// Integers from 10^18 on are not spelled out
const LIMIT: u64 = 1_000_000_000_000_000_000;

/// `final_word` tells whether nothing numeric follows, which decides the
/// plural of `quatre-vingts` and `cents`.
fn below_hundred(n: u64, final_word: bool) -> String {
    let (tens, units) = (n / 10, n % 10);
    match n {
        0..=16 => UNITS[n as usize].to_string(),
        17..=19 => format!("dix-{}", UNITS[units as usize]),
        _ => match tens {
            2..=6 => match units {
                0 => TENS[tens as usize].to_string(),
                1 => format!("{} et un", TENS[tens as usize]),
                _ => format!("{}-{}", TENS[tens as usize], UNITS[units as usize]),
            },
            7 if units == 1 => "soixante et onze".to_string(),
            7 => format!("soixante-{}", below_hundred(10 + units, final_word)),
            8 if units == 0 => {
                if final_word {
                    "quatre-vingts".to_string()
                } else {
                    "quatre-vingt".to_string()
                }
            }
            8 => format!("quatre-vingt-{}", UNITS[units as usize]),
            _ => format!("quatre-vingt-{}", below_hundred(10 + units, final_word)),
        },
    }
}

fn below_thousand(n: u64, final_word: bool) -> String {
    let (hundreds, rest) = (n / 100, n % 100);
    match (hundreds, rest) {
        (0, _) => below_hundred(rest, final_word),
        (1, 0) => "cent".to_string(),
        (1, _) => format!("cent {}", below_hundred(rest, final_word)),
        (_, 0) if final_word => format!("{} cents", UNITS[hundreds as usize]),
        (_, 0) => format!("{} cent", UNITS[hundreds as usize]),
        (_, _) => format!(
            "{} cent {}",
            UNITS[hundreds as usize],
            below_hundred(rest, final_word)
        ),
    }
}

/// Spell out a non-negative integer, `None` from 10^18 on
pub fn integer_words(mut n: u64) -> Option<String> {
    if n >= LIMIT {
        return None;
    }
    if n == 0 {
        return Some(UNITS[0].to_string());
    }

    let mut words = Vec::new();
    for (scale, noun) in SCALE_NOUNS {
        let count = n / scale;
        n %= scale;
        match count {
            0 => {}
            1 => words.push(format!("un {}", noun)),
            // Scale words are nouns: the count before them is final.
            _ => words.push(format!("{} {}s", below_thousand(count, true), noun)),
        }
    }

    let thousands = n / 1000;
    n %= 1000;
    match thousands {
        0 => {}
        1 => words.push("mille".to_string()),
        _ => words.push(format!("{} mille", below_thousand(thousands, false))),
    }

    if n > 0 {
        words.push(below_thousand(n, true));
    }
    Some(words.join(" "))
}

/// Spell out a rounded decimal in lower case
pub fn spelled_out(decimal: &Decimal) -> Option<String> {
    let integer: u64 = decimal.integer.parse().ok()?;
    let mut text = String::new();
    if decimal.negative {
        text.push_str("moins ");
    }
    text.push_str(&integer_words(integer)?);

    if !decimal.fraction.is_empty() {
        text.push_str(" virgule");
        let significant = decimal.fraction.trim_start_matches('0');
        for _ in 0..decimal.fraction.len() - significant.len() {
            text.push_str(" zéro");
        }
        let fraction: u64 = significant.parse().ok()?;
        text.push(' ');
        text.push_str(&integer_words(fraction)?);
    }
    Some(text)
}
