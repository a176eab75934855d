//! French digit formatting (`1 500`, `5,5`)

/// Digits kept after the decimal comma
const MAX_FRACTION_DIGITS: usize = 3;

/// A finite number rounded to three fraction digits, kept as digit strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal {
    pub negative: bool,
    /// Integer digits without leading zeros ("0" for zero)
    pub integer: String,
    /// Fraction digits without trailing zeros (possibly empty)
    pub fraction: String,
}

impl Decimal {
    /// Round `value` to three fraction digits. Returns `None` for NaN and infinities.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }

        let rounded = format!("{:.*}", MAX_FRACTION_DIGITS, value.abs());
        let (integer, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
        let fraction = fraction.trim_end_matches('0');
        let is_zero = integer.bytes().all(|b| b == b'0') && fraction.is_empty();

        Some(Self {
            negative: value.is_sign_negative() && !is_zero,
            integer: integer.to_string(),
            fraction: fraction.to_string(),
        })
    }

    /// French grouped form: thousands separated by a space once the integer
    /// part has four digits or more, decimal comma.
    pub fn grouped(&self) -> String {
        let mut text = String::new();
        if self.negative {
            text.push('-');
        }

        let digits = self.integer.as_bytes();
        if digits.len() >= 4 {
            for (index, digit) in digits.iter().enumerate() {
                if index > 0 && (digits.len() - index) % 3 == 0 {
                    text.push(' ');
                }
                text.push(char::from(*digit));
            }
        } else {
            text.push_str(&self.integer);
        }

        if !self.fraction.is_empty() {
            text.push(',');
            text.push_str(&self.fraction);
        }
        text
    }
}
