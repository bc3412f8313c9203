use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

/// Parses user-facing numeric text such as `"1,234.5"` or `" 42 "`.
#[must_use]
pub fn parse_numeric_text(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Display format for axis, tooltip, and value labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    pub max_fraction_digits: u32,
    pub group_thousands: bool,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            max_fraction_digits: 5,
            group_thousands: true,
        }
    }
}

impl NumberFormat {
    /// Formats `value` rounded half-away-from-zero to `max_fraction_digits`,
    /// without trailing zeros.
    #[must_use]
    pub fn format(self, value: f64) -> String {
        if !value.is_finite() {
            return String::new();
        }
        let Some(decimal) = Decimal::from_f64(value) else {
            return format!("{value}");
        };
        let rounded = decimal
            .round_dp_with_strategy(
                self.max_fraction_digits,
                rust_decimal::RoundingStrategy::MidpointAwayFromZero,
            )
            .normalize();
        let text = if rounded.is_zero() {
            "0".to_owned()
        } else {
            rounded.to_string()
        };
        if self.group_thousands {
            group_thousands(&text)
        } else {
            text
        }
    }
}

fn group_thousands(text: &str) -> String {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(text.len() + integer.len() / 3);
    grouped.push_str(sign);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}
