//! Monetary amount parsing and the total amount matcher.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::models::invoice::{ExtractedField, Matcher};

use super::patterns::PatternSet;
use super::FieldMatcher;

/// `Total`, `Grand Total`, `Total Amount`, `Total Due`, `Amount Due` or
/// `Final Amount` followed by an amount.
///
/// Matches are tried in document order; one whose number does not parse is
/// skipped in favor of the next.
pub struct LabeledTotal;

impl FieldMatcher for LabeledTotal {
    type Output = Decimal;

    fn matcher(&self) -> Matcher {
        Matcher::TotalLabel
    }

    fn find(&self, text: &str, patterns: &PatternSet) -> Option<ExtractedField<Decimal>> {
        patterns.total_label.captures_iter(text).find_map(|caps| {
            let full = caps.get(0)?;
            let amount = parse_amount(&caps[1])?;
            Some(
                ExtractedField::new(amount, self.matcher(), full.as_str())
                    .with_confidence(0.9)
                    .with_position(full.start(), full.end()),
            )
        })
    }
}

/// Parse an amount written with `,` thousands separators and `.` decimals,
/// with or without a leading `$`.
///
/// The scale of the input is kept, so `"2,821.00"` parses to `2821.00`.
/// A bare fraction (`.50`) and a dangling point (`12.`) are accepted.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let s = s.strip_prefix('$').unwrap_or(s);
    let cleaned: String = s.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.strip_suffix('.').unwrap_or(&cleaned);
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(cleaned).ok()
}

/// Format an amount with two decimals and `,` thousands separators
/// (e.g. `2,821.00`).
pub fn format_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.abs());
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let digits: Vec<char> = integer_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{sign}{grouped}.{decimal_part}")
}
