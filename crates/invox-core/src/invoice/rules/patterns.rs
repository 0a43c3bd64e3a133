//! Compiled regular expressions used by the field matchers and the item
//! table parser.

use regex::Regex;

/// The full set of extraction patterns.
///
/// Built once per pipeline and handed to every matcher by reference. The
/// patterns never change after construction.
#[derive(Debug, Clone)]
pub struct PatternSet {
    /// `Invoice Number: X`, `Invoice No. X`, `Invoice #X`.
    pub(crate) invoice_number_label: Regex,

    /// Bare `INV-2024-001` style identifier.
    pub(crate) invoice_number_standalone: Regex,

    /// `From:` / `Vendor:` / `Company:` / `Bill To:` followed by a name,
    /// possibly on the next line. Only the label is case-insensitive.
    pub(crate) vendor_label: Regex,

    /// Whole-word total label followed by an amount with optional `$`.
    pub(crate) total_label: Regex,

    /// `Invoice Date: MM/DD/YYYY` and friends.
    pub(crate) invoice_date_label: Regex,

    /// `Due Date: MM/DD/YYYY` and friends.
    pub(crate) due_date_label: Regex,

    /// A `$`-prefixed numeric token inside an item row.
    pub(crate) row_amount: Regex,
}

impl PatternSet {
    pub fn new() -> Self {
        Self {
            invoice_number_label: compile(
                r"(?i)\binvoice[ \t]*(?:number\b|num\b\.?|no\b\.?|#)[ \t]*[:#]?[ \t]*([A-Z0-9][A-Z0-9-]*)",
            ),
            invoice_number_standalone: compile(r"\b(INV-?[0-9][A-Za-z0-9-]*)"),
            vendor_label: compile(
                r"\b(?i:from|vendor|company|bill[ \t]*to)[ \t]*:\s*([A-Z][A-Za-z0-9&.,' -]*)",
            ),
            total_label: compile(
                r"(?i)\b(?:grand[ \t]*total|total[ \t]*amount|total[ \t]*due|amount[ \t]*due|final[ \t]*amount|total)\b[ \t]*:?\s*\$?[ \t]*([0-9][0-9,]*(?:\.[0-9]*)?|\.[0-9]+)",
            ),
            invoice_date_label: compile(
                r"(?i)\binvoice[ \t]*date\b[ \t]*:?\s*([0-9]{1,2}[/-][0-9]{1,2}[/-][0-9]{4})\b",
            ),
            due_date_label: compile(
                r"(?i)\bdue[ \t]*date\b[ \t]*:?\s*([0-9]{1,2}[/-][0-9]{1,2}[/-][0-9]{4})\b",
            ),
            row_amount: compile(r"\$(?:[0-9][0-9,]*(?:\.[0-9]*)?|\.[0-9]+)"),
        }
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile a built-in pattern. These are literals covered by tests, so a
/// failure here is a programming error.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern:?}: {e}"))
}
