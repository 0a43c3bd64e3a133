//! Rule-based candidate matchers for invoice header fields.

pub mod amounts;
pub mod dates;
pub mod invoice_number;
pub mod patterns;
pub mod vendor;

pub use amounts::{format_amount, parse_amount, LabeledTotal};
pub use dates::{parse_date, DateLabel, LabeledDate};
pub use invoice_number::{LabeledInvoiceNumber, StandaloneInvoiceNumber};
pub use patterns::PatternSet;
pub use vendor::{LabeledVendor, LeadingLineVendor};

use tracing::debug;

use crate::models::invoice::{ExtractedField, Matcher};

/// One heuristic attempt at locating a field in raw text.
///
/// A matcher never fails: a value that is found but does not parse counts as
/// no match, leaving the next candidate to try.
pub trait FieldMatcher {
    /// The type of value this matcher produces.
    type Output;

    /// Identifies the matcher in results and logs.
    fn matcher(&self) -> Matcher;

    /// Locate the field in `text`.
    fn find(&self, text: &str, patterns: &PatternSet) -> Option<ExtractedField<Self::Output>>;
}

/// Run `chain` in order and return the first candidate that matches.
/// Later candidates are not attempted.
pub fn first_match<T>(
    field: &str,
    chain: &[&dyn FieldMatcher<Output = T>],
    text: &str,
    patterns: &PatternSet,
) -> Option<ExtractedField<T>> {
    for candidate in chain {
        if let Some(found) = candidate.find(text, patterns) {
            debug!(field, matcher = %candidate.matcher(), source = %found.source, "field matched");
            return Some(found);
        }
    }
    debug!(field, candidates = chain.len(), "no candidate matched");
    None
}
