//! Invoice number matchers.

use crate::models::invoice::{ExtractedField, Matcher};

use super::patterns::PatternSet;
use super::FieldMatcher;

/// `Invoice Number: INV-2024-001`, `Invoice No. 5521`, `Invoice #A-17`.
///
/// The label is required; a bare number somewhere in the text is not enough.
pub struct LabeledInvoiceNumber;

impl FieldMatcher for LabeledInvoiceNumber {
    type Output = String;

    fn matcher(&self) -> Matcher {
        Matcher::InvoiceNumberLabel
    }

    fn find(&self, text: &str, patterns: &PatternSet) -> Option<ExtractedField<String>> {
        patterns
            .invoice_number_label
            .captures_iter(text)
            .find_map(|caps| {
                let full = caps.get(0)?;
                let value = caps[1].trim_end_matches('-');
                (!value.is_empty()).then(|| {
                    ExtractedField::new(value.to_string(), self.matcher(), full.as_str())
                        .with_confidence(0.95)
                        .with_position(full.start(), full.end())
                })
            })
    }
}

/// An unlabeled `INV-...` token anywhere in the text.
pub struct StandaloneInvoiceNumber;

impl FieldMatcher for StandaloneInvoiceNumber {
    type Output = String;

    fn matcher(&self) -> Matcher {
        Matcher::InvoiceNumberStandalone
    }

    fn find(&self, text: &str, patterns: &PatternSet) -> Option<ExtractedField<String>> {
        let caps = patterns.invoice_number_standalone.captures(text)?;
        let full = caps.get(0)?;
        let value = caps[1].trim_end_matches('-');

        Some(
            ExtractedField::new(value.to_string(), self.matcher(), full.as_str())
                .with_confidence(0.7)
                .with_position(full.start(), full.end()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labeled(text: &str) -> Option<String> {
        LabeledInvoiceNumber
            .find(text, &PatternSet::new())
            .map(|f| f.value)
    }

    #[test]
    fn test_labeled_number() {
        assert_eq!(labeled("Invoice Number: INV-2024-001").as_deref(), Some("INV-2024-001"));
        assert_eq!(labeled("INVOICE NO. 5521-A").as_deref(), Some("5521-A"));
        assert_eq!(labeled("Invoice #: 77120").as_deref(), Some("77120"));
        assert_eq!(labeled("invoice num 42").as_deref(), Some("42"));
    }

    #[test]
    fn test_label_required() {
        assert_eq!(labeled("INVOICE\nPayment Terms: Net 30"), None);
        assert_eq!(labeled("Order 12345"), None);
    }

    #[test]
    fn test_position_covers_label() {
        let text = "ACME\nInvoice Number: INV-9";
        let found = LabeledInvoiceNumber.find(text, &PatternSet::new()).unwrap();
        let (start, end) = found.position.unwrap();
        assert_eq!(&text[start..end], "Invoice Number: INV-9");
        assert_eq!(found.matcher, Matcher::InvoiceNumberLabel);
    }

    #[test]
    fn test_standalone_token() {
        let patterns = PatternSet::new();
        let found = StandaloneInvoiceNumber
            .find("Ref INV-2023-117- attached", &patterns)
            .unwrap();
        assert_eq!(found.value, "INV-2023-117");
        assert!(StandaloneInvoiceNumber.find("INVOICE", &patterns).is_none());
    }
}
