//! Header field extraction: one ordered candidate chain per field.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::config::ExtractionConfig;
use crate::models::invoice::ExtractedField;

use super::rules::{
    first_match, DateLabel, FieldMatcher, LabeledDate, LabeledInvoiceNumber, LabeledTotal,
    LabeledVendor, LeadingLineVendor, PatternSet, StandaloneInvoiceNumber,
};

/// Scalar header fields found in a text. `None` means not found.
#[derive(Debug, Clone, Default)]
pub struct HeaderFields {
    pub invoice_number: Option<ExtractedField<String>>,
    pub vendor: Option<ExtractedField<String>>,
    pub invoice_date: Option<ExtractedField<NaiveDate>>,
    pub due_date: Option<ExtractedField<NaiveDate>>,
    pub total_amount: Option<ExtractedField<Decimal>>,
}

/// Extracts the five header fields from raw text.
///
/// Each field has a fixed chain of candidates tried in order:
///
/// | field          | candidates                         |
/// |----------------|------------------------------------|
/// | invoice number | labeled, standalone `INV-` token   |
/// | vendor         | leading line, `From:`-style label  |
/// | invoice date   | `Invoice Date:` label              |
/// | due date       | `Due Date:` label                  |
/// | total amount   | whole-word total label             |
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    leading_vendor: LeadingLineVendor,
    invoice_date: LabeledDate,
    due_date: LabeledDate,
}

impl FieldExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            leading_vendor: LeadingLineVendor::new(config.vendor_scan_lines),
            invoice_date: LabeledDate::new(DateLabel::Invoice, &config.date_formats),
            due_date: LabeledDate::new(DateLabel::Due, &config.date_formats),
        }
    }

    pub fn invoice_number(&self, text: &str, patterns: &PatternSet) -> Option<ExtractedField<String>> {
        let chain: [&dyn FieldMatcher<Output = String>; 2] =
            [&LabeledInvoiceNumber, &StandaloneInvoiceNumber];
        first_match("invoice_number", &chain, text, patterns)
    }

    pub fn vendor(&self, text: &str, patterns: &PatternSet) -> Option<ExtractedField<String>> {
        let chain: [&dyn FieldMatcher<Output = String>; 2] = [&self.leading_vendor, &LabeledVendor];
        first_match("vendor", &chain, text, patterns)
    }

    pub fn invoice_date(&self, text: &str, patterns: &PatternSet) -> Option<ExtractedField<NaiveDate>> {
        let chain: [&dyn FieldMatcher<Output = NaiveDate>; 1] = [&self.invoice_date];
        first_match("invoice_date", &chain, text, patterns)
    }

    pub fn due_date(&self, text: &str, patterns: &PatternSet) -> Option<ExtractedField<NaiveDate>> {
        let chain: [&dyn FieldMatcher<Output = NaiveDate>; 1] = [&self.due_date];
        first_match("due_date", &chain, text, patterns)
    }

    pub fn total_amount(&self, text: &str, patterns: &PatternSet) -> Option<ExtractedField<Decimal>> {
        let chain: [&dyn FieldMatcher<Output = Decimal>; 1] = [&LabeledTotal];
        first_match("total_amount", &chain, text, patterns)
    }

    /// Run every field chain over `text`.
    pub fn extract(&self, text: &str, patterns: &PatternSet) -> HeaderFields {
        HeaderFields {
            invoice_number: self.invoice_number(text, patterns),
            vendor: self.vendor(text, patterns),
            invoice_date: self.invoice_date(text, patterns),
            due_date: self.due_date(text, patterns),
            total_amount: self.total_amount(text, patterns),
        }
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::Matcher;
    use crate::test_support::SAMPLE_INVOICE;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_sample_invoice_fields() {
        let patterns = PatternSet::new();
        let fields = FieldExtractor::default().extract(SAMPLE_INVOICE, &patterns);

        assert_eq!(fields.invoice_number.unwrap().value, "INV-2024-001");
        assert_eq!(fields.vendor.unwrap().value, "ACME Corporation");
        assert_eq!(
            fields.invoice_date.unwrap().value,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(
            fields.due_date.unwrap().value,
            NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()
        );
        let total = fields.total_amount.unwrap();
        assert_eq!(total.value, Decimal::from_str("2821.00").unwrap());
        assert_eq!(total.value.to_string(), "2821.00");
    }

    #[test]
    fn test_values_on_line_after_label() {
        let text = "ACME Corporation\n\
                    Invoice Date:\n01/15/2024\n\
                    Due Date:\n02/15/2024\n\
                    Total Amount:\n$2,821.00\n";
        let fields = FieldExtractor::default().extract(text, &PatternSet::new());

        assert_eq!(
            fields.invoice_date.unwrap().value,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(
            fields.due_date.unwrap().value,
            NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()
        );
        assert_eq!(
            fields.total_amount.unwrap().value,
            Decimal::from_str("2821.00").unwrap()
        );
    }

    #[test]
    fn test_labeled_number_beats_standalone() {
        let text = "Ref INV-0001\nInvoice Number: INV-2024-001";
        let found = FieldExtractor::default()
            .invoice_number(text, &PatternSet::new())
            .unwrap();
        assert_eq!(found.value, "INV-2024-001");
        assert_eq!(found.matcher, Matcher::InvoiceNumberLabel);
    }

    #[test]
    fn test_standalone_number_fallback() {
        let found = FieldExtractor::default()
            .invoice_number("Thanks for your order INV-7781", &PatternSet::new())
            .unwrap();
        assert_eq!(found.value, "INV-7781");
        assert_eq!(found.matcher, Matcher::InvoiceNumberStandalone);
    }

    #[test]
    fn test_vendor_label_fallback() {
        // lowercase label keeps the line out of the leading-line candidate
        let text = "INVOICE\n\n12 Main St\n\nfrom: Globex Ltd\n";
        let found = FieldExtractor::default()
            .vendor(text, &PatternSet::new())
            .unwrap();
        assert_eq!(found.value, "Globex Ltd");
        assert_eq!(found.matcher, Matcher::VendorLabel);
    }

    #[test]
    fn test_vendor_scan_depth_is_configurable() {
        let config = ExtractionConfig {
            vendor_scan_lines: 1,
            ..ExtractionConfig::default()
        };
        let text = "INVOICE\nGlobex Ltd\n";
        assert!(FieldExtractor::new(&config)
            .vendor(text, &PatternSet::new())
            .is_none());
    }

    #[test]
    fn test_configured_date_formats() {
        let config = ExtractionConfig {
            date_formats: vec!["%d/%m/%Y".to_string()],
            ..ExtractionConfig::default()
        };
        let found = FieldExtractor::new(&config)
            .invoice_date("Invoice Date: 03/04/2024", &PatternSet::new())
            .unwrap();
        assert_eq!(found.value, NaiveDate::from_ymd_opt(2024, 4, 3).unwrap());
    }

    #[test]
    fn test_empty_text_finds_nothing() {
        let fields = FieldExtractor::default().extract("", &PatternSet::new());
        assert!(fields.invoice_number.is_none());
        assert!(fields.vendor.is_none());
        assert!(fields.invoice_date.is_none());
        assert!(fields.due_date.is_none());
        assert!(fields.total_amount.is_none());
    }
}
