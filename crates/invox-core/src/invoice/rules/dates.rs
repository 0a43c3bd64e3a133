//! Labeled date matchers.

use chrono::NaiveDate;
use regex::Regex;

use crate::models::invoice::{ExtractedField, Matcher};

use super::patterns::PatternSet;
use super::FieldMatcher;

/// Which dated label a [`LabeledDate`] looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLabel {
    Invoice,
    Due,
}

impl DateLabel {
    fn pattern(self, patterns: &PatternSet) -> &Regex {
        match self {
            DateLabel::Invoice => &patterns.invoice_date_label,
            DateLabel::Due => &patterns.due_date_label,
        }
    }
}

/// `Invoice Date: 01/15/2024` or `Due Date: 02/15/2024`.
///
/// The captured token is parsed with each configured format in order and the
/// first format that accepts it wins. With the default month-first order a
/// day-first date whose day is 12 or less is read as month-first.
///
/// Day and month may be written with one digit (`1-5-2024`): chrono's `%m`
/// and `%d` accept both widths and OCR output often drops leading zeros.
#[derive(Debug, Clone)]
pub struct LabeledDate {
    label: DateLabel,
    formats: Vec<String>,
}

impl LabeledDate {
    pub fn new(label: DateLabel, formats: &[String]) -> Self {
        Self {
            label,
            formats: formats.to_vec(),
        }
    }
}

impl FieldMatcher for LabeledDate {
    type Output = NaiveDate;

    fn matcher(&self) -> Matcher {
        match self.label {
            DateLabel::Invoice => Matcher::InvoiceDateLabel,
            DateLabel::Due => Matcher::DueDateLabel,
        }
    }

    fn find(&self, text: &str, patterns: &PatternSet) -> Option<ExtractedField<NaiveDate>> {
        self.label
            .pattern(patterns)
            .captures_iter(text)
            .find_map(|caps| {
                let full = caps.get(0)?;
                let date = parse_date(&caps[1], &self.formats)?;
                Some(
                    ExtractedField::new(date, self.matcher(), full.as_str())
                        .with_confidence(0.95)
                        .with_position(full.start(), full.end()),
                )
            })
    }
}

/// Parse `token` with the first of `formats` (chrono syntax) that accepts it.
pub fn parse_date<S: AsRef<str>>(token: &str, formats: &[S]) -> Option<NaiveDate> {
    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(token.trim(), format.as_ref()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::ExtractionConfig;
    use pretty_assertions::assert_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn find(label: DateLabel, text: &str) -> Option<NaiveDate> {
        let formats = ExtractionConfig::default().date_formats;
        LabeledDate::new(label, &formats)
            .find(text, &PatternSet::new())
            .map(|f| f.value)
    }

    #[test]
    fn test_invoice_date_us_order() {
        assert_eq!(find(DateLabel::Invoice, "Invoice Date: 01/15/2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(find(DateLabel::Invoice, "INVOICE DATE 1-5-2024"), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn test_single_digit_day_and_month() {
        assert_eq!(parse_date("1/5/2024", &["%m/%d/%Y"]), Some(ymd(2024, 1, 5)));
        assert_eq!(find(DateLabel::Due, "Due Date: 2/09/2024"), Some(ymd(2024, 2, 9)));
    }

    #[test]
    fn test_day_first_fallback() {
        assert_eq!(find(DateLabel::Due, "Due Date: 15/02/2024"), Some(ymd(2024, 2, 15)));
        assert_eq!(find(DateLabel::Due, "Due Date: 28-02-2024"), Some(ymd(2024, 2, 28)));
    }

    #[test]
    fn test_ambiguous_date_reads_month_first() {
        assert_eq!(find(DateLabel::Invoice, "Invoice Date: 03/04/2024"), Some(ymd(2024, 3, 4)));
    }

    #[test]
    fn test_labels_are_distinct() {
        let text = "Invoice Date: 01/15/2024\nDue Date: 02/15/2024";
        assert_eq!(find(DateLabel::Invoice, text), Some(ymd(2024, 1, 15)));
        assert_eq!(find(DateLabel::Due, text), Some(ymd(2024, 2, 15)));
    }

    #[test]
    fn test_unparseable_date_is_no_match() {
        assert_eq!(find(DateLabel::Due, "Due Date: 31/31/2024"), None);
        assert_eq!(find(DateLabel::Due, "Due Date: 02/15/24"), None);
        assert_eq!(find(DateLabel::Due, "Due Date: upon receipt"), None);
    }

    #[test]
    fn test_parse_date_format_order() {
        assert_eq!(parse_date("02/03/2024", &["%d/%m/%Y"]), Some(ymd(2024, 3, 2)));
        assert_eq!(parse_date("02/03/2024", &["%m/%d/%Y", "%d/%m/%Y"]), Some(ymd(2024, 2, 3)));
        assert_eq!(parse_date::<&str>("02/03/2024", &[]), None);
    }
}
