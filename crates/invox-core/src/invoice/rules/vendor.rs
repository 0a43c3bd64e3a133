//! Vendor name matchers.

use crate::models::invoice::{ExtractedField, Matcher};

use super::patterns::PatternSet;
use super::FieldMatcher;

/// Words that disqualify a leading line from being the vendor name.
const NON_VENDOR_WORDS: &[&str] = &["invoice", "address"];

/// The first qualifying line among the leading non-empty lines.
///
/// Vendors usually print their name at the top of the page, so this runs
/// before any label-based matcher.
#[derive(Debug, Clone)]
pub struct LeadingLineVendor {
    scan_lines: usize,
}

impl LeadingLineVendor {
    pub fn new(scan_lines: usize) -> Self {
        Self { scan_lines }
    }
}

impl Default for LeadingLineVendor {
    fn default() -> Self {
        Self::new(5)
    }
}

impl FieldMatcher for LeadingLineVendor {
    type Output = String;

    fn matcher(&self) -> Matcher {
        Matcher::VendorLeadingLine
    }

    fn find(&self, text: &str, _patterns: &PatternSet) -> Option<ExtractedField<String>> {
        let mut offset = 0;
        let mut inspected = 0;

        for raw in text.split_inclusive('\n') {
            let line_start = offset;
            offset += raw.len();

            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            inspected += 1;
            if inspected > self.scan_lines {
                break;
            }

            if looks_like_vendor(line) {
                let start = line_start + (raw.len() - raw.trim_start().len());
                return Some(
                    ExtractedField::new(line.to_string(), self.matcher(), line)
                        .with_confidence(0.6)
                        .with_position(start, start + line.len()),
                );
            }
        }

        None
    }
}

fn looks_like_vendor(line: &str) -> bool {
    let lower = line.to_lowercase();
    line.chars().count() > 3
        && line.chars().next().is_some_and(char::is_uppercase)
        && !NON_VENDOR_WORDS.iter().any(|word| lower.contains(word))
}

/// `From:`, `Vendor:`, `Company:` or `Bill To:` followed by a name on the
/// same or the next line.
pub struct LabeledVendor;

impl FieldMatcher for LabeledVendor {
    type Output = String;

    fn matcher(&self) -> Matcher {
        Matcher::VendorLabel
    }

    fn find(&self, text: &str, patterns: &PatternSet) -> Option<ExtractedField<String>> {
        patterns.vendor_label.captures_iter(text).find_map(|caps| {
            let full = caps.get(0)?;
            let name = caps[1].trim();
            (!name.is_empty()).then(|| {
                ExtractedField::new(name.to_string(), self.matcher(), full.as_str().trim_end())
                    .with_confidence(0.8)
                    .with_position(full.start(), full.end())
            })
        })
    }
}
