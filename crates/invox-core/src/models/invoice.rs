//! Invoice extraction data models.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Document kinds the OCR path accepts, keyed by lowercase extension.
const SUPPORTED_TYPES: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("bmp", "image/bmp"),
];

const UNKNOWN_MIME: &str = "application/octet-stream";

/// A source document handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    path: PathBuf,
    mime_type: String,
}

impl RawDocument {
    /// Create a document with an explicit mime type.
    pub fn new(path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Create a document, inferring the mime type from the file extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mime_type = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|ext| {
                SUPPORTED_TYPES
                    .iter()
                    .find(|(known, _)| *known == ext)
                    .map(|(_, mime)| *mime)
            })
            .unwrap_or(UNKNOWN_MIME);

        Self::new(path, mime_type)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Whether the OCR engine is expected to handle this document.
    pub fn is_supported(&self) -> bool {
        SUPPORTED_TYPES.iter().any(|(_, mime)| *mime == self.mime_type)
    }
}

/// Which candidate matcher produced a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Matcher {
    /// `Invoice Number: ...` style label.
    InvoiceNumberLabel,
    /// Bare `INV-...` token anywhere in the text.
    InvoiceNumberStandalone,
    /// One of the leading lines of the document.
    VendorLeadingLine,
    /// `From:` / `Vendor:` / `Company:` / `Bill To:` label.
    VendorLabel,
    /// `Total` / `Grand Total` / `Amount Due` / `Final Amount` label.
    TotalLabel,
    /// `Invoice Date:` label.
    InvoiceDateLabel,
    /// `Due Date:` label.
    DueDateLabel,
}

impl Matcher {
    pub fn name(&self) -> &'static str {
        match self {
            Matcher::InvoiceNumberLabel => "invoice_number_label",
            Matcher::InvoiceNumberStandalone => "invoice_number_standalone",
            Matcher::VendorLeadingLine => "vendor_leading_line",
            Matcher::VendorLabel => "vendor_label",
            Matcher::TotalLabel => "total_label",
            Matcher::InvoiceDateLabel => "invoice_date_label",
            Matcher::DueDateLabel => "due_date_label",
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A field value together with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedField<T> {
    /// Extracted value.
    pub value: T,
    /// Matcher that produced the value.
    pub matcher: Matcher,
    /// Confidence score (0.0 - 1.0), when the matcher assigns one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    /// Source text that was matched.
    pub source: String,
    /// Byte span of the match in the raw text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<(usize, usize)>,
}

impl<T> ExtractedField<T> {
    pub fn new(value: T, matcher: Matcher, source: impl Into<String>) -> Self {
        Self {
            value,
            matcher,
            confidence: None,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// A single billed row of the invoice.
///
/// The total is always `quantity * unit_price`; a printed row total is never
/// trusted, so an OCR digit error cannot produce an inconsistent row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
    total: Decimal,
}

impl LineItem {
    /// Build a line item, or `None` if the description is blank, either
    /// number is not positive, or the product overflows.
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Option<Self> {
        let description = description.into().trim().to_string();
        if description.is_empty() || quantity <= Decimal::ZERO || unit_price <= Decimal::ZERO {
            return None;
        }
        let total = quantity.checked_mul(unit_price)?;

        Some(Self {
            description,
            quantity,
            unit_price,
            total,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Quantity times unit price.
    pub fn total(&self) -> Decimal {
        self.total
    }
}

/// Metadata about the extraction process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// Source document path, when the text came from a document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,

    /// OCR engine used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_engine: Option<String>,

    /// Engine exit code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_exit_code: Option<i32>,

    /// Time spent in the OCR engine in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_time_ms: Option<u64>,

    /// Whether the OCR text was cut at the configured size cap.
    pub text_truncated: bool,

    /// Total processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Issues encountered during extraction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Structured result of one extraction call.
///
/// Every scalar field is optional; `None` means "not found", never zero or
/// empty.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceExtraction {
    pub invoice_number: Option<ExtractedField<String>>,
    pub vendor: Option<ExtractedField<String>>,
    pub invoice_date: Option<ExtractedField<NaiveDate>>,
    pub due_date: Option<ExtractedField<NaiveDate>>,
    pub total_amount: Option<ExtractedField<Decimal>>,
    pub line_items: Vec<LineItem>,
    /// Text the fields were extracted from.
    pub raw_text: String,
    pub metadata: ExtractionMetadata,
}

impl InvoiceExtraction {
    /// Names of the scalar fields that were not found.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.invoice_number.is_none() {
            missing.push("invoice_number");
        }
        if self.vendor.is_none() {
            missing.push("vendor");
        }
        if self.invoice_date.is_none() {
            missing.push("invoice_date");
        }
        if self.due_date.is_none() {
            missing.push("due_date");
        }
        if self.total_amount.is_none() {
            missing.push("total_amount");
        }
        missing
    }

    /// Share of the five scalar fields that were found (0.0 - 1.0).
    pub fn confidence(&self) -> f32 {
        const SCALAR_FIELDS: usize = 5;
        let found = SCALAR_FIELDS - self.missing_fields().len();
        found as f32 / SCALAR_FIELDS as f32
    }

    /// Sum of the recomputed line totals.
    pub fn line_items_total(&self) -> Decimal {
        self.line_items.iter().map(LineItem::total).sum()
    }

    /// Whether every scalar field and at least one line item were found.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty() && !self.line_items.is_empty()
    }

    /// Issues a reviewer should look at before accepting the result.
    pub fn validate(&self) -> Vec<String> {
        let mut issues: Vec<String> = self
            .missing_fields()
            .into_iter()
            .map(|field| format!("Missing {}", field.replace('_', " ")))
            .collect();

        if self.line_items.is_empty() {
            issues.push("No line items".to_string());
        }

        if let (Some(issued), Some(due)) = (&self.invoice_date, &self.due_date) {
            if due.value < issued.value {
                issues.push(format!(
                    "Due date ({}) is before invoice date ({})",
                    due.value, issued.value
                ));
            }
        }

        if let Some(total) = &self.total_amount {
            if total.value <= Decimal::ZERO {
                issues.push(format!("Total amount is not positive ({})", total.value));
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn empty_extraction() -> InvoiceExtraction {
        InvoiceExtraction {
            invoice_number: None,
            vendor: None,
            invoice_date: None,
            due_date: None,
            total_amount: None,
            line_items: Vec::new(),
            raw_text: String::new(),
            metadata: ExtractionMetadata::default(),
        }
    }

    #[test]
    fn test_document_mime_from_extension() {
        let doc = RawDocument::from_path("/uploads/scan.JPG");
        assert_eq!(doc.mime_type(), "image/jpeg");
        assert!(doc.is_supported());

        let doc = RawDocument::from_path("/uploads/notes.docx");
        assert_eq!(doc.mime_type(), "application/octet-stream");
        assert!(!doc.is_supported());

        let doc = RawDocument::from_path("/uploads/no_extension");
        assert!(!doc.is_supported());
    }

    #[test]
    fn test_line_item_total_is_computed() {
        let item = LineItem::new("Support Package", dec("12"), dec("50.00")).unwrap();
        assert_eq!(item.total(), dec("600.00"));
        assert_eq!(item.total().to_string(), "600.00");
    }

    #[test]
    fn test_line_item_rejects_invalid_values() {
        assert!(LineItem::new("   ", dec("1"), dec("5.00")).is_none());
        assert!(LineItem::new("Widget", Decimal::ZERO, dec("5.00")).is_none());
        assert!(LineItem::new("Widget", dec("2"), dec("-5.00")).is_none());
        assert!(LineItem::new("Widget", Decimal::MAX, dec("2")).is_none());
    }

    #[test]
    fn test_missing_fields_and_confidence() {
        let mut extraction = empty_extraction();
        assert_eq!(extraction.missing_fields().len(), 5);
        assert_eq!(extraction.confidence(), 0.0);

        extraction.invoice_number = Some(ExtractedField::new(
            "INV-1".to_string(),
            Matcher::InvoiceNumberLabel,
            "Invoice #: INV-1",
        ));
        extraction.total_amount = Some(ExtractedField::new(dec("10.00"), Matcher::TotalLabel, "Total: 10.00"));

        assert_eq!(extraction.missing_fields(), vec!["vendor", "invoice_date", "due_date"]);
        assert!((extraction.confidence() - 0.4).abs() < f32::EPSILON);
        assert!(!extraction.is_complete());
    }

    #[test]
    fn test_validate_flags_due_before_issue() {
        let mut extraction = empty_extraction();
        extraction.invoice_date = Some(ExtractedField::new(
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            Matcher::InvoiceDateLabel,
            "Invoice Date: 02/01/2024",
        ));
        extraction.due_date = Some(ExtractedField::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            Matcher::DueDateLabel,
            "Due Date: 01/01/2024",
        ));

        let issues = extraction.validate();
        assert!(issues.iter().any(|i| i.starts_with("Due date (2024-01-01)")));
        assert!(issues.contains(&"No line items".to_string()));
        assert!(issues.contains(&"Missing invoice number".to_string()));
    }

    #[test]
    fn test_absent_fields_serialize_as_null() {
        let json = serde_json::to_value(empty_extraction()).unwrap();
        assert!(json["invoice_number"].is_null());
        assert!(json["total_amount"].is_null());
        assert_eq!(json["line_items"], serde_json::json!([]));
    }

    #[test]
    fn test_line_items_total() {
        let mut extraction = empty_extraction();
        extraction.line_items = vec![
            LineItem::new("Consulting Services", dec("10"), dec("150.00")).unwrap(),
            LineItem::new("Software License", dec("1"), dec("500.00")).unwrap(),
        ];
        assert_eq!(extraction.line_items_total(), dec("2000.00"));
    }
}
