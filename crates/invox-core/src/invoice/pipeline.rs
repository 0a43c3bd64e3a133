//! End-to-end extraction: document to OCR text to structured invoice.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::models::config::{ExtractionConfig, InvoxConfig};
use crate::models::invoice::{ExtractionMetadata, InvoiceExtraction, RawDocument};
use crate::ocr::{OcrBackend, OcrInvoker};

use super::fields::FieldExtractor;
use super::rules::PatternSet;
use super::table::LineItemTableParser;

/// Runs OCR on a document and extracts invoice fields and line items from
/// the resulting text.
///
/// Holds no per-call state, so one pipeline can serve many concurrent
/// `extract` calls.
#[derive(Debug)]
pub struct ExtractionPipeline<B = OcrInvoker> {
    backend: B,
    patterns: PatternSet,
    fields: FieldExtractor,
    table: LineItemTableParser,
}

impl ExtractionPipeline<OcrInvoker> {
    /// Build a pipeline around the configured OCR engine.
    pub fn from_config(config: &InvoxConfig) -> Self {
        Self::new(OcrInvoker::new(config.ocr.clone()), &config.extraction)
    }
}

impl<B: OcrBackend> ExtractionPipeline<B> {
    pub fn new(backend: B, config: &ExtractionConfig) -> Self {
        Self {
            backend,
            patterns: PatternSet::new(),
            fields: FieldExtractor::new(config),
            table: LineItemTableParser::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Extract an invoice from a document.
    ///
    /// Fails only when the OCR stage fails. Fields that cannot be found are
    /// left empty and reported in `metadata.warnings`.
    pub async fn extract(&self, document: &RawDocument) -> Result<InvoiceExtraction, ExtractionError> {
        let start = Instant::now();
        info!(
            path = %document.path().display(),
            mime = document.mime_type(),
            engine = self.backend.name(),
            "Extracting invoice"
        );

        if !document.is_supported() {
            warn!(
                path = %document.path().display(),
                "Unrecognized document type, passing to OCR engine anyway"
            );
        }

        let ocr = self.backend.recognize(document.path()).await.map_err(|cause| {
            warn!(path = %document.path().display(), error = %cause, "OCR failed");
            ExtractionError::from(cause)
        })?;

        let mut extraction = self.extract_from_text(ocr.text);
        let metadata = &mut extraction.metadata;
        if ocr.truncated {
            metadata
                .warnings
                .insert(0, "OCR text was truncated at the configured size cap".to_string());
        }
        metadata.source_path = Some(document.path().to_path_buf());
        metadata.ocr_engine = Some(ocr.engine);
        metadata.ocr_exit_code = ocr.exit_code;
        metadata.ocr_time_ms = Some(ocr.processing_time_ms);
        metadata.text_truncated = ocr.truncated;
        metadata.processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            path = %document.path().display(),
            confidence = extraction.confidence(),
            line_items = extraction.line_items.len(),
            "Extraction finished in {}ms",
            extraction.metadata.processing_time_ms
        );
        Ok(extraction)
    }

    /// Extract an invoice from text that has already been recognized.
    pub fn extract_from_text(&self, text: impl Into<String>) -> InvoiceExtraction {
        let start = Instant::now();
        let text = text.into();

        debug!("Parsing invoice from {} characters of text", text.len());

        let fields = self.fields.extract(&text, &self.patterns);
        let line_items = self.table.parse(&text, &self.patterns);

        let mut extraction = InvoiceExtraction {
            invoice_number: fields.invoice_number,
            vendor: fields.vendor,
            invoice_date: fields.invoice_date,
            due_date: fields.due_date,
            total_amount: fields.total_amount,
            line_items,
            raw_text: text,
            metadata: ExtractionMetadata::default(),
        };

        let mut warnings: Vec<String> = extraction
            .missing_fields()
            .into_iter()
            .map(|field| format!("Could not extract {}", field.replace('_', " ")))
            .collect();
        if extraction.line_items.is_empty() {
            warnings.push("Could not extract line items".to_string());
        }
        extraction.metadata.warnings = warnings;
        extraction.metadata.processing_time_ms = start.elapsed().as_millis() as u64;

        debug!(
            "Extracted invoice {:?} with confidence {:.2}",
            extraction.invoice_number.as_ref().map(|f| f.value.as_str()),
            extraction.confidence()
        );
        extraction
    }
}
