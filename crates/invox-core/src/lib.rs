//! Core library for invoice OCR extraction.
//!
//! This crate provides:
//! - A sandboxed invoker for an external Tesseract-compatible OCR engine
//! - Rule-based extraction of invoice header fields (number, vendor, dates, total)
//! - A line-item table parser with recomputed row totals
//! - An async pipeline tying OCR and extraction together

pub mod error;
pub mod invoice;
pub mod models;
pub mod ocr;

#[cfg(test)]
mod test_support;

pub use error::{ExtractionError, InvoxError, OcrError, Result};
pub use invoice::{ExtractionPipeline, FieldExtractor, LineItemTableParser, PatternSet, TableState};
pub use models::config::{ExtractionConfig, InvoxConfig, OcrConfig};
pub use models::invoice::{
    ExtractedField, ExtractionMetadata, InvoiceExtraction, LineItem, Matcher, RawDocument,
};
pub use ocr::{OcrBackend, OcrInvoker, OcrResult};
