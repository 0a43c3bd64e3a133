//! OCR stage: turns a document into raw text through an external engine.

mod invoker;

pub use invoker::OcrInvoker;

use std::future::Future;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Result of running the OCR engine on one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// Recognized text, trailing whitespace removed.
    pub text: String,

    /// Engine exit code.
    pub exit_code: Option<i32>,

    /// Wall-clock time spent in the engine in milliseconds.
    pub processing_time_ms: u64,

    /// Whether `text` was cut at the configured size cap.
    pub truncated: bool,

    /// Engine identifier (executable file name).
    pub engine: String,

    /// Recognition language passed to the engine.
    pub language: String,
}

impl OcrResult {
    /// Wrap text that did not come from an engine run.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            exit_code: None,
            processing_time_ms: 0,
            truncated: false,
            engine: "text".to_string(),
            language: String::new(),
        }
    }
}

/// A source of raw text for documents.
///
/// [`OcrInvoker`] is the production implementation; the pipeline is generic
/// over this trait so other text sources can be plugged in.
pub trait OcrBackend: Send + Sync {
    /// Produce raw text for the document at `path`.
    fn recognize(&self, path: &Path) -> impl Future<Output = Result<OcrResult, OcrError>> + Send;

    /// Short engine name for logs and metadata.
    fn name(&self) -> &str;
}

/// Cut `text` to at most `max_bytes`, backing off to a char boundary.
///
/// Returns `true` when anything was removed.
pub(crate) fn truncate_at_char_boundary(text: &mut String, max_bytes: usize) -> bool {
    if text.len() <= max_bytes {
        return false;
    }
    let mut cut = max_bytes;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
    true
}
