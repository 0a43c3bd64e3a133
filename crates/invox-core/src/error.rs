//! Error types for the invox-core library.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Error type for configuration loading and saving.
///
/// Extraction reports [`ExtractionError`] directly.
#[derive(Error, Debug)]
pub enum InvoxError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while running the external OCR engine.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The configured executable is missing or cannot be run.
    #[error("OCR engine unavailable at {}: {reason}", .path.display())]
    EngineUnavailable { path: PathBuf, reason: String },

    /// The engine did not finish within the wall-clock budget and was killed.
    #[error("OCR engine timed out after {}ms", .timeout.as_millis())]
    EngineTimeout { timeout: Duration },

    /// The engine ran but exited unsuccessfully.
    #[error("OCR engine failed with exit code {}: {stderr}", display_exit_code(.exit_code))]
    EngineFailure {
        /// Exit code, `None` when the process was terminated by a signal.
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The engine exited cleanly but left no output artifact.
    #[error("OCR output not found at {}", .0.display())]
    MissingOutput(PathBuf),

    /// Temp file, spawn or read failure.
    #[error("I/O error during OCR: {0}")]
    Io(#[from] std::io::Error),
}

impl OcrError {
    /// Whether a caller-side retry could reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, OcrError::EngineTimeout { .. })
    }
}

fn display_exit_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none (terminated by signal)".to_string(), |c| c.to_string())
}

/// Errors that cross the extraction pipeline boundary.
///
/// Only OCR failures end up here; missing fields and unparseable line items
/// degrade into an incomplete [`InvoiceExtraction`](crate::InvoiceExtraction).
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Text could not be obtained from the document.
    #[error("extraction failed: {cause}")]
    Failed {
        #[source]
        cause: OcrError,
    },
}

impl From<OcrError> for ExtractionError {
    fn from(cause: OcrError) -> Self {
        ExtractionError::Failed { cause }
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, InvoxError>;
