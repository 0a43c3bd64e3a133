//! Configuration structures for the extraction pipeline.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{InvoxError, Result};

/// Main configuration for the invox pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoxConfig {
    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,
}

/// External OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Path to the engine executable.
    pub executable: PathBuf,

    /// Engine data directory, exported to the child as `TESSDATA_PREFIX`.
    pub data_path: PathBuf,

    /// Recognition language code (e.g. "eng", "eng+deu").
    pub language: String,

    /// Target DPI passed to the engine.
    pub dpi: u32,

    /// Page segmentation mode.
    pub psm: u8,

    /// Wall-clock budget for one engine run, in milliseconds.
    pub timeout_ms: u64,

    /// Cap on the returned text size in bytes; longer output is truncated.
    pub max_text_bytes: usize,

    /// Root for per-call temporary directories (system temp dir when unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,

    /// Extra variables for the child environment. Nothing else is inherited.
    pub env: BTreeMap<String, String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from(default_executable()),
            data_path: PathBuf::from(default_data_path()),
            language: "eng".to_string(),
            dpi: 300,
            psm: 3,
            timeout_ms: 30_000,
            max_text_bytes: 1024 * 1024,
            temp_dir: None,
            env: BTreeMap::new(),
        }
    }
}

impl OcrConfig {
    /// Engine timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(windows)]
fn default_executable() -> &'static str {
    r"C:\Program Files\Tesseract-OCR\tesseract.exe"
}

#[cfg(not(windows))]
fn default_executable() -> &'static str {
    "/usr/bin/tesseract"
}

#[cfg(windows)]
fn default_data_path() -> &'static str {
    r"C:\Program Files\Tesseract-OCR\tessdata"
}

#[cfg(not(windows))]
fn default_data_path() -> &'static str {
    "/usr/share/tesseract-ocr/5/tessdata"
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// chrono format strings for labeled dates, tried in order.
    pub date_formats: Vec<String>,

    /// How many leading non-empty lines the vendor heuristic inspects.
    pub vendor_scan_lines: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            // US order first; day-first dates with day <= 12 resolve as month-first.
            date_formats: vec![
                "%m/%d/%Y".to_string(),
                "%m-%d-%Y".to_string(),
                "%d/%m/%Y".to_string(),
                "%d-%m-%Y".to_string(),
            ],
            vendor_scan_lines: 5,
        }
    }
}

impl InvoxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| InvoxError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| InvoxError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = InvoxConfig::default();
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.dpi, 300);
        assert_eq!(config.ocr.psm, 3);
        assert_eq!(config.ocr.timeout(), Duration::from_secs(30));
        assert_eq!(config.extraction.vendor_scan_lines, 5);
        assert_eq!(config.extraction.date_formats[0], "%m/%d/%Y");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: InvoxConfig =
            serde_json::from_str(r#"{"ocr": {"language": "deu", "timeout_ms": 500}}"#).unwrap();
        assert_eq!(config.ocr.language, "deu");
        assert_eq!(config.ocr.timeout(), Duration::from_millis(500));
        assert_eq!(config.ocr.dpi, 300);
        assert_eq!(config.extraction.date_formats.len(), 4);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = InvoxConfig::default();
        config.ocr.psm = 6;
        config.ocr.env.insert("OMP_THREAD_LIMIT".to_string(), "1".to_string());
        config.save(&path).unwrap();

        let loaded = InvoxConfig::from_file(&path).unwrap();
        assert_eq!(loaded.ocr.psm, 6);
        assert_eq!(loaded.ocr.env.get("OMP_THREAD_LIMIT").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = InvoxConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, InvoxError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = InvoxConfig::from_file(Path::new("/nonexistent/invox.json")).unwrap_err();
        assert!(matches!(err, InvoxError::Io(_)));
    }
}
