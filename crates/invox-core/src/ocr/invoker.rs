//! Tesseract-compatible command line invoker.
//!
//! Every call gets its own temporary directory for the engine output, so
//! concurrent calls never share artifacts. The directory is an RAII guard and
//! the child is spawned with `kill_on_drop`, which keeps cleanup unconditional
//! on success, failure, timeout and cancellation alike.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use tempfile::TempDir;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{truncate_at_char_boundary, OcrBackend, OcrResult};

/// Environment variable the engine reads its language data from.
const DATA_PATH_VAR: &str = "TESSDATA_PREFIX";

/// File stem handed to the engine; it appends `.txt` itself.
const OUTPUT_BASE: &str = "ocr_output";

const TEMP_PREFIX: &str = "invox-ocr-";

/// Runs an external OCR executable once per document.
#[derive(Debug, Clone)]
pub struct OcrInvoker {
    config: OcrConfig,
}

impl OcrInvoker {
    /// Create an invoker for the given engine configuration.
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    /// Whether the configured executable exists and can be run.
    pub fn is_available(&self) -> bool {
        self.check_executable().is_ok()
    }

    /// Verify the configured executable, failing with `EngineUnavailable`.
    pub fn check_executable(&self) -> Result<(), OcrError> {
        let path = &self.config.executable;
        let metadata = std::fs::metadata(path).map_err(|e| unavailable(path, e.to_string()))?;

        if !metadata.is_file() {
            return Err(unavailable(path, "not a regular file"));
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if metadata.permissions().mode() & 0o111 == 0 {
                return Err(unavailable(path, "not executable"));
            }
        }

        Ok(())
    }

    /// Engine arguments for one run.
    pub fn build_args(&self, input: &Path, output_base: &Path) -> Vec<OsString> {
        vec![
            input.as_os_str().to_owned(),
            output_base.as_os_str().to_owned(),
            "-l".into(),
            self.config.language.clone().into(),
            "--psm".into(),
            self.config.psm.to_string().into(),
            "--dpi".into(),
            self.config.dpi.to_string().into(),
            // Keeps column alignment so item tables stay parseable.
            "-c".into(),
            "preserve_interword_spaces=1".into(),
        ]
    }

    fn build_command(&self, input: &Path, output_base: &Path) -> Command {
        let mut command = Command::new(&self.config.executable);
        command
            .args(self.build_args(input, output_base))
            .env_clear()
            .env(DATA_PATH_VAR, &self.config.data_path)
            .envs(&self.config.env)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    fn create_workdir(&self) -> Result<TempDir, OcrError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX);
        let dir = match &self.config.temp_dir {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        Ok(dir)
    }

    fn engine_name(&self) -> String {
        self.name().to_string()
    }

    /// Run the engine on `image_path` and return its text.
    pub async fn extract_text(&self, image_path: &Path) -> Result<OcrResult, OcrError> {
        self.check_executable()?;

        let start = Instant::now();
        let workdir = self.create_workdir()?;
        let output_base = workdir.path().join(OUTPUT_BASE);

        info!(
            "Running OCR engine {} on {}",
            self.config.executable.display(),
            image_path.display()
        );
        debug!("OCR arguments: {:?}", self.build_args(image_path, &output_base));

        let mut child = self
            .build_command(image_path, &output_base)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    unavailable(&self.config.executable, e.to_string())
                }
                _ => OcrError::Io(e),
            })?;

        let timeout = self.config.timeout();
        let mut stderr_pipe = child.stderr.take();
        let mut stderr_buf = Vec::new();

        let outcome = tokio::time::timeout(timeout, async {
            let read_stderr = async {
                if let Some(pipe) = stderr_pipe.as_mut() {
                    if let Err(e) = pipe.read_to_end(&mut stderr_buf).await {
                        debug!("Could not read OCR stderr: {}", e);
                    }
                }
            };
            let (status, ()) = tokio::join!(child.wait(), read_stderr);
            status
        })
        .await;

        let status = match outcome {
            Ok(status) => status?,
            Err(_) => {
                warn!(
                    "OCR engine exceeded {}ms on {}, killing it",
                    timeout.as_millis(),
                    image_path.display()
                );
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill OCR engine: {}", e);
                }
                return Err(OcrError::EngineTimeout { timeout });
            }
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_buf).trim().to_string();
            warn!("OCR engine exited with {}: {}", status, stderr);
            return Err(OcrError::EngineFailure {
                exit_code: status.code(),
                stderr,
            });
        }

        let output_path = output_base.with_extension("txt");
        let bytes = match tokio::fs::read(&output_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(OcrError::MissingOutput(output_path));
            }
            Err(e) => return Err(OcrError::Io(e)),
        };

        let mut text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "OCR output for {} is not valid UTF-8, replacing invalid sequences",
                    image_path.display()
                );
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };

        let trimmed_len = text.trim_end().len();
        text.truncate(trimmed_len);

        let truncated = truncate_at_char_boundary(&mut text, self.config.max_text_bytes);
        if truncated {
            warn!(
                "OCR output truncated to {} bytes for {}",
                self.config.max_text_bytes,
                image_path.display()
            );
        }

        if let Err(e) = workdir.close() {
            warn!("Failed to remove OCR temp directory: {}", e);
        }

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Extracted {} characters in {}ms",
            text.chars().count(),
            processing_time_ms
        );

        Ok(OcrResult {
            text,
            exit_code: status.code(),
            processing_time_ms,
            truncated,
            engine: self.engine_name(),
            language: self.config.language.clone(),
        })
    }
}

impl OcrBackend for OcrInvoker {
    async fn recognize(&self, path: &Path) -> Result<OcrResult, OcrError> {
        self.extract_text(path).await
    }

    fn name(&self) -> &str {
        self.config
            .executable
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("ocr")
    }
}

fn unavailable(path: &Path, reason: impl Into<String>) -> OcrError {
    OcrError::EngineUnavailable {
        path: PathBuf::from(path),
        reason: reason.into(),
    }
}
