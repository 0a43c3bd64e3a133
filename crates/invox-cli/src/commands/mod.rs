//! Subcommand implementations.

pub mod batch;
pub mod config;
pub mod engine;
pub mod process;

use std::path::{Path, PathBuf};

use tracing::debug;

use invox_core::InvoxConfig;

/// `<user config dir>/invox/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invox")
        .join("config.json")
}

/// The explicit `--config` path, or the default location.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load `--config` if given, else the default file if it exists, else
/// built-in defaults.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<InvoxConfig> {
    if let Some(path) = explicit {
        return Ok(InvoxConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
        Ok(InvoxConfig::from_file(&path)?)
    } else {
        Ok(InvoxConfig::default())
    }
}
