use std::fs;
use std::io;
use std::path::Path;

use diag_engine::EngineConfig;
use log::{debug, warn};

/// Write an engine configuration as pretty-printed JSON, creating parent directories.
pub fn save_config(path: impl AsRef<Path>, config: &EngineConfig) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let bytes = serde_json::to_vec_pretty(config).map_err(invalid_data)?;
    fs::write(path, bytes)
}

fn invalid_data(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}

/// Read an engine configuration; fields missing from the file keep their defaults.
///
/// Tolerances and limits are validated before the configuration is returned.
pub fn load_config(path: impl AsRef<Path>) -> io::Result<EngineConfig> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let config: EngineConfig = serde_json::from_slice(&bytes).map_err(invalid_data)?;
    config.validate().map_err(|err| {
        warn!("rejecting engine configuration {}: {err}", path.display());
        invalid_data(err)
    })?;
    debug!("engine configuration loaded from {}", path.display());
    Ok(config)
}
