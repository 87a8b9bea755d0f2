use crate::infrastructure::error::{CliError, Result};
use activity_delivery_bridge::BridgeConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Read and parse a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(CliError::file_not_found(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Pretty-print to `output`, or stdout when no path is given
pub fn write_json<T: Serialize>(value: &T, output: Option<&PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, json + "\n")?;
            tracing::info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Bridge configuration from `--config`, or the defaults
pub fn load_bridge_config(path: Option<&Path>) -> Result<BridgeConfig> {
    match path {
        Some(path) => {
            let config = read_json(path)?;
            tracing::debug!("Loaded bridge config from {}", path.display());
            Ok(config)
        }
        None => Ok(BridgeConfig::default()),
    }
}
