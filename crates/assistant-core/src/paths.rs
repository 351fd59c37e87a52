use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::ConfigError;

/// Assistant configuration directory (`~/.meditrack`).
pub fn meditrack_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".meditrack")
}

/// Path of `config.json` inside the configuration directory.
pub fn config_json_path() -> PathBuf {
    meditrack_dir().join("config.json")
}

/// Load and deserialize a JSON file.
pub fn load_config_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = read(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Load and deserialize a TOML file.
pub fn load_config_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = read(path)?;
    Ok(toml::from_str(&content)?)
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })
}
