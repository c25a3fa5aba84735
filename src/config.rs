//! Application configuration for the administrative CLI.
//!
//! Settings come from a TOML file, with the store path overridable via
//! the `POS_CONFIG_STORE` environment variable so operators can point the
//! tool at a different installation without editing the file.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{fs, path::Path};

/// Default location of the store file when nothing else is configured.
pub const DEFAULT_STORE_PATH: &str = "data/pos-config.sqlite";

/// CLI configuration, loaded from TOML.
#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    /// Path to the sqlite store file.
    #[serde(default = "default_store_path")]
    pub store_path: String,
    /// Operator name recorded as `createdBy` on initialization; falls
    /// back to the process environment identity when absent.
    #[serde(default)]
    pub operator: Option<String>,
}

fn default_store_path() -> String {
    DEFAULT_STORE_PATH.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            operator: None,
        }
    }
}

/// Loads configuration from `path`, then applies environment overrides.
/// A missing file is not an error; defaults apply.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);

    let mut config = if path_ref.exists() {
        let contents = fs::read_to_string(path_ref).map_err(|e| {
            Error::Config(format!("Failed to read config file {path_ref:?}: {e}"))
        })?;
        toml::from_str(&contents).map_err(|e| {
            Error::Config(format!(
                "Failed to parse TOML from config file {path_ref:?}: {e}"
            ))
        })?
    } else {
        tracing::debug!("No config file at {:?}; using defaults.", path_ref);
        AppConfig::default()
    };

    if let Ok(store_path) = std::env::var("POS_CONFIG_STORE") {
        config.store_path = store_path;
    }
    Ok(config)
}
