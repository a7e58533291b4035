// ⚙️ Configuration - TOML file with per-section defaults

use crate::entities::SchemaVersion;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Complete configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub macrovision: MacrovisionConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Export configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportConfig {
    /// View shape of the catalog (v1: attributes.height.base, v2: height)
    #[serde(default)]
    pub schema: SchemaVersion,
    /// Entity catalog to read when none is given on the command line
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    /// Where to write the exported table; stdout when absent
    #[serde(default)]
    pub output: Option<PathBuf>,
}

/// Macrovision scene configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MacrovisionConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "https://macrovision.crux.sexy/".to_string()
}

impl Default for MacrovisionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(config)
}
