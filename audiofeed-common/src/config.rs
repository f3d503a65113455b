//! Configuration loading
//!
//! Each setting resolves in priority order:
//! 1. Command-line argument or environment variable (both arrive through
//!    clap in the binary as [`ConfigOverrides`])
//! 2. TOML config file
//! 3. Compiled default
//!
//! A missing config file is not an error; a malformed one is.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "audiofeed.db";

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Optional values read from the TOML config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub frontend_url: Option<String>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub root_folder: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub frontend_url: Option<String>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub root_folder: PathBuf,
    pub bind_address: String,
    pub port: u16,
    pub frontend_url: String,
    pub log_level: String,
    /// Config file that contributed values, if any
    pub config_file: Option<PathBuf>,
}

impl ServiceConfig {
    /// Resolve configuration from overrides, the config file, and defaults
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let config_file = match &overrides.config_file {
            Some(path) if !path.exists() => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => Some(path.clone()),
            None => default_config_file(),
        };

        let file = match &config_file {
            Some(path) => TomlConfig::load(path)?,
            None => TomlConfig::default(),
        };

        Ok(Self::merge(overrides, file, config_file))
    }

    /// Merge already-loaded sources without touching the filesystem
    pub fn merge(overrides: ConfigOverrides, file: TomlConfig, config_file: Option<PathBuf>) -> Self {
        Self {
            root_folder: overrides
                .root_folder
                .or(file.root_folder)
                .unwrap_or_else(default_root_folder),
            bind_address: overrides
                .bind_address
                .or(file.bind_address)
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            port: overrides.port.or(file.port).unwrap_or(DEFAULT_PORT),
            frontend_url: overrides
                .frontend_url
                .or(file.frontend_url)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string()),
            log_level: overrides
                .log_level
                .or(file.log_level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            config_file,
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// First existing platform config file, if any
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("audiofeed").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/audiofeed/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("audiofeed"))
        .unwrap_or_else(|| PathBuf::from("./audiofeed_data"))
}
