//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. User config ({config_dir}/config.yaml, or an explicit path)
//! 3. Environment variables (AQUA_* prefix)
//! 4. CLI flags (handled by caller)

use crate::error::{Error, Result};
use crate::types::ToolsConfig;
use crate::utils;
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use std::env;
use std::fs;
use tracing::debug;

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

const DEFAULTS_FILE: &str = "defaults.yaml";
const USER_FILE: &str = "config.yaml";

/// Configuration hierarchy loader
pub struct ConfigLoader {
    /// Base directory for configuration files
    config_dir: Utf8PathBuf,
}

impl ConfigLoader {
    /// Create a loader rooted at the platform config directory
    pub fn new() -> Result<Self> {
        let dir = utils::config_dir()?;
        let config_dir = Utf8PathBuf::from_path_buf(dir).map_err(|p| {
            Error::invalid_config("config_dir", format!("not valid UTF-8: {}", p.display()))
        })?;
        Ok(Self { config_dir })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self { config_dir }
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Path of the user config file
    pub fn user_config_path(&self) -> Utf8PathBuf {
        self.config_dir.join(USER_FILE)
    }

    /// Load configuration from defaults, the user file and the environment
    pub fn load(&self) -> Result<ToolsConfig> {
        self.load_with_override(None)
    }

    /// Load configuration, reading `path` instead of the user file when given.
    ///
    /// An explicit path must exist; the implicit user file is optional.
    pub fn load_with_override(&self, path: Option<&Utf8Path>) -> Result<ToolsConfig> {
        let mut config = Self::load_embedded_defaults()?;

        match path {
            Some(explicit) => {
                if !explicit.exists() {
                    return Err(Error::config_not_found(explicit.as_str()));
                }
                config = Self::load_yaml_file(explicit)?;
            }
            None => {
                let user_path = self.user_config_path();
                if user_path.exists() {
                    debug!(path = %user_path, "loading user configuration");
                    config = Self::load_yaml_file(&user_path)?;
                }
            }
        }

        config = Self::apply_env_overrides(config)?;
        config.validate()?;

        Ok(config)
    }

    /// Load the embedded default configuration
    pub fn load_embedded_defaults() -> Result<ToolsConfig> {
        let embedded_file = EmbeddedConfigs::get(DEFAULTS_FILE).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", DEFAULTS_FILE))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(DEFAULTS_FILE, "invalid UTF-8 in embedded config")
        })?;

        let config: ToolsConfig = serde_yaml_ng::from_str(content)?;
        Ok(config)
    }

    /// Load a YAML file and parse it. Missing fields take their defaults.
    fn load_yaml_file(path: &Utf8Path) -> Result<ToolsConfig> {
        let content = fs::read_to_string(path)?;
        let config: ToolsConfig = serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(path.as_str(), e.to_string()))?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: ToolsConfig) -> Result<ToolsConfig> {
        if let Ok(val) = env::var("AQUA_API_TIMEOUT_SECS") {
            config.network.api_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("AQUA_API_TIMEOUT_SECS", "must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("AQUA_DOWNLOAD_TIMEOUT_SECS") {
            config.network.download_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("AQUA_DOWNLOAD_TIMEOUT_SECS", "must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("AQUA_GITHUB_API_URL") {
            config.github.api_url = val;
        }

        if let Ok(val) = env::var("AQUA_GITHUB_API_MAGIC_URL") {
            config.github.api_magic_url = Some(val);
        }

        if let Ok(val) = env::var("AQUA_INSTALL_DIR") {
            config.install.dir = Some(val);
        }

        if let Ok(val) = env::var("AQUA_NO_COLOR") {
            config.display.color_enabled = !val.parse().unwrap_or(false);
        }

        Ok(config)
    }
}
