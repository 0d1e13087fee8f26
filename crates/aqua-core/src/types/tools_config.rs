//! Runtime configuration for aqua-speed-tools
//!
//! Controls network timeouts, GitHub endpoints, mirror candidates, the
//! install layout of the managed speed-test binary, and table display.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Complete tools configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ToolsConfig {
    /// Network and HTTP configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// GitHub endpoints and repositories
    #[serde(default)]
    pub github: GitHubConfig,

    /// Mirror candidates for raw content
    #[serde(default)]
    pub mirrors: MirrorConfig,

    /// DNS-over-HTTPS endpoints
    #[serde(default)]
    pub dns_over_https: Vec<DohEndpoint>,

    /// Managed binary install settings
    #[serde(default)]
    pub install: InstallConfig,

    /// Archive decoding settings
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Display and output settings
    #[serde(default)]
    pub display: DisplayConfig,
}

impl ToolsConfig {
    /// Check the configuration for values the tools cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.install.binary_prefix.trim().is_empty() {
            return Err(Error::invalid_config(
                "install.binary-prefix",
                "cannot be empty",
            ));
        }
        if self.install.default_version.trim().is_empty() {
            return Err(Error::invalid_config(
                "install.default-version",
                "cannot be empty",
            ));
        }

        if self.mirrors.raw_jsdelivr_set.is_empty() {
            return Err(Error::invalid_config(
                "mirrors.raw-jsdelivr-set",
                "must contain at least one URL",
            ));
        }
        for (i, mirror) in self.mirrors.raw_jsdelivr_set.iter().enumerate() {
            if mirror.trim().is_empty() {
                return Err(Error::invalid_config(
                    format!("mirrors.raw-jsdelivr-set[{}]", i),
                    "cannot be empty",
                ));
            }
        }

        for (i, doh) in self.dns_over_https.iter().enumerate() {
            if doh.endpoint.trim().is_empty() {
                return Err(Error::invalid_config(
                    format!("dns-over-https[{}].endpoint", i),
                    "cannot be empty",
                ));
            }
            if doh.timeout_secs == 0 {
                return Err(Error::invalid_config(
                    format!("dns-over-https[{}].timeout-secs", i),
                    "must be greater than 0",
                ));
            }
        }

        if self.network.download_timeout_secs == 0 {
            return Err(Error::invalid_config(
                "network.download-timeout-secs",
                "must be greater than 0",
            ));
        }
        if self.network.api_timeout_secs == 0 {
            return Err(Error::invalid_config(
                "network.api-timeout-secs",
                "must be greater than 0",
            ));
        }

        Ok(())
    }
}

/// Network and HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// Release API timeout in seconds
    #[serde(default = "default_api_timeout")]
    pub api_timeout_secs: u64,

    /// Archive download timeout in seconds
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,

    /// Mirror latency probe timeout in seconds
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Upper bound on metadata response bodies
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: u64,

    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            api_timeout_secs: default_api_timeout(),
            download_timeout_secs: default_download_timeout(),
            probe_timeout_secs: default_probe_timeout(),
            max_response_bytes: default_max_response_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_api_timeout() -> u64 {
    30
}
fn default_download_timeout() -> u64 {
    300 // 5 minutes
}
fn default_probe_timeout() -> u64 {
    10
}
fn default_max_response_bytes() -> u64 {
    10 * 1024 * 1024 // 10 MiB
}
fn default_user_agent() -> String {
    format!("Aqua-Speed-Updater/{}", env!("CARGO_PKG_VERSION"))
}

/// GitHub endpoints and repositories
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitHubConfig {
    /// Release API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Mirror overriding the release API base
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_magic_url: Option<String>,

    /// Raw content base URL
    #[serde(default = "default_raw_url")]
    pub raw_url: String,

    /// Repository publishing the speed-test binary (owner/name)
    #[serde(default = "default_speed_repo")]
    pub speed_repo: String,

    /// Repository publishing the node presets (owner/name)
    #[serde(default = "default_tools_repo")]
    pub tools_repo: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_magic_url: None,
            raw_url: default_raw_url(),
            speed_repo: default_speed_repo(),
            tools_repo: default_tools_repo(),
        }
    }
}

impl GitHubConfig {
    /// Release API base, preferring the magic URL when set
    pub fn effective_api_url(&self) -> &str {
        match self.api_magic_url.as_deref() {
            Some(magic) if !magic.trim().is_empty() => magic,
            _ => &self.api_url,
        }
    }

    /// Latest-release endpoint for the speed-test repository
    pub fn latest_release_url(&self) -> String {
        format!(
            "{}/repos/{}/releases/latest",
            self.effective_api_url().trim_end_matches('/'),
            self.speed_repo
        )
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}
fn default_raw_url() -> String {
    "https://raw.githubusercontent.com".to_string()
}
fn default_speed_repo() -> String {
    "alice39s/aqua-speed".to_string()
}
fn default_tools_repo() -> String {
    "alice39s/aqua-speed-tools".to_string()
}

/// Mirror candidates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MirrorConfig {
    /// jsDelivr-style bases serving `{owner}/{repo}@{ref}/{path}`
    #[serde(default = "default_jsdelivr_set")]
    pub raw_jsdelivr_set: Vec<String>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            raw_jsdelivr_set: default_jsdelivr_set(),
        }
    }
}

fn default_jsdelivr_set() -> Vec<String> {
    vec![
        "https://cdn.jsdelivr.net/gh".to_string(),
        "https://fastly.jsdelivr.net/gh".to_string(),
    ]
}

/// A DNS-over-HTTPS resolver endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DohEndpoint {
    pub endpoint: String,

    #[serde(default = "default_doh_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub retries: u32,
}

fn default_doh_timeout() -> u64 {
    5
}

/// Managed binary install settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InstallConfig {
    /// Binary and asset name prefix
    #[serde(default = "default_binary_prefix")]
    pub binary_prefix: String,

    /// Version assumed when no install record exists
    #[serde(default = "default_version")]
    pub default_version: String,

    /// Override for the platform install directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            binary_prefix: default_binary_prefix(),
            default_version: default_version(),
            dir: None,
        }
    }
}

fn default_binary_prefix() -> String {
    "aqua-speed".to_string()
}
fn default_version() -> String {
    "0.0.0".to_string()
}

/// Archive decoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArchiveConfig {
    /// Window size used when decoding xz streams
    #[serde(default = "default_dict_capacity")]
    pub dict_capacity: usize,

    /// Largest entry body read into memory during verification
    #[serde(default = "default_max_entry_bytes")]
    pub max_entry_bytes: u64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            dict_capacity: default_dict_capacity(),
            max_entry_bytes: default_max_entry_bytes(),
        }
    }
}

fn default_dict_capacity() -> usize {
    1024 * 1024 // 1 MiB
}

fn default_max_entry_bytes() -> u64 {
    256 * 1024 * 1024
}

/// Display and output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DisplayConfig {
    /// Rows per page in the node table
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Enable colored output
    #[serde(default = "default_true")]
    pub color_enabled: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            color_enabled: default_true(),
        }
    }
}

fn default_page_size() -> usize {
    25
}
fn default_true() -> bool {
    true
}
