//! Version information for aqua-speed-tools and the managed binary

use serde::{Deserialize, Serialize};

/// Version information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Semantic version of the tools
    pub version: String,

    /// Git commit SHA (short)
    pub commit: Option<String>,

    /// Target triple
    pub target: Option<String>,

    /// Installed aqua-speed version, when one is recorded
    pub speed_version: Option<String>,

    /// Checksum the installed binary was verified against
    pub speed_checksum: Option<String>,
}

impl VersionInfo {
    /// Create version info for current build
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: option_env!("GIT_SHA").map(String::from),
            target: option_env!("TARGET").map(String::from),
            speed_version: None,
            speed_checksum: None,
        }
    }

    /// Attach the install record of the managed binary
    pub fn with_install_record(mut self, record: Option<aqua_update::InstallRecord>) -> Self {
        if let Some(record) = record {
            self.speed_version = Some(record.version);
            self.speed_checksum = Some(record.checksum).filter(|c| !c.is_empty());
        }
        self
    }

    /// Format as display string
    pub fn display(&self) -> String {
        let mut parts = vec![format!("aqua-speed-tools {}", self.version)];

        if let Some(commit) = &self.commit {
            parts.push(format!("({})", commit));
        }

        if let Some(target) = &self.target {
            parts.push(target.clone());
        }

        parts.join(" ")
    }
}

impl std::fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}
