//! Platform naming, release asset selection and archive entry matching

use crate::error::{Result, UpdateError};
use crate::releases::{Release, ReleaseAsset};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Release-side checksum manifest, never an installable archive
const CHECKSUMS_ASSET: &str = "checksums.txt";

/// Operating system and architecture as used in release asset names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Platform of the running build, using release naming conventions
    pub fn current() -> Self {
        let os = match std::env::consts::OS {
            "macos" => "darwin",
            other => other,
        };
        let arch = match std::env::consts::ARCH {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            other => other,
        };
        Self::new(os, arch)
    }

    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    /// Architecture as it appears in file names
    pub fn name_arch(&self) -> &str {
        normalize_arch(&self.arch)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.name_arch())
    }
}

/// Map 64-bit x86 architecture names to `x64`; others pass through
pub fn normalize_arch(arch: &str) -> &str {
    match arch {
        "amd64" | "x86_64" => "x64",
        other => other,
    }
}

/// Installed binary name: `{prefix}-{os}-{arch}`, with `.exe` on Windows
pub fn format_binary_name(prefix: &str, platform: &Platform) -> String {
    let name = format!("{}-{}", prefix, platform);
    if platform.is_windows() {
        format!("{}.exe", name)
    } else {
        name
    }
}

/// Selects the release archive for a platform
#[derive(Debug, Clone)]
pub struct AssetResolver {
    prefix: String,
}

impl AssetResolver {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Name prefix every candidate asset must start with
    pub fn expected_prefix(&self, platform: &Platform) -> String {
        format!("{}-{}", self.prefix, platform)
    }

    /// First non-checksum asset whose name starts with the expected prefix
    pub fn resolve<'a>(
        &self,
        release: &'a Release,
        platform: &Platform,
    ) -> Result<&'a ReleaseAsset> {
        let expected = self.expected_prefix(platform);
        debug!(
            expected_prefix = %expected,
            total_assets = release.assets.len(),
            "looking for release asset"
        );

        release
            .assets
            .iter()
            .filter(|asset| asset.name != CHECKSUMS_ASSET)
            .find(|asset| asset.name.starts_with(&expected))
            .ok_or_else(|| UpdateError::NoMatchingAsset {
                expected,
                available: release.assets.iter().map(|a| a.name.clone()).collect(),
            })
    }
}

/// Recognizes the target executable among archive entries.
///
/// Comparison uses the entry's base name, lowercased, with its last
/// extension removed; it must start with the target name treated the same
/// way. On Windows the entry must also end in `.exe`.
#[derive(Debug, Clone)]
pub struct BinaryMatcher {
    target_stem: String,
    require_exe: bool,
}

impl BinaryMatcher {
    pub fn new(binary_name: &str, platform: &Platform) -> Self {
        Self {
            target_stem: strip_extension(&binary_name.to_lowercase()).to_string(),
            require_exe: platform.is_windows(),
        }
    }

    pub fn is_target(&self, entry_name: &str) -> bool {
        let base = Path::new(entry_name)
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if base.is_empty() {
            return false;
        }
        if self.require_exe && !base.ends_with(".exe") {
            return false;
        }

        strip_extension(&base).starts_with(&self.target_stem)
    }
}

/// Remove the final `.ext` of a file name, if any
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// True for the in-archive checksum entry
pub fn is_checksum_entry(entry_name: &str) -> bool {
    entry_name.ends_with("checksum.txt")
}
