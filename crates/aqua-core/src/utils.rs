//! Shared platform path helpers

use crate::error::{Error, Result};
use std::path::PathBuf;

/// Directory name holding the tools configuration
pub const TOOLS_DIR_NAME: &str = "aqua-speed-tools";

/// Directory name holding the managed speed-test binary
pub const SPEED_DIR_NAME: &str = "aqua-speed";

/// Get the user's home directory
///
/// Prefers the HOME environment variable over dirs::home_dir() so that
/// containers and test harnesses overriding HOME are respected.
pub fn get_home_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        if !home.is_empty() {
            return Ok(PathBuf::from(home));
        }
    }

    dirs::home_dir().ok_or(Error::NoPlatformDir { what: "home" })
}

/// Resolve the per-application directory for `name`.
///
/// - Windows: `%APPDATA%\{name}`
/// - macOS: `~/Library/Application Support/{name}`
/// - Linux as root: `/etc/{name}`
/// - Linux otherwise: `$XDG_CONFIG_HOME/{name}` or `~/.config/{name}`
pub fn app_dir(name: &str) -> Result<PathBuf> {
    if is_root() {
        return Ok(PathBuf::from("/etc").join(name));
    }

    if cfg!(any(target_os = "windows", target_os = "macos")) {
        return dirs::config_dir()
            .map(|dir| dir.join(name))
            .ok_or(Error::NoPlatformDir { what: "config" });
    }

    match dirs::config_dir() {
        Some(dir) => Ok(dir.join(name)),
        None => Ok(get_home_dir()?.join(".config").join(name)),
    }
}

/// Configuration directory for aqua-speed-tools
pub fn config_dir() -> Result<PathBuf> {
    app_dir(TOOLS_DIR_NAME)
}

/// Install directory for the managed aqua-speed binary
pub fn install_dir() -> Result<PathBuf> {
    app_dir(SPEED_DIR_NAME)
}

#[cfg(target_os = "linux")]
fn is_root() -> bool {
    use std::os::unix::fs::MetadataExt;

    // /proc/self is owned by the effective uid of the calling process
    std::fs::metadata("/proc/self")
        .map(|meta| meta.uid() == 0)
        .unwrap_or(false)
}

#[cfg(not(target_os = "linux"))]
fn is_root() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_home_dir_from_env() {
        if std::env::var("HOME").is_ok() {
            let home = get_home_dir().unwrap();
            assert!(!home.as_os_str().is_empty());
        }
    }

    #[test]
    fn test_app_dir_ends_with_name() {
        let dir = app_dir("aqua-test-app").unwrap();
        assert!(dir.ends_with("aqua-test-app"));
    }

    #[test]
    fn test_install_and_config_dirs_differ() {
        let install = install_dir().unwrap();
        let config = config_dir().unwrap();
        assert_ne!(install, config);
        assert!(install.ends_with(SPEED_DIR_NAME));
        assert!(config.ends_with(TOOLS_DIR_NAME));
    }
}
