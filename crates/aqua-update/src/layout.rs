//! On-disk layout of the managed binary
//!
//! ```text
//! {root}/
//!   bin/{binary_name}
//!   version.txt        "{version} {checksum}\n"
//!   .install.lock
//! ```

use crate::assets::{format_binary_name, Platform};
use crate::error::{Result, UpdateError};
use fs4::fs_std::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const BIN_DIR: &str = "bin";
const VERSION_FILE: &str = "version.txt";
const LOCK_FILE: &str = ".install.lock";

/// Install directory and the paths derived from it
#[derive(Debug, Clone)]
pub struct InstallLayout {
    root: PathBuf,
    binary_name: String,
}

impl InstallLayout {
    pub fn new(root: impl Into<PathBuf>, binary_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            binary_name: binary_name.into(),
        }
    }

    /// Layout for `prefix` on `platform`, rooted at `root`
    pub fn for_platform(root: impl Into<PathBuf>, prefix: &str, platform: &Platform) -> Self {
        Self::new(root, format_binary_name(prefix, platform))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn binary_name(&self) -> &str {
        &self.binary_name
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.join(BIN_DIR)
    }

    pub fn binary_path(&self) -> PathBuf {
        self.bin_dir().join(&self.binary_name)
    }

    pub fn version_file(&self) -> PathBuf {
        self.root.join(VERSION_FILE)
    }

    pub fn has_binary(&self) -> bool {
        self.binary_path().is_file()
    }

    /// Read the install record, if one exists and parses
    pub fn read_record(&self) -> Option<InstallRecord> {
        let content = fs::read_to_string(self.version_file()).ok()?;
        InstallRecord::parse(&content)
    }

    /// Take the exclusive install lock, creating directories as needed
    pub fn lock(&self) -> Result<InstallLock> {
        fs::create_dir_all(self.bin_dir())?;

        let path = self.root.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;

        // Released when the file handle is dropped
        file.lock_exclusive()?;
        debug!(path = %path.display(), "acquired install lock");

        Ok(InstallLock { _file: file })
    }

    /// Write `bytes` as the executable, replacing any previous binary
    pub fn install_binary(&self, bytes: &[u8]) -> Result<PathBuf> {
        let dest = self.binary_path();
        let staging = self
            .bin_dir()
            .join(format!(".{}.partial", self.binary_name));

        let write_failed = |source| UpdateError::InstallWriteFailed {
            path: dest.clone(),
            source,
        };

        fs::create_dir_all(self.bin_dir()).map_err(write_failed)?;
        write_executable(&staging, bytes).map_err(|e| {
            let _ = fs::remove_file(&staging);
            write_failed(e)
        })?;
        fs::rename(&staging, &dest).map_err(|e| {
            let _ = fs::remove_file(&staging);
            write_failed(e)
        })?;

        Ok(dest)
    }

    /// Persist the install record
    pub fn write_record(&self, record: &InstallRecord) -> Result<()> {
        let path = self.version_file();
        fs::write(&path, record.to_string()).map_err(|source| {
            UpdateError::VersionRecordWriteFailed {
                path: path.clone(),
                source,
            }
        })
    }

    /// Delete the installed binary after a failed record write
    pub fn remove_binary(&self) {
        let path = self.binary_path();
        if let Err(e) = fs::remove_file(&path) {
            warn!(path = %path.display(), error = %e, "failed to remove installed binary");
        }
    }
}

/// Held for the duration of an install
#[derive(Debug)]
pub struct InstallLock {
    _file: File,
}

/// Installed version and the checksum it was verified against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRecord {
    pub version: String,
    pub checksum: String,
}

impl InstallRecord {
    pub fn new(version: impl Into<String>, checksum: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            checksum: checksum.into(),
        }
    }

    /// Parse `"{version} {checksum}"`. A missing checksum reads as empty.
    pub fn parse(content: &str) -> Option<Self> {
        let mut fields = content.split_whitespace();
        let version = fields.next()?;
        let checksum = fields.next().unwrap_or_default();
        Some(Self::new(version, checksum))
    }
}

impl std::fmt::Display for InstallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} {}", self.version, self.checksum)
    }
}

#[cfg(unix)]
fn write_executable(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .mode(0o755)
        .open(path)?;
    file.write_all(bytes)?;
    file.sync_all()?;

    // The mode above is filtered through the umask
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn write_executable(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
