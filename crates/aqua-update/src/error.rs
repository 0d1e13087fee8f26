//! Error taxonomy for the update flow

use crate::archive::ArchiveError;
use crate::releases::ReleaseError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`UpdateError`]
pub type Result<T> = std::result::Result<T, UpdateError>;

/// Errors raised while checking for, downloading or installing an update
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("invalid version format: {version}")]
    InvalidVersionFormat { version: String },

    #[error("no matching asset found for {expected} (available: {})", available.join(", "))]
    NoMatchingAsset {
        expected: String,
        available: Vec<String>,
    },

    #[error("download of {url} failed: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("no executable found in archive")]
    NoExecutableFound,

    #[error("checksum file not found in archive")]
    ChecksumFileMissing,

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("failed to write binary to {}", path.display())]
    InstallWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write version record to {}", path.display())]
    VersionRecordWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error(transparent)]
    Release(#[from] ReleaseError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An error tagged with the update step it occurred in
    #[error("{op}")]
    Operation {
        op: &'static str,
        #[source]
        source: Box<UpdateError>,
    },
}

impl UpdateError {
    /// Create a download failure
    pub fn download_failed(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::DownloadFailed {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Wrap this error with the operation it occurred in
    pub fn context(self, op: &'static str) -> Self {
        Self::Operation {
            op,
            source: Box::new(self),
        }
    }

    /// The innermost error beneath any operation labels
    pub fn root(&self) -> &UpdateError {
        match self {
            Self::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    /// Operation labels from outermost to innermost
    pub fn operations(&self) -> Vec<&'static str> {
        let mut ops = Vec::new();
        let mut current = self;
        while let Self::Operation { op, source } = current {
            ops.push(*op);
            current = source;
        }
        ops
    }
}

/// Attach an operation label to the error side of a result
pub trait ResultExt<T> {
    fn op(self, op: &'static str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<UpdateError>,
{
    fn op(self, op: &'static str) -> Result<T> {
        self.map_err(|e| e.into().context(op))
    }
}
