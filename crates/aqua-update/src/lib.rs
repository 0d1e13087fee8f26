//! Self-update functionality for the aqua-speed binary
//!
//! Provides:
//! - Version checking against GitHub releases
//! - Platform asset selection with optional jsDelivr mirror rewriting
//! - Streaming download with progress tracking
//! - Zip and tar.xz archive reading
//! - SHA-1 checksum verification before install
//! - Locked, staged binary replacement with a version record

pub mod archive;
pub mod assets;
pub mod checksum;
pub mod download;
pub mod error;
pub mod layout;
pub mod mirror;
pub mod releases;
pub mod updater;
pub mod version;

pub use archive::{
    ArchiveEntries, ArchiveOptions, ArchiveReader, ProgressBarObserver, ProgressObserver,
};
pub use assets::{AssetResolver, BinaryMatcher, Platform};
pub use download::Downloader;
pub use error::{Result, UpdateError};
pub use layout::{InstallLayout, InstallRecord};
pub use mirror::GitHubUrls;
pub use releases::{GitHubReleaseClient, Release, ReleaseAsset, ReleaseError, ReleaseSource};
pub use updater::{
    read_archive_contents, ArchiveContents, LatestRelease, UpdateCheck, UpdateOutcome,
    UpdatePhase, Updater, UpdaterConfig,
};
pub use version::Version;

/// Current tools version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
