//! Update orchestration for the managed aqua-speed binary
//!
//! One call to [`Updater::check_and_update`] walks these phases:
//!
//! ```text
//! Idle -> CheckingVersion -> UpToDate
//!                         -> Downloading -> Verifying -> Installing -> Done
//! (any phase) -> Failed
//! ```
//!
//! Nothing touches the install directory until the archive has been
//! downloaded and its binary verified against the bundled checksum.

use crate::archive::{ArchiveOptions, ArchiveReader, ProgressObserver};
use crate::assets::{is_checksum_entry, AssetResolver, BinaryMatcher, Platform};
use crate::checksum;
use crate::download::Downloader;
use crate::error::{Result, ResultExt, UpdateError};
use crate::layout::{InstallLayout, InstallRecord};
use crate::mirror::{convert_release_url_to_mirror, GitHubUrls};
use crate::releases::{GitHubReleaseClient, ReleaseSource};
use crate::version::Version;
use aqua_core::types::ToolsConfig;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Settings the updater needs from the tools configuration
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    /// Repository publishing the binary (owner/name)
    pub repo: String,
    /// Asset and binary name prefix
    pub binary_prefix: String,
    pub user_agent: String,
    pub api_timeout: Duration,
    pub download_timeout: Duration,
    pub max_response_bytes: u64,
    pub dict_capacity: usize,
    /// Largest archive entry read into memory
    pub max_entry_bytes: u64,
    /// API base and optional download mirror
    pub urls: GitHubUrls,
}

impl UpdaterConfig {
    pub fn from_tools_config(config: &ToolsConfig) -> Self {
        Self {
            repo: config.github.speed_repo.trim_matches('/').to_string(),
            binary_prefix: config.install.binary_prefix.clone(),
            user_agent: config.network.user_agent.clone(),
            api_timeout: Duration::from_secs(config.network.api_timeout_secs),
            download_timeout: Duration::from_secs(config.network.download_timeout_secs),
            max_response_bytes: config.network.max_response_bytes,
            dict_capacity: config.archive.dict_capacity,
            max_entry_bytes: config.archive.max_entry_bytes,
            urls: GitHubUrls::new(&config.github.raw_url, config.github.effective_api_url()),
        }
    }

    /// Route release downloads through `mirror` when given
    pub fn with_fastest_mirror(mut self, mirror: Option<&str>) -> Self {
        if let Some(mirror) = mirror {
            self.urls = self.urls.with_mirror(mirror);
        }
        self
    }

    /// `{api}/repos/{owner}/{repo}/releases/latest`
    pub fn latest_release_url(&self) -> String {
        format!("{}/repos/{}/releases/latest", self.urls.api_url, self.repo)
    }
}

/// Where an update run currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePhase {
    Idle,
    CheckingVersion,
    UpToDate,
    Downloading,
    Verifying,
    Installing,
    Done,
    Failed,
}

impl fmt::Display for UpdatePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::CheckingVersion => "checking version",
            Self::UpToDate => "up to date",
            Self::Downloading => "downloading",
            Self::Verifying => "verifying",
            Self::Installing => "installing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The newest published release and the archive chosen for this platform
#[derive(Debug, Clone)]
pub struct LatestRelease {
    pub version: Version,
    pub asset_name: String,
    pub download_url: String,
}

/// Result of comparing the local install against the latest release
#[derive(Debug, Clone)]
pub struct UpdateCheck {
    pub current: Version,
    pub latest: LatestRelease,
}

impl UpdateCheck {
    pub fn update_available(&self) -> bool {
        self.latest.version > self.current
    }
}

/// What [`Updater::check_and_update`] did
#[derive(Debug, Clone)]
pub enum UpdateOutcome {
    UpToDate {
        version: Version,
    },
    Updated {
        from: Version,
        to: Version,
        checksum: String,
        binary_path: PathBuf,
    },
}

/// Verified binary bytes pulled from a release archive
#[derive(Debug, Clone)]
pub struct ArchiveContents {
    /// Lowercase hex digest of `binary`, matching the archive's checksum entry
    pub checksum: String,
    pub binary: Vec<u8>,
}

/// Checks for, downloads and installs new releases of the managed binary
pub struct Updater<S: ReleaseSource = GitHubReleaseClient> {
    config: UpdaterConfig,
    current: Version,
    root: PathBuf,
    platform: Platform,
    layout: InstallLayout,
    source: S,
    downloader: Downloader,
    observer: Option<Arc<dyn ProgressObserver>>,
    phase: UpdatePhase,
}

impl Updater<GitHubReleaseClient> {
    /// Create an updater for an install at `root` currently at `current_version`
    pub fn new(config: UpdaterConfig, root: impl Into<PathBuf>, current_version: &str) -> Result<Self> {
        let current = Version::parse(current_version).op("parse current version")?;
        let source = GitHubReleaseClient::new(
            config.user_agent.clone(),
            config.api_timeout,
            config.max_response_bytes,
        )
        .op("create release client")?;
        let downloader = Downloader::new(config.user_agent.clone(), config.download_timeout)?;
        let root = root.into();
        let platform = Platform::current();
        let layout = InstallLayout::for_platform(&root, &config.binary_prefix, &platform);

        Ok(Self {
            config,
            current,
            root,
            platform,
            layout,
            source,
            downloader,
            observer: None,
            phase: UpdatePhase::Idle,
        })
    }

    /// Like [`Updater::new`], taking the current version from the install
    /// record and falling back to `default_version` when it is unreadable
    pub fn with_local_version(
        config: UpdaterConfig,
        root: impl Into<PathBuf>,
        default_version: &str,
    ) -> Result<Self> {
        let root = root.into();
        let version = read_local_version(&root).unwrap_or_else(|| default_version.to_string());
        debug!(version = %version, root = %root.display(), "resolved local version");
        Self::new(config, root, &version)
    }
}

impl<S: ReleaseSource> Updater<S> {
    /// Replace the release metadata source
    pub fn with_source<T: ReleaseSource>(self, source: T) -> Updater<T> {
        Updater {
            config: self.config,
            current: self.current,
            root: self.root,
            platform: self.platform,
            layout: self.layout,
            source,
            downloader: self.downloader,
            observer: self.observer,
            phase: self.phase,
        }
    }

    /// Target a specific platform instead of the running one
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.layout = InstallLayout::for_platform(&self.root, &self.config.binary_prefix, &platform);
        self.platform = platform;
        self
    }

    /// Report download and extraction progress to `observer`
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.downloader = self.downloader.with_observer(observer.clone());
        self.observer = Some(observer);
        self
    }

    pub fn current_version(&self) -> &Version {
        &self.current
    }

    pub fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    pub fn binary_path(&self) -> PathBuf {
        self.layout.binary_path()
    }

    pub fn phase(&self) -> UpdatePhase {
        self.phase
    }

    /// Latest-release endpoint in use
    pub fn api_url(&self) -> String {
        self.config.latest_release_url()
    }

    /// Fetch the latest release and pick the archive for this platform
    pub async fn latest(&self) -> Result<LatestRelease> {
        let api_url = self.api_url();
        debug!(
            api_url = %api_url,
            current_version = %self.current,
            "fetching latest release"
        );

        let release = self
            .source
            .latest_release(&api_url)
            .await
            .op("fetch latest release")?;

        let version = Version::parse(&release.tag_name).op("parse latest version")?;

        let resolver = AssetResolver::new(&self.config.binary_prefix);
        let asset = resolver
            .resolve(&release, &self.platform)
            .op("resolve release asset")?;
        debug!(asset = %asset.name, url = %asset.browser_download_url, "found matching asset");

        let mut download_url = asset.browser_download_url.clone();
        if let Some(mirror) = &self.config.urls.fastest_mirror {
            match convert_release_url_to_mirror(&download_url, mirror) {
                Ok(converted) if converted != download_url => {
                    info!(original = %download_url, mirror = %converted, "using mirror for download");
                    download_url = converted;
                }
                Ok(_) => debug!(mirror = %mirror, "mirror does not serve release files"),
                Err(e) => debug!(url = %download_url, error = %e, "could not convert to mirror URL"),
            }
        }

        url::Url::parse(&download_url).map_err(|e| {
            UpdateError::InvalidUrl {
                url: download_url.clone(),
                reason: e.to_string(),
            }
            .context("validate download url")
        })?;

        Ok(LatestRelease {
            version,
            asset_name: asset.name.clone(),
            download_url,
        })
    }

    /// Compare the local version with the latest release
    pub async fn check(&self) -> Result<UpdateCheck> {
        let latest = self.latest().await?;
        Ok(UpdateCheck {
            current: self.current.clone(),
            latest,
        })
    }

    /// Install the latest release when it is newer than the local version
    pub async fn check_and_update(&mut self) -> Result<UpdateOutcome> {
        info!(current_version = %self.current, "starting update check");
        self.phase = UpdatePhase::CheckingVersion;

        let result = self.run().await;
        if let Err(e) = &result {
            warn!(phase = %self.phase, error = %e, "update failed");
            self.phase = UpdatePhase::Failed;
        }
        result
    }

    async fn run(&mut self) -> Result<UpdateOutcome> {
        let check = self.check().await?;
        if !check.update_available() {
            info!(version = %self.current, "current version is already the latest");
            self.phase = UpdatePhase::UpToDate;
            return Ok(UpdateOutcome::UpToDate {
                version: self.current.clone(),
            });
        }

        let latest = check.latest;
        info!(latest_version = %latest.version, "update available");

        let temp_dir = tempfile::Builder::new()
            .prefix("aqua-speed-update")
            .tempdir()
            .op("create temporary directory")?;

        self.phase = UpdatePhase::Downloading;
        let archive_path = temp_dir.path().join(&latest.asset_name);
        self.downloader
            .download_to(&latest.download_url, &archive_path)
            .await
            .op("download file")?;

        self.phase = UpdatePhase::Verifying;
        let matcher = BinaryMatcher::new(self.layout.binary_name(), &self.platform);
        let contents = read_archive_contents(&archive_path, &matcher, &self.archive_options())
            .op("read archive contents")?;

        self.phase = UpdatePhase::Installing;
        let binary_path = self.install(&latest.version, &contents.binary, &contents.checksum)?;

        let from = std::mem::replace(&mut self.current, latest.version.clone());
        self.phase = UpdatePhase::Done;
        info!(new_version = %latest.version, "update completed successfully");

        Ok(UpdateOutcome::Updated {
            from,
            to: latest.version,
            checksum: contents.checksum,
            binary_path,
        })
    }

    fn install(&self, version: &Version, binary: &[u8], checksum: &str) -> Result<PathBuf> {
        let _lock = self.layout.lock().op("acquire install lock")?;

        let path = self.layout.install_binary(binary).op("save binary file")?;

        let record = InstallRecord::new(version.to_string(), checksum);
        if let Err(e) = self.layout.write_record(&record) {
            self.layout.remove_binary();
            return Err(e.context("save version information"));
        }

        Ok(path)
    }

    fn archive_options(&self) -> ArchiveOptions {
        let options = ArchiveOptions::default()
            .with_dict_capacity(self.config.dict_capacity)
            .with_max_entry_bytes(self.config.max_entry_bytes);
        match &self.observer {
            Some(observer) => options.with_observer(observer.clone()),
            None => options,
        }
    }
}

/// First whitespace token of `{root}/version.txt`
fn read_local_version(root: &Path) -> Option<String> {
    let content = std::fs::read_to_string(root.join("version.txt")).ok()?;
    InstallRecord::parse(&content).map(|r| r.version)
}

/// Scan an archive for the checksum entry and the target binary, then
/// verify the binary against it.
///
/// An entry ending in `checksum.txt` is always treated as the checksum,
/// even if its name would also match the binary. Scanning stops once both
/// have been found. Entry bodies larger than `options.max_entry_bytes` are
/// rejected whatever size their header declares.
pub fn read_archive_contents(
    path: &Path,
    matcher: &BinaryMatcher,
    options: &ArchiveOptions,
) -> Result<ArchiveContents> {
    let mut reader = ArchiveReader::open(path, options)?;

    let mut expected: Option<String> = None;
    let mut binary: Option<Vec<u8>> = None;

    {
        let mut entries = reader.entries()?;
        while let Some(mut entry) = entries.next_entry()? {
            debug!(entry = %entry.name(), declared_size = entry.size(), "scanning archive entry");

            if is_checksum_entry(entry.name()) {
                let data = entry
                    .read_limited(options.max_entry_bytes)
                    .op("read checksum file")?;
                let content = String::from_utf8_lossy(&data);
                let value = checksum::parse_checksum_file(&content).unwrap_or_default();
                debug!(checksum = %value, "found checksum file");
                expected = Some(value.to_string());
            } else if matcher.is_target(entry.name()) {
                let data = entry
                    .read_limited(options.max_entry_bytes)
                    .op("read binary file")?;
                debug!(size = data.len(), "found binary file");
                binary = Some(data);
            }

            if expected.is_some() && binary.is_some() {
                break;
            }
        }
    }
    reader.close();

    let binary = binary.ok_or(UpdateError::NoExecutableFound)?;
    let expected = expected.ok_or(UpdateError::ChecksumFileMissing)?;
    let checksum = checksum::verify(&binary, &expected).op("verify checksum")?;

    Ok(ArchiveContents { checksum, binary })
}
