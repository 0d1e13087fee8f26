//! Startup wiring shared by every command
//!
//! Resolves configuration, picks GitHub endpoints, and builds the updater
//! and node catalogue from them.

use anyhow::{Context, Result};
use aqua_core::types::DohEndpoint;
use aqua_core::{ConfigLoader, NodeList, ToolsConfig};
use aqua_update::mirror::{is_jsdelivr, normalize_url};
use aqua_update::{
    GitHubReleaseClient, GitHubUrls, ProgressBarObserver, UpdateOutcome, Updater, UpdaterConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cli::Cli;
use crate::output;
use crate::services::mirror_probe::MirrorProber;
use crate::services::nodes::NodeCatalog;

/// Timeout and retry count used for a DoH endpoint given on the command line
const CLI_DOH_TIMEOUT_SECS: u64 = 10;
const CLI_DOH_RETRIES: u32 = 3;

/// Resolved runtime state for one invocation
pub struct App {
    pub config: ToolsConfig,
    pub urls: GitHubUrls,
    pub install_dir: PathBuf,
    quiet: bool,
}

impl App {
    /// Load configuration, apply command-line overrides and pick endpoints
    pub async fn bootstrap(cli: &Cli) -> Result<Self> {
        let config = load_config(cli)?;
        output::set_color(config.display.color_enabled);

        if let Some(doh) = config.dns_over_https.first() {
            // Name resolution still goes through the system resolver
            debug!(endpoint = %doh.endpoint, "DNS-over-HTTPS endpoint configured");
        }

        let fastest = match &cli.github_raw_magic_url {
            Some(_) => None,
            None => {
                let prober = MirrorProber::new(
                    &config.network.user_agent,
                    Duration::from_secs(config.network.probe_timeout_secs),
                    &config.github.speed_repo,
                )?;
                prober.find_fastest(&config.mirrors.raw_jsdelivr_set).await
            }
        };

        let urls = resolve_urls(&config, cli.github_raw_magic_url.as_deref(), fastest.as_deref());
        info!(raw = %urls.raw_base_url, api = %urls.api_url, "using GitHub endpoints");

        let install_dir = install_dir(&config)?;

        Ok(Self {
            config,
            urls,
            install_dir,
            quiet: cli.quiet,
        })
    }

    /// Updater for the managed binary, seeded from the local install record
    pub fn updater(&self) -> Result<Updater> {
        let mut config = UpdaterConfig::from_tools_config(&self.config);
        config.urls = self.urls.clone();

        let updater = Updater::with_local_version(
            config,
            &self.install_dir,
            &self.config.install.default_version,
        )
        .context("Failed to create updater")?;

        if self.quiet {
            return Ok(updater);
        }
        Ok(updater.with_observer(Arc::new(ProgressBarObserver::new("Fetching"))))
    }

    /// Bring the binary up to date, returning its path.
    ///
    /// A failed update is only fatal when no binary is installed yet.
    pub async fn ensure_binary(&self) -> Result<PathBuf> {
        let mut updater = self.updater()?;
        let path = updater.binary_path();

        match updater.check_and_update().await {
            Ok(UpdateOutcome::Updated { to, .. }) => {
                output::success(&format!("aqua-speed updated to {}", to));
            }
            Ok(UpdateOutcome::UpToDate { version }) => {
                debug!(version = %version, "aqua-speed is up to date");
            }
            Err(e) if path.is_file() => {
                warn!(error = %e, "update failed, continuing with the installed binary");
                for op in e.operations() {
                    debug!(operation = op, "update step");
                }
            }
            Err(e) => return Err(e).context("Failed to install aqua-speed"),
        }

        Ok(path)
    }

    /// Fetch and validate the node catalogue
    pub async fn load_nodes(&self) -> Result<NodeList> {
        let client = GitHubReleaseClient::new(
            self.config.network.user_agent.clone(),
            Duration::from_secs(self.config.network.api_timeout_secs),
            self.config.network.max_response_bytes,
        )?;
        let catalog = NodeCatalog::new(client, self.urls.clone(), &self.config.github.tools_repo);

        let spinner = (!self.quiet).then(|| output::spinner("Loading node list..."));
        let result = catalog.fetch().await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        result
    }
}

/// Configuration with `--config`, `--github-api-magic-url` and
/// `--doh-endpoint` applied
pub fn load_config(cli: &Cli) -> Result<ToolsConfig> {
    let loader = ConfigLoader::new().context("Failed to locate config directory")?;
    let mut config = loader
        .load_with_override(cli.config.as_deref())
        .context("Failed to load configuration")?;

    apply_cli_overrides(&mut config, cli);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn apply_cli_overrides(config: &mut ToolsConfig, cli: &Cli) {
    if let Some(api) = &cli.github_api_magic_url {
        config.github.api_magic_url = Some(api.clone());
    }

    if let Some(endpoint) = &cli.doh_endpoint {
        config.dns_over_https.insert(
            0,
            DohEndpoint {
                endpoint: endpoint.clone(),
                timeout_secs: CLI_DOH_TIMEOUT_SECS,
                retries: CLI_DOH_RETRIES,
            },
        );
    }
}

/// Endpoint selection: a raw magic URL wins outright, otherwise the fastest
/// probed mirror, otherwise the configured raw base
pub fn resolve_urls(
    config: &ToolsConfig,
    raw_magic: Option<&str>,
    fastest: Option<&str>,
) -> GitHubUrls {
    let urls = GitHubUrls::new(&config.github.raw_url, config.github.effective_api_url());

    match (raw_magic, fastest) {
        (Some(raw), _) => {
            let mut urls = urls;
            urls.raw_base_url = normalize_url(raw);
            if is_jsdelivr(raw) {
                urls.fastest_mirror = Some(urls.raw_base_url.clone());
            }
            urls
        }
        (None, Some(mirror)) => urls.with_mirror(mirror),
        (None, None) => urls,
    }
}

/// Install root from config, or the platform default
pub fn install_dir(config: &ToolsConfig) -> Result<PathBuf> {
    match &config.install.dir {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => aqua_core::utils::install_dir().context("Failed to resolve install directory"),
    }
}
