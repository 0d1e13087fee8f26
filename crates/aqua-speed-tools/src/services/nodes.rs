//! Remote node catalogue

use anyhow::{Context, Result};
use aqua_core::NodeList;
use aqua_update::mirror::is_jsdelivr;
use aqua_update::{GitHubReleaseClient, GitHubUrls};
use tracing::{debug, info};

const CATALOG_PATH: &str = "presets/config.json";
const CATALOG_BRANCH: &str = "main";

/// Fetches `presets/config.json` from the tools repository
pub struct NodeCatalog {
    client: GitHubReleaseClient,
    urls: GitHubUrls,
    repo: String,
}

impl NodeCatalog {
    pub fn new(client: GitHubReleaseClient, urls: GitHubUrls, repo: &str) -> Self {
        Self {
            client,
            urls,
            repo: repo.trim_matches('/').to_string(),
        }
    }

    /// jsDelivr form `{base}/{owner}/{repo}@main/{path}` when the raw base is
    /// a jsDelivr mirror, otherwise `{base}/{owner}/{repo}/main/{path}`
    pub fn catalog_url(&self) -> String {
        if is_jsdelivr(&self.urls.raw_base_url) {
            format!(
                "{}/{}@{}/{}",
                self.urls.raw_base_url, self.repo, CATALOG_BRANCH, CATALOG_PATH
            )
        } else {
            let (owner, name) = self.repo.split_once('/').unwrap_or((self.repo.as_str(), ""));
            self.urls
                .build_raw_url(owner, name, CATALOG_BRANCH, CATALOG_PATH)
        }
    }

    /// Download, parse and validate the catalogue
    pub async fn fetch(&self) -> Result<NodeList> {
        let url = self.catalog_url();
        debug!(url = %url, "fetching node catalogue");

        let body = self
            .client
            .get_raw_content(&url)
            .await
            .with_context(|| format!("Failed to fetch node list from {}", url))?;

        let nodes = NodeList::from_json(&body).context("Invalid node list")?;
        info!(count = nodes.len(), "loaded nodes");
        Ok(nodes)
    }
}
