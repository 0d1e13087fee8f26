//! GitHub endpoint selection and mirror URL rewriting

use url::Url;

const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com";
const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Raw content and API bases in effect for this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubUrls {
    pub raw_base_url: String,
    pub api_url: String,
    /// Mirror used for release downloads, when one was selected
    pub fastest_mirror: Option<String>,
}

impl Default for GitHubUrls {
    fn default() -> Self {
        Self {
            raw_base_url: DEFAULT_RAW_BASE.to_string(),
            api_url: DEFAULT_API_BASE.to_string(),
            fastest_mirror: None,
        }
    }
}

impl GitHubUrls {
    /// Start from explicit raw and API bases
    pub fn new(raw_base_url: &str, api_url: &str) -> Self {
        Self {
            raw_base_url: normalize_url(raw_base_url),
            api_url: normalize_url(api_url),
            fastest_mirror: None,
        }
    }

    /// Use `mirror` for both raw content and release downloads
    pub fn with_mirror(mut self, mirror: &str) -> Self {
        let mirror = normalize_url(mirror);
        self.raw_base_url = mirror.clone();
        self.fastest_mirror = Some(mirror);
        self
    }

    /// Override the API base
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = normalize_url(api_url);
        self
    }

    /// `{raw}/{owner}/{repo}/{branch}/{path}`, skipping empty parts
    pub fn build_raw_url(&self, owner: &str, repo: &str, branch: &str, path: &str) -> String {
        std::iter::once(self.raw_base_url.as_str())
            .chain([owner, repo, branch, path].into_iter().filter(|p| !p.is_empty()))
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Strip trailing slashes
pub fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// True for mirrors serving jsDelivr's `gh/{owner}/{repo}@{ref}/{path}` scheme
pub fn is_jsdelivr(mirror: &str) -> bool {
    mirror.contains("jsdelivr.net")
}

/// Rewrite a GitHub release download URL to go through a jsDelivr mirror.
///
/// Only `https://github.com/{owner}/{repo}/releases/download/{tag}/{file}`
/// URLs are rewritten, to `{mirror}/{owner}/{repo}@{tag}/{file}`. Anything
/// else, including every non-jsDelivr mirror, comes back unchanged.
pub fn convert_release_url_to_mirror(
    release_url: &str,
    mirror: &str,
) -> Result<String, url::ParseError> {
    let parsed = Url::parse(release_url)?;
    if parsed.host_str() != Some("github.com") {
        return Ok(release_url.to_string());
    }

    let parts: Vec<&str> = parsed.path().trim_matches('/').split('/').collect();
    if parts.len() < 6 || parts[2] != "releases" || parts[3] != "download" {
        return Ok(release_url.to_string());
    }

    if !is_jsdelivr(mirror) {
        return Ok(release_url.to_string());
    }

    let (owner, repo, tag) = (parts[0], parts[1], parts[4]);
    let file = parts[5..].join("/");
    Ok(format!(
        "{}/{}/{}@{}/{}",
        normalize_url(mirror),
        owner,
        repo,
        tag,
        file
    ))
}
