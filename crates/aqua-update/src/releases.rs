//! Release metadata from the GitHub releases API

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Bytes of an error response body kept for diagnostics
const ERROR_BODY_LIMIT: usize = 1024;

/// Release information
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Release tag (e.g., "v1.2.0")
    pub tag_name: String,

    /// Release name
    #[serde(default)]
    pub name: Option<String>,

    /// Release assets
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// Release asset
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    /// Asset name
    pub name: String,

    /// Download URL
    pub browser_download_url: String,

    /// Asset size in bytes
    #[serde(default)]
    pub size: u64,
}

/// Failures talking to the release API
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("rate limit exceeded, reset at: {}", reset.as_deref().unwrap_or("unknown"))]
    RateLimited { reset: Option<String> },

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response exceeds {limit} bytes")]
    ResponseTooLarge { limit: u64 },

    #[error("failed to decode release response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Source of latest-release descriptions
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    async fn latest_release(&self, api_url: &str) -> Result<Release, ReleaseError>;
}

/// HTTP client for GitHub release metadata and raw content
#[derive(Debug, Clone)]
pub struct GitHubReleaseClient {
    client: reqwest::Client,
    user_agent: String,
    max_response_bytes: u64,
}

impl GitHubReleaseClient {
    pub fn new(
        user_agent: impl Into<String>,
        timeout: Duration,
        max_response_bytes: u64,
    ) -> Result<Self, ReleaseError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            user_agent: user_agent.into(),
            max_response_bytes,
        })
    }

    /// Fetch a raw file, bounded by the response size cap
    pub async fn get_raw_content(&self, url: &str) -> Result<Vec<u8>, ReleaseError> {
        debug!(url = %url, "fetching raw content");
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(status_error(response).await);
        }

        read_capped(response, self.max_response_bytes).await
    }
}

#[async_trait]
impl ReleaseSource for GitHubReleaseClient {
    async fn latest_release(&self, api_url: &str) -> Result<Release, ReleaseError> {
        debug!(api_url = %api_url, "fetching latest release");
        let response = self
            .client
            .get(api_url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await?;

        if response.status() == StatusCode::FORBIDDEN {
            let reset = response
                .headers()
                .get("X-RateLimit-Reset")
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            return Err(ReleaseError::RateLimited { reset });
        }

        if response.status() != StatusCode::OK {
            return Err(status_error(response).await);
        }

        let body = read_capped(response, self.max_response_bytes).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Build a status error carrying the first KiB of the body
async fn status_error(mut response: Response) -> ReleaseError {
    let status = response.status().as_u16();
    let mut body = Vec::new();

    while body.len() < ERROR_BODY_LIMIT {
        match response.chunk().await {
            Ok(Some(chunk)) => body.extend_from_slice(&chunk),
            _ => break,
        }
    }
    body.truncate(ERROR_BODY_LIMIT);

    ReleaseError::Status {
        status,
        body: String::from_utf8_lossy(&body).into_owned(),
    }
}

async fn read_capped(mut response: Response, limit: u64) -> Result<Vec<u8>, ReleaseError> {
    if response.content_length().is_some_and(|len| len > limit) {
        return Err(ReleaseError::ResponseTooLarge { limit });
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() as u64 + chunk.len() as u64 > limit {
            return Err(ReleaseError::ResponseTooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
