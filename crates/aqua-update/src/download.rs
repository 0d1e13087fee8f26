//! Streaming archive download with progress reporting

use crate::archive::ProgressObserver;
use crate::error::{Result, UpdateError};
use futures::StreamExt;
use reqwest::header::USER_AGENT;
use reqwest::StatusCode;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Downloads release archives to local files
#[derive(Clone)]
pub struct Downloader {
    client: reqwest::Client,
    user_agent: String,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl Downloader {
    pub fn new(user_agent: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpdateError::download_failed("", e))?;

        Ok(Self {
            client,
            user_agent: user_agent.into(),
            observer: None,
        })
    }

    /// Report transfer progress to `observer`
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Stream `url` into `dest`, returning the number of bytes written.
    ///
    /// Anything other than `200 OK` is a failure.
    pub async fn download_to(&self, url: &str, dest: &Path) -> Result<u64> {
        info!(url = %url, "downloading update");

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| UpdateError::download_failed(url, e))?;

        if response.status() != StatusCode::OK {
            return Err(UpdateError::download_failed(
                url,
                format!("failed with status: {}", response.status()),
            ));
        }

        let total = response.content_length().unwrap_or(0);
        let name = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| url.to_string());

        if let Some(observer) = &self.observer {
            observer.on_start(&name, total);
        }

        let result = self.stream_body(response, url, dest, &name, total).await;

        if let Some(observer) = &self.observer {
            observer.on_finish(&name);
        }

        let written = result?;
        debug!(
            url = %url,
            bytes = written,
            size = %human_readable_size(written),
            "download complete"
        );
        Ok(written)
    }

    async fn stream_body(
        &self,
        response: reqwest::Response,
        url: &str,
        dest: &Path,
        name: &str,
        total: u64,
    ) -> Result<u64> {
        let mut file = File::create(dest)?;
        let mut written = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk: bytes::Bytes = chunk.map_err(|e| UpdateError::download_failed(url, e))?;
            file.write_all(&chunk)?;
            written += chunk.len() as u64;

            if let Some(observer) = &self.observer {
                observer.on_progress(name, written, total);
            }
        }

        file.sync_all()?;
        Ok(written)
    }
}

/// Convert bytes to human-readable size
pub fn human_readable_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}
