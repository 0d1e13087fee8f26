//! Mirror latency probing

use anyhow::Result;
use aqua_update::mirror::normalize_url;
use futures::future::join_all;
use reqwest::header::USER_AGENT;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Picks the mirror answering fastest
pub struct MirrorProber {
    client: reqwest::Client,
    user_agent: String,
    repo: String,
}

impl MirrorProber {
    /// `repo` is the owner/name whose README each mirror is asked for
    pub fn new(user_agent: &str, timeout: Duration, repo: &str) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
            repo: repo.trim_matches('/').to_string(),
        })
    }

    /// URL requested from `mirror` to measure latency
    pub fn probe_url(&self, mirror: &str) -> String {
        format!("{}/{}@main/README.md", normalize_url(mirror), self.repo)
    }

    /// Probe every mirror concurrently; the lowest latency among those that
    /// answered wins. `None` when none answered.
    pub async fn find_fastest(&self, mirrors: &[String]) -> Option<String> {
        if mirrors.is_empty() {
            return None;
        }

        let results = join_all(mirrors.iter().map(|m| self.probe(m))).await;

        let fastest = mirrors
            .iter()
            .zip(results)
            .filter_map(|(mirror, latency)| latency.map(|l| (mirror, l)))
            .min_by_key(|(_, latency)| *latency);

        match fastest {
            Some((mirror, latency)) => {
                info!(
                    mirror = %mirror,
                    latency_ms = latency.as_millis() as u64,
                    "selected fastest mirror"
                );
                Some(mirror.clone())
            }
            None => {
                debug!("no mirror reachable");
                None
            }
        }
    }

    /// Round-trip time of one HEAD request. Any HTTP response counts.
    async fn probe(&self, mirror: &str) -> Option<Duration> {
        let url = self.probe_url(mirror);
        let start = Instant::now();

        match self
            .client
            .head(&url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
        {
            Ok(response) => {
                let latency = start.elapsed();
                debug!(
                    mirror = %mirror,
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis() as u64,
                    "mirror probed"
                );
                Some(latency)
            }
            Err(e) => {
                debug!(mirror = %mirror, error = %e, "mirror unreachable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const REPO: &str = "alice39s/aqua-speed";

    fn prober(timeout_ms: u64) -> MirrorProber {
        MirrorProber::new("aqua-test", Duration::from_millis(timeout_ms), REPO).unwrap()
    }

    #[test]
    fn test_probe_url() {
        let prober = prober(1000);
        assert_eq!(
            prober.probe_url("https://cdn.jsdelivr.net/gh/"),
            "https://cdn.jsdelivr.net/gh/alice39s/aqua-speed@main/README.md"
        );
    }

    #[tokio::test]
    async fn test_empty_mirror_list() {
        assert!(prober(1000).find_fastest(&[]).await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_mirror_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/gh/alice39s/aqua-speed@main/README.md"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let reachable = format!("{}/gh", server.uri());
        let mirrors = vec!["http://127.0.0.1:1/gh".to_string(), reachable.clone()];

        assert_eq!(prober(2000).find_fastest(&mirrors).await, Some(reachable));
    }

    #[tokio::test]
    async fn test_timed_out_mirror_loses() {
        let slow = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&slow)
            .await;

        let fast = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&fast)
            .await;

        let mirrors = vec![slow.uri(), fast.uri()];
        assert_eq!(prober(500).find_fastest(&mirrors).await, Some(fast.uri()));
    }

    #[tokio::test]
    async fn test_nothing_reachable() {
        let mirrors = vec!["http://127.0.0.1:1".to_string()];
        assert!(prober(500).find_fastest(&mirrors).await.is_none());
    }
}
