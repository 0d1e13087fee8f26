//! Wiremock helpers for the releases API and asset downloads

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::builders::release_json;
use super::constants::*;

/// Download URL served by [`mock_asset_download`]
pub fn asset_url(server: &MockServer, name: &str) -> String {
    format!("{}/download/{}", server.uri(), name)
}

/// Serve a latest release at `tag` whose assets download from this server
pub async fn mock_latest_release(server: &MockServer, tag: &str, asset_names: &[&str]) {
    let assets: Vec<(&str, String)> = asset_names
        .iter()
        .map(|name| (*name, asset_url(server, name)))
        .collect();

    Mock::given(method("GET"))
        .and(path(LATEST_RELEASE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(release_json(tag, &assets)))
        .mount(server)
        .await;
}

/// Serve `content` at `/download/{name}`
pub async fn mock_asset_download(server: &MockServer, name: &str, content: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(format!("/download/{}", name)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content))
        .mount(server)
        .await;
}

/// Fail any download of `name` with `status`
pub async fn mock_failing_download(server: &MockServer, name: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/download/{}", name)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
