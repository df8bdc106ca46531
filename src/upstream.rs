// 🌐 Upstream Client - forwards queries to the transparency registry

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, ORIGIN, REFERER};
use std::time::Duration;

const REGISTRY_ORIGIN: &str = "https://tematicos.plataformadetransparencia.org.mx";
const REGISTRY_REFERER: &str = "https://tematicos.plataformadetransparencia.org.mx/";

/// Raw upstream answer; interpreted later by `payload::process_upstream`
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    target_url: String,
}

impl UpstreamClient {
    pub fn new(target_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(registry_headers())
            .build()
            .context("Failed to build upstream HTTP client")?;

        Ok(UpstreamClient {
            client,
            target_url: target_url.to_string(),
        })
    }

    /// POST the query body upstream and collect status, content type and text
    pub async fn post_query(&self, body: &serde_json::Value) -> Result<UpstreamResponse> {
        let resp = self
            .client
            .post(&self.target_url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Upstream request to {} failed", self.target_url))?;

        let status = resp.status();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/json")
            .to_string();
        let body = resp.text().await.context("Failed to read upstream body")?;

        if status.is_success() {
            log::info!("✅ Upstream accepted query - status {}", status);
        } else {
            log::warn!("❌ Upstream rejected query - status {}", status);
        }

        Ok(UpstreamResponse {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

fn registry_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ORIGIN, HeaderValue::from_static(REGISTRY_ORIGIN));
    headers.insert(REFERER, HeaderValue::from_static(REGISTRY_REFERER));
    headers
}
