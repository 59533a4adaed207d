//! Short-video media resolver

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

use crate::application::errors::{BotError, MediaError};
use crate::domain::traits::MediaResolver;

/// Default resolver endpoint
pub const DEFAULT_RESOLVER_URL: &str = "https://api.snaptik.link/api/tiktok";

/// Resolver response envelope: `{status, data: {video: {url}}}`
#[derive(Debug, Deserialize)]
struct ResolveResponse {
    status: Option<String>,
    data: Option<ResolveData>,
}

#[derive(Debug, Deserialize)]
struct ResolveData {
    video: Option<ResolveVideo>,
}

#[derive(Debug, Deserialize)]
struct ResolveVideo {
    url: Option<String>,
}

impl ResolveResponse {
    fn into_media_url(self) -> Result<String, MediaError> {
        let status = self.status.unwrap_or_default();
        if status != "ok" {
            return Err(MediaError::ResolutionFailed(format!("status {:?}", status)));
        }
        self.data
            .and_then(|d| d.video)
            .and_then(|v| v.url)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| MediaError::ResolutionFailed("response has no video url".to_string()))
    }
}

/// HTTP media resolver with an explicit request timeout
pub struct HttpMediaResolver {
    client: Client,
    endpoint: String,
}

impl HttpMediaResolver {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, BotError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn request_url(&self, source_url: &str) -> Result<Url, MediaError> {
        Url::parse_with_params(&self.endpoint, &[("url", source_url)])
            .map_err(|e| MediaError::Transport(format!("invalid resolver endpoint: {}", e)))
    }
}

#[async_trait]
impl MediaResolver for HttpMediaResolver {
    async fn resolve(&self, source_url: &str) -> Result<String, MediaError> {
        let url = self.request_url(source_url)?;
        tracing::debug!("Resolving media via {}", self.endpoint);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MediaError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MediaError::Transport(format!("resolver returned {}", response.status())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| MediaError::Transport(e.to_string()))?;

        let parsed: ResolveResponse = serde_json::from_str(&body)
            .map_err(|e| MediaError::ResolutionFailed(format!("malformed response: {}", e)))?;

        parsed.into_media_url()
    }
}
