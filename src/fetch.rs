use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Fetches raw page markup from third-party sites. Failure or timeout is an
/// absent result, not an error; callers skip the row and move on.
#[async_trait]
pub trait MarkupFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Option<String>;
}

pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl MarkupFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Option<String> {
        debug!(%url, "fetching page markup");
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(%url, error = %e, "page fetch failed");
                return None;
            }
        };
        if !response.status().is_success() {
            warn!(%url, status = %response.status(), "page fetch returned non-success status");
            return None;
        }
        match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(%url, error = %e, "failed to read page body");
                None
            }
        }
    }
}
