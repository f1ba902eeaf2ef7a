//! HTTP transport used by the discovery client.
//!
//! The [`HttpFetch`] trait is the seam between resolution logic and the
//! network. A failed request is not an error at this layer: connection
//! failures, non-2xx statuses and empty bodies all come back as `None`, and
//! the client decides whether that means "fall back" or "give up".
//!
//! # Implementations
//!
//! | Type | When to use |
//! |------|-------------|
//! | [`ReqwestFetcher`] | Real HTTP(S) over a pooled `reqwest::Client` |
//! | test doubles | Scripted responses keyed by URL |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::{debug, warn};

use crate::config::DiscoveryConfig;
use crate::error::DiscoveryError;

/// Retrieves a document body over HTTP.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// `GET url` with the given `Accept` header.
    ///
    /// Returns the body on a 2xx response with a non-empty body, `None`
    /// otherwise.
    async fn fetch(&self, url: &str, accept: &str) -> Option<Vec<u8>>;
}

/// [`HttpFetch`] over `reqwest`. Redirects are followed.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    /// Wrap a pre-configured client (e.g. with custom TLS or proxy settings).
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client with the configured timeout and `User-Agent`.
    pub fn from_config(config: &DiscoveryConfig) -> Result<Self, DiscoveryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn fetch(&self, url: &str, accept: &str) -> Option<Vec<u8>> {
        debug!("discovery: GET {url}");
        let response = match self
            .client
            .get(url)
            .header(header::ACCEPT, accept)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("discovery: GET {url} failed: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!("discovery: GET {url} returned {}", response.status());
            return None;
        }

        match response.bytes().await {
            Ok(body) if body.is_empty() => {
                debug!("discovery: GET {url} returned an empty body");
                None
            }
            Ok(body) => Some(body.to_vec()),
            Err(e) => {
                warn!("discovery: reading body of {url} failed: {e}");
                None
            }
        }
    }
}
