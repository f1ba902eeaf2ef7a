//! WebFinger resolution with host-meta lookup and caching.
//!
//! Resolving a resource runs two sequential steps:
//!
//! 1. Fetch the resource host's host-meta (`https`, then `http`) and expand
//!    its XRD LRDD template with the encoded resource.
//! 2. If the host has no host-meta, use
//!    `https://{host}/.well-known/webfinger?resource=…` instead.
//!
//! The discovered URL is fetched as XRD and parsed into a [`WebFinger`].
//!
//! # Caching
//!
//! - WebFinger results are cached per exact resource string, successes only.
//! - Host-meta results are cached per host, *including* "no host-meta"
//!   (negative caching), so a host without one is probed once per client.
//!
//! Entries never expire; create a new client to start afresh.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};
use xrd::{HostMeta, HostMetaExt, WebFinger, XrdError, XRD_CONTENT_TYPE};

use crate::address::{expand_lrdd, extract_host, host_meta_url, webfinger_url};
use crate::config::DiscoveryConfig;
use crate::error::DiscoveryError;
use crate::fetch::{HttpFetch, ReqwestFetcher};

// ---------------------------------------------------------------------------
// DiscoveryClient
// ---------------------------------------------------------------------------

/// Resolves resource URIs to WebFinger documents.
///
/// Cheap to share: wrap it in an [`Arc`] and call it from many tasks. Two
/// concurrent first lookups of the same key may both hit the network; the
/// cache keeps whichever finishes last.
pub struct DiscoveryClient {
    fetcher: Arc<dyn HttpFetch>,
    host_meta_cache: RwLock<HashMap<String, Option<Arc<HostMeta>>>>,
    webfinger_cache: RwLock<HashMap<String, Arc<WebFinger>>>,
}

impl DiscoveryClient {
    pub fn new(fetcher: Arc<dyn HttpFetch>) -> Self {
        Self {
            fetcher,
            host_meta_cache: RwLock::new(HashMap::new()),
            webfinger_cache: RwLock::new(HashMap::new()),
        }
    }

    /// A client over [`ReqwestFetcher`] built from `config`.
    pub fn from_config(config: &DiscoveryConfig) -> Result<Self, DiscoveryError> {
        Ok(Self::new(Arc::new(ReqwestFetcher::from_config(config)?)))
    }

    /// Resolve `resource`, serving repeated requests from the cache.
    ///
    /// # Errors
    /// - [`DiscoveryError::EmptyResource`] / [`DiscoveryError::EmptyHost`]
    ///   before any network access.
    /// - [`DiscoveryError::FetchFailed`] if the WebFinger document cannot be
    ///   retrieved.
    /// - [`DiscoveryError::Descriptor`] if it is not a valid XRD.
    ///
    /// Failures are not cached.
    pub async fn get(&self, resource: &str) -> Result<Arc<WebFinger>, DiscoveryError> {
        if resource.is_empty() {
            return Err(DiscoveryError::EmptyResource);
        }

        let cached = self.webfinger_cache.read().unwrap().get(resource).cloned();
        if let Some(webfinger) = cached {
            debug!("discovery: webfinger cache hit for {resource}");
            return Ok(webfinger);
        }

        let webfinger = self.fetch(resource).await?;
        self.webfinger_cache
            .write()
            .unwrap()
            .insert(resource.to_string(), Arc::clone(&webfinger));
        Ok(webfinger)
    }

    /// Resolve `resource` without consulting or filling the WebFinger cache.
    ///
    /// The host-meta step still goes through [`DiscoveryClient::get_host_meta`].
    pub async fn fetch(&self, resource: &str) -> Result<Arc<WebFinger>, DiscoveryError> {
        let url = self.discovery_url(resource).await?;

        let body = self
            .fetcher
            .fetch(&url, XRD_CONTENT_TYPE)
            .await
            .ok_or_else(|| DiscoveryError::FetchFailed(url.clone()))?;
        let text = String::from_utf8(body).map_err(|e| XrdError::InvalidXml(e.to_string()))?;
        let webfinger = WebFinger::from_xml(&text)?;

        info!(
            "discovery: resolved {resource} via {url} ({} links)",
            webfinger.links().len()
        );
        Ok(Arc::new(webfinger))
    }

    /// The URL a lookup of `resource` would fetch its WebFinger document from.
    ///
    /// Performs (and caches) the host-meta step. The well-known endpoint is
    /// used only when the host has no host-meta; a host-meta without an XRD
    /// LRDD template is a [`DiscoveryError::FetchFailed`].
    pub async fn discovery_url(&self, resource: &str) -> Result<String, DiscoveryError> {
        if resource.is_empty() {
            return Err(DiscoveryError::EmptyResource);
        }
        let host =
            extract_host(resource).ok_or_else(|| DiscoveryError::EmptyHost(resource.to_string()))?;

        let Some(host_meta) = self.get_host_meta(&host).await? else {
            debug!("discovery: no host-meta for {host}; using the well-known endpoint");
            return Ok(webfinger_url(&host, resource));
        };

        let lrdd = host_meta.lrdd_xrd();
        if lrdd.is_empty() {
            warn!("discovery: host-meta of {host} has no XRD LRDD template");
            return Err(DiscoveryError::FetchFailed(format!(
                "host-meta of {host} has no XRD LRDD template"
            )));
        }
        Ok(expand_lrdd(lrdd, resource))
    }

    /// The host-meta document of `host`, cached per host.
    ///
    /// `Ok(None)` means the host serves no usable host-meta; that outcome is
    /// cached too.
    pub async fn get_host_meta(&self, host: &str) -> Result<Option<Arc<HostMeta>>, DiscoveryError> {
        if host.is_empty() {
            return Err(DiscoveryError::EmptyHost(host.to_string()));
        }

        let cached = self.host_meta_cache.read().unwrap().get(host).cloned();
        if let Some(host_meta) = cached {
            debug!("discovery: host-meta cache hit for {host}");
            return Ok(host_meta);
        }

        let host_meta = self.fetch_host_meta(host).await?;
        self.host_meta_cache
            .write()
            .unwrap()
            .insert(host.to_string(), host_meta.clone());
        Ok(host_meta)
    }

    /// Fetch the host-meta of `host` without the cache.
    ///
    /// Tries `https` first and `http` once if that yields nothing. A document
    /// that does not parse is logged and reported as absent.
    pub async fn fetch_host_meta(
        &self,
        host: &str,
    ) -> Result<Option<Arc<HostMeta>>, DiscoveryError> {
        if host.is_empty() {
            return Err(DiscoveryError::EmptyHost(host.to_string()));
        }

        let mut url = host_meta_url(host, false);
        let mut body = self.fetcher.fetch(&url, XRD_CONTENT_TYPE).await;
        if body.is_none() {
            url = host_meta_url(host, true);
            body = self.fetcher.fetch(&url, XRD_CONTENT_TYPE).await;
        }
        let Some(body) = body else {
            info!("discovery: no host-meta available for {host}");
            return Ok(None);
        };

        let parsed = String::from_utf8(body)
            .map_err(|e| XrdError::InvalidXml(e.to_string()))
            .and_then(|text| HostMeta::from_xml(&text));
        match parsed {
            Ok(host_meta) => {
                debug!("discovery: host-meta for {host} loaded from {url}");
                Ok(Some(Arc::new(host_meta)))
            }
            Err(e) => {
                warn!("discovery: ignoring unparseable host-meta from {url}: {e}");
                Ok(None)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
