use thiserror::Error;
use xrd::XrdError;

/// Errors returned by [`DiscoveryClient`](crate::DiscoveryClient).
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The resource URI was empty; raised before any network access.
    #[error("resource URI is empty")]
    EmptyResource,

    /// No host could be derived from the given resource URI or host argument.
    #[error("invalid resource URI '{0}': host is empty")]
    EmptyHost(String),

    /// The final WebFinger document could not be retrieved. Carries the URL
    /// tried, or the reason no URL could be built.
    #[error("webfinger fetch failed: {0}")]
    FetchFailed(String),

    /// The WebFinger document was retrieved but is not a valid XRD.
    #[error("invalid webfinger document: {0}")]
    Descriptor(#[from] XrdError),

    /// Building the HTTP transport failed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}
