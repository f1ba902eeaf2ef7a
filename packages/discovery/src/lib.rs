//! WebFinger discovery over HTTP.
//!
//! Given a resource URI such as `acct:alice@example.com`, [`DiscoveryClient`]
//! finds the host's WebFinger endpoint through its host-meta document
//! (RFC 6415) or the well-known fallback (RFC 7033), fetches the XRD and
//! returns it as an [`xrd::WebFinger`].
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`address`] | Host extraction and well-known URL construction (pure) |
//! | [`fetch`] | The [`HttpFetch`] transport trait and [`ReqwestFetcher`] |
//! | [`config`] | [`DiscoveryConfig`], read from `XRD_*` environment variables |
//! | [`client`] | [`DiscoveryClient`]: resolution and caching |
//!
//! # Example
//!
//! ```rust,no_run
//! use xrd::WebFingerExt;
//! use xrd_discovery::{DiscoveryClient, DiscoveryConfig};
//!
//! # async fn run() -> Result<(), xrd_discovery::DiscoveryError> {
//! let client = DiscoveryClient::from_config(&DiscoveryConfig::from_env())?;
//! let webfinger = client.get("acct:mirai_iro@mstdn.jp").await?;
//! println!("{}", webfinger.profile_page_href());
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod client;
pub mod config;
pub mod error;
pub mod fetch;

pub use client::DiscoveryClient;
pub use config::DiscoveryConfig;
pub use error::DiscoveryError;
pub use fetch::{HttpFetch, ReqwestFetcher};
