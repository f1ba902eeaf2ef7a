//! Discovery client configuration, populated from environment variables.

/// Default per-request timeout of the HTTP transport, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// HTTP settings for the discovery transport.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `XRD_HTTP_TIMEOUT_SECS` | `10` | Per-request timeout in seconds |
/// | `XRD_USER_AGENT` | `xrd-discovery/<version>` | `User-Agent` request header |
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Seconds before a single host-meta or WebFinger request is abandoned.
    pub timeout_secs: u64,

    /// Value sent in the `User-Agent` header.
    pub user_agent: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }
}

impl DiscoveryConfig {
    /// Populate config from environment variables, applying defaults where
    /// absent or unparseable.
    pub fn from_env() -> Self {
        let timeout_secs = std::env::var("XRD_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let user_agent = std::env::var("XRD_USER_AGENT")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(default_user_agent);

        Self {
            timeout_secs,
            user_agent,
        }
    }
}

fn default_user_agent() -> String {
    format!("xrd-discovery/{}", env!("CARGO_PKG_VERSION"))
}
