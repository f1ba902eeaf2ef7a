//! Resource URIs and the well-known URLs derived from them.
//!
//! Everything here is pure string work with no I/O, so the client's URL
//! choices can be tested without a transport.
//!
//! # Host extraction
//!
//! ```text
//! acct:mirai_iro@mstdn.jp            -> mstdn.jp        (after the last '@')
//! https://example.com:8443/users/a   -> example.com:8443
//! https://example.com/users/a        -> example.com
//! ```

use reqwest::Url;
use urlencoding::encode;

/// Path of the host-meta document (RFC 6415 §2).
pub const HOST_META_PATH: &str = "/.well-known/host-meta";

/// Path of the WebFinger endpoint (RFC 7033 §4).
pub const WEBFINGER_PATH: &str = "/.well-known/webfinger";

/// The placeholder an LRDD template carries for the resource URI.
pub const LRDD_PLACEHOLDER: &str = "{uri}";

/// The host to query for `resource`, or `None` if it names no host.
///
/// For `acct:` URIs this is everything after the last `@`. For other URIs it
/// is the authority's host, with `:port` appended when the URI carries a
/// non-default port.
pub fn extract_host(resource: &str) -> Option<String> {
    if let Some(account) = resource.strip_prefix("acct:") {
        let at = account.rfind('@')?;
        let host = &account[at + 1..];
        return (!host.is_empty()).then(|| host.to_string());
    }

    let url = Url::parse(resource).ok()?;
    let host = url.host_str().filter(|h| !h.is_empty())?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// `https://{host}/.well-known/host-meta`, or the `http://` form when
/// `insecure` is set.
pub fn host_meta_url(host: &str, insecure: bool) -> String {
    let scheme = if insecure { "http" } else { "https" };
    format!("{scheme}://{host}{HOST_META_PATH}")
}

/// The fallback endpoint used when a host publishes no usable LRDD template.
pub fn webfinger_url(host: &str, resource: &str) -> String {
    format!("https://{host}{WEBFINGER_PATH}?resource={}", encode(resource))
}

/// Replace every `{uri}` in `template` with the percent-encoded `resource`.
///
/// Only RFC 3986 unreserved characters are left unencoded.
pub fn expand_lrdd(template: &str, resource: &str) -> String {
    template.replace(LRDD_PLACEHOLDER, &encode(resource))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
