//! WebFinger (RFC 7033) result accessors.

use crate::descriptor::Descriptor;

/// Link relation of a human-readable profile page.
pub const REL_PROFILE_PAGE: &str = "http://webfinger.net/rel/profile-page";

/// A WebFinger result is a plain descriptor read through [`WebFingerExt`].
pub type WebFinger = Descriptor;

/// Convenience lookups over the links of a WebFinger result.
///
/// Each one looks only at the *first* link with the given rel; if that link
/// has no target of the requested kind the result is `""`.
pub trait WebFingerExt {
    fn link_href(&self, rel: &str) -> &str;

    fn link_template(&self, rel: &str) -> &str;

    fn profile_page_href(&self) -> &str {
        self.link_href(REL_PROFILE_PAGE)
    }
}

impl WebFingerExt for Descriptor {
    fn link_href(&self, rel: &str) -> &str {
        self.find_first_link_element(rel)
            .and_then(|link| link.href())
            .unwrap_or("")
    }

    fn link_template(&self, rel: &str) -> &str {
        self.find_first_link_element(rel)
            .and_then(|link| link.template())
            .unwrap_or("")
    }
}
