//! Host metadata (RFC 6415): the document served at `/.well-known/host-meta`.

use crate::descriptor::Descriptor;
use crate::link::LinkElement;
use crate::types::XRD_CONTENT_TYPE;

/// Link relation of a Link-based Resource Descriptor Document template.
pub const REL_LRDD: &str = "lrdd";

/// A host-meta document is a plain descriptor read through [`HostMetaExt`].
pub type HostMeta = Descriptor;

/// LRDD template access on a host-meta descriptor.
pub trait HostMetaExt {
    /// Template of the first `lrdd` link whose type is `media_type`.
    ///
    /// Rel and type compare ignoring ASCII case; links without a template
    /// are skipped. Returns `""` when nothing matches.
    fn lrdd(&self, media_type: &str) -> &str;

    /// [`HostMetaExt::lrdd`] for `application/xrd+xml`.
    fn lrdd_xrd(&self) -> &str {
        self.lrdd(XRD_CONTENT_TYPE)
    }

    /// Append an `lrdd` template link of type `media_type`.
    fn add_lrdd(&mut self, template: impl Into<String>, media_type: impl Into<String>);

    /// [`HostMetaExt::add_lrdd`] for `application/xrd+xml`.
    fn add_lrdd_xrd(&mut self, template: impl Into<String>) {
        self.add_lrdd(template, XRD_CONTENT_TYPE);
    }
}

impl HostMetaExt for Descriptor {
    fn lrdd(&self, media_type: &str) -> &str {
        self.links()
            .iter()
            .filter(|link| link.rel_matches(REL_LRDD))
            .filter(|link| link.media_type().unwrap_or("").eq_ignore_ascii_case(media_type))
            .find_map(LinkElement::template)
            .unwrap_or("")
    }

    fn add_lrdd(&mut self, template: impl Into<String>, media_type: impl Into<String>) {
        self.add_link(LinkElement::new_template(REL_LRDD, template).with_type(media_type));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JRD_CONTENT_TYPE;

    #[test]
    fn add_and_get_lrdd() {
        let mut host_meta = HostMeta::default();
        host_meta.add_lrdd_xrd("https://example.jp/.well-known/webfinger?resource={uri}");
        host_meta.add_lrdd(
            "https://example.jp/.well-known/webfinger.json?resource={uri}",
            JRD_CONTENT_TYPE,
        );

        let links = host_meta.links();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].rel(), Some("lrdd"));
        assert_eq!(links[0].media_type(), Some("application/xrd+xml"));
        assert_eq!(
            links[0].template(),
            Some("https://example.jp/.well-known/webfinger?resource={uri}")
        );
        assert_eq!(links[1].media_type(), Some("application/jrd+json"));

        assert_eq!(
            host_meta.lrdd_xrd(),
            "https://example.jp/.well-known/webfinger?resource={uri}"
        );
        assert_eq!(
            host_meta.lrdd(JRD_CONTENT_TYPE),
            "https://example.jp/.well-known/webfinger.json?resource={uri}"
        );
    }

    #[test]
    fn lrdd_matching_ignores_case_and_skips_hrefs() {
        let mut host_meta = HostMeta::default();
        host_meta.add_link(
            LinkElement::new_href("lrdd", "https://example.jp/static").with_type(XRD_CONTENT_TYPE),
        );
        host_meta.add_link(
            LinkElement::new_template("LRDD", "https://example.jp/?q={uri}")
                .with_type("Application/XRD+XML"),
        );
        assert_eq!(host_meta.lrdd_xrd(), "https://example.jp/?q={uri}");
    }

    #[test]
    fn lrdd_without_match_is_empty() {
        let mut host_meta = HostMeta::default();
        assert_eq!(host_meta.lrdd_xrd(), "");
        host_meta.add_link(LinkElement::new_template("lrdd", "https://example.jp/?q={uri}"));
        assert_eq!(host_meta.lrdd_xrd(), "");
        assert_eq!(host_meta.lrdd(""), "https://example.jp/?q={uri}");
    }

    #[test]
    fn to_xml() {
        let mut host_meta = HostMeta::default();
        host_meta.add_lrdd_xrd("https://example.jp/.well-known/webfinger?resource={uri}");
        let expected = concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            "\n",
            r#"<XRD xmlns="http://docs.oasis-open.org/ns/xri/xrd-1.0">"#,
            r#"<Link rel="lrdd" type="application/xrd+xml" template="https://example.jp/.well-known/webfinger?resource={uri}"/>"#,
            "</XRD>\n",
        );
        assert_eq!(host_meta.to_xml(), expected);
    }

    #[test]
    fn to_json() {
        let mut host_meta = HostMeta::default();
        host_meta.add_lrdd(
            "https://example.jp/.well-known/webfinger.json?resource={uri}",
            JRD_CONTENT_TYPE,
        );
        assert_eq!(
            host_meta.to_json(),
            r#"{"links":[{"rel":"lrdd","type":"application/jrd+json","template":"https://example.jp/.well-known/webfinger.json?resource={uri}"}]}"#
        );
    }

    #[test]
    fn parsed_host_meta_exposes_lrdd() {
        let host_meta = HostMeta::from_xml(concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<XRD xmlns="http://docs.oasis-open.org/ns/xri/xrd-1.0">"#,
            r#"<Link rel="lrdd" type="application/xrd+xml" template="https://mstdn.jp/.well-known/webfinger?resource={uri}"/>"#,
            "</XRD>"
        ))
        .unwrap();
        assert_eq!(
            host_meta.lrdd_xrd(),
            "https://mstdn.jp/.well-known/webfinger?resource={uri}"
        );
    }
}
