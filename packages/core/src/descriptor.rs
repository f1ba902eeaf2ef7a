//! The general resource descriptor shared by host-meta and WebFinger.

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, SubsecRound};
use serde_json::Value;

use crate::error::XrdError;
use crate::link::LinkElement;
use crate::types::{Properties, PropertyValue};
use crate::{json, xml};

/// An XRD / JRD resource descriptor (RFC 6415 §3, RFC 7033 §4.4).
///
/// Fields serialize in a fixed order: subject, expires, aliases, properties,
/// links. An empty `subject` counts as absent.
///
/// # Example
///
/// ```rust
/// use xrd::{Descriptor, LinkElement};
///
/// let mut jrd = Descriptor::new("acct:alice@example.com");
/// jrd.add_alias("https://example.com/@alice");
/// jrd.add_link(
///     LinkElement::new_href("http://webfinger.net/rel/profile-page", "https://example.com/@alice")
///         .with_type("text/html"),
/// );
///
/// let parsed = Descriptor::from_json(&jrd.to_json()).unwrap();
/// assert_eq!(parsed, jrd);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Descriptor {
    subject: String,
    expires: Option<DateTime<FixedOffset>>,
    aliases: Vec<String>,
    properties: Properties,
    links: Vec<LinkElement>,
}

impl Descriptor {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Self::default()
        }
    }

    /// Parse an XRD document.
    ///
    /// # Errors
    /// A parse error if `xml` is not well formed or its root is not `XRD`;
    /// a value error for a `<Property>` without `type` or a bad `<Expires>`.
    pub fn from_xml(xml: &str) -> Result<Self, XrdError> {
        xml::decode_descriptor(xml)
    }

    /// Parse a JRD document.
    ///
    /// # Errors
    /// A parse error if `json` is not valid JSON; a value error if a member
    /// has the wrong shape.
    pub fn from_json(json: &str) -> Result<Self, XrdError> {
        json::decode_descriptor(json)
    }

    /// Serialize as an XRD document, declaration and trailing newline included.
    pub fn to_xml(&self) -> String {
        xml::encode_descriptor(self)
    }

    /// Serialize as a compact JRD document; `{}` when nothing is set.
    pub fn to_json(&self) -> String {
        json::encode_descriptor(self)
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.subject = subject.into();
    }

    pub fn expires(&self) -> Option<&DateTime<FixedOffset>> {
        self.expires.as_ref()
    }

    /// Set the expiry, truncated to whole seconds (the serialized precision).
    pub fn set_expires(&mut self, expires: DateTime<FixedOffset>) {
        self.expires = Some(expires.trunc_subsecs(0));
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn add_alias(&mut self, alias: impl Into<String>) {
        self.aliases.push(alias.into());
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.set(key, value.into());
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Merge `properties` into the descriptor; existing keys are overwritten.
    pub fn set_properties<K, V>(&mut self, properties: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        for (key, value) in properties {
            self.set_property(key, value);
        }
    }

    pub fn links(&self) -> &[LinkElement] {
        &self.links
    }

    pub fn add_link(&mut self, link: LinkElement) {
        self.links.push(link);
    }

    /// Append a link given as a JRD link object.
    ///
    /// # Errors
    /// A value error if `link` is not an object or has malformed members.
    pub fn add_link_value(&mut self, link: &Value) -> Result<(), XrdError> {
        self.links.push(LinkElement::from_value(link)?);
        Ok(())
    }

    /// All links whose rel equals `rel` (ASCII case-insensitive), in order.
    pub fn find_link_elements(&self, rel: &str) -> Vec<&LinkElement> {
        self.links.iter().filter(|l| l.rel_matches(rel)).collect()
    }

    pub fn find_first_link_element(&self, rel: &str) -> Option<&LinkElement> {
        self.links.iter().find(|l| l.rel_matches(rel))
    }
}

/// Renders the XRD form.
impl std::fmt::Display for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_xml())
    }
}

/// RFC 3339 with whole seconds and a numeric offset: `2010-01-30T09:30:00+00:00`.
pub(crate) fn format_expires(expires: &DateTime<FixedOffset>) -> String {
    expires.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Accepts RFC 3339; a timestamp without an offset is taken as UTC.
pub(crate) fn parse_expires(text: &str) -> Result<DateTime<FixedOffset>, XrdError> {
    let text = text.trim();
    if let Ok(expires) = DateTime::parse_from_rfc3339(text) {
        return Ok(expires);
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
        .map(|naive| naive.and_utc().fixed_offset())
        .map_err(|_| XrdError::InvalidExpires(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn links_fixture() -> Descriptor {
        let mut d = Descriptor::default();
        d.add_link(LinkElement::new_href("author", "http://example.jp/users/user1"));
        d.add_link(LinkElement::new_href("Author", "http://example.jp/users/user2"));
        d.add_link(LinkElement::new_href("copyright", "http://example.jp/copyright"));
        d
    }

    #[test]
    fn subject_and_aliases() {
        let mut d = Descriptor::default();
        assert_eq!(d.subject(), "");
        d.set_subject("acct:mirai-iro@example.jp");
        d.add_alias("acct:mirai-iro@example.jp");
        d.add_alias("https://example.jp/users/mirai-iro");
        d.add_alias("acct:mirai-iro@example.jp");
        assert_eq!(d.subject(), "acct:mirai-iro@example.jp");
        assert_eq!(
            d.aliases(),
            [
                "acct:mirai-iro@example.jp",
                "https://example.jp/users/mirai-iro",
                "acct:mirai-iro@example.jp"
            ]
        );
    }

    #[test]
    fn expires_roundtrips_through_setter() {
        let mut d = Descriptor::default();
        let expires = DateTime::parse_from_rfc3339("2024-05-01T12:00:00+09:00").unwrap();
        d.set_expires(expires);
        assert_eq!(d.expires(), Some(&expires));
        assert!(d.to_json().contains(r#""expires":"2024-05-01T12:00:00+09:00""#));
    }

    #[test]
    fn expires_drops_subseconds() {
        let mut d = Descriptor::default();
        d.set_expires(DateTime::parse_from_rfc3339("2023-11-14T22:13:20.123+00:00").unwrap());
        assert_eq!(
            d.expires(),
            Some(&DateTime::parse_from_rfc3339("2023-11-14T22:13:20+00:00").unwrap())
        );
    }

    #[test]
    fn setter_built_descriptor_survives_both_codecs() {
        let mut d = Descriptor::new("acct:mirai-iro@example.jp");
        d.set_expires(
            chrono::Utc
                .timestamp_millis_opt(1_700_000_000_123)
                .unwrap()
                .fixed_offset(),
        );
        d.add_alias("https://example.jp/users/mirai-iro");
        d.set_property("http://props.example.net/color", "red");
        d.set_property("http://props.example.net/none", PropertyValue::Nil);

        let mut link = LinkElement::new_href("author", "https://example.jp/users/mirai-iro")
            .with_type("text/html");
        link.set_title("About", None);
        link.set_title("Über", Some("de"));
        link.set_property("http://example.com/role", "editor");
        link.set_property("http://example.com/nothing", PropertyValue::Nil);
        d.add_link(link);
        d.add_link(LinkElement::new_template("lrdd", "https://example.jp/lrdd?uri={uri}"));

        assert_eq!(Descriptor::from_xml(&d.to_xml()).unwrap(), d);
        assert_eq!(Descriptor::from_json(&d.to_json()).unwrap(), d);
    }

    #[test]
    fn properties_set_and_merge() {
        let mut d = Descriptor::default();
        d.set_property("http://props.example.net/color", "red");
        d.set_properties([
            ("http://blgx.example.net/ns/version", PropertyValue::from("1.3")),
            ("http://blgx.example.net/ns/ext", PropertyValue::Nil),
        ]);
        assert_eq!(
            d.property("http://props.example.net/color"),
            Some(&PropertyValue::from("red"))
        );
        assert_eq!(
            d.property("http://blgx.example.net/ns/ext"),
            Some(&PropertyValue::Nil)
        );
        assert_eq!(d.property("http://example.net/missing"), None);
        assert_eq!(d.properties().len(), 3);
    }

    #[test]
    fn find_link_elements_is_case_insensitive_and_ordered() {
        let d = links_fixture();
        let authors = d.find_link_elements("AUTHOR");
        assert_eq!(authors.len(), 2);
        assert_eq!(authors[0].href(), Some("http://example.jp/users/user1"));
        assert_eq!(authors[1].href(), Some("http://example.jp/users/user2"));
        assert_eq!(d.find_link_elements("copyright").len(), 1);
        assert!(d.find_link_elements("notfound").is_empty());
    }

    #[test]
    fn find_first_link_element() {
        let d = links_fixture();
        assert_eq!(
            d.find_first_link_element("author").and_then(|l| l.href()),
            Some("http://example.jp/users/user1")
        );
        assert!(d.find_first_link_element("notfound").is_none());
    }

    #[test]
    fn add_link_value_converts_objects() {
        let mut d = Descriptor::default();
        let link = LinkElement::new_href("author", "http://example.jp/users/user1");
        d.add_link_value(&link.to_value()).unwrap();
        assert_eq!(d.links(), [link]);
    }

    #[test]
    fn add_link_value_rejects_non_objects() {
        let mut d = Descriptor::default();
        let err = d.add_link_value(&json!("author")).unwrap_err();
        assert!(matches!(err, XrdError::NotAnObject("link")));
        assert!(!err.is_parse_error());
        assert!(d.links().is_empty());
    }

    #[test]
    fn expires_formats_with_numeric_offset() {
        let parsed = parse_expires("2010-01-30T09:30:00Z").unwrap();
        assert_eq!(format_expires(&parsed), "2010-01-30T09:30:00+00:00");
        let parsed = parse_expires("2010-01-30T18:30:00+09:00").unwrap();
        assert_eq!(format_expires(&parsed), "2010-01-30T18:30:00+09:00");
        let parsed = parse_expires("2010-01-30T09:30:00").unwrap();
        assert_eq!(format_expires(&parsed), "2010-01-30T09:30:00+00:00");
    }

    #[test]
    fn expires_rejects_garbage() {
        assert!(matches!(
            parse_expires("next tuesday"),
            Err(XrdError::InvalidExpires(_))
        ));
    }

    #[test]
    fn display_is_xml() {
        let d = Descriptor::new("acct:alice@example.com");
        assert_eq!(d.to_string(), d.to_xml());
    }
}
