//! Value types shared by links and descriptors.
//!
//! This module defines the building blocks of a resource descriptor:
//! [`PropertyValue`], the insertion-ordered [`OrderedMap`] used for
//! properties and titles, and [`LinkTarget`]. It also holds the wire-level
//! constants (content types, namespaces) defined by RFC 6415 and RFC 7033.

/// XRD content type (RFC 6415 §3).
pub const XRD_CONTENT_TYPE: &str = "application/xrd+xml";

/// JRD content type (RFC 7033 §10.2).
pub const JRD_CONTENT_TYPE: &str = "application/jrd+json";

/// Namespace of the `XRD` document element.
pub const XRD_NAMESPACE: &str = "http://docs.oasis-open.org/ns/xri/xrd-1.0";

/// Namespace bound to the reserved `xml:` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// XML Schema instance namespace, declared only when a nil property exists.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Language key used for a title that carries no language tag.
pub const TITLE_LANG_DEFAULT: &str = "default";

/// The value of a `<Property>` element or JRD property entry.
///
/// `Nil` is an explicit marker (`xsi:nil="true"` in XML, `null` in JSON) and
/// is distinct from the key being absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// A property with text content (possibly empty).
    Value(String),
    /// A property explicitly set to nil.
    Nil,
}

impl PropertyValue {
    /// The text content, or `None` for [`PropertyValue::Nil`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Value(v) => Some(v),
            PropertyValue::Nil => None,
        }
    }

    /// Whether this is the explicit nil marker.
    pub fn is_nil(&self) -> bool {
        matches!(self, PropertyValue::Nil)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::Value(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::Value(v)
    }
}

/// `None` becomes [`PropertyValue::Nil`].
impl From<Option<&str>> for PropertyValue {
    fn from(v: Option<&str>) -> Self {
        v.map_or(PropertyValue::Nil, PropertyValue::from)
    }
}

impl From<Option<String>> for PropertyValue {
    fn from(v: Option<String>) -> Self {
        v.map_or(PropertyValue::Nil, PropertyValue::Value)
    }
}

/// A string-keyed map that iterates in insertion order.
///
/// Keys are unique. Setting an existing key replaces its value in place, so
/// the key keeps the position of its first insertion. Descriptors are small
/// (a handful of entries), so lookups are linear scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> OrderedMap<V> {
    /// An empty map.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Insert or overwrite `key`.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects with overwrite semantics: a repeated key keeps the last value.
impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.set(k, v);
        }
        map
    }
}

impl<V> IntoIterator for OrderedMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Typed properties: type URI -> value or nil.
pub type Properties = OrderedMap<PropertyValue>;

/// Localized titles: language tag -> title text.
pub type Titles = OrderedMap<String>;

/// Where a link points: a concrete URI, a `{uri}` template, or nowhere.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LinkTarget {
    #[default]
    None,
    Href(String),
    Template(String),
}

/// Map an optional language tag to the key used in [`Titles`].
///
/// Absent, empty and `"0"` tags all select [`TITLE_LANG_DEFAULT`]; `"0"` is
/// not a valid language tag.
pub fn normalize_lang(lang: Option<&str>) -> &str {
    match lang {
        None | Some("") | Some("0") => TITLE_LANG_DEFAULT,
        Some(lang) => lang,
    }
}
