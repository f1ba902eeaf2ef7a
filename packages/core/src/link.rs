//! The `<Link>` element / JRD link object.

use serde_json::{Map, Value};

use crate::error::XrdError;
use crate::types::{normalize_lang, LinkTarget, Properties, PropertyValue, Titles};
use crate::xml;

/// One link of a resource descriptor (RFC 6415 §3.1.1.1, RFC 7033 §4.4.4).
///
/// A link points at its target either directly ([`LinkTarget::Href`]) or
/// through a template whose literal `{uri}` is replaced with the resource
/// being described ([`LinkTarget::Template`]); never both.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinkElement {
    rel: Option<String>,
    media_type: Option<String>,
    target: LinkTarget,
    titles: Titles,
    properties: Properties,
}

impl LinkElement {
    pub fn new(rel: Option<String>, target: LinkTarget, media_type: Option<String>) -> Self {
        Self {
            rel,
            media_type,
            target,
            titles: Titles::new(),
            properties: Properties::new(),
        }
    }

    /// A link with `rel` pointing directly at `href`.
    pub fn new_href(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self::new(Some(rel.into()), LinkTarget::Href(href.into()), None)
    }

    /// A link with `rel` whose target is the `{uri}` template `template`.
    pub fn new_template(rel: impl Into<String>, template: impl Into<String>) -> Self {
        Self::new(Some(rel.into()), LinkTarget::Template(template.into()), None)
    }

    /// Set the media type of the linked resource.
    pub fn with_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// The `rel` attribute.
    pub fn rel(&self) -> Option<&str> {
        self.rel.as_deref()
    }

    /// The `type` attribute.
    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    /// The `href` or `template`, whichever is set.
    pub fn target(&self) -> &LinkTarget {
        &self.target
    }

    pub fn href(&self) -> Option<&str> {
        match &self.target {
            LinkTarget::Href(href) => Some(href),
            _ => None,
        }
    }

    pub fn template(&self) -> Option<&str> {
        match &self.target {
            LinkTarget::Template(template) => Some(template),
            _ => None,
        }
    }

    /// `true` when `rel` equals this link's rel, ignoring ASCII case.
    ///
    /// A link without a rel compares as the empty string.
    pub fn rel_matches(&self, rel: &str) -> bool {
        self.rel().unwrap_or("").eq_ignore_ascii_case(rel)
    }

    /// The title for `lang`; `None`, `""` and `"0"` select the default title.
    pub fn title(&self, lang: Option<&str>) -> Option<&str> {
        self.titles.get(normalize_lang(lang)).map(String::as_str)
    }

    pub fn set_title(&mut self, title: impl Into<String>, lang: Option<&str>) {
        self.titles.set(normalize_lang(lang), title.into());
    }

    pub fn titles(&self) -> &Titles {
        &self.titles
    }

    pub fn title_langs(&self) -> Vec<&str> {
        self.titles.keys().collect()
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

    /// Merge `properties` into this link; existing keys are overwritten.
    pub fn set_properties<K, V>(&mut self, properties: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        for (key, value) in properties {
            self.set_property(key, value);
        }
    }

    /// Serialize as a single `<Link .../>` element with no XML declaration.
    ///
    /// A nil property is written as `xsi:nil="true"`; the `xsi` prefix is
    /// left undeclared since declaring it belongs to the enclosing `XRD`.
    pub fn to_xml(&self) -> String {
        let mut needs_xsi = false;
        let mut out = String::new();
        xml::link_node(self, &mut needs_xsi).write_to(&mut out);
        out
    }

    /// The JRD link object. Absent fields are omitted; nil properties are `null`.
    pub fn to_value(&self) -> Value {
        let mut link = Map::new();
        if let Some(rel) = &self.rel {
            link.insert("rel".into(), Value::String(rel.clone()));
        }
        if let Some(media_type) = &self.media_type {
            link.insert("type".into(), Value::String(media_type.clone()));
        }
        match &self.target {
            LinkTarget::Href(href) => {
                link.insert("href".into(), Value::String(href.clone()));
            }
            LinkTarget::Template(template) => {
                link.insert("template".into(), Value::String(template.clone()));
            }
            LinkTarget::None => {}
        }
        if !self.titles.is_empty() {
            let titles = self
                .titles
                .iter()
                .map(|(lang, title)| (lang.to_string(), Value::String(title.clone())))
                .collect();
            link.insert("titles".into(), Value::Object(titles));
        }
        if !self.properties.is_empty() {
            link.insert("properties".into(), properties_to_value(&self.properties));
        }
        Value::Object(link)
    }

    /// Build a link from a JRD link object.
    ///
    /// A `template` member wins over `href`. Any member with the wrong JSON
    /// type is rejected rather than coerced.
    pub fn from_value(value: &Value) -> Result<Self, XrdError> {
        let obj = value.as_object().ok_or(XrdError::NotAnObject("link"))?;

        let rel = optional_string(obj, "rel")?;
        let media_type = optional_string(obj, "type")?;
        let target = match (
            optional_string(obj, "template")?,
            optional_string(obj, "href")?,
        ) {
            (Some(template), _) => LinkTarget::Template(template),
            (None, Some(href)) => LinkTarget::Href(href),
            (None, None) => LinkTarget::None,
        };
        let mut link = Self::new(rel, target, media_type);

        if let Some(titles) = non_null(obj, "titles") {
            let titles = titles.as_object().ok_or(XrdError::InvalidField {
                field: "titles",
                expected: "object",
            })?;
            for (lang, title) in titles {
                let title = title.as_str().ok_or(XrdError::InvalidField {
                    field: "titles",
                    expected: "string values",
                })?;
                link.set_title(title, Some(lang.as_str()));
            }
        }
        if let Some(properties) = non_null(obj, "properties") {
            link.set_properties(properties_from_value(properties)?);
        }
        Ok(link)
    }
}

impl std::fmt::Display for LinkElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_xml())
    }
}

// ---------------------------------------------------------------------------
// JSON helpers shared with the descriptor codec
// ---------------------------------------------------------------------------

/// A member that is present and not `null`.
pub(crate) fn non_null<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn optional_string(obj: &Map<String, Value>, key: &'static str) -> Result<Option<String>, XrdError> {
    match non_null(obj, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(XrdError::InvalidField {
            field: key,
            expected: "string",
        }),
    }
}

pub(crate) fn properties_to_value(properties: &Properties) -> Value {
    let map = properties
        .iter()
        .map(|(key, value)| {
            let value = match value {
                PropertyValue::Value(v) => Value::String(v.clone()),
                PropertyValue::Nil => Value::Null,
            };
            (key.to_string(), value)
        })
        .collect();
    Value::Object(map)
}

pub(crate) fn properties_from_value(value: &Value) -> Result<Properties, XrdError> {
    let obj = value.as_object().ok_or(XrdError::InvalidField {
        field: "properties",
        expected: "object",
    })?;
    let mut properties = Properties::new();
    for (key, value) in obj {
        let value = match value {
            Value::String(s) => PropertyValue::Value(s.clone()),
            Value::Null => PropertyValue::Nil,
            _ => {
                return Err(XrdError::InvalidField {
                    field: "properties",
                    expected: "string or null values",
                })
            }
        };
        properties.set(key.as_str(), value);
    }
    Ok(properties)
}
