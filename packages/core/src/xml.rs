//! XRD (XML) encoding and decoding.
//!
//! Writing is two-pass: the descriptor is first turned into a small element
//! tree while noting whether any property was nil, then the root is given
//! its `xmlns:xsi` declaration (only if needed) and the tree is serialized.
//! The output matches the canonical XRD layout byte for byte:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <XRD xmlns="http://docs.oasis-open.org/ns/xri/xrd-1.0"><Subject>…</Subject>…</XRD>
//! ```
//!
//! Reading uses a namespace-aware `quick_xml` reader to build the same tree
//! shape, after which descriptor fields are picked out by local name.

use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::descriptor::{format_expires, parse_expires, Descriptor};
use crate::error::XrdError;
use crate::link::LinkElement;
use crate::types::{
    LinkTarget, Properties, PropertyValue, TITLE_LANG_DEFAULT, XML_NAMESPACE, XRD_NAMESPACE,
    XSI_NAMESPACE,
};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

// ---------------------------------------------------------------------------
// Element tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub(crate) struct XmlAttr {
    /// Resolved namespace; only populated on the read path.
    pub namespace: Option<String>,
    /// Qualified name when writing (`xml:lang`), local name when read.
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct XmlElement {
    pub name: String,
    pub attrs: Vec<XmlAttr>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn push_attr(&mut self, name: &str, value: &str) {
        self.attrs.push(XmlAttr {
            namespace: None,
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    /// Child elements with the given local name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn first_child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// An attribute with no namespace prefix.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.namespace.is_none() && a.name == name)
            .map(|a| a.value.as_str())
    }

    /// An attribute bound to `namespace`, whatever prefix the document used.
    pub fn attr_ns(&self, namespace: &str, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.namespace.as_deref() == Some(namespace) && a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Serialize this element (and its subtree) without an XML declaration.
    pub fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for attr in &self.attrs {
            out.push(' ');
            out.push_str(&attr.name);
            out.push_str("=\"");
            out.push_str(&escape(attr.value.as_str()));
            out.push('"');
        }
        if self.text.is_empty() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        out.push_str(&partial_escape(self.text.as_str()));
        for child in &self.children {
            child.write_to(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Append one `<Property>` element per entry; sets `needs_xsi` on nil values.
fn push_properties(parent: &mut XmlElement, properties: &Properties, needs_xsi: &mut bool) {
    for (key, value) in properties.iter() {
        let mut node = XmlElement::new("Property").with_text(value.as_str().unwrap_or(""));
        node.push_attr("type", key);
        if value.is_nil() {
            node.push_attr("xsi:nil", "true");
            *needs_xsi = true;
        }
        parent.children.push(node);
    }
}

/// Build the `<Link>` element for `link`.
///
/// `needs_xsi` is raised when a nil property is written; declaring the
/// namespace is left to whoever owns the document root.
pub(crate) fn link_node(link: &LinkElement, needs_xsi: &mut bool) -> XmlElement {
    let mut node = XmlElement::new("Link");
    if let Some(rel) = link.rel() {
        node.push_attr("rel", rel);
    }
    if let Some(media_type) = link.media_type() {
        node.push_attr("type", media_type);
    }
    match link.target() {
        LinkTarget::Href(href) => node.push_attr("href", href),
        LinkTarget::Template(template) => node.push_attr("template", template),
        LinkTarget::None => {}
    }
    for (lang, title) in link.titles().iter() {
        let mut title_node = XmlElement::new("Title").with_text(title);
        if lang != TITLE_LANG_DEFAULT {
            title_node.push_attr("xml:lang", lang);
        }
        node.children.push(title_node);
    }
    push_properties(&mut node, link.properties(), needs_xsi);
    node
}

pub(crate) fn encode_descriptor(descriptor: &Descriptor) -> String {
    let mut needs_xsi = false;
    let mut root = XmlElement::new("XRD");
    root.push_attr("xmlns", XRD_NAMESPACE);

    if !descriptor.subject().is_empty() {
        root.children
            .push(XmlElement::new("Subject").with_text(descriptor.subject()));
    }
    if let Some(expires) = descriptor.expires() {
        root.children
            .push(XmlElement::new("Expires").with_text(&format_expires(expires)));
    }
    for alias in descriptor.aliases() {
        root.children.push(XmlElement::new("Alias").with_text(alias));
    }
    push_properties(&mut root, descriptor.properties(), &mut needs_xsi);
    for link in descriptor.links() {
        root.children.push(link_node(link, &mut needs_xsi));
    }

    // Second pass: the namespace is only known to be needed once every
    // property has been written.
    if needs_xsi {
        root.push_attr("xmlns:xsi", XSI_NAMESPACE);
    }

    let mut out = String::with_capacity(256);
    out.push_str(XML_DECLARATION);
    out.push('\n');
    root.write_to(&mut out);
    out.push('\n');
    out
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn xml_error(e: impl std::fmt::Display) -> XrdError {
    XrdError::InvalidXml(e.to_string())
}

fn namespace_of(resolved: ResolveResult<'_>) -> Option<String> {
    match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        // The `xml` prefix is bound by definition even when never declared.
        ResolveResult::Unknown(prefix) if prefix == b"xml" => Some(XML_NAMESPACE.to_string()),
        _ => None,
    }
}

fn open_element(reader: &NsReader<&[u8]>, start: &BytesStart<'_>) -> Result<XmlElement, XrdError> {
    let mut element = XmlElement::new(&String::from_utf8_lossy(start.local_name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(xml_error)?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let (resolved, local) = reader.resolve_attribute(attr.key);
        let namespace = namespace_of(resolved);
        let name = String::from_utf8_lossy(local.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(xml_error)?.into_owned();
        element.attrs.push(XmlAttr {
            namespace,
            name,
            value,
        });
    }
    Ok(element)
}

/// Attach a finished element to its parent, or make it the document root.
fn close_element(
    element: XmlElement,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
) -> Result<(), XrdError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(XrdError::InvalidXml("more than one root element".into())),
    }
    Ok(())
}

/// Parse `text` into an element tree rooted at the document element.
pub(crate) fn parse_tree(text: &str) -> Result<XmlElement, XrdError> {
    let mut reader = NsReader::from_str(text);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        // Element namespaces are not needed: children are matched by local name.
        match reader.read_event().map_err(xml_error)? {
            Event::Start(start) => {
                if root.is_some() && stack.is_empty() {
                    return Err(XrdError::InvalidXml("more than one root element".into()));
                }
                let element = open_element(&reader, &start)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = open_element(&reader, &start)?;
                close_element(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| XrdError::InvalidXml("unexpected closing tag".into()))?;
                close_element(element, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(xml_error)?;
                match stack.last_mut() {
                    Some(current) => current.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(XrdError::InvalidXml(
                            "text content outside the root element".into(),
                        ))
                    }
                }
            }
            Event::CData(data) => {
                let data = std::str::from_utf8(&data).map_err(xml_error)?;
                match stack.last_mut() {
                    Some(current) => current.text.push_str(data),
                    None => {
                        return Err(XrdError::InvalidXml(
                            "CDATA section outside the root element".into(),
                        ))
                    }
                }
            }
            Event::Eof => break,
            // Declaration, comments, processing instructions, DOCTYPE.
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(XrdError::InvalidXml("unexpected end of document".into()));
    }
    root.ok_or_else(|| XrdError::InvalidXml("document has no root element".into()))
}

/// Collect `<Property>` elements; a repeated type keeps the last value.
fn parse_properties(parent: &XmlElement) -> Result<Properties, XrdError> {
    let mut properties = Properties::new();
    for node in parent.children_named("Property") {
        let key = node.attr("type").unwrap_or("");
        if key.is_empty() {
            return Err(XrdError::EmptyPropertyType);
        }
        let value = if node.attr_ns(XSI_NAMESPACE, "nil") == Some("true") {
            PropertyValue::Nil
        } else {
            PropertyValue::Value(node.text.clone())
        };
        properties.set(key, value);
    }
    Ok(properties)
}

fn parse_link(node: &XmlElement) -> Result<LinkElement, XrdError> {
    let target = match (node.attr("template"), node.attr("href")) {
        (Some(template), _) => LinkTarget::Template(template.to_string()),
        (None, Some(href)) => LinkTarget::Href(href.to_string()),
        (None, None) => LinkTarget::None,
    };
    let mut link = LinkElement::new(
        node.attr("rel").map(str::to_string),
        target,
        node.attr("type").map(str::to_string),
    );

    for title in node.children_named("Title") {
        let lang = title
            .attr_ns(XML_NAMESPACE, "lang")
            .or_else(|| title.attr("lang"));
        link.set_title(title.text.as_str(), lang);
    }
    link.set_properties(parse_properties(node)?);
    Ok(link)
}

pub(crate) fn decode_descriptor(text: &str) -> Result<Descriptor, XrdError> {
    let root = parse_tree(text)?;
    if root.name != "XRD" {
        return Err(XrdError::UnexpectedRoot(root.name));
    }

    let mut descriptor = Descriptor::new(
        root.first_child("Subject")
            .map(|s| s.text.as_str())
            .unwrap_or(""),
    );
    if let Some(expires) = root.first_child("Expires") {
        descriptor.set_expires(parse_expires(&expires.text)?);
    }
    for alias in root.children_named("Alias") {
        descriptor.add_alias(alias.text.as_str());
    }
    descriptor.set_properties(parse_properties(&root)?);
    for node in root.children_named("Link") {
        descriptor.add_link(parse_link(node)?);
    }
    Ok(descriptor)
}
