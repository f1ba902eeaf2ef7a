//! JRD (application/jrd+json) encoding and decoding.

use serde_json::{Map, Value};

use crate::descriptor::{format_expires, parse_expires, Descriptor};
use crate::error::XrdError;
use crate::link::{non_null, properties_from_value, properties_to_value};

/// Compact JSON with members in the order subject, expires, aliases,
/// properties, links. Empty members are left out.
pub(crate) fn encode_descriptor(descriptor: &Descriptor) -> String {
    let mut jrd = Map::new();
    if !descriptor.subject().is_empty() {
        jrd.insert("subject".into(), Value::String(descriptor.subject().into()));
    }
    if let Some(expires) = descriptor.expires() {
        jrd.insert("expires".into(), Value::String(format_expires(expires)));
    }
    if !descriptor.aliases().is_empty() {
        let aliases = descriptor
            .aliases()
            .iter()
            .map(|a| Value::String(a.clone()))
            .collect();
        jrd.insert("aliases".into(), Value::Array(aliases));
    }
    if !descriptor.properties().is_empty() {
        jrd.insert(
            "properties".into(),
            properties_to_value(descriptor.properties()),
        );
    }
    if !descriptor.links().is_empty() {
        let links = descriptor.links().iter().map(|l| l.to_value()).collect();
        jrd.insert("links".into(), Value::Array(links));
    }
    Value::Object(jrd).to_string()
}

pub(crate) fn decode_descriptor(json: &str) -> Result<Descriptor, XrdError> {
    let value: Value = serde_json::from_str(json)?;
    let jrd = value.as_object().ok_or(XrdError::NotAnObject("JRD document"))?;

    let mut descriptor = Descriptor::default();

    match non_null(jrd, "subject") {
        None => {}
        Some(Value::String(subject)) => descriptor.set_subject(subject.as_str()),
        Some(_) => return Err(invalid("subject", "string")),
    }

    match non_null(jrd, "expires") {
        None => {}
        Some(Value::String(expires)) => descriptor.set_expires(parse_expires(expires)?),
        Some(_) => return Err(invalid("expires", "string")),
    }

    if let Some(aliases) = non_null(jrd, "aliases") {
        let aliases = aliases
            .as_array()
            .ok_or_else(|| invalid("aliases", "array"))?;
        for alias in aliases {
            let alias = alias
                .as_str()
                .ok_or_else(|| invalid("aliases", "array of strings"))?;
            descriptor.add_alias(alias);
        }
    }

    if let Some(properties) = non_null(jrd, "properties") {
        descriptor.set_properties(properties_from_value(properties)?);
    }

    if let Some(links) = non_null(jrd, "links") {
        let links = links.as_array().ok_or_else(|| invalid("links", "array"))?;
        for link in links {
            descriptor.add_link_value(link)?;
        }
    }

    Ok(descriptor)
}

fn invalid(field: &'static str, expected: &'static str) -> XrdError {
    XrdError::InvalidField { field, expected }
}
