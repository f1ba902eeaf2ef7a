//! XRD and JRD resource descriptors.
//!
//! This crate provides the data model, XML and JSON codecs, and host-meta /
//! WebFinger accessors used to describe web resources per RFC 6415 (XRD,
//! host-meta) and RFC 7033 (WebFinger, JRD). It is the foundation for the
//! `xrd-discovery` client and the `webfinger` CLI.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`types`] | Shared value types: [`PropertyValue`], [`OrderedMap`], [`LinkTarget`], content types and namespaces |
//! | [`link`] | [`LinkElement`], one `<Link>` / JRD link object |
//! | [`descriptor`] | [`Descriptor`], the resource descriptor and its XML/JSON entry points |
//! | [`host_meta`] | [`HostMetaExt`]: LRDD template lookup on host-meta documents |
//! | [`webfinger`] | [`WebFingerExt`]: href/template lookup on WebFinger results |
//!
//! # Quick start
//!
//! ```rust
//! use xrd::{HostMeta, HostMetaExt, WebFinger, WebFingerExt};
//!
//! let mut host_meta = HostMeta::default();
//! host_meta.add_lrdd_xrd("https://example.com/.well-known/webfinger?resource={uri}");
//! let xml = host_meta.to_xml();
//!
//! let parsed = HostMeta::from_xml(&xml).unwrap();
//! assert_eq!(
//!     parsed.lrdd_xrd(),
//!     "https://example.com/.well-known/webfinger?resource={uri}"
//! );
//!
//! let jrd = WebFinger::from_json(
//!     r#"{"subject":"acct:alice@example.com","links":[{"rel":"http://webfinger.net/rel/profile-page","href":"https://example.com/@alice"}]}"#,
//! )
//! .unwrap();
//! assert_eq!(jrd.profile_page_href(), "https://example.com/@alice");
//! ```

pub mod descriptor;
pub mod error;
pub mod host_meta;
mod json;
pub mod link;
pub mod types;
pub mod webfinger;
mod xml;

pub use descriptor::Descriptor;
pub use error::XrdError;
pub use host_meta::{HostMeta, HostMetaExt, REL_LRDD};
pub use link::LinkElement;
pub use types::{
    LinkTarget, OrderedMap, Properties, PropertyValue, Titles, JRD_CONTENT_TYPE,
    TITLE_LANG_DEFAULT, XRD_CONTENT_TYPE, XRD_NAMESPACE,
};
pub use webfinger::{WebFinger, WebFingerExt, REL_PROFILE_PAGE};
