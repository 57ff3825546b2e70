//! Wire payload capability
//!
//! Responses arrive as XML or JSON depending on the resource. Both are parsed
//! into a generic node tree and read through the same [`WireNode`] interface,
//! so entity decoding is written once. Each request processor picks its
//! [`WireFormat`] statically.

pub mod json;
pub mod xml;

use std::borrow::Cow;
use std::str::FromStr;

use crate::error::Result;

pub use json::Json;
pub use xml::{Xml, XmlElement};

/// A parsed wire payload
pub trait WireFormat {
    type Node: WireNode;

    /// Human readable format name used in error messages
    const NAME: &'static str;

    fn parse(text: &str) -> Result<Self::Node>;
}

/// Read access to a node of a parsed payload
pub trait WireNode {
    /// Element name; JSON nodes are unnamed
    fn name(&self) -> Option<&str>;

    /// Named child element or object member
    fn child(&self, key: &str) -> Option<&Self>;

    /// Child elements, or array items
    fn items(&self) -> Vec<&Self>;

    /// Scalar content, if the node has any
    fn text(&self) -> Option<Cow<'_, str>>;

    /// Walk a `/`-separated path of child names
    fn query(&self, path: &str) -> Option<&Self> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, key| node.child(key))
    }

    fn has(&self, path: &str) -> bool {
        self.query(path).is_some()
    }

    /// Non-empty text at `path`
    fn string(&self, path: &str) -> Option<String> {
        self.query(path)?
            .text()
            .map(Cow::into_owned)
            .filter(|s| !s.is_empty())
    }

    fn value<T: FromStr>(&self, path: &str) -> Option<T> {
        self.string(path)?.trim().parse().ok()
    }

    /// Boolean at `path`, false when absent or unreadable
    fn flag(&self, path: &str) -> bool {
        self.value::<bool>(path).unwrap_or(false)
    }

    /// Items of the node at `path`, empty when absent
    fn list(&self, path: &str) -> Vec<&Self> {
        self.query(path).map(|node| node.items()).unwrap_or_default()
    }
}
