//! Request processors and result materialization
//!
//! A request processor owns everything resource-specific about a query: which
//! fields a predicate may mention, how the resulting parameter map becomes an
//! endpoint and ordered wire parameters, and how the response payload becomes
//! typed items. The pipeline is the same for every resource:
//!
//! ```text
//! Expr --parameters--> ParameterMap --query--> Query --request_for--> Request
//!                                                |
//! raw text ------------------- process_results --+--> Vec<Record<Query, Item>>
//! ```
//!
//! The typed `Query` value is the echoed context: it is built once from the
//! caller's parameters and cloned onto every materialized record.

use serde::Serialize;
use std::ops::Deref;

use crate::error::{Error, Result};
use crate::expression::Expr;
use crate::parameters::{self, ParameterMap};
use crate::request::Request;
use crate::wire::{WireFormat, WireNode};

/// A materialized item together with the query that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record<Q, T> {
    pub query: Q,
    pub item: T,
}

impl<Q, T> Record<Q, T> {
    pub fn new(query: Q, item: T) -> Self {
        Self { query, item }
    }

    pub fn into_item(self) -> T {
        self.item
    }
}

impl<Q, T> Deref for Record<Q, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.item
    }
}

/// Translation and materialization rules for one resource
pub trait RequestProcessor {
    /// Typed view of the caller's parameters, echoed onto every record
    type Query: Clone;

    /// Materialized entity
    type Item: Default;

    /// Payload format of the resource's responses
    type Format: WireFormat;

    /// Fields a predicate may mention
    const FIELDS: &'static [&'static str];

    /// Extract this resource's parameters from a predicate
    fn parameters(&self, expr: &Expr) -> Result<ParameterMap> {
        parameters::extract(expr, Self::FIELDS)
    }

    /// Read the variant and typed fields out of a parameter map
    fn query(&self, params: &ParameterMap) -> Result<Self::Query>;

    /// Validate a query and build its request
    fn request_for(&self, query: &Self::Query) -> Result<Request>;

    fn build_request(&self, params: &ParameterMap) -> Result<Request> {
        let query = self.query(params)?;
        self.request_for(&query)
    }

    /// Project a parsed payload into items
    fn items(
        &self,
        root: &<Self::Format as WireFormat>::Node,
        query: &Self::Query,
    ) -> Result<Vec<Self::Item>>;

    fn process_results(
        &self,
        raw: &str,
        query: &Self::Query,
    ) -> Result<Vec<Record<Self::Query, Self::Item>>> {
        materialize(self, raw, query)
    }
}

/// Parse `raw` with the processor's format and stamp every item with `query`
///
/// A blank payload is a single default item, never an error.
pub fn materialize<P: RequestProcessor + ?Sized>(
    processor: &P,
    raw: &str,
    query: &P::Query,
) -> Result<Vec<Record<P::Query, P::Item>>> {
    let items = if raw.trim().is_empty() {
        vec![P::Item::default()]
    } else {
        let root = <P::Format as WireFormat>::parse(raw)?;
        processor.items(&root, query)?
    };

    Ok(items
        .into_iter()
        .map(|item| Record::new(query.clone(), item))
        .collect())
}

/// Record elements named `element`
///
/// Collection responses wrap records in a parent element; single-record
/// responses (a `show` call) return the record itself as the root.
pub fn records<'a, N: WireNode>(root: &'a N, element: &str) -> Vec<&'a N> {
    let mut nodes: Vec<&N> = root
        .items()
        .into_iter()
        .filter(|node| node.name() == Some(element))
        .collect();

    if root.name() == Some(element) {
        nodes.push(root);
    }

    nodes
}

/// True when `id` textually equals one of its alternate identifiers
///
/// The API disambiguates by parameter name rather than value shape, so in that
/// case the alternate parameter is sent and the id form is dropped.
pub fn duplicates_alternate(id: &str, alternates: &[Option<&str>]) -> bool {
    alternates.iter().flatten().any(|alternate| *alternate == id)
}

/// Fail with a missing-parameter error for `group` unless one of `present` holds
pub fn require_any(group: &str, present: &[bool], message: &str) -> Result<()> {
    if present.iter().any(|p| *p) {
        Ok(())
    } else {
        Err(Error::missing(group, message))
    }
}

/// Non-blank text value
pub fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Base URL with exactly one trailing slash
pub fn normalize_base(base_url: &str) -> String {
    format!("{}/", base_url.trim_end_matches('/'))
}
