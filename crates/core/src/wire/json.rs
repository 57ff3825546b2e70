//! JSON payloads read through `serde_json::Value`

use serde_json::Value;
use std::borrow::Cow;

use super::{WireFormat, WireNode};
use crate::error::{Error, Result};

/// JSON wire format
pub struct Json;

impl WireFormat for Json {
    type Node = Value;

    const NAME: &'static str = "JSON";

    fn parse(text: &str) -> Result<Value> {
        serde_json::from_str(text).map_err(|e| Error::Materialization {
            format: Self::NAME,
            message: e.to_string(),
        })
    }
}

impl WireNode for Value {
    fn name(&self) -> Option<&str> {
        None
    }

    fn child(&self, key: &str) -> Option<&Self> {
        self.as_object()?.get(key)
    }

    fn items(&self) -> Vec<&Self> {
        match self {
            Value::Array(items) => items.iter().collect(),
            _ => Vec::new(),
        }
    }

    fn text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::String(s) => Some(Cow::Borrowed(s)),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Bool(b) => Some(Cow::Owned(b.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}
