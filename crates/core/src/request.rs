//! Request model handed to the transport

use serde::Serialize;
use std::fmt;

/// Endpoint plus ordered wire parameters for a query
///
/// Parameter order is insertion order; it is part of the request's identity
/// (signatures are computed over it downstream).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Request {
    pub endpoint: String,
    pub parameters: Vec<(String, String)>,
}

impl Request {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            parameters: Vec::new(),
        }
    }

    pub fn push(&mut self, name: &str, value: impl Into<String>) {
        self.parameters.push((name.to_string(), value.into()));
    }

    /// Append `name=true` only when the flag is set
    pub fn push_flag(&mut self, name: &str, flag: Option<bool>) {
        if flag == Some(true) {
            self.push(name, "true");
        }
    }

    /// Append `name=value` only when a value is present
    pub fn push_opt<T: ToString + ?Sized>(&mut self, name: &str, value: Option<&T>) {
        if let Some(value) = value {
            self.push(name, value.to_string());
        }
    }

    /// First value for the wire parameter `name`
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Percent-encoded query string without the leading `?`
    pub fn query_string(&self) -> String {
        self.parameters
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(name),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Full URL for a GET request
    pub fn url(&self) -> String {
        if self.parameters.is_empty() {
            self.endpoint.clone()
        } else {
            format!("{}?{}", self.endpoint, self.query_string())
        }
    }
}

/// HTTP method of an outgoing call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Body of an outgoing call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Body {
    Empty,
    /// `application/x-www-form-urlencoded`, in the given order
    Form(Vec<(String, String)>),
    Json(serde_json::Value),
}

impl Body {
    /// Value of a form field, if this is a form body
    pub fn form_value(&self, name: &str) -> Option<&str> {
        match self {
            Body::Form(fields) => fields
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            Body::Empty | Body::Json(_) => None,
        }
    }
}

/// A fully validated mutating call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandRequest {
    pub method: Method,
    pub url: String,
    pub body: Body,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_encodes_values_in_order() {
        let mut req = Request::new("https://api.twitter.com/1.1/tweets/search/30day/dev.json");
        req.push("query", "LINQ to Twitter");
        req.push("maxResults", "10");

        assert_eq!(
            req.url(),
            "https://api.twitter.com/1.1/tweets/search/30day/dev.json?query=LINQ%20to%20Twitter&maxResults=10"
        );
    }

    #[test]
    fn test_url_without_parameters() {
        let req = Request::new("https://api.twitter.com/1.1/statuses/public_timeline.xml");
        assert_eq!(req.url(), req.endpoint);
    }

    #[test]
    fn test_push_flag_only_when_true() {
        let mut req = Request::new("x");
        req.push_flag("a", None);
        req.push_flag("b", Some(false));
        req.push_flag("c", Some(true));
        assert_eq!(req.parameters, vec![("c".to_string(), "true".to_string())]);
    }

    #[test]
    fn test_form_value() {
        let body = Body::Form(vec![("slug".to_string(), "test".to_string())]);
        assert_eq!(body.form_value("slug"), Some("test"));
        assert_eq!(body.form_value("list_id"), None);
        assert_eq!(Body::Empty.form_value("slug"), None);
    }
}
