//! Transport seam between the context and the network

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use twquery_core::request::{Body, Method};
use twquery_core::{Error, Result};

use crate::config::TwitterConfig;

/// Sends one request and returns the raw response body
///
/// Implementations must report non-2xx responses as [`Error::Transport`] with
/// the response body as the message.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn send(&self, method: Method, url: &str, body: &Body) -> Result<String>;
}

/// [`Executor`] backed by `reqwest` with bearer-token authentication
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: reqwest::Client,
}

fn transport(err: reqwest::Error) -> Error {
    Error::Transport {
        status: err.status().map(|s| s.as_u16()),
        message: err.to_string(),
    }
}

impl HttpExecutor {
    pub fn new(config: &TwitterConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.bearer_token))
                .map_err(|e| Error::Transport {
                    status: None,
                    message: format!("Invalid header value: {e}"),
                })?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/xml"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("twquery/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(transport)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Executor for HttpExecutor {
    async fn send(&self, method: Method, url: &str, body: &Body) -> Result<String> {
        let builder = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        };

        let builder = match body {
            Body::Empty => builder,
            Body::Form(fields) => builder.form(fields),
            Body::Json(value) => builder.json(value),
        };

        let response = builder.send().await.map_err(transport)?;
        let status = response.status();
        let text = response.text().await.map_err(transport)?;

        if !status.is_success() {
            return Err(Error::Transport {
                status: Some(status.as_u16()),
                message: text,
            });
        }

        Ok(text)
    }
}
