use twquery_core::processor::normalize_base;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    MissingVariable(&'static str),
}

/// Twitter API configuration
///
/// `base_url` serves the v1.1 resources (timelines, search, list queries and
/// member changes); `base_url2` serves the v2 list endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwitterConfig {
    pub base_url: String,
    pub base_url2: String,
    pub bearer_token: String,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            base_url2: Self::DEFAULT_BASE_URL2.to_string(),
            bearer_token: String::new(),
        }
    }
}

impl TwitterConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.twitter.com/1.1/";
    pub const DEFAULT_BASE_URL2: &'static str = "https://api.twitter.com/2/";

    pub fn new(bearer_token: impl Into<String>) -> Self {
        Self {
            bearer_token: bearer_token.into(),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables
    ///
    /// Requires `TWITTER_BEARER_TOKEN`; `TWITTER_BASE_URL` and
    /// `TWITTER_BASE_URL2` override the default endpoints.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bearer_token = lookup("TWITTER_BEARER_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::MissingVariable("TWITTER_BEARER_TOKEN"))?;

        Ok(Self {
            bearer_token,
            ..Default::default()
        }
        .with_overrides(
            lookup("TWITTER_BASE_URL"),
            lookup("TWITTER_BASE_URL2"),
            None,
        ))
    }

    /// Apply CLI overrides to the configuration
    pub fn with_overrides(
        mut self,
        base_url: Option<String>,
        base_url2: Option<String>,
        bearer_token: Option<String>,
    ) -> Self {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        if let Some(url) = base_url2 {
            self.base_url2 = url;
        }
        if let Some(token) = bearer_token {
            self.bearer_token = token;
        }
        self.base_url = normalize_base(&self.base_url);
        self.base_url2 = normalize_base(&self.base_url2);
        self
    }
}
