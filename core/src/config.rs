//! Client configuration.
//!
//! `ClientConfig` carries the base URL every resolved method path is joined
//! onto, plus headers sent with every request. It can be built in code or
//! read from the environment.

use url::Url;

use crate::error::{ApiError, Result};

/// Environment variable read by [`ClientConfig::from_env`].
pub const BASE_URL_ENV: &str = "NSAPI_BASE_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    headers: Vec<(String, String)>,
}

impl ClientConfig {
    /// Validate `base_url` as an absolute http(s) URL and strip trailing
    /// slashes so method paths can be appended verbatim.
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidConfig(format!("base url `{base_url}`: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidConfig(format!(
                "base url `{base_url}` must use http or https"
            )));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(ApiError::InvalidConfig(format!(
                "base url `{base_url}` must not carry a query or fragment"
            )));
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            headers: Vec::new(),
        })
    }

    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(BASE_URL_ENV)
            .map_err(|e| ApiError::InvalidConfig(format!("{BASE_URL_ENV}: {e}")))?;
        Self::new(&base_url)
    }

    /// Add a header sent with every request. Header names are lower-cased.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}
