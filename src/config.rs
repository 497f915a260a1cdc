use crate::constants::{env, headers, network, protocols::ALLOWED_HTTP, server};
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid absolute http(s) URL: {value}")]
    InvalidBaseUrl { var: &'static str, value: String },

    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Everything the API client needs, fixed at construction.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    /// Sent verbatim as the `api-key` header on every request.
    pub api_key: Option<String>,
    /// Initial bearer token; seeds the client's auth state.
    pub auth_token: Option<String>,
    /// Default headers in insertion order. Later entries win on collision.
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(env::API_BASE_URL, base_url)?,
            api_key: None,
            auth_token: None,
            headers: vec![
                (
                    "Content-Type".to_string(),
                    headers::CONTENT_TYPE_JSON.to_string(),
                ),
                (
                    "User-Agent".to_string(),
                    format!("{}/{}", server::NAME, server::VERSION),
                ),
            ],
            timeout: Duration::from_millis(network::TIMEOUT_API_REQUEST_MS),
        })
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = non_empty(Some(key.into()));
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = non_empty(Some(token.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub api: ApiConfig,
    pub port: u16,
    pub base_url_configured: bool,
    pub api_key_configured: bool,
    pub auth_token_from_env: bool,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so callers can supply a
    /// fixed map instead of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| non_empty(lookup(key).map(|v| v.trim().to_string()));

        let base_url = read(env::API_BASE_URL);
        let base_url_configured = base_url.is_some();
        let mut api = ApiConfig::new(
            base_url
                .as_deref()
                .unwrap_or(network::PLACEHOLDER_BASE_URL),
        )?;

        let api_key = read(env::API_KEY);
        if let Some(key) = api_key.as_ref() {
            api = api.with_api_key(key.clone());
        }
        let auth_token = read(env::AUTH_TOKEN);
        if let Some(token) = auth_token.as_ref() {
            api = api.with_auth_token(token.clone());
        }
        if let Some(raw) = read(env::API_TIMEOUT) {
            let timeout_ms = parse_positive(env::API_TIMEOUT, &raw)?;
            api = api.with_timeout(Duration::from_millis(timeout_ms));
        }

        let port = match read(env::PORT) {
            Some(raw) => {
                let value = parse_positive(env::PORT, &raw)?;
                u16::try_from(value).map_err(|_| ConfigError::InvalidNumber {
                    var: env::PORT,
                    value: raw.clone(),
                })?
            }
            None => network::DEFAULT_HTTP_PORT,
        };

        Ok(Self {
            api,
            port,
            base_url_configured,
            api_key_configured: api_key.is_some(),
            auth_token_from_env: auth_token.is_some(),
        })
    }
}

fn parse_base_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidBaseUrl {
        var,
        value: raw.to_string(),
    };
    let url = Url::parse(raw).map_err(|_| invalid())?;
    let scheme = format!("{}:", url.scheme());
    if !ALLOWED_HTTP.contains(&scheme.as_str()) || url.cannot_be_a_base() {
        return Err(invalid());
    }
    Ok(url)
}

fn parse_positive(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidNumber {
            var,
            value: raw.to_string(),
        }),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
