use serde_json::Value;
use thiserror::Error;

/// Failure of a single round trip against the configured API.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("API Error: {status} {status_text} - {body}")]
    HttpStatus {
        status: u16,
        status_text: String,
        body: Value,
    },

    #[error("{0}")]
    Network(String),

    #[error("Token not found in response")]
    TokenNotFound,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

impl ApiError {
    /// Stable snake_case label used in envelope metadata and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Timeout { .. } => "timeout",
            ApiError::HttpStatus { .. } => "http_status",
            ApiError::Network(_) => "network",
            ApiError::TokenNotFound => "token_not_found",
            ApiError::InvalidUrl(_) => "invalid_url",
            ApiError::InvalidHeader(_) => "invalid_header",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}
